//! Score Gradient
//!
//! Maps a numeric score to a color by clamping it into
//! `min_value..=max_value` and interpolating between evenly spaced stops.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GRADIENT_COLORS, DEFAULT_GRADIENT_MAX, DEFAULT_GRADIENT_MIN};
use super::parse::Rgba;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    pub colors: Vec<String>,
    pub min_value: f64,
    pub max_value: f64,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            colors: DEFAULT_GRADIENT_COLORS.iter().map(|c| c.to_string()).collect(),
            min_value: DEFAULT_GRADIENT_MIN,
            max_value: DEFAULT_GRADIENT_MAX,
        }
    }
}

impl Gradient {
    pub fn new(colors: Vec<String>, min_value: f64, max_value: f64) -> Self {
        Self { colors, min_value, max_value }
    }

    /// Color for `score` as `#rrggbb`; `None` if no stop parses or the score
    /// is not finite.
    pub fn get_color(&self, score: f64) -> Option<String> {
        if !score.is_finite() {
            return None;
        }

        let stops: Vec<Rgba> = self.colors.iter()
            .filter_map(|c| {
                let parsed = Rgba::parse(c);
                if parsed.is_none() {
                    log::debug!("Ignoring unparseable gradient stop '{}'", c);
                }
                parsed
            })
            .collect();

        match stops.len() {
            0 => None,
            1 => Some(stops[0].to_hex()),
            n => {
                let (lo, hi) = if self.min_value <= self.max_value {
                    (self.min_value, self.max_value)
                } else {
                    (self.max_value, self.min_value)
                };
                let span = hi - lo;
                let t = if span > 0.0 { (score.clamp(lo, hi) - lo) / span } else { 0.0 };

                let position = t * (n - 1) as f64;
                let index = (position.floor() as usize).min(n - 2);
                let local = position - index as f64;

                Some(stops[index].mix(&stops[index + 1], local).to_hex())
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
