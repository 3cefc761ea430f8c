//! CSS Color Parsing
//!
//! Accepts the forms layer files and gradients actually carry:
//! `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()` and common color names.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static FUNCTIONAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^rgba?\((.*)\)$").ok());

/// Common CSS named colors (subset)
static NAMED_COLORS: Lazy<HashMap<&'static str, (u8, u8, u8)>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("black", (0, 0, 0));
    m.insert("white", (255, 255, 255));
    m.insert("red", (255, 0, 0));
    m.insert("lime", (0, 255, 0));
    m.insert("green", (0, 128, 0));
    m.insert("blue", (0, 0, 255));
    m.insert("yellow", (255, 255, 0));
    m.insert("cyan", (0, 255, 255));
    m.insert("aqua", (0, 255, 255));
    m.insert("magenta", (255, 0, 255));
    m.insert("fuchsia", (255, 0, 255));
    m.insert("gray", (128, 128, 128));
    m.insert("grey", (128, 128, 128));
    m.insert("silver", (192, 192, 192));
    m.insert("maroon", (128, 0, 0));
    m.insert("olive", (128, 128, 0));
    m.insert("purple", (128, 0, 128));
    m.insert("teal", (0, 128, 128));
    m.insert("navy", (0, 0, 128));
    m.insert("orange", (255, 165, 0));
    m.insert("pink", (255, 192, 203));
    m.insert("brown", (165, 42, 42));
    m.insert("gold", (255, 215, 0));
    m.insert("lightblue", (173, 216, 230));
    m.insert("lightgreen", (144, 238, 144));
    m.insert("darkred", (139, 0, 0));
    m.insert("darkgreen", (0, 100, 0));
    m.insert("darkblue", (0, 0, 139));
    m
});

/// An sRGB color with alpha in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 1.0 };
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 1.0 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse a CSS color string. Returns `None` for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        if let Some(caps) = FUNCTIONAL.as_ref().and_then(|re| re.captures(s)) {
            return parse_functional(caps.get(1)?.as_str());
        }

        NAMED_COLORS
            .get(s.to_ascii_lowercase().as_str())
            .map(|&(r, g, b)| Rgba::rgb(r, g, b))
    }

    /// Lowercase `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation towards `other`, `t` in 0.0..=1.0
    pub fn mix(&self, other: &Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba {
            r: nibble(0)?,
            g: nibble(1)?,
            b: nibble(2)?,
            a: nibble(3)? as f64 / 255.0,
        }),
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
            a: byte(6)? as f64 / 255.0,
        }),
        _ => None,
    }
}

/// Body of `rgb(...)`: comma syntax or space syntax with `/ alpha`
fn parse_functional(body: &str) -> Option<Rgba> {
    let normalized = body.replace([',', '/'], " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 255.0 / 100.0,
            None => s.parse::<f64>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };

    let alpha = match parts.get(3) {
        Some(s) => match s.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? / 100.0,
            None => s.parse::<f64>().ok()?,
        },
        None => 1.0,
    };

    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha.clamp(0.0, 1.0),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("#FF6666"), Some(Rgba::rgb(255, 102, 102)));

        let translucent = Rgba::parse("#00000080").unwrap();
        assert_eq!((translucent.r, translucent.g, translucent.b), (0, 0, 0));
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);

        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("#zzz"), None);
    }

    #[test]
    fn test_parse_functional_forms() {
        assert_eq!(Rgba::parse("rgb(255, 0, 10)"), Some(Rgba::rgb(255, 0, 10)));

        let spaced = Rgba::parse("rgb(255 255 255 / 25%)").unwrap();
        assert_eq!((spaced.r, spaced.g, spaced.b), (255, 255, 255));
        assert!((spaced.a - 0.25).abs() < 1e-9);

        let rgba = Rgba::parse("RGBA(0, 0, 0, 0.5)").unwrap();
        assert!((rgba.a - 0.5).abs() < 1e-9);

        assert_eq!(Rgba::parse("rgb(1, 2)"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Rgba::parse("White"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("navy"), Some(Rgba::rgb(0, 0, 128)));
        assert_eq!(Rgba::parse("not-a-color"), None);
        assert_eq!(Rgba::parse(""), None);
    }

    #[test]
    fn test_mix_and_hex() {
        let a = Rgba::rgb(255, 102, 102);
        let b = Rgba::rgb(255, 231, 102);
        assert_eq!(a.mix(&b, 0.5).to_hex(), "#ffa766");
        assert_eq!(a.mix(&b, 0.0).to_hex(), "#ff6666");
        assert_eq!(a.mix(&b, 1.0).to_hex(), "#ffe766");
    }
}
