//! Readability
//!
//! WCAG 2.x relative luminance and contrast ratio. Alpha is ignored.

use super::parse::Rgba;

/// Relative luminance in 0.0..=1.0
pub fn luminance(color: &Rgba) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };

    0.2126 * linear(color.r) + 0.7152 * linear(color.g) + 0.0722 * linear(color.b)
}

/// Contrast ratio in 1.0..=21.0
pub fn contrast_ratio(a: &Rgba, b: &Rgba) -> f64 {
    let la = luminance(a);
    let lb = luminance(b);
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

/// Pick the candidate with the highest contrast against `base`.
///
/// An unparseable `base` is treated as black; unparseable candidates are
/// skipped. The first candidate wins ties. Returns `None` only when no
/// candidate parses.
pub fn most_readable<'a>(base: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let base_rgba = Rgba::parse(base).unwrap_or_else(|| {
        log::debug!("Unparseable color '{}', treating as black", base);
        Rgba::BLACK
    });

    let mut best: Option<(&'a str, f64)> = None;
    for &candidate in candidates {
        let Some(rgba) = Rgba::parse(candidate) else {
            log::debug!("Skipping unparseable candidate '{}'", candidate);
            continue;
        };
        let ratio = contrast_ratio(&base_rgba, &rgba);
        match best {
            Some((_, best_ratio)) if ratio <= best_ratio => {}
            _ => best = Some((candidate, ratio)),
        }
    }

    best.map(|(c, _)| c)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BW: &[&str] = &["white", "black"];

    #[test]
    fn test_contrast_extremes() {
        let ratio = contrast_ratio(&Rgba::WHITE, &Rgba::BLACK);
        assert!((ratio - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(&Rgba::WHITE, &Rgba::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_most_readable() {
        assert_eq!(most_readable("#ffffff", BW), Some("black"));
        assert_eq!(most_readable("#000000", BW), Some("white"));
        assert_eq!(most_readable("navy", BW), Some("white"));
        assert_eq!(most_readable("#ff6666", BW), Some("black"));
        assert_eq!(most_readable("#8ec843", BW), Some("black"));
    }

    #[test]
    fn test_unparseable_base_is_black() {
        assert_eq!(most_readable("garbage", BW), Some("white"));
    }

    #[test]
    fn test_tie_keeps_first() {
        assert_eq!(most_readable("#777777", &["white", "white"]), Some("white"));
        assert_eq!(most_readable("#777777", &["nope"]), None);
    }
}
