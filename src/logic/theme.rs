//! Theme Detection
//!
//! Resolved once per session: the `is_user_theme_dark` cookie wins when
//! present, otherwise the system color-scheme preference decides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::THEME_COOKIE;

// ============================================================================
// COOKIES
// ============================================================================

/// Read-only view of a `Cookie:` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    /// Parse `name=value; other=value`. Malformed pairs are ignored;
    /// the first occurrence of a name wins.
    pub fn parse(header: &str) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else { continue };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies
                .entry(name.to_string())
                .or_insert_with(|| value.trim().trim_matches('"').to_string());
        }
        Self { cookies }
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

// ============================================================================
// THEME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Cookie first, then the system preference
    pub fn detect(cookies: &CookieJar, system_prefers_dark: bool) -> Self {
        let dark = match cookies.get(THEME_COOKIE) {
            Some(value) => value == "true",
            None => system_prefers_dark,
        };
        log::debug!(
            "Theme resolved to {} (cookie: {})",
            if dark { "dark" } else { "light" },
            cookies.has(THEME_COOKIE)
        );
        Self::from_dark(dark)
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    /// Default cell text color when nothing else applies
    pub fn default_text_color(&self) -> &'static str {
        if self.is_dark() { "white" } else { "black" }
    }

    /// `is_user_theme_dark=<bool>` pair for persisting a user toggle
    pub fn to_cookie(&self) -> String {
        format!("{}={}", THEME_COOKIE, self.is_dark())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parse() {
        let jar = CookieJar::parse("session=abc; is_user_theme_dark=true; junk; =x; quoted=\"v\"");
        assert!(jar.has("session"));
        assert_eq!(jar.get(THEME_COOKIE), Some("true"));
        assert_eq!(jar.get("quoted"), Some("v"));
        assert!(!jar.has("junk"));
        assert!(!jar.has(""));
    }

    #[test]
    fn test_cookie_wins_over_system() {
        let dark = CookieJar::parse("is_user_theme_dark=true");
        let light = CookieJar::parse("is_user_theme_dark=false");

        assert_eq!(Theme::detect(&dark, false), Theme::Dark);
        assert_eq!(Theme::detect(&light, true), Theme::Light);
    }

    #[test]
    fn test_non_true_cookie_is_light() {
        let jar = CookieJar::parse("is_user_theme_dark=yes");
        assert_eq!(Theme::detect(&jar, true), Theme::Light);
    }

    #[test]
    fn test_system_fallback() {
        let empty = CookieJar::default();
        assert_eq!(Theme::detect(&empty, true), Theme::Dark);
        assert_eq!(Theme::detect(&empty, false), Theme::Light);
    }

    #[test]
    fn test_cookie_round_trip() {
        let jar = CookieJar::parse(&Theme::Dark.to_cookie());
        assert_eq!(Theme::detect(&jar, false), Theme::Dark);
        assert_eq!(Theme::Light.to_cookie(), "is_user_theme_dark=false");
        assert_eq!(Theme::Dark.default_text_color(), "white");
        assert_eq!(Theme::Light.default_text_color(), "black");
    }
}
