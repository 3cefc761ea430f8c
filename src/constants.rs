//! Central Configuration Constants
//!
//! Single source of truth for defaults shared by the view-model, the cell
//! renderer and the CLI.

/// Default ATT&CK domain
pub const DEFAULT_DOMAIN: &str = "enterprise-attack";

/// Default ATT&CK content version
pub const DEFAULT_ATTACK_VERSION: &str = "14";

/// Layer format version written on export
pub const LAYER_VERSION: &str = "4.5";

/// Major layer version accepted on import
pub const SUPPORTED_LAYER_MAJOR: u32 = 4;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "nav-matrix";

/// Cookie holding the user's explicit theme choice ("true" / "false")
pub const THEME_COOKIE: &str = "is_user_theme_dark";

/// Kill chain name used by ATT&CK kill chain phases and external references
pub const ATTACK_SOURCE_NAME: &str = "mitre-attack";

// ============================================
// Cell styling
// ============================================

/// Classes every cell starts with
pub const BASE_CELL_CLASSES: &str = "link noselect cell";

/// Text color of disabled annotations
pub const DISABLED_TEXT_COLOR: &str = "rgb(255 255 255 / 25%)";

/// Candidates offered to the readability check
pub const TEXT_COLOR_CANDIDATES: &[&str] = &["white", "black"];

/// Default score gradient (red -> yellow -> green)
pub const DEFAULT_GRADIENT_COLORS: &[&str] = &["#ff6666", "#ffe766", "#8ec843"];

pub const DEFAULT_GRADIENT_MIN: f64 = 0.0;
pub const DEFAULT_GRADIENT_MAX: f64 = 100.0;

// ============================================
// Multiselect picker labels
// ============================================

pub const LABEL_GROUPS: &str = "threat groups";
pub const LABEL_SOFTWARE: &str = "software";
pub const LABEL_MITIGATIONS: &str = "mitigations";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get domain from environment or use default
pub fn get_domain() -> String {
    std::env::var("NAV_DOMAIN")
        .unwrap_or_else(|_| DEFAULT_DOMAIN.to_string())
}

/// Get ATT&CK version from environment or use default
pub fn get_attack_version() -> String {
    std::env::var("NAV_ATTACK_VERSION")
        .unwrap_or_else(|_| DEFAULT_ATTACK_VERSION.to_string())
}

/// Read a boolean flag from environment ("1"/"true"/"yes")
pub fn get_env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}
