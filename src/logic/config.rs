//! Navigator Configuration
//!
//! Defaults every new `ViewModel` is seeded with. Can be loaded from a JSON
//! file, the environment, or set at runtime.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{self, DEFAULT_ATTACK_VERSION, DEFAULT_DOMAIN};
use super::color::Gradient;
use super::viewmodel::types::{LayoutMode, LayoutOptions};

// ============================================================================
// NAVIGATOR CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// ATT&CK domain, e.g. "enterprise-attack"
    pub domain: String,
    /// ATT&CK content version, e.g. "14"
    pub attack_version: String,
    pub layout: LayoutOptions,
    pub gradient: Gradient,
    pub select_techniques_across_tactics: bool,
    pub select_subtechniques_with_parent: bool,
    /// System color-scheme signal used when no theme cookie is set
    pub prefers_dark: bool,
    /// Where layers are saved; `None` means the platform data dir
    pub layer_dir: Option<PathBuf>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            attack_version: DEFAULT_ATTACK_VERSION.to_string(),
            layout: LayoutOptions::default(),
            gradient: Gradient::default(),
            select_techniques_across_tactics: true,
            select_subtechniques_with_parent: false,
            prefers_dark: false,
            layer_dir: None,
        }
    }
}

impl NavigatorConfig {
    /// Compact mode - mini layout with IDs instead of names
    pub fn compact() -> Self {
        Self {
            layout: LayoutOptions {
                layout: LayoutMode::Mini,
                show_id: true,
                show_name: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Defaults overridden by `NAV_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self {
            domain: constants::get_domain(),
            attack_version: constants::get_attack_version(),
            ..Default::default()
        };

        if let Ok(layout) = std::env::var("NAV_LAYOUT") {
            match layout.parse::<LayoutMode>() {
                Ok(mode) => config.layout.layout = mode,
                Err(e) => log::warn!("{} - keeping {}", e, config.layout.layout),
            }
        }
        if let Some(dark) = constants::get_env_flag("NAV_PREFERS_DARK") {
            config.prefers_dark = dark;
        }
        if let Some(across) = constants::get_env_flag("NAV_SELECT_ACROSS_TACTICS") {
            config.select_techniques_across_tactics = across;
        }
        if let Some(with_parent) = constants::get_env_flag("NAV_SELECT_SUBTECHNIQUES_WITH_PARENT") {
            config.select_subtechniques_with_parent = with_parent;
        }
        if let Ok(dir) = std::env::var("NAV_LAYER_DIR") {
            config.layer_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// `"{domain}-{attack_version}"`
    pub fn domain_version_id(&self) -> String {
        format!("{}-{}", self.domain, self.attack_version)
    }
}

// ============================================================================
// LOADING
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO Error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config Parse Error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err)
    }
}

/// Load config from a JSON file; missing fields take their defaults
pub fn load_config(path: &Path) -> Result<NavigatorConfig, ConfigError> {
    let data = fs::read(path)?;
    let config: NavigatorConfig = serde_json::from_slice(&data)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

// ============================================================================
// TESTS
// ============================================================================
