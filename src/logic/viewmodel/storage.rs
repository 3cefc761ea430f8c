use std::fs;
use std::path::{Path, PathBuf};

use super::layer::{Layer, LayerError};

/// Get default layer directory
pub fn default_layer_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nav-matrix") // App name
        .join("layers")
}

/// File path for a layer name inside `dir`
pub fn layer_path(dir: &Path, name: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "layer".to_string() } else { stem };
    dir.join(format!("{}.json", stem))
}

/// Save layer to disk
pub fn save_layer(layer: &Layer, path: &Path) -> Result<(), LayerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(layer)?;
    fs::write(path, json)?;
    log::debug!("Saved layer '{}' to {}", layer.name, path.display());
    Ok(())
}

/// Load layer from disk; the version must be supported
pub fn load_layer(path: &Path) -> Result<Layer, LayerError> {
    let data = fs::read(path)?;
    let layer: Layer = serde_json::from_slice(&data)?;
    layer.validate_version()?;

    Ok(layer)
}
