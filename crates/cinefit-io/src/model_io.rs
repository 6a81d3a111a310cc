use cinefit_core::{CineError, CineResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Save any serializable model to a pretty-printed JSON file.
pub fn save_model<M: Serialize>(model: &M, path: impl AsRef<Path>) -> CineResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(model)
        .map_err(|e| CineError::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    info!(path = %path.display(), "model saved");
    Ok(())
}

/// Load a model previously written by [`save_model`].
pub fn load_model<M: DeserializeOwned>(path: impl AsRef<Path>) -> CineResult<M> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CineError::NotFound(path.display().to_string()));
    }
    let json = fs::read_to_string(path)?;
    let model = serde_json::from_str(&json).map_err(|e| CineError::Serialization(e.to_string()))?;
    info!(path = %path.display(), "model loaded");
    Ok(model)
}
