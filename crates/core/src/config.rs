//! TOML configuration loading.
//!
//! The renderer itself has no global settings; each binary describes its own
//! configuration type and loads it through [`load_toml`] or [`parse_toml`].

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Read and deserialize a TOML file.
///
/// # Errors
/// - [`Error::Io`] if the file cannot be read
/// - [`Error::Config`] if the contents do not match `T`
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value = parse_toml(&text, path)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(value)
}

/// Deserialize TOML text, attributing errors to `origin`.
pub fn parse_toml<T: DeserializeOwned>(text: &str, origin: impl AsRef<Path>) -> Result<T> {
    toml::from_str(text).map_err(|e| Error::Config {
        path: origin.as_ref().to_path_buf(),
        message: e.message().to_string(),
    })
}
