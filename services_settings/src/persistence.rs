//! Settings persistence layer
//!
//! Overrides are stored as versioned JSON. Defaults are never written; they
//! are rebuilt by `create_default_registry`.

use crate::{ProfileId, ProfileOverrides, SettingKey, SettingValue, SettingsRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Serializable container for settings overrides
///
/// BTreeMaps keep the JSON output stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverridesData {
    /// Version of the settings format
    pub version: u32,
    pub overrides: BTreeMap<ProfileId, BTreeMap<String, SettingValue>>,
}

impl SettingsOverridesData {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_overrides(overrides: &ProfileOverrides) -> Self {
        let overrides = overrides
            .iter()
            .map(|(profile, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (key.as_str().to_string(), value.clone()))
                    .collect();
                (profile.clone(), settings)
            })
            .collect();
        Self {
            version: Self::CURRENT_VERSION,
            overrides,
        }
    }

    pub fn to_overrides(&self) -> ProfileOverrides {
        self.overrides
            .iter()
            .map(|(profile, settings)| {
                let settings = settings
                    .iter()
                    .map(|(key, value)| (SettingKey::new(key.as_str()), value.clone()))
                    .collect();
                (profile.clone(), settings)
            })
            .collect()
    }
}

impl Default for SettingsOverridesData {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur while storing or loading settings
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    #[error("Failed to deserialize settings: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serializes settings overrides to JSON bytes
pub fn serialize_overrides(data: &SettingsOverridesData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(PersistenceError::SerializationFailed)
}

/// Deserializes settings overrides from JSON bytes
pub fn deserialize_overrides(bytes: &[u8]) -> PersistenceResult<SettingsOverridesData> {
    let data: SettingsOverridesData =
        serde_json::from_slice(bytes).map_err(PersistenceError::DeserializationFailed)?;

    if data.version != SettingsOverridesData::CURRENT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(data.version));
    }

    Ok(data)
}

/// Loads overrides from bytes, falling back to no overrides on error
pub fn load_overrides_safe(bytes: &[u8]) -> SettingsOverridesData {
    deserialize_overrides(bytes).unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable settings overrides");
        SettingsOverridesData::new()
    })
}

/// Writes the registry's overrides to a file
pub fn save_to_path(registry: &SettingsRegistry, path: &Path) -> PersistenceResult<()> {
    let data = SettingsOverridesData::from_overrides(&registry.export_overrides());
    fs::write(path, serialize_overrides(&data)?)?;
    Ok(())
}

/// Replaces the registry's overrides with those stored in a file
pub fn load_from_path(registry: &mut SettingsRegistry, path: &Path) -> PersistenceResult<()> {
    let bytes = fs::read(path)?;
    let data = deserialize_overrides(&bytes)?;
    registry.import_overrides(data.to_overrides());
    Ok(())
}
