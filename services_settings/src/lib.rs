//! # Settings Registry
//!
//! Typed, layered settings for the form engine.
//!
//! ## Philosophy
//!
//! - **Typed settings**: Every setting has an explicit type, fixed by its default
//! - **Layered**: Read-only defaults + per-profile overrides
//! - **Deterministic**: Settings are serializable and reproducible
//! - **Testable**: No global config files, no environment variables
//!
//! ## Example
//!
//! ```ignore
//! use services_settings::{create_default_registry, keys, SettingValue};
//!
//! let mut registry = create_default_registry();
//! registry.set_override("operator", keys::ELEMENT_SAVE, SettingValue::text("Store"))?;
//!
//! assert_eq!(registry.text("operator", keys::ELEMENT_SAVE), Some("Store"));
//! assert_eq!(registry.text("guest", keys::ELEMENT_SAVE), Some("Save"));
//! ```

pub mod persistence;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Setting key (path-like identifier)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingKey(String);

impl SettingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if this key starts with the given prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Setting value (strongly typed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl SettingValue {
    pub fn text(value: impl Into<String>) -> Self {
        SettingValue::Text(value.into())
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            SettingValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Boolean(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::Text(_) => "text",
        }
    }

    fn same_type(&self, other: &SettingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(v) => write!(f, "{}", v),
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Settings error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettingsError {
    #[error("Setting {key} expects a {expected} value, got {actual}")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Profile identifier; overrides are scoped to one profile
pub type ProfileId = String;

/// Overrides of every profile
pub type ProfileOverrides = BTreeMap<ProfileId, BTreeMap<SettingKey, SettingValue>>;

/// Settings registry
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    /// Default settings (read-only)
    defaults: BTreeMap<SettingKey, SettingValue>,
    /// Profile-specific overrides
    overrides: ProfileOverrides,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a default setting
    pub fn register_default(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.defaults.insert(key.into(), value);
    }

    /// Sets a profile override
    ///
    /// The value must have the same type as the registered default, if any.
    pub fn set_override(
        &mut self,
        profile: impl Into<ProfileId>,
        key: impl Into<SettingKey>,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        let key = key.into();
        if let Some(default) = self.defaults.get(&key) {
            if !default.same_type(&value) {
                return Err(SettingsError::TypeMismatch {
                    key,
                    expected: default.type_name(),
                    actual: value.type_name(),
                });
            }
        }
        self.overrides
            .entry(profile.into())
            .or_default()
            .insert(key, value);
        Ok(())
    }

    /// Removes a profile override; returns true if one existed
    pub fn remove_override(&mut self, profile: &str, key: &SettingKey) -> bool {
        self.overrides
            .get_mut(profile)
            .map(|settings| settings.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Gets the effective value for a profile (override or default)
    pub fn get(&self, profile: &str, key: impl Into<SettingKey>) -> Option<&SettingValue> {
        let key = key.into();
        self.overrides
            .get(profile)
            .and_then(|settings| settings.get(&key))
            .or_else(|| self.defaults.get(&key))
    }

    /// Gets the effective text value for a profile
    pub fn text(&self, profile: &str, key: impl Into<SettingKey>) -> Option<&str> {
        self.get(profile, key).and_then(SettingValue::as_text)
    }

    pub fn get_default(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.defaults.get(key)
    }

    /// Returns all default setting keys
    pub fn list_defaults(&self) -> Vec<SettingKey> {
        self.defaults.keys().cloned().collect()
    }

    /// Returns the keys overridden by a profile
    pub fn list_overrides(&self, profile: &str) -> Vec<SettingKey> {
        self.overrides
            .get(profile)
            .map(|settings| settings.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the effective settings under a prefix for a profile
    pub fn list_with_prefix(&self, profile: &str, prefix: &str) -> Vec<(SettingKey, SettingValue)> {
        let mut effective: BTreeMap<&SettingKey, &SettingValue> = self
            .defaults
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        if let Some(settings) = self.overrides.get(profile) {
            effective.extend(settings.iter().filter(|(key, _)| key.starts_with(prefix)));
        }
        effective
            .into_iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Clears all overrides of a profile
    pub fn clear_overrides(&mut self, profile: &str) {
        self.overrides.remove(profile);
    }

    /// Exports all overrides for persistence
    pub fn export_overrides(&self) -> ProfileOverrides {
        self.overrides.clone()
    }

    /// Imports overrides, replacing existing ones
    pub fn import_overrides(&mut self, overrides: ProfileOverrides) {
        self.overrides = overrides;
    }
}

/// Setting keys read by the form engine
pub mod keys {
    /// Caption of the save command
    pub const ELEMENT_SAVE: &str = "forms.element.save";
    /// Caption of the reload command
    pub const ELEMENT_RELOAD: &str = "forms.element.reload";
    /// Caption of the list refresh command
    pub const LIST_REFRESH: &str = "forms.list.refresh";
    /// Caption of the list create command
    pub const LIST_CREATE: &str = "forms.list.create";
    /// Empty entry of enumeration selections
    pub const ENUM_EMPTY: &str = "forms.enum.empty";
    /// Prefix of element view keys
    pub const ELEMENT_KEY_PREFIX: &str = "forms.key.element_prefix";
    /// Prefix of list view keys
    pub const LIST_KEY_PREFIX: &str = "forms.key.list_prefix";
    /// Caption token of unsaved instances
    pub const CAPTION_NEW: &str = "forms.caption.new";
}

/// Creates a settings registry with the form engine defaults
pub fn create_default_registry() -> SettingsRegistry {
    let mut registry = SettingsRegistry::new();

    // Command captions
    registry.register_default(keys::ELEMENT_SAVE, SettingValue::text("Save"));
    registry.register_default(keys::ELEMENT_RELOAD, SettingValue::text("Reload"));
    registry.register_default(keys::LIST_REFRESH, SettingValue::text("Refresh"));
    registry.register_default(keys::LIST_CREATE, SettingValue::text("Create"));

    // Widgets
    registry.register_default(keys::ENUM_EMPTY, SettingValue::text("<empty>"));

    // View keys and captions
    registry.register_default(keys::ELEMENT_KEY_PREFIX, SettingValue::text("DEF_ELEM_"));
    registry.register_default(keys::LIST_KEY_PREFIX, SettingValue::text("DEF_LIST_"));
    registry.register_default(keys::CAPTION_NEW, SettingValue::text("new"));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_key_starts_with() {
        let key = SettingKey::new("forms.element.save");
        assert!(key.starts_with("forms"));
        assert!(key.starts_with("forms.element"));
        assert!(!key.starts_with("theme"));
    }

    #[test]
    fn test_setting_value_accessors() {
        assert_eq!(SettingValue::Boolean(true).as_boolean(), Some(true));
        assert_eq!(SettingValue::Integer(42).as_integer(), Some(42));
        assert_eq!(SettingValue::text("Save").as_text(), Some("Save"));
        assert_eq!(SettingValue::Integer(42).as_text(), None);
    }

    #[test]
    fn test_override_shadows_default_per_profile() {
        let mut registry = create_default_registry();
        registry
            .set_override("operator", keys::ELEMENT_SAVE, SettingValue::text("Store"))
            .unwrap();

        assert_eq!(registry.text("operator", keys::ELEMENT_SAVE), Some("Store"));
        assert_eq!(registry.text("guest", keys::ELEMENT_SAVE), Some("Save"));
    }

    #[test]
    fn test_override_must_match_default_type() {
        let mut registry = create_default_registry();
        let err = registry
            .set_override("operator", keys::ENUM_EMPTY, SettingValue::Integer(0))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::TypeMismatch {
                key: SettingKey::new(keys::ENUM_EMPTY),
                expected: "text",
                actual: "integer",
            }
        );
        assert!(registry.list_overrides("operator").is_empty());
    }

    #[test]
    fn test_override_without_default_is_accepted() {
        let mut registry = SettingsRegistry::new();
        registry
            .set_override("operator", "custom.flag", SettingValue::Boolean(true))
            .unwrap();
        assert_eq!(
            registry.get("operator", "custom.flag"),
            Some(&SettingValue::Boolean(true))
        );
    }

    #[test]
    fn test_remove_override_falls_back() {
        let mut registry = create_default_registry();
        registry
            .set_override("operator", keys::CAPTION_NEW, SettingValue::text("draft"))
            .unwrap();

        assert!(registry.remove_override("operator", &SettingKey::new(keys::CAPTION_NEW)));
        assert_eq!(registry.text("operator", keys::CAPTION_NEW), Some("new"));
        assert!(!registry.remove_override("operator", &SettingKey::new(keys::CAPTION_NEW)));
    }

    #[test]
    fn test_list_with_prefix_applies_overrides() {
        let mut registry = create_default_registry();
        registry
            .set_override("operator", keys::LIST_KEY_PREFIX, SettingValue::text("LIST_"))
            .unwrap();

        let settings = registry.list_with_prefix("operator", "forms.key");
        assert_eq!(
            settings,
            vec![
                (
                    SettingKey::new(keys::ELEMENT_KEY_PREFIX),
                    SettingValue::text("DEF_ELEM_")
                ),
                (SettingKey::new(keys::LIST_KEY_PREFIX), SettingValue::text("LIST_")),
            ]
        );
    }

    #[test]
    fn test_clear_overrides() {
        let mut registry = create_default_registry();
        registry
            .set_override("operator", keys::ELEMENT_SAVE, SettingValue::text("Store"))
            .unwrap();
        registry.clear_overrides("operator");
        assert!(registry.list_overrides("operator").is_empty());
        assert_eq!(registry.text("operator", keys::ELEMENT_SAVE), Some("Save"));
    }

    #[test]
    fn test_default_registry_contents() {
        let registry = create_default_registry();
        assert_eq!(registry.text("any", keys::ELEMENT_RELOAD), Some("Reload"));
        assert_eq!(registry.text("any", keys::ENUM_EMPTY), Some("<empty>"));
        assert_eq!(registry.text("any", keys::ELEMENT_KEY_PREFIX), Some("DEF_ELEM_"));
        assert_eq!(registry.list_defaults().len(), 8);
    }
}
