//! User-visible strings and key prefixes

use services_settings::{keys, SettingsRegistry};

/// Strings the host shows or uses to build keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLabels {
    pub save: String,
    pub reload: String,
    pub refresh: String,
    pub create: String,
    /// Empty entry of enumeration selections
    pub empty_selection: String,
    pub element_prefix: String,
    pub list_prefix: String,
    /// Caption token of unsaved instances
    pub new_caption: String,
}

impl FormLabels {
    /// Resolves every label for a profile, falling back to the built-in text
    pub fn from_settings(settings: &SettingsRegistry, profile: &str) -> Self {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            settings
                .text(profile, key)
                .map(str::to_string)
                .unwrap_or(fallback)
        };
        Self {
            save: text(keys::ELEMENT_SAVE, defaults.save),
            reload: text(keys::ELEMENT_RELOAD, defaults.reload),
            refresh: text(keys::LIST_REFRESH, defaults.refresh),
            create: text(keys::LIST_CREATE, defaults.create),
            empty_selection: text(keys::ENUM_EMPTY, defaults.empty_selection),
            element_prefix: text(keys::ELEMENT_KEY_PREFIX, defaults.element_prefix),
            list_prefix: text(keys::LIST_KEY_PREFIX, defaults.list_prefix),
            new_caption: text(keys::CAPTION_NEW, defaults.new_caption),
        }
    }
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            save: "Save".to_string(),
            reload: "Reload".to_string(),
            refresh: "Refresh".to_string(),
            create: "Create".to_string(),
            empty_selection: "<empty>".to_string(),
            element_prefix: "DEF_ELEM_".to_string(),
            list_prefix: "DEF_LIST_".to_string(),
            new_caption: "new".to_string(),
        }
    }
}
