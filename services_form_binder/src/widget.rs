//! Headless editable widgets
//!
//! Widgets hold presentation state only. User edits go through `input` and
//! `select`, which honour the read-only flag; the binder writes display
//! values directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Widget error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Widget {0} is read-only")]
    ReadOnly(String),

    #[error("Widget {0} does not accept text input")]
    NotATextInput(String),

    #[error("Widget {0} has no selectable items")]
    NotASelection(String),

    #[error("Widget {caption} has no item {item}")]
    UnknownItem { caption: String, item: String },
}

/// Kind of widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetKind {
    /// Single-line text input
    TextField,
    /// Multi-line text input
    TextArea,
    /// Selection list with an empty entry
    ComboBox,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::TextField => write!(f, "TextField"),
            WidgetKind::TextArea => write!(f, "TextArea"),
            WidgetKind::ComboBox => write!(f, "ComboBox"),
        }
    }
}

/// Presentation value held by a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetValue {
    /// Raw text of a text input
    Text(String),
    /// Selected item; `None` is the empty entry
    Selection(Option<String>),
}

impl WidgetValue {
    pub fn empty_text() -> Self {
        WidgetValue::Text(String::new())
    }
}

/// An editable widget
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    kind: WidgetKind,
    caption: String,
    read_only: bool,
    value: WidgetValue,
    /// Selectable items, without the empty entry
    items: Vec<String>,
    /// Caption of the empty entry
    empty_caption: String,
}

impl Widget {
    /// Creates a single-line text input
    pub fn text_field(caption: impl Into<String>) -> Self {
        Self::text_input(WidgetKind::TextField, caption)
    }

    /// Creates a multi-line text input
    pub fn text_area(caption: impl Into<String>) -> Self {
        Self::text_input(WidgetKind::TextArea, caption)
    }

    fn text_input(kind: WidgetKind, caption: impl Into<String>) -> Self {
        Self {
            kind,
            caption: caption.into(),
            read_only: false,
            value: WidgetValue::empty_text(),
            items: Vec::new(),
            empty_caption: String::new(),
        }
    }

    /// Creates a selection list with an explicit empty entry
    pub fn combo_box(
        caption: impl Into<String>,
        items: Vec<String>,
        empty_caption: impl Into<String>,
    ) -> Self {
        Self {
            kind: WidgetKind::ComboBox,
            caption: caption.into(),
            read_only: false,
            value: WidgetValue::Selection(None),
            items,
            empty_caption: empty_caption.into(),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn value(&self) -> &WidgetValue {
        &self.value
    }

    /// Current text, for text inputs
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            WidgetValue::Text(text) => Some(text),
            WidgetValue::Selection(_) => None,
        }
    }

    /// Current selection, for selection lists
    pub fn selection(&self) -> Option<&str> {
        match &self.value {
            WidgetValue::Selection(item) => item.as_deref(),
            WidgetValue::Text(_) => None,
        }
    }

    /// Items as displayed, empty entry first
    pub fn display_items(&self) -> Vec<&str> {
        if self.kind != WidgetKind::ComboBox {
            return Vec::new();
        }
        std::iter::once(self.empty_caption.as_str())
            .chain(self.items.iter().map(String::as_str))
            .collect()
    }

    /// Types text into the widget
    pub fn input(&mut self, text: impl Into<String>) -> Result<(), WidgetError> {
        if self.read_only {
            return Err(WidgetError::ReadOnly(self.caption.clone()));
        }
        match self.kind {
            WidgetKind::TextField | WidgetKind::TextArea => {
                self.value = WidgetValue::Text(text.into());
                Ok(())
            }
            WidgetKind::ComboBox => Err(WidgetError::NotATextInput(self.caption.clone())),
        }
    }

    /// Selects an item; `None` selects the empty entry
    pub fn select(&mut self, item: Option<&str>) -> Result<(), WidgetError> {
        if self.read_only {
            return Err(WidgetError::ReadOnly(self.caption.clone()));
        }
        if self.kind != WidgetKind::ComboBox {
            return Err(WidgetError::NotASelection(self.caption.clone()));
        }
        match item {
            None => self.value = WidgetValue::Selection(None),
            Some(item) if self.items.iter().any(|i| i == item) => {
                self.value = WidgetValue::Selection(Some(item.to_string()));
            }
            Some(item) => {
                return Err(WidgetError::UnknownItem {
                    caption: self.caption.clone(),
                    item: item.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Replaces the displayed value regardless of the read-only flag
    pub(crate) fn display(&mut self, value: WidgetValue) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_input() {
        let mut widget = Widget::text_field("Name");
        widget.input("Acme").unwrap();
        assert_eq!(widget.text(), Some("Acme"));
        assert_eq!(widget.kind(), WidgetKind::TextField);
    }

    #[test]
    fn test_read_only_rejects_input() {
        let mut widget = Widget::text_field("Identifier");
        widget.set_read_only(true);
        assert_eq!(
            widget.input("5"),
            Err(WidgetError::ReadOnly("Identifier".to_string()))
        );
        assert_eq!(widget.text(), Some(""));
    }

    #[test]
    fn test_display_bypasses_read_only() {
        let mut widget = Widget::text_field("Identifier");
        widget.set_read_only(true);
        widget.display(WidgetValue::Text("5".to_string()));
        assert_eq!(widget.text(), Some("5"));
    }

    #[test]
    fn test_combo_box_items_start_with_empty_entry() {
        let widget = Widget::combo_box(
            "Level",
            vec!["BRONZE".to_string(), "GOLD".to_string()],
            "<empty>",
        );
        assert_eq!(widget.display_items(), vec!["<empty>", "BRONZE", "GOLD"]);
        assert_eq!(widget.selection(), None);
    }

    #[test]
    fn test_combo_box_select() {
        let mut widget = Widget::combo_box("Level", vec!["BRONZE".to_string()], "<empty>");
        widget.select(Some("BRONZE")).unwrap();
        assert_eq!(widget.selection(), Some("BRONZE"));

        widget.select(None).unwrap();
        assert_eq!(widget.selection(), None);

        let err = widget.select(Some("GOLD")).unwrap_err();
        assert!(matches!(err, WidgetError::UnknownItem { .. }));
    }

    #[test]
    fn test_combo_box_rejects_text() {
        let mut widget = Widget::combo_box("Level", Vec::new(), "<empty>");
        assert!(matches!(
            widget.input("x"),
            Err(WidgetError::NotATextInput(_))
        ));
    }

    #[test]
    fn test_text_area_rejects_selection() {
        let mut widget = Widget::text_area("Notes");
        assert!(matches!(
            widget.select(None),
            Err(WidgetError::NotASelection(_))
        ));
    }
}
