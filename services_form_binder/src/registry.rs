//! Widget registration table
//!
//! Maps a value type to the factory that builds its widget and converter.
//! Types without an entry are not rendered.

use crate::converter::{
    Converter, DisplayConverter, EnumConverter, NumberConverter, NumericKind, TextConverter,
};
use crate::widget::Widget;
use form_types::{MemberDescriptor, ValueType, ValueTypeKey, ValueTypeSupport};
use std::collections::HashMap;

/// Default caption of the empty selection entry
pub const DEFAULT_EMPTY_CAPTION: &str = "<empty>";

/// Options shared by every factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    /// Caption of the empty entry in selection lists
    pub empty_caption: String,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            empty_caption: DEFAULT_EMPTY_CAPTION.to_string(),
        }
    }
}

/// Builds the widget for one member
pub trait WidgetFactory: Send + Sync {
    /// Returns `None` when the member cannot be shown by this factory
    fn create(
        &self,
        member: &MemberDescriptor,
        options: &WidgetOptions,
    ) -> Option<(Widget, Box<dyn Converter>)>;
}

/// Text input parsing a number
pub struct NumberFieldFactory(pub NumericKind);

impl WidgetFactory for NumberFieldFactory {
    fn create(
        &self,
        member: &MemberDescriptor,
        _options: &WidgetOptions,
    ) -> Option<(Widget, Box<dyn Converter>)> {
        Some((
            Widget::text_field(&member.label),
            Box::new(NumberConverter::new(self.0)),
        ))
    }
}

/// Text input, multi-line for long text
pub struct TextFieldFactory;

impl WidgetFactory for TextFieldFactory {
    fn create(
        &self,
        member: &MemberDescriptor,
        _options: &WidgetOptions,
    ) -> Option<(Widget, Box<dyn Converter>)> {
        let widget = if member.long_text {
            Widget::text_area(&member.label)
        } else {
            Widget::text_field(&member.label)
        };
        Some((widget, Box::new(TextConverter)))
    }
}

/// Selection list over enumeration constants
pub struct EnumComboFactory;

impl WidgetFactory for EnumComboFactory {
    fn create(
        &self,
        member: &MemberDescriptor,
        options: &WidgetOptions,
    ) -> Option<(Widget, Box<dyn Converter>)> {
        let ValueType::Enumeration(constants) = &member.value_type else {
            return None;
        };
        let widget = Widget::combo_box(
            &member.label,
            constants.as_slice().to_vec(),
            &options.empty_caption,
        );
        Some((widget, Box::new(EnumConverter::new(constants.clone()))))
    }
}

/// Read-only text showing a value that is never written back
///
/// Used for relations and derived values.
pub struct DisplayFieldFactory;

impl WidgetFactory for DisplayFieldFactory {
    fn create(
        &self,
        member: &MemberDescriptor,
        _options: &WidgetOptions,
    ) -> Option<(Widget, Box<dyn Converter>)> {
        let mut widget = Widget::text_field(&member.label);
        widget.set_read_only(true);
        Some((widget, Box::new(DisplayConverter)))
    }
}

/// Registry of widget factories by value type
pub struct WidgetRegistry {
    factories: HashMap<ValueTypeKey, Box<dyn WidgetFactory>>,
    options: WidgetOptions,
}

impl WidgetRegistry {
    /// Creates a registry with no factories
    pub fn new(options: WidgetOptions) -> Self {
        Self {
            factories: HashMap::new(),
            options,
        }
    }

    /// Creates a registry with the built-in factories
    pub fn with_defaults(options: WidgetOptions) -> Self {
        let mut registry = Self::new(options);
        registry.register(
            ValueTypeKey::Integer,
            NumberFieldFactory(NumericKind::Integer),
        );
        registry.register(ValueTypeKey::Float, NumberFieldFactory(NumericKind::Float));
        registry.register(ValueTypeKey::Double, NumberFieldFactory(NumericKind::Double));
        registry.register(ValueTypeKey::Text, TextFieldFactory);
        registry.register(ValueTypeKey::Enumeration, EnumComboFactory);
        registry.register(ValueTypeKey::Relation, DisplayFieldFactory);
        registry.register(ValueTypeKey::Derived, DisplayFieldFactory);
        registry
    }

    /// Registers or replaces the factory for a value type
    pub fn register(&mut self, key: ValueTypeKey, factory: impl WidgetFactory + 'static) {
        self.factories.insert(key, Box::new(factory));
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// Builds the widget for a member
    ///
    /// Identifier and derived members are forced read-only.
    pub fn create(&self, member: &MemberDescriptor) -> Option<(Widget, Box<dyn Converter>)> {
        let factory = self.factories.get(&member.value_type.key())?;
        let (mut widget, converter) = factory.create(member, &self.options)?;
        if member.read_only {
            widget.set_read_only(true);
        }
        Some((widget, converter))
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_defaults(WidgetOptions::default())
    }
}

impl ValueTypeSupport for WidgetRegistry {
    fn supports(&self, value_type: &ValueType) -> bool {
        self.factories.contains_key(&value_type.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn member(name: &str, value_type: ValueType) -> MemberDescriptor {
        MemberDescriptor {
            name: name.to_string(),
            value_type,
            order: None,
            label: name.to_string(),
            read_only: false,
            identifier: false,
            long_text: false,
            derived: None,
        }
    }

    #[test]
    fn test_default_support() {
        let registry = WidgetRegistry::default();
        assert!(registry.supports(&ValueType::Integer));
        assert!(registry.supports(&ValueType::enumeration(["A"])));
        assert!(registry.supports(&ValueType::relation("example.Other")));
        assert!(!registry.supports(&ValueType::other("Set<TradeDeal>")));
    }

    #[test]
    fn test_long_text_uses_text_area() {
        let registry = WidgetRegistry::default();
        let mut notes = member("notes", ValueType::Text);
        notes.long_text = true;
        let (widget, _) = registry.create(&notes).unwrap();
        assert_eq!(widget.kind(), WidgetKind::TextArea);

        let (widget, _) = registry.create(&member("name", ValueType::Text)).unwrap();
        assert_eq!(widget.kind(), WidgetKind::TextField);
    }

    #[test]
    fn test_identifier_is_forced_read_only() {
        let registry = WidgetRegistry::default();
        let mut id = member("id", ValueType::Integer);
        id.read_only = true;
        id.identifier = true;
        let (widget, _) = registry.create(&id).unwrap();
        assert_eq!(widget.kind(), WidgetKind::TextField);
        assert!(widget.is_read_only());
    }

    #[test]
    fn test_relation_is_read_only() {
        let registry = WidgetRegistry::default();
        let (widget, _) = registry
            .create(&member("customer", ValueType::relation("example.Customer")))
            .unwrap();
        assert!(widget.is_read_only());
    }

    #[test]
    fn test_empty_caption_is_configurable() {
        let registry = WidgetRegistry::with_defaults(WidgetOptions {
            empty_caption: "(none)".to_string(),
        });
        let (widget, _) = registry
            .create(&member("level", ValueType::enumeration(["LOW", "HIGH"])))
            .unwrap();
        assert_eq!(widget.display_items(), vec!["(none)", "LOW", "HIGH"]);
    }

    #[test]
    fn test_unregistered_type_has_no_widget() {
        let registry = WidgetRegistry::default();
        assert!(registry
            .create(&member("deals", ValueType::other("Set<TradeDeal>")))
            .is_none());
    }

    #[test]
    fn test_register_extends_table() {
        let mut registry = WidgetRegistry::default();
        registry.register(ValueTypeKey::Other("Money".to_string()), TextFieldFactory);
        assert!(registry.supports(&ValueType::other("Money")));
        assert!(registry
            .create(&member("price", ValueType::other("Money")))
            .is_some());
    }
}
