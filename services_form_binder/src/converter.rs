//! Conversions between member values and widget values

use crate::widget::WidgetValue;
use form_types::{EnumConstants, Value};
use std::str::FromStr;

/// Converts a model value to presentation and back
pub trait Converter: Send + Sync {
    /// Model to widget
    fn to_presentation(&self, value: &Value) -> WidgetValue;

    /// Widget to model; the error is a human-readable reason
    fn to_model(&self, presentation: &WidgetValue) -> Result<Value, String>;
}

const UNEXPECTED_WIDGET_VALUE: &str = "Unexpected widget value";

/// Which numeric type a text input parses into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
    Double,
}

impl NumericKind {
    /// Default conversion failure message
    pub fn message(&self) -> &'static str {
        match self {
            NumericKind::Integer => "Must be an integer value",
            NumericKind::Float => "Must be a float value",
            NumericKind::Double => "Must be a double value",
        }
    }

    fn parse(&self, text: &str) -> Option<Value> {
        match self {
            NumericKind::Integer => parse::<i64>(text).map(Value::Integer),
            NumericKind::Float => parse::<f32>(text).map(Value::Float),
            NumericKind::Double => parse::<f64>(text).map(Value::Double),
        }
    }
}

fn parse<N: FromStr>(text: &str) -> Option<N> {
    text.parse().ok()
}

/// Parses text into an integer, float or double
///
/// Blank input converts to `Null`.
#[derive(Debug, Clone)]
pub struct NumberConverter {
    kind: NumericKind,
    message: String,
}

impl NumberConverter {
    pub fn new(kind: NumericKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }

    /// Overrides the failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> NumericKind {
        self.kind
    }
}

impl Converter for NumberConverter {
    fn to_presentation(&self, value: &Value) -> WidgetValue {
        WidgetValue::Text(value.to_string())
    }

    fn to_model(&self, presentation: &WidgetValue) -> Result<Value, String> {
        let WidgetValue::Text(text) = presentation else {
            return Err(UNEXPECTED_WIDGET_VALUE.to_string());
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Null);
        }
        self.kind.parse(text).ok_or_else(|| self.message.clone())
    }
}

/// Passes text through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn to_presentation(&self, value: &Value) -> WidgetValue {
        WidgetValue::Text(value.to_string())
    }

    fn to_model(&self, presentation: &WidgetValue) -> Result<Value, String> {
        match presentation {
            WidgetValue::Text(text) => Ok(Value::Text(text.clone())),
            WidgetValue::Selection(_) => Err(UNEXPECTED_WIDGET_VALUE.to_string()),
        }
    }
}

/// Maps enumeration constants to selections
///
/// The empty entry stands for `Null`.
#[derive(Debug, Clone)]
pub struct EnumConverter {
    constants: EnumConstants,
}

impl EnumConverter {
    pub fn new(constants: EnumConstants) -> Self {
        Self { constants }
    }
}

impl Converter for EnumConverter {
    fn to_presentation(&self, value: &Value) -> WidgetValue {
        match value {
            Value::Enum(name) | Value::Text(name) if self.constants.contains(name) => {
                WidgetValue::Selection(Some(name.clone()))
            }
            _ => WidgetValue::Selection(None),
        }
    }

    fn to_model(&self, presentation: &WidgetValue) -> Result<Value, String> {
        match presentation {
            WidgetValue::Selection(None) => Ok(Value::Null),
            WidgetValue::Selection(Some(name)) if self.constants.contains(name) => {
                Ok(Value::Enum(name.clone()))
            }
            WidgetValue::Selection(Some(name)) => Err(format!("Unknown constant {}", name)),
            WidgetValue::Text(_) => Err(UNEXPECTED_WIDGET_VALUE.to_string()),
        }
    }
}

/// Shows a value as text and never converts back
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayConverter;

impl Converter for DisplayConverter {
    fn to_presentation(&self, value: &Value) -> WidgetValue {
        WidgetValue::Text(value.to_string())
    }

    fn to_model(&self, _presentation: &WidgetValue) -> Result<Value, String> {
        Err("Value is display only".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> WidgetValue {
        WidgetValue::Text(s.to_string())
    }

    #[test]
    fn test_integer_parse() {
        let converter = NumberConverter::new(NumericKind::Integer);
        assert_eq!(converter.to_model(&text("42")), Ok(Value::Integer(42)));
        assert_eq!(converter.to_model(&text(" -3 ")), Ok(Value::Integer(-3)));
        assert_eq!(
            converter.to_model(&text("4.5")),
            Err("Must be an integer value".to_string())
        );
    }

    #[test]
    fn test_empty_numeric_input_is_null() {
        for kind in [NumericKind::Integer, NumericKind::Float, NumericKind::Double] {
            let converter = NumberConverter::new(kind);
            assert_eq!(converter.to_model(&text("")), Ok(Value::Null));
            assert_eq!(converter.to_model(&text("   ")), Ok(Value::Null));
        }
    }

    #[test]
    fn test_float_and_double_messages() {
        assert_eq!(
            NumberConverter::new(NumericKind::Float).to_model(&text("abc")),
            Err("Must be a float value".to_string())
        );
        assert_eq!(
            NumberConverter::new(NumericKind::Double).to_model(&text("abc")),
            Err("Must be a double value".to_string())
        );
        assert_eq!(
            NumberConverter::new(NumericKind::Double).to_model(&text("2.5")),
            Ok(Value::Double(2.5))
        );
    }

    #[test]
    fn test_custom_message() {
        let converter = NumberConverter::new(NumericKind::Integer).with_message("Whole numbers only");
        assert_eq!(
            converter.to_model(&text("x")),
            Err("Whole numbers only".to_string())
        );
    }

    #[test]
    fn test_null_presents_as_empty_text() {
        let converter = NumberConverter::new(NumericKind::Integer);
        assert_eq!(converter.to_presentation(&Value::Null), text(""));
        assert_eq!(converter.to_presentation(&Value::Integer(7)), text("7"));
    }

    #[test]
    fn test_enum_sentinel_maps_to_null() {
        let converter = EnumConverter::new(EnumConstants::new(["BRONZE", "GOLD"]));
        assert_eq!(
            converter.to_presentation(&Value::Null),
            WidgetValue::Selection(None)
        );
        assert_eq!(
            converter.to_model(&WidgetValue::Selection(None)),
            Ok(Value::Null)
        );
        assert_eq!(
            converter.to_model(&WidgetValue::Selection(Some("GOLD".to_string()))),
            Ok(Value::Enum("GOLD".to_string()))
        );
        assert!(converter
            .to_model(&WidgetValue::Selection(Some("PLATINUM".to_string())))
            .is_err());
    }

    #[test]
    fn test_display_converter_never_writes_back() {
        assert!(DisplayConverter.to_model(&text("x")).is_err());
        assert_eq!(
            DisplayConverter.to_presentation(&Value::Reference("Acme:7".to_string())),
            text("Acme:7")
        );
    }
}
