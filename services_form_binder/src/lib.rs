//! # Form Binder
//!
//! This crate builds editable widgets for entity members and keeps them in
//! sync with the entity.
//!
//! ## Philosophy
//!
//! - **Dispatch by type**: A registration table maps each value type to a
//!   widget factory; unregistered types are simply not rendered
//! - **Atomic commit**: Every widget is converted before anything is written
//! - **Headless**: Widgets are plain state, so views can be driven and tested
//!   without a toolkit
//!
//! ## Example
//!
//! ```ignore
//! use services_form_binder::{FormBinder, WidgetRegistry};
//!
//! let mut binder = FormBinder::new(Arc::new(WidgetRegistry::default()));
//! binder.bind_all(&customer_type, &customer)?;
//! binder.input("name", "Acme Corp")?;
//! binder.commit(&mut customer)?;
//! ```

pub mod binder;
pub mod converter;
pub mod registry;
pub mod widget;

pub use binder::{BindError, BoundWidget, ConversionError, FormBinder};
pub use converter::{
    Converter, DisplayConverter, EnumConverter, NumberConverter, NumericKind, TextConverter,
};
pub use registry::{
    DisplayFieldFactory, EnumComboFactory, NumberFieldFactory, TextFieldFactory, WidgetFactory,
    WidgetOptions, WidgetRegistry, DEFAULT_EMPTY_CAPTION,
};
pub use widget::{Widget, WidgetError, WidgetKind, WidgetValue};
