//! Two-way binding between an entity and its widgets

use crate::converter::Converter;
use crate::registry::WidgetRegistry;
use crate::widget::{Widget, WidgetError, WidgetValue};
use form_types::{
    Entity, EntityAccessError, EntityType, MemberDescriptor, TypeCatalog, Value, ValueTypeKey,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A widget value that could not be converted to its member type
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{caption}: {reason}")]
pub struct ConversionError {
    pub member: String,
    pub caption: String,
    pub reason: String,
    /// True when the member holds a number
    pub numeric: bool,
}

/// Binder error types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindError {
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Member {member} could not be accessed: {source}")]
    Access {
        member: String,
        #[source]
        source: EntityAccessError,
    },

    #[error("No widget bound to member {0}")]
    NotBound(String),

    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// A member with its widget and converter
pub struct BoundWidget {
    member: MemberDescriptor,
    widget: Widget,
    converter: Box<dyn Converter>,
}

impl BoundWidget {
    pub fn member(&self) -> &MemberDescriptor {
        &self.member
    }

    pub fn name(&self) -> &str {
        &self.member.name
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// True when commit writes this widget back to the entity
    pub fn is_writable(&self) -> bool {
        !self.widget.is_read_only() && !self.member.identifier && !self.member.is_derived()
    }

    fn read(&mut self, entity: &dyn Entity, catalog: Option<&dyn TypeCatalog>) -> Result<(), BindError> {
        let related = catalog.and_then(|catalog| self.member.represent_related(entity, catalog));
        let presentation = match (&self.member.derived, related) {
            (Some(derived), _) => WidgetValue::Text(derived.evaluate(entity)),
            (None, Some(text)) => WidgetValue::Text(text),
            (None, None) => {
                let value = entity
                    .get_value(&self.member.name)
                    .map_err(|source| BindError::Access {
                        member: self.member.name.clone(),
                        source,
                    })?;
                self.converter.to_presentation(&value)
            }
        };
        self.widget.display(presentation);
        Ok(())
    }

    fn convert(&self) -> Result<Value, ConversionError> {
        self.converter
            .to_model(self.widget.value())
            .map_err(|reason| ConversionError {
                member: self.member.name.clone(),
                caption: self.widget.caption().to_string(),
                reason,
                numeric: matches!(
                    self.member.value_type.key(),
                    ValueTypeKey::Integer | ValueTypeKey::Float | ValueTypeKey::Double
                ),
            })
    }
}

impl std::fmt::Debug for BoundWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundWidget")
            .field("member", &self.member.name)
            .field("widget", &self.widget)
            .finish()
    }
}

/// Binds the members of one entity to widgets
pub struct FormBinder {
    registry: Arc<WidgetRegistry>,
    catalog: Option<Arc<dyn TypeCatalog>>,
    widgets: Vec<BoundWidget>,
}

impl FormBinder {
    pub fn new(registry: Arc<WidgetRegistry>) -> Self {
        Self {
            registry,
            catalog: None,
            widgets: Vec::new(),
        }
    }

    /// Shows relation members through the representation of their target type
    ///
    /// Without a catalog a relation shows the linked identifier.
    pub fn with_catalog(mut self, catalog: Arc<dyn TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Builds and binds the widget for a member, filled from the entity
    ///
    /// Returns `None` when the member's type has no widget.
    pub fn bind(
        &mut self,
        member: &MemberDescriptor,
        entity: &dyn Entity,
    ) -> Result<Option<&BoundWidget>, BindError> {
        let Some((widget, converter)) = self.registry.create(member) else {
            debug!(member = %member.name, value_type = %member.value_type, "no widget for member");
            return Ok(None);
        };
        let mut bound = BoundWidget {
            member: member.clone(),
            widget,
            converter,
        };
        bound.read(entity, self.catalog.as_deref())?;
        self.widgets.push(bound);
        Ok(self.widgets.last())
    }

    /// Binds every member of a type, in draw order
    ///
    /// Returns the number of widgets bound.
    pub fn bind_all(
        &mut self,
        entity_type: &EntityType,
        entity: &dyn Entity,
    ) -> Result<usize, BindError> {
        let mut bound = 0;
        for member in &entity_type.members {
            if self.bind(member, entity)?.is_some() {
                bound += 1;
            }
        }
        Ok(bound)
    }

    /// Refills every widget from the entity
    pub fn read(&mut self, entity: &dyn Entity) -> Result<(), BindError> {
        let catalog = self.catalog.as_deref();
        for bound in &mut self.widgets {
            bound.read(entity, catalog)?;
        }
        Ok(())
    }

    /// Writes every writable widget back to the entity
    ///
    /// All widgets are converted before anything is written; on a conversion
    /// failure the entity is untouched and the first failing member is
    /// reported. A rejected write restores the members already written.
    pub fn commit(&self, entity: &mut dyn Entity) -> Result<(), BindError> {
        let mut pending = Vec::new();
        for bound in self.widgets.iter().filter(|b| b.is_writable()) {
            pending.push((bound.name(), bound.convert()?));
        }

        let mut written: Vec<(&str, Value)> = Vec::with_capacity(pending.len());
        for (member, value) in pending {
            let previous = entity.get_value(member);
            if let Err(source) = entity.set_value(member, value) {
                for (member, previous) in written.into_iter().rev() {
                    if let Err(err) = entity.set_value(member, previous) {
                        warn!(member, error = %err, "rollback could not restore member");
                    }
                }
                return Err(BindError::Access {
                    member: member.to_string(),
                    source,
                });
            }
            match previous {
                Ok(previous) => written.push((member, previous)),
                Err(err) => warn!(member, error = %err, "member unreadable; rollback will skip it"),
            }
        }
        Ok(())
    }

    pub fn widgets(&self) -> &[BoundWidget] {
        &self.widgets
    }

    pub fn widget(&self, member: &str) -> Option<&BoundWidget> {
        self.widgets.iter().find(|b| b.name() == member)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Types text into a member's widget
    pub fn input(&mut self, member: &str, text: impl Into<String>) -> Result<(), BindError> {
        self.widget_mut(member)?.input(text)?;
        Ok(())
    }

    /// Selects an item in a member's widget; `None` selects the empty entry
    pub fn select(&mut self, member: &str, item: Option<&str>) -> Result<(), BindError> {
        self.widget_mut(member)?.select(item)?;
        Ok(())
    }

    fn widget_mut(&mut self, member: &str) -> Result<&mut Widget, BindError> {
        self.widgets
            .iter_mut()
            .find(|b| b.name() == member)
            .map(|b| &mut b.widget)
            .ok_or_else(|| BindError::NotBound(member.to_string()))
    }
}

impl std::fmt::Debug for FormBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBinder")
            .field("widgets", &self.widgets)
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WidgetOptions;
    use crate::widget::WidgetKind;
    use form_fixtures::{ClientLevel, Contact, Customer, TradeDeal};
    use form_types::{shared, Describe, EntityDefinition, EntityLink, MemberDefinition, ValueType};
    use services_schema_registry::SchemaRegistry;
    use std::any::Any;

    fn registries() -> (Arc<WidgetRegistry>, SchemaRegistry) {
        let widgets = Arc::new(WidgetRegistry::with_defaults(WidgetOptions::default()));
        let schemas = SchemaRegistry::new(widgets.clone());
        (widgets, schemas)
    }

    fn bound<T: Describe>(entity: &T) -> FormBinder {
        let (widgets, schemas) = registries();
        let entity_type = schemas.describe::<T>();
        let mut binder = FormBinder::new(widgets);
        binder.bind_all(&entity_type, entity).unwrap();
        binder
    }

    fn acme() -> Customer {
        let mut customer = Customer::new("Acme").with_id(7);
        customer.level = Some(ClientLevel::Gold);
        customer
    }

    #[test]
    fn test_bind_fills_widgets_in_draw_order() {
        let binder = bound(&acme());
        let names: Vec<&str> = binder.widgets().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["id", "name", "description", "level"]);

        assert_eq!(binder.widget("id").unwrap().widget().text(), Some("7"));
        assert_eq!(binder.widget("name").unwrap().widget().text(), Some("Acme"));
        assert_eq!(binder.widget("level").unwrap().widget().selection(), Some("GOLD"));
        assert_eq!(binder.widget("description").unwrap().widget().text(), Some(""));
    }

    #[test]
    fn test_widget_kinds_and_captions() {
        let binder = bound(&acme());
        let description = binder.widget("description").unwrap().widget();
        assert_eq!(description.kind(), WidgetKind::TextArea);
        assert_eq!(description.caption(), "Customer description");

        let level = binder.widget("level").unwrap().widget();
        assert_eq!(level.kind(), WidgetKind::ComboBox);
        assert_eq!(level.display_items(), vec!["<empty>", "BRONZE", "SILVER", "GOLD"]);
    }

    #[test]
    fn test_identifier_rejects_edits() {
        let mut binder = bound(&acme());
        let err = binder.input("id", "9").unwrap_err();
        assert_eq!(
            err,
            BindError::Widget(WidgetError::ReadOnly("Identifier".to_string()))
        );
    }

    #[test]
    fn test_commit_writes_edits() {
        let mut customer = acme();
        let mut binder = bound(&customer);
        binder.input("name", "Acme Corp").unwrap();
        binder.select("level", None).unwrap();
        binder.commit(&mut customer).unwrap();

        assert_eq!(customer.name.as_deref(), Some("Acme Corp"));
        assert_eq!(customer.level, None);
        assert_eq!(customer.id, Some(7));
    }

    #[test]
    fn test_failed_conversion_leaves_entity_untouched() {
        let mut deal = TradeDeal {
            id: Some(1),
            sum: Some(100.0),
            discount: Some(0.1),
            customer: None,
        };
        let mut binder = bound(&deal);
        binder.input("discount", "0.5").unwrap();
        binder.input("sum", "lots").unwrap();

        let err = binder.commit(&mut deal).unwrap_err();
        let BindError::Conversion(conversion) = err else {
            panic!("expected conversion error");
        };
        assert_eq!(conversion.member, "sum");
        assert_eq!(conversion.caption, "Summ of the deal");
        assert_eq!(conversion.reason, "Must be a double value");
        assert!(conversion.numeric);
        assert_eq!(deal.sum, Some(100.0));
        assert_eq!(deal.discount, Some(0.1));
    }

    #[test]
    fn test_empty_numeric_input_commits_null() {
        let mut deal = TradeDeal {
            id: Some(1),
            sum: Some(100.0),
            discount: Some(0.1),
            customer: None,
        };
        let mut binder = bound(&deal);
        binder.input("discount", "").unwrap();
        binder.commit(&mut deal).unwrap();
        assert_eq!(deal.discount, None);
        assert_eq!(deal.sum, Some(100.0));
    }

    #[test]
    fn test_derived_value_refreshes_on_read() {
        let mut deal = TradeDeal {
            id: Some(1),
            sum: Some(200.0),
            discount: Some(0.25),
            customer: None,
        };
        let mut binder = bound(&deal);
        let net = binder.widget("net_sum").unwrap();
        assert!(net.widget().is_read_only());
        assert!(!net.is_writable());
        assert_eq!(net.widget().text(), Some("150.00"));

        binder.input("discount", "0.5").unwrap();
        binder.commit(&mut deal).unwrap();
        binder.read(&deal).unwrap();
        assert_eq!(binder.widget("net_sum").unwrap().widget().text(), Some("100.00"));
    }

    #[test]
    fn test_relation_shows_representation_and_is_not_written() {
        let (widgets, schemas) = registries();
        let schemas = Arc::new(schemas);
        schemas.describe::<Customer>();
        let acme = shared(Customer::new("Acme").with_id(7));
        let mut contact = Contact {
            id: Some(3),
            comment: Some("call back".to_string()),
            customer: Some(EntityLink::new(acme.clone())),
        };

        let mut binder = FormBinder::new(widgets).with_catalog(schemas.clone());
        binder.bind_all(&schemas.describe::<Contact>(), &contact).unwrap();
        let customer = binder.widget("customer").unwrap();
        assert!(customer.widget().is_read_only());
        assert!(!customer.is_writable());
        assert_eq!(customer.widget().text(), Some("Acme:7"));

        binder.input("comment", "done").unwrap();
        binder.commit(&mut contact).unwrap();
        assert_eq!(contact.customer, Some(EntityLink::new(acme.clone())));
        assert_eq!(contact.comment.as_deref(), Some("done"));

        acme.borrow_mut().set_value("name", Value::from("Acme Corp")).unwrap();
        binder.read(&contact).unwrap();
        assert_eq!(binder.widget("customer").unwrap().widget().text(), Some("Acme Corp:7"));
    }

    #[test]
    fn test_relation_without_catalog_shows_identifier() {
        let contact = Contact {
            id: Some(3),
            comment: None,
            customer: Some(EntityLink::new(shared(Customer::new("Acme").with_id(7)))),
        };
        let binder = bound(&contact);
        assert_eq!(binder.widget("customer").unwrap().widget().text(), Some("7"));
    }

    /// Accepts `first`, refuses every write to `second`
    #[derive(Default)]
    struct Stubborn {
        first: Option<String>,
        second: Option<String>,
    }

    impl Entity for Stubborn {
        fn get_value(&self, member: &str) -> Result<Value, EntityAccessError> {
            let value = match member {
                "first" => &self.first,
                "second" => &self.second,
                other => return Err(EntityAccessError::UnknownMember(other.to_string())),
            };
            Ok(value.clone().map_or(Value::Null, Value::Text))
        }

        fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError> {
            match (member, value) {
                ("first", Value::Text(text)) => self.first = Some(text),
                ("first", Value::Null) => self.first = None,
                ("second", _) => return Err(EntityAccessError::NotWritable(member.to_string())),
                (other, _) => return Err(EntityAccessError::UnknownMember(other.to_string())),
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Describe for Stubborn {
        fn definition() -> EntityDefinition {
            EntityDefinition::standard("test.Stubborn", "Stubborn")
                .member(MemberDefinition::field("first", ValueType::Text).order(1))
                .member(MemberDefinition::field("second", ValueType::Text).order(2))
        }
    }

    #[test]
    fn test_rejected_write_restores_earlier_members() {
        let mut entity = Stubborn {
            first: Some("kept".to_string()),
            second: None,
        };
        let mut binder = bound(&entity);
        binder.input("first", "changed").unwrap();
        binder.input("second", "refused").unwrap();

        let err = binder.commit(&mut entity).unwrap_err();
        assert_eq!(
            err,
            BindError::Access {
                member: "second".to_string(),
                source: EntityAccessError::NotWritable("second".to_string()),
            }
        );
        assert_eq!(entity.first.as_deref(), Some("kept"));
        assert_eq!(entity.second, None);
    }

    #[test]
    fn test_unsupported_member_is_not_bound() {
        let (widgets, _) = registries();
        let mut binder = FormBinder::new(widgets);
        let member = MemberDescriptor {
            name: "trade_deals".to_string(),
            value_type: form_types::ValueType::other("Set<TradeDeal>"),
            order: None,
            label: "trade_deals".to_string(),
            read_only: false,
            identifier: false,
            long_text: false,
            derived: None,
        };
        assert!(binder.bind(&member, &acme()).unwrap().is_none());
        assert!(binder.is_empty());
    }

    #[test]
    fn test_unknown_member_input() {
        let mut binder = bound(&acme());
        assert_eq!(
            binder.input("missing", "x"),
            Err(BindError::NotBound("missing".to_string()))
        );
    }
}
