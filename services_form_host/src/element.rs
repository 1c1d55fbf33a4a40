//! Element views and their assembly

use crate::command::CommandBar;
use crate::error::FormError;
use crate::labels::FormLabels;
use form_types::{EntityRef, EntityType, IdentityKey, IdentityToken, TypeCatalog, ViewId};
use services_form_binder::{FormBinder, WidgetRegistry};
use std::sync::Arc;
use tracing::debug;

/// Editable form for one entity instance
pub struct ElementView {
    pub(crate) id: ViewId,
    pub(crate) key: IdentityKey,
    pub(crate) caption: String,
    pub(crate) entity: EntityRef,
    pub(crate) entity_type: Arc<EntityType>,
    pub(crate) binder: FormBinder,
    pub(crate) commands: CommandBar,
}

impl ElementView {
    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// The instance currently shown; replaced when a save returns another one
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn binder(&self) -> &FormBinder {
        &self.binder
    }

    pub fn commands(&self) -> &CommandBar {
        &self.commands
    }

    pub fn is_new(&self) -> bool {
        self.key.is_draft()
    }
}

impl std::fmt::Debug for ElementView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementView")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("caption", &self.caption)
            .field("binder", &self.binder)
            .finish_non_exhaustive()
    }
}

/// Builds element views from described types
pub struct ViewAssembler {
    widgets: Arc<WidgetRegistry>,
    labels: FormLabels,
    catalog: Option<Arc<dyn TypeCatalog>>,
}

impl ViewAssembler {
    pub fn new(widgets: Arc<WidgetRegistry>, labels: FormLabels) -> Self {
        Self {
            widgets,
            labels,
            catalog: None,
        }
    }

    /// Resolves relation members of assembled views through `catalog`
    pub fn with_catalog(mut self, catalog: Arc<dyn TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn labels(&self) -> &FormLabels {
        &self.labels
    }

    /// Computes the key of an element view
    ///
    /// New instances get a draft token. Existing instances of a type without
    /// an identifier member are keyed by instance.
    pub fn element_key(
        &self,
        entity_type: &EntityType,
        entity: &EntityRef,
        is_new: bool,
    ) -> Result<IdentityKey, FormError> {
        let token = match entity_type.identifier.as_deref() {
            _ if is_new => IdentityToken::draft_for(entity),
            None => IdentityToken::instance_for(entity),
            Some(identifier) => {
                let value = entity.borrow().get_value(identifier).map_err(|err| {
                    FormError::missing_metadata(&entity_type.type_name, err.to_string())
                })?;
                if value.is_null() {
                    return Err(FormError::missing_metadata(
                        &entity_type.type_name,
                        format!("persisted instance has no value for {}", identifier),
                    ));
                }
                IdentityToken::Persisted(value.to_string())
            }
        };
        Ok(IdentityKey::element(
            &self.labels.element_prefix,
            &entity_type.type_name,
            token,
        ))
    }

    /// Recomputes a key from the entity's current state
    ///
    /// A draft stays a draft until the identifier has a value.
    pub fn rekey(&self, entity_type: &EntityType, entity: &EntityRef, old: &IdentityKey) -> IdentityKey {
        let current = entity_type
            .identifier_value(&*entity.borrow())
            .filter(|value| !value.is_null());
        let token = match (current, old.token()) {
            (Some(value), _) => IdentityToken::Persisted(value.to_string()),
            (None, token) => token.clone(),
        };
        IdentityKey::element(old.prefix(), old.type_name(), token)
    }

    /// Tab caption for an element key
    pub fn caption(&self, entity_type: &EntityType, key: &IdentityKey) -> String {
        match key.token() {
            IdentityToken::Persisted(id) => format!("{}:{}", entity_type.label, id),
            IdentityToken::Draft(_) => format!("{}:{}", entity_type.label, self.labels.new_caption),
            IdentityToken::Instance(_) => format!("{}:", entity_type.label),
            IdentityToken::Type => entity_type.label.clone(),
        }
    }

    /// Builds a view: widgets in draw order, then the command bar
    pub fn assemble(
        &self,
        entity_type: Arc<EntityType>,
        entity: EntityRef,
        is_new: bool,
    ) -> Result<ElementView, FormError> {
        let role = entity_type.role.as_ref().ok_or_else(|| {
            FormError::missing_metadata(&entity_type.type_name, "no role declared")
        })?;
        let key = self.element_key(&entity_type, &entity, is_new)?;

        let mut binder = FormBinder::new(Arc::clone(&self.widgets));
        if let Some(catalog) = &self.catalog {
            binder = binder.with_catalog(Arc::clone(catalog));
        }
        let bound = binder.bind_all(&entity_type, &*entity.borrow())?;
        let commands = CommandBar::for_role(role, &self.labels);
        debug!(key = %key, widgets = bound, commands = commands.len(), "assembled element view");

        Ok(ElementView {
            id: ViewId::new(),
            caption: self.caption(&entity_type, &key),
            key,
            entity,
            entity_type,
            binder,
            commands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_fixtures::{Calculator, Customer, Orphan};
    use form_types::{shared, Describe, Value};
    use services_form_binder::WidgetKind;
    use services_schema_registry::SchemaRegistry;

    fn setup() -> (ViewAssembler, SchemaRegistry) {
        let widgets = Arc::new(WidgetRegistry::default());
        let schemas = SchemaRegistry::new(widgets.clone());
        (ViewAssembler::new(widgets, FormLabels::default()), schemas)
    }

    fn describe<T: Describe>(schemas: &SchemaRegistry) -> Arc<EntityType> {
        schemas.describe::<T>()
    }

    #[test]
    fn test_customer_view_layout() {
        let (assembler, schemas) = setup();
        let view = assembler
            .assemble(
                describe::<Customer>(&schemas),
                shared(Customer::new("Acme").with_id(7)),
                false,
            )
            .unwrap();

        let names: Vec<&str> = view.binder().widgets().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["id", "name", "description", "level"]);
        assert!(view.binder().widget("id").unwrap().widget().is_read_only());
        assert_eq!(
            view.binder().widget("description").unwrap().widget().kind(),
            WidgetKind::TextArea
        );
        assert_eq!(view.commands().captions(), vec!["Save", "Reload"]);
        assert_eq!(view.caption(), "Customer:7");
        assert_eq!(view.key().to_string(), "DEF_ELEM_example.entity.Customer@7");
    }

    #[test]
    fn test_new_instance_gets_draft_caption() {
        let (assembler, schemas) = setup();
        let view = assembler
            .assemble(describe::<Customer>(&schemas), shared(Customer::default()), true)
            .unwrap();
        assert!(view.is_new());
        assert_eq!(view.caption(), "Customer:new");
        assert!(view.key().to_string().starts_with("DEF_ELEM_example.entity.Customer@new-"));
    }

    #[test]
    fn test_same_identifier_same_key() {
        let (assembler, schemas) = setup();
        let customer = describe::<Customer>(&schemas);
        let a = shared(Customer::new("A").with_id(42));
        let b = shared(Customer::new("B").with_id(42));
        assert_eq!(
            assembler.element_key(&customer, &a, false).unwrap(),
            assembler.element_key(&customer, &b, false).unwrap()
        );
    }

    #[test]
    fn test_drafts_never_collide() {
        let (assembler, schemas) = setup();
        let customer = describe::<Customer>(&schemas);
        let a = shared(Customer::default());
        let b = shared(Customer::default());
        let persisted = shared(Customer::default().with_id(1));

        let key_a = assembler.element_key(&customer, &a, true).unwrap();
        let key_b = assembler.element_key(&customer, &b, true).unwrap();
        assert_ne!(key_a, key_b);
        assert_ne!(key_a, assembler.element_key(&customer, &persisted, false).unwrap());
        assert_eq!(key_a, assembler.element_key(&customer, &a, true).unwrap());
    }

    #[test]
    fn test_persisted_without_identifier_value_is_missing_metadata() {
        let (assembler, schemas) = setup();
        let err = assembler
            .assemble(describe::<Customer>(&schemas), shared(Customer::default()), false)
            .unwrap_err();
        assert!(matches!(err, FormError::MissingMetadata { .. }));
    }

    #[test]
    fn test_missing_role_is_missing_metadata() {
        let (assembler, schemas) = setup();
        let err = assembler
            .assemble(describe::<Orphan>(&schemas), shared(Orphan::default()), true)
            .unwrap_err();
        assert_eq!(
            err,
            FormError::MissingMetadata {
                type_name: "example.entity.Orphan".to_string(),
                reason: "no role declared".to_string(),
            }
        );
    }

    #[test]
    fn test_custom_form_is_keyed_by_instance() {
        let (assembler, schemas) = setup();
        let calculator = describe::<Calculator>(&schemas);
        let view = assembler
            .assemble(calculator.clone(), shared(Calculator::default()), false)
            .unwrap();
        assert!(view.key().to_string().starts_with("DEF_ELEM_example.form.Calculator@obj-"));
        assert!(!view.is_new());
        assert_eq!(view.caption(), "Calculator:");
        assert_eq!(view.commands().captions(), vec!["Add", "Divide"]);

        let other = assembler
            .assemble(calculator.clone(), shared(Calculator::default()), false)
            .unwrap();
        assert_ne!(view.key(), other.key());

        let draft = assembler
            .assemble(calculator, shared(Calculator::default()), true)
            .unwrap();
        assert!(draft.is_new());
        assert_eq!(draft.caption(), "Calculator:new");
    }

    #[test]
    fn test_rekey_after_identifier_assigned() {
        let (assembler, schemas) = setup();
        let customer = describe::<Customer>(&schemas);
        let entity = shared(Customer::new("Acme"));
        let draft = assembler.element_key(&customer, &entity, true).unwrap();

        assert_eq!(assembler.rekey(&customer, &entity, &draft), draft);

        entity.borrow_mut().set_value("id", Value::Integer(7)).unwrap();
        let saved = assembler.rekey(&customer, &entity, &draft);
        assert_eq!(saved.to_string(), "DEF_ELEM_example.entity.Customer@7");
        assert_eq!(assembler.caption(&customer, &saved), "Customer:7");
    }
}
