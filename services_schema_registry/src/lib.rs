//! # Schema Registry
//!
//! This crate turns registered entity definitions into described entity types.
//!
//! ## Philosophy
//!
//! - **Describe once**: Each concrete type is described on first use and the
//!   result is shared for the lifetime of the registry
//! - **Explicit schemas**: Definitions come from [`Describe`], not runtime
//!   inspection
//! - **Render what we can**: Members without a widget mapping are dropped with
//!   a diagnostic instead of failing the whole type
//! - **Deterministic**: Member order comes from [`draw_order`] and never
//!   depends on hashing
//!
//! ## Example
//!
//! ```ignore
//! use services_schema_registry::SchemaRegistry;
//!
//! let registry = SchemaRegistry::new(widget_support);
//! let customer = registry.describe::<Customer>();
//! assert_eq!(customer.member_names()[0], "id");
//! ```

pub mod draw_order;

use form_types::{
    Describe, Diagnostic, EntityDefinition, EntityType, MemberDescriptor, MemberKind,
    TypeCatalog, ValueTypeSupport,
};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Per-type metadata cache
///
/// Write-once per type; safe to share across threads once populated.
pub struct SchemaRegistry {
    /// Decides which value types have a widget
    support: Arc<dyn ValueTypeSupport>,
    /// Described types by concrete type
    types: RwLock<HashMap<TypeId, Arc<EntityType>>>,
}

impl SchemaRegistry {
    /// Creates an empty registry
    pub fn new(support: Arc<dyn ValueTypeSupport>) -> Self {
        Self {
            support,
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Describes an entity type
    ///
    /// The first call builds the description; later calls return the same
    /// shared instance.
    pub fn describe<T: Describe>(&self) -> Arc<EntityType> {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = self
            .types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Arc::clone(existing);
        }

        let described = Arc::new(build_entity_type(T::definition(), self.support.as_ref()));
        debug!(
            type_name = %described.type_name,
            members = described.members.len(),
            "described entity type"
        );

        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(types.entry(type_id).or_insert(described))
    }

    /// Returns true if the type has been described already
    pub fn is_described<T: Describe>(&self) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of described types
    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Only types described so far can be found
impl TypeCatalog for SchemaRegistry {
    fn by_name(&self, type_name: &str) -> Option<Arc<EntityType>> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|described| described.type_name == type_name)
            .cloned()
    }
}

/// Builds an entity type from its definition
///
/// Injected and static fields are excluded, as are providers that are not
/// static. Fields whose type is not supported are dropped and reported in
/// [`EntityType::diagnostics`].
pub fn build_entity_type(
    definition: EntityDefinition,
    support: &dyn ValueTypeSupport,
) -> EntityType {
    let identifier = definition.identifier.clone();
    let mut members = Vec::with_capacity(definition.members.len());
    let mut diagnostics = Vec::new();

    for member in definition.members {
        let derived = match member.kind {
            MemberKind::Field if member.injected || member.static_member => continue,
            MemberKind::Provider(_) if !member.static_member => continue,
            MemberKind::Field => None,
            MemberKind::Provider(provider) => Some(provider),
        };

        if derived.is_none() && !support.supports(&member.value_type) {
            warn!(
                type_name = %definition.type_name,
                member = %member.name,
                value_type = %member.value_type,
                "member type has no widget mapping, skipping"
            );
            diagnostics.push(Diagnostic::UnsupportedMemberType {
                member: member.name,
                type_name: member.value_type.to_string(),
            });
            continue;
        }

        let is_identifier = identifier.as_deref() == Some(member.name.as_str());
        let label = member.label.unwrap_or_else(|| member.name.clone());
        members.push(MemberDescriptor {
            read_only: is_identifier || derived.is_some(),
            identifier: is_identifier,
            long_text: member.long_text,
            order: member.order,
            label,
            name: member.name,
            value_type: member.value_type,
            derived,
        });
    }

    draw_order::sort(&mut members);

    EntityType {
        menu_caption: definition
            .menu_caption
            .unwrap_or_else(|| definition.label.clone()),
        type_name: definition.type_name,
        label: definition.label,
        menu_path: definition.menu_path,
        role: definition.role,
        identifier,
        search_member: definition.search_member,
        members,
        diagnostics,
        representation: definition.representation,
        factory: definition.factory,
    }
}
