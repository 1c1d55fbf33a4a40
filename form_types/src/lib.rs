//! # Form Types
//!
//! Shared data model for the generic entity form engine.
//!
//! ## Philosophy
//!
//! - **Schemas, not reflection**: Entity shapes are registered explicitly as
//!   [`EntityDefinition`]s and turned into immutable [`EntityType`]s
//! - **Closed value types**: Widget dispatch goes through [`ValueType`], a
//!   tagged union with an escape hatch for unregistered types
//! - **Host-owned data**: Entity instances belong to the caller and are shared
//!   with views through [`EntityRef`]
//! - **Testable**: Everything here is plain data and can be asserted on
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A persistence layer
//! - An ORM or query builder
//! - A widget toolkit

pub mod entity;
pub mod identity;
pub mod persistence;
pub mod schema;
pub mod value;

pub use entity::{
    downcast, downcast_mut, shared, Describe, Entity, EntityAccessError, EntityLink, EntityRef,
};
pub use identity::{IdentityKey, IdentityToken};
pub use persistence::{Persistence, PersistenceError};
pub use schema::{
    CommandAction, CommandDefinition, CommandError, DerivedValue, Diagnostic, EntityDefinition,
    EntityFactory, EntityRole, EntityType, MemberDefinition, MemberDescriptor, MemberKind,
    Representation, TypeCatalog, ValueTypeSupport,
};
pub use value::{EnumConstants, Value, ValueType, ValueTypeKey};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an open view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    /// Creates a new unique view ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a ViewId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view:{}", self.0)
    }
}

/// Kind of view held by the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    /// Editable form for a single entity instance
    Element,
    /// Tabular listing of all instances of a type
    List,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Element => write!(f, "Element"),
            ViewKind::List => write!(f, "List"),
        }
    }
}
