//! Entity instances as seen by the form engine

use crate::schema::EntityDefinition;
use crate::value::Value;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Shared handle to a live entity instance
///
/// Views hold one of these; commits mutate the instance in place. Handles are
/// single-threaded, matching the one-session-one-thread access model.
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Errors raised by member access on an entity
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EntityAccessError {
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Member {member} does not accept {value:?}")]
    TypeMismatch { member: String, value: Value },

    #[error("Member {0} is not writable")]
    NotWritable(String),
}

/// A data object whose shape drives form generation
///
/// Implementors expose their members by name. The engine never touches the
/// concrete type except through this trait and [`downcast`].
pub trait Entity: Any {
    /// Reads a member value
    fn get_value(&self, member: &str) -> Result<Value, EntityAccessError>;

    /// Writes a member value
    fn set_value(&mut self, member: &str, value: Value) -> Result<(), EntityAccessError>;

    /// Instance linked through a relation member, if any
    fn related(&self, _member: &str) -> Option<EntityRef> {
        None
    }

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An entity type with a registered schema
pub trait Describe: Entity + Sized {
    /// Returns the schema definition for this type
    fn definition() -> EntityDefinition;
}

/// Link held by a relation member
///
/// Two links are equal when they point at the same instance.
#[derive(Clone)]
pub struct EntityLink(EntityRef);

impl EntityLink {
    pub fn new(entity: EntityRef) -> Self {
        Self(entity)
    }

    pub fn entity(&self) -> &EntityRef {
        &self.0
    }
}

impl PartialEq for EntityLink {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl std::fmt::Debug for EntityLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EntityLink(..)")
    }
}

/// Wraps an entity into a shared handle
pub fn shared<E: Entity>(entity: E) -> EntityRef {
    Rc::new(RefCell::new(entity))
}

/// Downcasts an entity to its concrete type
pub fn downcast<E: Entity>(entity: &dyn Entity) -> Option<&E> {
    entity.as_any().downcast_ref::<E>()
}

/// Mutably downcasts an entity to its concrete type
pub fn downcast_mut<E: Entity>(entity: &mut dyn Entity) -> Option<&mut E> {
    entity.as_any_mut().downcast_mut::<E>()
}
