//! Persistence collaborator boundary
//!
//! The engine never persists anything itself. Hosts implement [`Persistence`]
//! and the engine calls it synchronously from command handlers.

use crate::entity::EntityRef;
use crate::schema::EntityType;
use thiserror::Error;

/// Errors reported by a persistence collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to save {type_name}: {reason}")]
    SaveFailed { type_name: String, reason: String },

    #[error("Failed to refresh {type_name}: {reason}")]
    RefreshFailed { type_name: String, reason: String },

    #[error("Failed to query {type_name}: {reason}")]
    QueryFailed { type_name: String, reason: String },

    #[error("No storage registered for {0}")]
    UnknownType(String),
}

/// Save, refresh and query operations supplied by the host
///
/// Calls are blocking, non-cancelable, and never retried by the engine.
pub trait Persistence {
    /// Persists an entity
    ///
    /// May return a different handle (for example one carrying a generated
    /// identifier); the caller adopts whatever is returned.
    fn save(&self, entity: EntityRef) -> Result<EntityRef, PersistenceError>;

    /// Reloads an entity in place from the source of truth
    fn refresh(&self, entity: &EntityRef) -> Result<(), PersistenceError>;

    /// Returns every stored instance of a type
    fn find_all(&self, entity_type: &EntityType) -> Result<Vec<EntityRef>, PersistenceError>;
}
