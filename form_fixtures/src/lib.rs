//! # Form Fixtures
//!
//! Example entity types and an in-memory persistence collaborator shared by
//! the form engine's tests.
//!
//! - [`Customer`]: standard entity with identifier, long text, enumeration,
//!   an unsupported collection and an injected field
//! - [`Contact`] and [`TradeDeal`]: relations, floats and a derived value
//! - [`Calculator`]: custom-command form without identifier
//! - [`Orphan`]: definition without a role

pub mod entities;
pub mod memory;

pub use entities::{Calculator, ClientLevel, Contact, Customer, Orphan, TradeDeal};
pub use memory::InMemoryPersistence;
