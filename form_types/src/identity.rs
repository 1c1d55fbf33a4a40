//! Identity keys for open views
//!
//! A key is `prefix ⊕ type name ⊕ token`. Persisted instances use their
//! identifier value as the token, so two in-memory copies of the same row
//! collide on purpose. Unsaved instances use a draft token that can never be
//! equal to a persisted one. Instances of types without an identifier are
//! keyed by the instance itself.

use crate::entity::EntityRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Per-instance part of an identity key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityToken {
    /// Identifier value of a persisted instance
    Persisted(String),
    /// Placeholder for an instance without an identifier yet
    Draft(String),
    /// Existing instance of a type that declares no identifier
    Instance(String),
    /// Type-level views (lists) carry no token
    Type,
}

impl IdentityToken {
    /// Draft token for an unsaved instance
    ///
    /// Derived from the allocation address of the shared handle. The address
    /// is stable for as long as a view holds the handle, which is exactly as
    /// long as the key lives in the registry.
    pub fn draft_for(entity: &EntityRef) -> Self {
        IdentityToken::Draft(format!("new-{:x}", address_of(entity)))
    }

    /// Instance token for an entity whose type has no identifier member
    pub fn instance_for(entity: &EntityRef) -> Self {
        IdentityToken::Instance(format!("obj-{:x}", address_of(entity)))
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, IdentityToken::Draft(_))
    }
}

fn address_of(entity: &EntityRef) -> usize {
    Rc::as_ptr(entity) as *const () as usize
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityToken::Persisted(id) => write!(f, "@{}", id),
            IdentityToken::Draft(placeholder) | IdentityToken::Instance(placeholder) => {
                write!(f, "@{}", placeholder)
            }
            IdentityToken::Type => Ok(()),
        }
    }
}

/// Cache key identifying one open view
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    prefix: String,
    type_name: String,
    token: IdentityToken,
}

impl IdentityKey {
    /// Key for an element view
    pub fn element(
        prefix: impl Into<String>,
        type_name: impl Into<String>,
        token: IdentityToken,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            type_name: type_name.into(),
            token,
        }
    }

    /// Key for a list view
    pub fn list(prefix: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            type_name: type_name.into(),
            token: IdentityToken::Type,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn token(&self) -> &IdentityToken {
        &self.token
    }

    pub fn is_draft(&self) -> bool {
        self.token.is_draft()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.type_name, self.token)
    }
}
