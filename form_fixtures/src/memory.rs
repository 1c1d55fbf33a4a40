//! In-memory persistence collaborator
//!
//! Keeps a snapshot per stored row so that `refresh` can discard local edits.
//! Failures can be injected to exercise the engine's error paths.

use form_types::{
    Describe, EntityFactory, EntityRef, EntityType, MemberKind, Persistence, PersistenceError,
    Value, ValueType,
};
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

type Snapshot = Vec<(String, Value)>;

struct Table {
    type_name: String,
    identifier: String,
    fields: Vec<String>,
    factory: Option<EntityFactory>,
    rows: BTreeMap<i64, Snapshot>,
    live: BTreeMap<i64, EntityRef>,
}

impl Table {
    fn snapshot(&self, entity: &EntityRef) -> Result<Snapshot, PersistenceError> {
        let entity = entity.borrow();
        self.fields
            .iter()
            .map(|field| {
                entity
                    .get_value(field)
                    .map(|value| (field.clone(), value))
                    .map_err(|err| PersistenceError::SaveFailed {
                        type_name: self.type_name.clone(),
                        reason: err.to_string(),
                    })
            })
            .collect()
    }
}

/// Persistence backed by process memory
pub struct InMemoryPersistence {
    tables: RefCell<HashMap<TypeId, Table>>,
    next_id: Cell<i64>,
    detached_saves: bool,
    fail_next_save: RefCell<Option<String>>,
    fail_next_refresh: RefCell<Option<String>>,
    save_calls: Cell<usize>,
    refresh_calls: Cell<usize>,
}

impl InMemoryPersistence {
    /// Creates an empty store; generated identifiers start at 1
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            detached_saves: false,
            fail_next_save: RefCell::new(None),
            fail_next_refresh: RefCell::new(None),
            save_calls: Cell::new(0),
            refresh_calls: Cell::new(0),
        }
    }

    /// Sets the next generated identifier
    pub fn starting_at(self, next_id: i64) -> Self {
        self.next_id.set(next_id);
        self
    }

    /// Makes `save` return a fresh instance instead of the one passed in
    pub fn with_detached_saves(mut self) -> Self {
        self.detached_saves = true;
        self
    }

    /// Registers a storable type
    ///
    /// Types without an identifier member are ignored. Relation links live on
    /// the instances and are not part of stored rows.
    pub fn register<T: Describe>(self) -> Self {
        let definition = T::definition();
        if let Some(identifier) = definition.identifier {
            let fields = definition
                .members
                .iter()
                .filter(|m| matches!(m.kind, MemberKind::Field) && !m.injected && !m.static_member)
                .filter(|m| !matches!(m.value_type, ValueType::Other(_) | ValueType::Relation { .. }))
                .map(|m| m.name.clone())
                .collect();
            self.tables.borrow_mut().insert(
                TypeId::of::<T>(),
                Table {
                    type_name: definition.type_name,
                    identifier,
                    fields,
                    factory: definition.factory,
                    rows: BTreeMap::new(),
                    live: BTreeMap::new(),
                },
            );
        }
        self
    }

    /// Makes the next `save` fail with `reason`
    pub fn fail_next_save(&self, reason: impl Into<String>) {
        *self.fail_next_save.borrow_mut() = Some(reason.into());
    }

    /// Makes the next `refresh` fail with `reason`
    pub fn fail_next_refresh(&self, reason: impl Into<String>) {
        *self.fail_next_refresh.borrow_mut() = Some(reason.into());
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.get()
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.get()
    }

    /// Returns the stored value of a member, bypassing live instances
    pub fn stored_value<T: Describe>(&self, id: i64, member: &str) -> Option<Value> {
        let tables = self.tables.borrow();
        let row = tables.get(&TypeId::of::<T>())?.rows.get(&id)?;
        row.iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| value.clone())
    }

    /// Changes a stored row behind the back of any open view
    pub fn overwrite_stored<T: Describe>(&self, id: i64, member: &str, value: Value) -> bool {
        let mut tables = self.tables.borrow_mut();
        let Some(row) = tables
            .get_mut(&TypeId::of::<T>())
            .and_then(|table| table.rows.get_mut(&id))
        else {
            return false;
        };
        match row.iter_mut().find(|(name, _)| name == member) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }

    fn table_error(entity: &EntityRef) -> PersistenceError {
        let type_id = entity.borrow().as_any().type_id();
        PersistenceError::UnknownType(format!("{:?}", type_id))
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for InMemoryPersistence {
    fn save(&self, entity: EntityRef) -> Result<EntityRef, PersistenceError> {
        self.save_calls.set(self.save_calls.get() + 1);
        let type_id = entity.borrow().as_any().type_id();
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .get_mut(&type_id)
            .ok_or_else(|| Self::table_error(&entity))?;

        if let Some(reason) = self.fail_next_save.borrow_mut().take() {
            return Err(PersistenceError::SaveFailed {
                type_name: table.type_name.clone(),
                reason,
            });
        }

        let save_failed = |reason: String| PersistenceError::SaveFailed {
            type_name: table.type_name.clone(),
            reason,
        };

        let current = entity
            .borrow()
            .get_value(&table.identifier)
            .map_err(|err| save_failed(err.to_string()))?;
        let id = match current {
            Value::Integer(id) => id,
            Value::Null => {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                entity
                    .borrow_mut()
                    .set_value(&table.identifier, Value::Integer(id))
                    .map_err(|err| save_failed(err.to_string()))?;
                id
            }
            other => return Err(save_failed(format!("unexpected identifier {:?}", other))),
        };

        let snapshot = table.snapshot(&entity)?;
        let stored = match (self.detached_saves, table.factory) {
            (true, Some(factory)) => {
                let copy = factory.create();
                for (member, value) in &snapshot {
                    copy.borrow_mut()
                        .set_value(member, value.clone())
                        .map_err(|err| save_failed(err.to_string()))?;
                }
                copy
            }
            _ => entity,
        };

        table.rows.insert(id, snapshot);
        table.live.insert(id, stored.clone());
        Ok(stored)
    }

    fn refresh(&self, entity: &EntityRef) -> Result<(), PersistenceError> {
        self.refresh_calls.set(self.refresh_calls.get() + 1);
        let type_id = entity.borrow().as_any().type_id();
        let tables = self.tables.borrow();
        let table = tables
            .get(&type_id)
            .ok_or_else(|| Self::table_error(entity))?;

        let refresh_failed = |reason: String| PersistenceError::RefreshFailed {
            type_name: table.type_name.clone(),
            reason,
        };

        if let Some(reason) = self.fail_next_refresh.borrow_mut().take() {
            return Err(refresh_failed(reason));
        }

        let id = entity
            .borrow()
            .get_value(&table.identifier)
            .map_err(|err| refresh_failed(err.to_string()))?
            .as_integer()
            .ok_or_else(|| refresh_failed("instance was never saved".to_string()))?;
        let row = table
            .rows
            .get(&id)
            .ok_or_else(|| refresh_failed(format!("no stored row {}", id)))?;

        let mut target = entity.borrow_mut();
        for (member, value) in row {
            target
                .set_value(member, value.clone())
                .map_err(|err| refresh_failed(err.to_string()))?;
        }
        Ok(())
    }

    fn find_all(&self, entity_type: &EntityType) -> Result<Vec<EntityRef>, PersistenceError> {
        let tables = self.tables.borrow();
        tables
            .values()
            .find(|table| table.type_name == entity_type.type_name)
            .map(|table| table.live.values().cloned().collect())
            .ok_or_else(|| PersistenceError::UnknownType(entity_type.type_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Customer, Orphan};
    use form_types::shared;

    fn store() -> InMemoryPersistence {
        InMemoryPersistence::new().starting_at(7).register::<Customer>()
    }

    #[test]
    fn test_save_assigns_identifier() {
        let store = store();
        let customer = shared(Customer::new("Acme"));
        let saved = store.save(customer.clone()).unwrap();
        assert_eq!(saved.borrow().get_value("id").unwrap(), Value::Integer(7));
        assert_eq!(
            store.stored_value::<Customer>(7, "name"),
            Some(Value::Text("Acme".to_string()))
        );
        assert_eq!(store.save_calls(), 1);
    }

    #[test]
    fn test_save_keeps_existing_identifier() {
        let store = store();
        let customer = shared(Customer::new("Acme").with_id(42));
        store.save(customer).unwrap();
        assert!(store.stored_value::<Customer>(42, "name").is_some());
        assert!(store.stored_value::<Customer>(7, "name").is_none());
    }

    #[test]
    fn test_refresh_discards_local_edits() {
        let store = store();
        let customer = shared(Customer::new("Acme"));
        store.save(customer.clone()).unwrap();

        customer
            .borrow_mut()
            .set_value("name", Value::from("Edited"))
            .unwrap();
        store.refresh(&customer).unwrap();
        assert_eq!(
            customer.borrow().get_value("name").unwrap(),
            Value::Text("Acme".to_string())
        );
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let store = store();
        store.fail_next_save("disk full");
        let customer = shared(Customer::new("Acme"));
        let err = store.save(customer.clone()).err().unwrap();
        assert!(matches!(err, PersistenceError::SaveFailed { .. }));
        assert!(store.save(customer).is_ok());
    }

    #[test]
    fn test_detached_saves_return_new_instance() {
        let store = store().with_detached_saves();
        let customer = shared(Customer::new("Acme"));
        let saved = store.save(customer.clone()).unwrap();
        assert!(!std::rc::Rc::ptr_eq(&saved, &customer));
        assert_eq!(saved.borrow().get_value("id").unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_unregistered_type_is_rejected() {
        let store = store();
        let err = store.save(shared(Orphan::default())).err().unwrap();
        assert!(matches!(err, PersistenceError::UnknownType(_)));
    }
}
