//! List views over all stored instances of a type

use crate::command::CommandBar;
use crate::labels::FormLabels;
use form_types::{
    EntityRef, EntityType, IdentityKey, Persistence, PersistenceError, TypeCatalog, ViewId,
};
use std::sync::Arc;

/// One column of a list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub member: String,
    pub caption: String,
}

/// Tabular listing of a type
pub struct ListView {
    pub(crate) id: ViewId,
    pub(crate) key: IdentityKey,
    pub(crate) caption: String,
    pub(crate) entity_type: Arc<EntityType>,
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: Vec<EntityRef>,
    pub(crate) commands: CommandBar,
    pub(crate) catalog: Option<Arc<dyn TypeCatalog>>,
}

impl ListView {
    /// Builds a list view; rows are loaded separately
    pub(crate) fn new(entity_type: Arc<EntityType>, labels: &FormLabels) -> Self {
        let columns = entity_type
            .members
            .iter()
            .map(|member| Column {
                member: member.name.clone(),
                caption: member.label.clone(),
            })
            .collect();
        Self {
            id: ViewId::new(),
            key: IdentityKey::list(&labels.list_prefix, &entity_type.type_name),
            caption: entity_type.menu_caption.clone(),
            columns,
            rows: Vec::new(),
            commands: CommandBar::for_list(labels),
            catalog: None,
            entity_type,
        }
    }

    /// Shows relation cells through the representation of their target type
    pub(crate) fn with_catalog(mut self, catalog: Arc<dyn TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Re-queries the rows
    pub(crate) fn load(&mut self, persistence: &dyn Persistence) -> Result<usize, PersistenceError> {
        self.rows = persistence.find_all(&self.entity_type)?;
        Ok(self.rows.len())
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[EntityRef] {
        &self.rows
    }

    pub fn commands(&self) -> &CommandBar {
        &self.commands
    }

    /// Display text of every cell in a row
    ///
    /// Derived members are evaluated and relations use the representation
    /// of their target. Unreadable members show as empty.
    pub fn cells(&self, index: usize) -> Option<Vec<String>> {
        let row = self.rows.get(index)?;
        let entity = row.borrow();
        let catalog = self.catalog.as_deref();
        let cells = self
            .entity_type
            .members
            .iter()
            .map(|member| {
                if let Some(derived) = &member.derived {
                    return derived.evaluate(&*entity);
                }
                catalog
                    .and_then(|catalog| member.represent_related(&*entity, catalog))
                    .or_else(|| entity.get_value(&member.name).ok().map(|value| value.to_string()))
                    .unwrap_or_default()
            })
            .collect();
        Some(cells)
    }
}

impl std::fmt::Debug for ListView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListView")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("caption", &self.caption)
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}
