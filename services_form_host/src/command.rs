//! Command bars and command results

use crate::labels::FormLabels;
use form_types::{EntityRole, IdentityKey, ViewId, ViewKind};
use serde::{Deserialize, Serialize};
use services_form_binder::ConversionError;
use std::fmt;

/// Identifies a command on a view's command bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandId {
    /// Commit and persist an element
    Save,
    /// Discard edits and reload an element
    Reload,
    /// Re-query the rows of a list
    Refresh,
    /// Open a new element from a list
    Create,
    /// Caller-declared command, by declaration index
    Custom(usize),
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandId::Save => write!(f, "save"),
            CommandId::Reload => write!(f, "reload"),
            CommandId::Refresh => write!(f, "refresh"),
            CommandId::Create => write!(f, "create"),
            CommandId::Custom(index) => write!(f, "custom#{}", index),
        }
    }
}

/// One button on a command bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandItem {
    pub id: CommandId,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CommandItem {
    fn new(id: CommandId, caption: impl Into<String>) -> Self {
        Self {
            id,
            caption: caption.into(),
            icon: None,
        }
    }
}

/// Ordered commands of a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBar {
    items: Vec<CommandItem>,
}

impl CommandBar {
    /// Commands for an element of the given role
    pub fn for_role(role: &EntityRole, labels: &FormLabels) -> Self {
        let items = match role {
            EntityRole::Standard => vec![
                CommandItem::new(CommandId::Save, &labels.save),
                CommandItem::new(CommandId::Reload, &labels.reload),
            ],
            EntityRole::CustomCommands(commands) => commands
                .iter()
                .enumerate()
                .map(|(index, command)| CommandItem {
                    id: CommandId::Custom(index),
                    caption: command.caption.clone(),
                    icon: command.icon.clone(),
                })
                .collect(),
        };
        Self { items }
    }

    /// Commands of a list view
    pub fn for_list(labels: &FormLabels) -> Self {
        Self {
            items: vec![
                CommandItem::new(CommandId::Refresh, &labels.refresh),
                CommandItem::new(CommandId::Create, &labels.create),
            ],
        }
    }

    pub fn items(&self) -> &[CommandItem] {
        &self.items
    }

    pub fn captions(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.caption.as_str()).collect()
    }

    pub fn contains(&self, id: CommandId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Finds a command by caption
    pub fn find(&self, caption: &str) -> Option<CommandId> {
        self.items
            .iter()
            .find(|item| item.caption == caption)
            .map(|item| item.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handle to an open view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewHandle {
    pub id: ViewId,
    pub kind: ViewKind,
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Element persisted; `key` is its key after re-keying
    Saved { key: IdentityKey },
    /// Element reloaded from the source of truth
    Reloaded,
    /// Custom command ran
    Completed,
    /// List re-queried
    Refreshed { rows: usize },
    /// A new view was opened or focused
    Opened(ViewHandle),
    /// Pending edits could not be converted; nothing was written
    Rejected(ConversionError),
    /// A collaborator failed; the view is unchanged and still open
    Failed { message: String },
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            CommandOutcome::Rejected(_) | CommandOutcome::Failed { .. }
        )
    }
}
