//! # Form Host
//!
//! This crate turns described entity types into open views and runs their
//! commands.
//!
//! ## Philosophy
//!
//! - **One view per identity**: Opening an instance that is already open
//!   focuses the existing view instead of building a second one
//! - **Keys follow the entity**: A draft is re-keyed once persistence assigns
//!   its identifier
//! - **Failures are messages**: Persistence and command failures become
//!   notifications; the view stays open with the user's edits
//! - **Headless**: Views are plain state driven through [`FormWorkspace`]
//!
//! ## Example
//!
//! ```ignore
//! use services_form_host::{CommandId, FormLabels, FormWorkspace};
//!
//! let mut workspace = FormWorkspace::new(persistence, FormLabels::default());
//! workspace.open_element_view::<Customer>(shared(Customer::default()), true)?;
//! let key = workspace.focused().cloned().unwrap();
//! workspace.input(&key, "name", "Acme Corp")?;
//! workspace.execute_command(&key, CommandId::Save)?;
//! ```

pub mod command;
pub mod element;
pub mod error;
pub mod labels;
pub mod list;
pub mod registry;
pub mod workspace;

pub use command::{CommandBar, CommandId, CommandItem, CommandOutcome, ViewHandle};
pub use element::{ElementView, ViewAssembler};
pub use error::FormError;
pub use labels::FormLabels;
pub use list::{Column, ListView};
pub use registry::{OpenView, OpenViewRegistry};
pub use workspace::FormWorkspace;
