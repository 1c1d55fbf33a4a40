//! Entity schema definitions and the computed entity type
//!
//! An [`EntityDefinition`] is what an entity type registers about itself. The
//! schema registry turns it into an [`EntityType`]: filtered, ordered, and
//! annotated with diagnostics for members that cannot be rendered.

use crate::entity::{Entity, EntityRef};
use crate::value::{Value, ValueType};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Computes a read-only value from an entity
#[derive(Clone, Copy)]
pub struct DerivedValue(pub fn(&dyn Entity) -> String);

impl DerivedValue {
    /// Evaluates the provider against an entity
    pub fn evaluate(&self, entity: &dyn Entity) -> String {
        (self.0)(entity)
    }
}

impl fmt::Debug for DerivedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedValue(..)")
    }
}

/// Human-readable representation of an entity (used for relation display)
#[derive(Clone, Copy)]
pub struct Representation(pub fn(&dyn Entity) -> String);

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Representation(..)")
    }
}

/// Creates a fresh, unsaved instance of an entity type
#[derive(Clone, Copy)]
pub struct EntityFactory(pub fn() -> EntityRef);

impl EntityFactory {
    /// Builds a new instance
    pub fn create(&self) -> EntityRef {
        (self.0)()
    }
}

impl fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EntityFactory(..)")
    }
}

/// Failure raised by a custom command action
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CommandError(pub String);

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Action executed by a custom command
#[derive(Clone, Copy)]
pub struct CommandAction(pub fn(&mut dyn Entity) -> Result<(), CommandError>);

impl CommandAction {
    /// Runs the action against an entity
    pub fn run(&self, entity: &mut dyn Entity) -> Result<(), CommandError> {
        (self.0)(entity)
    }
}

impl fmt::Debug for CommandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CommandAction(..)")
    }
}

/// A caller-declared command on a custom-command form
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    /// Command bar caption
    pub caption: String,
    /// Optional icon name
    pub icon: Option<String>,
    /// Action to run
    pub action: CommandAction,
}

impl CommandDefinition {
    /// Creates a new command definition
    pub fn new(caption: impl Into<String>, action: fn(&mut dyn Entity) -> Result<(), CommandError>) -> Self {
        Self {
            caption: caption.into(),
            icon: None,
            action: CommandAction(action),
        }
    }

    /// Sets the icon
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Role of an entity type in the workspace
#[derive(Debug, Clone)]
pub enum EntityRole {
    /// Persisted entity: Save and Reload
    Standard,
    /// Form driven by caller-declared commands
    CustomCommands(Vec<CommandDefinition>),
}

/// How a member gets its value
#[derive(Debug, Clone, Copy)]
pub enum MemberKind {
    /// Stored field
    Field,
    /// Derived-value provider
    Provider(DerivedValue),
}

/// Registration-time description of one member
#[derive(Debug, Clone)]
pub struct MemberDefinition {
    pub name: String,
    pub value_type: ValueType,
    pub kind: MemberKind,
    pub label: Option<String>,
    pub order: Option<i32>,
    pub long_text: bool,
    /// Filled by the host environment, never shown
    pub injected: bool,
    /// Type-level rather than instance-level
    pub static_member: bool,
}

impl MemberDefinition {
    /// Declares a stored field
    pub fn field(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind: MemberKind::Field,
            label: None,
            order: None,
            long_text: false,
            injected: false,
            static_member: false,
        }
    }

    /// Declares a static derived-value provider
    pub fn provider(name: impl Into<String>, provider: fn(&dyn Entity) -> String) -> Self {
        Self {
            name: name.into(),
            value_type: ValueType::Derived,
            kind: MemberKind::Provider(DerivedValue(provider)),
            label: None,
            order: None,
            long_text: false,
            injected: false,
            static_member: true,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn long_text(mut self) -> Self {
        self.long_text = true;
        self
    }

    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.static_member = true;
        self
    }

    /// Marks a provider as instance-level; such providers are not rendered
    pub fn instance_level(mut self) -> Self {
        self.static_member = false;
        self
    }

    /// Returns true if this is a derived-value provider
    pub fn is_provider(&self) -> bool {
        matches!(self.kind, MemberKind::Provider(_))
    }
}

/// Registration-time description of an entity type
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    /// Canonical type name, used in identity keys
    pub type_name: String,
    /// Singular display label
    pub label: String,
    pub menu_caption: Option<String>,
    pub menu_path: Option<String>,
    pub role: Option<EntityRole>,
    /// Name of the identifier member
    pub identifier: Option<String>,
    /// Member used by the menu collaborator for quick search
    pub search_member: Option<String>,
    /// Members in declaration order
    pub members: Vec<MemberDefinition>,
    pub representation: Option<Representation>,
    pub factory: Option<EntityFactory>,
}

impl EntityDefinition {
    /// Starts a definition with no role attached
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let label = type_name
            .rsplit(|c: char| c == '.' || c == ':')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            type_name,
            label,
            menu_caption: None,
            menu_path: None,
            role: None,
            identifier: None,
            search_member: None,
            members: Vec::new(),
            representation: None,
            factory: None,
        }
    }

    /// Starts a standard (Save/Reload) entity definition
    pub fn standard(type_name: impl Into<String>, label: impl Into<String>) -> Self {
        let mut definition = Self::new(type_name);
        definition.label = label.into();
        definition.role = Some(EntityRole::Standard);
        definition
    }

    /// Starts a custom-command form definition
    pub fn custom_form(type_name: impl Into<String>, label: impl Into<String>) -> Self {
        let mut definition = Self::new(type_name);
        definition.label = label.into();
        definition.role = Some(EntityRole::CustomCommands(Vec::new()));
        definition
    }

    pub fn menu_caption(mut self, caption: impl Into<String>) -> Self {
        self.menu_caption = Some(caption.into());
        self
    }

    pub fn menu_path(mut self, path: impl Into<String>) -> Self {
        self.menu_path = Some(path.into());
        self
    }

    pub fn identifier(mut self, member: impl Into<String>) -> Self {
        self.identifier = Some(member.into());
        self
    }

    pub fn search_member(mut self, member: impl Into<String>) -> Self {
        self.search_member = Some(member.into());
        self
    }

    pub fn member(mut self, member: MemberDefinition) -> Self {
        self.members.push(member);
        self
    }

    pub fn representation(mut self, represent: fn(&dyn Entity) -> String) -> Self {
        self.representation = Some(Representation(represent));
        self
    }

    pub fn factory(mut self, factory: fn() -> EntityRef) -> Self {
        self.factory = Some(EntityFactory(factory));
        self
    }

    /// Adds a command; turns a role-less definition into a custom-command form
    ///
    /// Standard entities keep Save and Reload: commands declared on them are
    /// ignored with a warning.
    pub fn command(mut self, command: CommandDefinition) -> Self {
        match &mut self.role {
            Some(EntityRole::CustomCommands(commands)) => commands.push(command),
            Some(EntityRole::Standard) => warn!(
                type_name = %self.type_name,
                command = %command.caption,
                "command ignored on a standard entity"
            ),
            None => self.role = Some(EntityRole::CustomCommands(vec![command])),
        }
        self
    }
}

/// One rendered member of an entity type
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    pub name: String,
    pub value_type: ValueType,
    /// Explicit draw order; `None` sorts after every explicit value
    pub order: Option<i32>,
    /// Caption: explicit label or the bare member name
    pub label: String,
    pub read_only: bool,
    pub identifier: bool,
    pub long_text: bool,
    /// Present only for computed members
    pub derived: Option<DerivedValue>,
}

impl MemberDescriptor {
    /// Display text of the instance linked through a relation member
    ///
    /// Resolved with the target type's representation. `None` when this is
    /// not a relation, nothing is linked, or the target type is unknown.
    pub fn represent_related(&self, entity: &dyn Entity, catalog: &dyn TypeCatalog) -> Option<String> {
        let ValueType::Relation { target } = &self.value_type else {
            return None;
        };
        let target = catalog.by_name(target)?;
        let linked = entity.related(&self.name)?;
        let text = target.represent(&*linked.borrow());
        Some(text)
    }

    /// Numeric draw order, defaulting to zero
    pub fn order_value(&self) -> i32 {
        self.order.unwrap_or(0)
    }

    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }
}

/// Non-fatal findings recorded while describing a type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Member {member} has unsupported type {type_name}; it is not rendered")]
    UnsupportedMemberType { member: String, type_name: String },
}

/// Tells the schema registry which value types can be rendered
pub trait ValueTypeSupport: Send + Sync {
    fn supports(&self, value_type: &ValueType) -> bool;
}

/// Finds described entity types by canonical name
pub trait TypeCatalog: Send + Sync {
    fn by_name(&self, type_name: &str) -> Option<Arc<EntityType>>;
}

/// Fully described entity type
///
/// Immutable once computed; shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EntityType {
    pub type_name: String,
    pub label: String,
    pub menu_caption: String,
    pub menu_path: Option<String>,
    pub role: Option<EntityRole>,
    pub identifier: Option<String>,
    pub search_member: Option<String>,
    /// Rendered members, in draw order
    pub members: Vec<MemberDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    pub representation: Option<Representation>,
    pub factory: Option<EntityFactory>,
}

impl EntityType {
    /// Looks up a rendered member by name
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Returns the member names in draw order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// Reads the identifier value of an entity, if the type declares one
    pub fn identifier_value(&self, entity: &dyn Entity) -> Option<Value> {
        let identifier = self.identifier.as_deref()?;
        entity.get_value(identifier).ok()
    }

    /// Display representation of an entity
    ///
    /// Falls back to `<label>:<identifier>` when no resolver is registered.
    pub fn represent(&self, entity: &dyn Entity) -> String {
        match self.representation {
            Some(Representation(represent)) => represent(entity),
            None => match self.identifier_value(entity) {
                Some(value) if !value.is_null() => format!("{}:{}", self.label, value),
                _ => self.label.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe_len(_: &dyn Entity) -> String {
        "0".to_string()
    }

    #[test]
    fn test_definition_label_defaults_to_last_path_segment() {
        let definition = EntityDefinition::new("example.entity.Customer");
        assert_eq!(definition.label, "Customer");
        assert!(definition.role.is_none());

        let definition = EntityDefinition::new("example::Invoice");
        assert_eq!(definition.label, "Invoice");
    }

    #[test]
    fn test_standard_definition_builder() {
        let definition = EntityDefinition::standard("example.Customer", "Customer")
            .menu_caption("Our Customers")
            .identifier("id")
            .member(MemberDefinition::field("id", ValueType::Integer).order(-1))
            .member(MemberDefinition::field("name", ValueType::Text).label("Name"));

        assert!(matches!(definition.role, Some(EntityRole::Standard)));
        assert_eq!(definition.identifier.as_deref(), Some("id"));
        assert_eq!(definition.members.len(), 2);
        assert_eq!(definition.members[0].order, Some(-1));
        assert_eq!(definition.members[1].label.as_deref(), Some("Name"));
    }

    #[test]
    fn test_command_turns_definition_into_custom_form() {
        fn noop(_: &mut dyn Entity) -> Result<(), CommandError> {
            Ok(())
        }

        let definition = EntityDefinition::new("example.Calculator")
            .command(CommandDefinition::new("Compute", noop))
            .command(CommandDefinition::new("Clear", noop).with_icon("eraser"));

        match definition.role {
            Some(EntityRole::CustomCommands(commands)) => {
                assert_eq!(commands.len(), 2);
                assert_eq!(commands[1].icon.as_deref(), Some("eraser"));
            }
            other => panic!("unexpected role: {:?}", other),
        }
    }

    #[test]
    fn test_command_keeps_standard_role() {
        fn noop(_: &mut dyn Entity) -> Result<(), CommandError> {
            Ok(())
        }

        let definition = EntityDefinition::standard("example.Customer", "Customer")
            .command(CommandDefinition::new("Compute", noop));
        assert!(matches!(definition.role, Some(EntityRole::Standard)));
    }

    #[test]
    fn test_provider_is_static_by_default() {
        let member = MemberDefinition::provider("count", describe_len);
        assert!(member.is_provider());
        assert!(member.static_member);
        assert_eq!(member.value_type, ValueType::Derived);

        let member = member.instance_level();
        assert!(!member.static_member);
    }
}
