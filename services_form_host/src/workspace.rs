//! The workspace facade: opening, caching, commanding and closing views

use crate::command::{CommandId, CommandOutcome, ViewHandle};
use crate::element::{ElementView, ViewAssembler};
use crate::error::FormError;
use crate::labels::FormLabels;
use crate::list::ListView;
use crate::registry::{OpenView, OpenViewRegistry};
use form_types::{
    Describe, EntityRef, EntityRole, EntityType, IdentityKey, Persistence, ViewKind,
};
use services_form_binder::{BindError, WidgetOptions, WidgetRegistry};
use services_notification::{Notification, NotificationService};
use services_schema_registry::SchemaRegistry;
use services_settings::SettingsRegistry;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// One user session of open entity views
///
/// Single-threaded: entities are shared through `Rc<RefCell<_>>`.
pub struct FormWorkspace {
    schemas: Arc<SchemaRegistry>,
    assembler: ViewAssembler,
    persistence: Rc<dyn Persistence>,
    views: OpenViewRegistry,
    notifications: NotificationService,
}

impl FormWorkspace {
    /// Creates a workspace with the built-in widgets
    pub fn new(persistence: Rc<dyn Persistence>, labels: FormLabels) -> Self {
        let widgets = WidgetRegistry::with_defaults(WidgetOptions {
            empty_caption: labels.empty_selection.clone(),
        });
        Self::with_widgets(persistence, labels, widgets)
    }

    /// Creates a workspace with labels resolved for a settings profile
    pub fn from_settings(
        persistence: Rc<dyn Persistence>,
        settings: &SettingsRegistry,
        profile: &str,
    ) -> Self {
        Self::new(persistence, FormLabels::from_settings(settings, profile))
    }

    /// Creates a workspace with a caller-supplied widget registry
    pub fn with_widgets(
        persistence: Rc<dyn Persistence>,
        labels: FormLabels,
        widgets: WidgetRegistry,
    ) -> Self {
        let widgets = Arc::new(widgets);
        let schemas = Arc::new(SchemaRegistry::new(widgets.clone()));
        Self {
            assembler: ViewAssembler::new(widgets, labels).with_catalog(schemas.clone()),
            schemas,
            persistence,
            views: OpenViewRegistry::new(),
            notifications: NotificationService::new(),
        }
    }

    /// Describes a type ahead of opening it
    ///
    /// Relations show a target's representation only once the target type is
    /// described.
    pub fn register<T: Describe>(&self) -> Arc<EntityType> {
        self.schemas.describe::<T>()
    }

    /// Opens the element view of an instance, or focuses it if already open
    pub fn open_element_view<T: Describe>(
        &mut self,
        entity: EntityRef,
        is_new: bool,
    ) -> Result<ViewHandle, FormError> {
        let entity_type = self.schemas.describe::<T>();
        self.open_element(entity_type, entity, is_new)
    }

    /// Opens an element view for an already described type
    pub fn open_element(
        &mut self,
        entity_type: Arc<EntityType>,
        entity: EntityRef,
        is_new: bool,
    ) -> Result<ViewHandle, FormError> {
        let key = self.assembler.element_key(&entity_type, &entity, is_new)?;
        if let Some(handle) = self.focus_existing(&key) {
            return Ok(handle);
        }

        let view = OpenView::Element(self.assembler.assemble(entity_type, entity, is_new)?);
        let handle = view.handle();
        debug!(key = %key, view = %handle.id, "opened element view");
        self.views.insert(view);
        Ok(handle)
    }

    /// Opens the list view of a type, or focuses it if already open
    pub fn open_list_view<T: Describe>(&mut self) -> Result<ViewHandle, FormError> {
        let entity_type = self.schemas.describe::<T>();
        let key = IdentityKey::list(
            &self.assembler.labels().list_prefix,
            &entity_type.type_name,
        );
        if let Some(handle) = self.focus_existing(&key) {
            return Ok(handle);
        }

        let mut view = ListView::new(entity_type, self.assembler.labels())
            .with_catalog(self.schemas.clone());
        if let Err(err) = view.load(self.persistence.as_ref()) {
            report_failure(&mut self.notifications, &key, err.to_string());
            return Err(err.into());
        }
        let view = OpenView::List(view);
        let handle = view.handle();
        debug!(key = %key, view = %handle.id, "opened list view");
        self.views.insert(view);
        Ok(handle)
    }

    /// Opens the element view of a list row
    pub fn open_row(&mut self, key: &IdentityKey, index: usize) -> Result<ViewHandle, FormError> {
        let list = list_in(&self.views, key)?;
        let row = list
            .rows()
            .get(index)
            .cloned()
            .ok_or_else(|| FormError::RowOutOfRange {
                key: key.clone(),
                index,
            })?;
        let entity_type = Arc::clone(list.entity_type());
        self.open_element(entity_type, row, false)
    }

    /// Recomputes the key and caption of an open view from its entity
    ///
    /// Returns the current key, or `None` if no view is open under `old_key`.
    pub fn refresh_caption(&mut self, old_key: &IdentityKey) -> Option<IdentityKey> {
        let Some(view) = self.views.get_mut(old_key) else {
            warn!(key = %old_key, "caption refresh for a view that is not open");
            return None;
        };

        let new_key = match view {
            OpenView::Element(view) => {
                let new_key = self.assembler.rekey(&view.entity_type, &view.entity, old_key);
                view.caption = self.assembler.caption(&view.entity_type, &new_key);
                new_key
            }
            OpenView::List(_) => old_key.clone(),
        };

        if &new_key != old_key {
            if self.views.contains(&new_key) {
                warn!(key = %new_key, "re-keyed view replaces an open view");
            }
            self.views.rekey(old_key, new_key.clone());
            self.notifications
                .retarget(&old_key.to_string(), &new_key.to_string());
            debug!(old = %old_key, new = %new_key, "re-keyed view");
        }
        Some(new_key)
    }

    /// Closes a view; unknown keys are ignored
    ///
    /// Pending errors raised by the view are dismissed. Returns true if a
    /// view was closed.
    pub fn close(&mut self, key: &IdentityKey) -> bool {
        let Some(view) = self.views.remove(key) else {
            return false;
        };
        let dismissed = self.notifications.dismiss_errors_from(&key.to_string());
        debug!(key = %key, dismissed, "closed view");
        self.notifications.notify(
            Notification::info(format!("Closing {}", view.caption())).with_source(key.to_string()),
        );
        true
    }

    /// Runs a command of an open view
    ///
    /// Collaborator failures are reported as notifications and an outcome;
    /// only structural problems are returned as errors.
    pub fn execute_command(
        &mut self,
        key: &IdentityKey,
        command: CommandId,
    ) -> Result<CommandOutcome, FormError> {
        let view = self
            .views
            .get(key)
            .ok_or_else(|| FormError::ViewNotFound(key.clone()))?;
        if !view.commands().contains(command) {
            return Err(FormError::UnknownCommand {
                key: key.clone(),
                command,
            });
        }

        match command {
            CommandId::Save => self.save(key),
            CommandId::Reload => self.reload(key),
            CommandId::Custom(index) => self.run_custom(key, command, index),
            CommandId::Refresh => self.refresh_rows(key),
            CommandId::Create => self.create_element(key),
        }
    }

    /// Types text into a widget of an element view
    pub fn input(
        &mut self,
        key: &IdentityKey,
        member: &str,
        text: impl Into<String>,
    ) -> Result<(), FormError> {
        element_in(&mut self.views, key)?.binder.input(member, text)?;
        Ok(())
    }

    /// Selects an item in a widget of an element view
    pub fn select(
        &mut self,
        key: &IdentityKey,
        member: &str,
        item: Option<&str>,
    ) -> Result<(), FormError> {
        element_in(&mut self.views, key)?.binder.select(member, item)?;
        Ok(())
    }

    /// Brings an open view to the foreground
    pub fn focus(&mut self, key: &IdentityKey) -> bool {
        self.views.focus(key)
    }

    pub fn focused(&self) -> Option<&IdentityKey> {
        self.views.focused()
    }

    pub fn focused_view(&self) -> Option<&OpenView> {
        self.views.focused().and_then(|key| self.views.get(key))
    }

    pub fn view(&self, key: &IdentityKey) -> Option<&OpenView> {
        self.views.get(key)
    }

    pub fn element(&self, key: &IdentityKey) -> Option<&ElementView> {
        self.views.get(key).and_then(OpenView::as_element)
    }

    pub fn list(&self, key: &IdentityKey) -> Option<&ListView> {
        self.views.get(key).and_then(OpenView::as_list)
    }

    pub fn views(&self) -> &OpenViewRegistry {
        &self.views
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationService {
        &mut self.notifications
    }

    fn focus_existing(&mut self, key: &IdentityKey) -> Option<ViewHandle> {
        let handle = self.views.get(key)?.handle();
        self.views.focus(key);
        debug!(key = %key, view = %handle.id, "view already open, focusing");
        Some(handle)
    }

    /// Commit, persist, adopt the stored instance, re-read, re-key
    fn save(&mut self, key: &IdentityKey) -> Result<CommandOutcome, FormError> {
        let view = element_in(&mut self.views, key)?;
        if let Err(outcome) = commit(view, &mut self.notifications) {
            return Ok(outcome);
        }

        match self.persistence.save(Rc::clone(&view.entity)) {
            Ok(saved) => view.entity = saved,
            Err(err) => return Ok(report_failure(&mut self.notifications, key, err.to_string())),
        }
        if let Err(err) = view.binder.read(&*view.entity.borrow()) {
            return Ok(report_failure(&mut self.notifications, key, err.to_string()));
        }

        let new_key = self.refresh_caption(key).unwrap_or_else(|| key.clone());
        let caption = self
            .views
            .get(&new_key)
            .map(|view| view.caption().to_string())
            .unwrap_or_default();
        self.notifications.notify(
            Notification::success(format!("{} saved", caption)).with_source(new_key.to_string()),
        );
        Ok(CommandOutcome::Saved { key: new_key })
    }

    /// Discard edits: refresh from the source of truth and re-read
    fn reload(&mut self, key: &IdentityKey) -> Result<CommandOutcome, FormError> {
        let view = element_in(&mut self.views, key)?;
        if let Err(err) = self.persistence.refresh(&view.entity) {
            return Ok(report_failure(&mut self.notifications, key, err.to_string()));
        }
        if let Err(err) = view.binder.read(&*view.entity.borrow()) {
            return Ok(report_failure(&mut self.notifications, key, err.to_string()));
        }
        Ok(CommandOutcome::Reloaded)
    }

    /// Commit, run the declared action, re-read
    fn run_custom(
        &mut self,
        key: &IdentityKey,
        command: CommandId,
        index: usize,
    ) -> Result<CommandOutcome, FormError> {
        let view = element_in(&mut self.views, key)?;
        let action = match view.entity_type.role.as_ref() {
            Some(EntityRole::CustomCommands(commands)) => commands.get(index).map(|c| c.action),
            _ => None,
        }
        .ok_or_else(|| FormError::UnknownCommand {
            key: key.clone(),
            command,
        })?;

        if let Err(outcome) = commit(view, &mut self.notifications) {
            return Ok(outcome);
        }
        let result = action.run(&mut *view.entity.borrow_mut());
        let reread = view.binder.read(&*view.entity.borrow());

        match (result, reread) {
            (Err(err), _) => Ok(report_failure(&mut self.notifications, key, err.to_string())),
            (Ok(()), Err(err)) => Ok(report_failure(&mut self.notifications, key, err.to_string())),
            (Ok(()), Ok(())) => Ok(CommandOutcome::Completed),
        }
    }

    fn refresh_rows(&mut self, key: &IdentityKey) -> Result<CommandOutcome, FormError> {
        let view = match self.views.get_mut(key) {
            Some(OpenView::List(view)) => view,
            _ => return Err(wrong_kind(key, ViewKind::List)),
        };
        match view.load(self.persistence.as_ref()) {
            Ok(rows) => Ok(CommandOutcome::Refreshed { rows }),
            Err(err) => Ok(report_failure(&mut self.notifications, key, err.to_string())),
        }
    }

    /// Opens an element view for a fresh instance of the listed type
    fn create_element(&mut self, key: &IdentityKey) -> Result<CommandOutcome, FormError> {
        let entity_type = Arc::clone(list_in(&self.views, key)?.entity_type());
        let factory = entity_type
            .factory
            .ok_or_else(|| FormError::missing_metadata(&entity_type.type_name, "no factory declared"))?;
        let handle = self.open_element(entity_type, factory.create(), true)?;
        Ok(CommandOutcome::Opened(handle))
    }
}

fn wrong_kind(key: &IdentityKey, expected: ViewKind) -> FormError {
    FormError::WrongViewKind {
        key: key.clone(),
        expected,
    }
}

fn element_in<'a>(
    views: &'a mut OpenViewRegistry,
    key: &IdentityKey,
) -> Result<&'a mut ElementView, FormError> {
    match views.get_mut(key) {
        Some(OpenView::Element(view)) => Ok(view),
        Some(OpenView::List(_)) => Err(wrong_kind(key, ViewKind::Element)),
        None => Err(FormError::ViewNotFound(key.clone())),
    }
}

fn list_in<'a>(views: &'a OpenViewRegistry, key: &IdentityKey) -> Result<&'a ListView, FormError> {
    match views.get(key) {
        Some(OpenView::List(view)) => Ok(view),
        Some(OpenView::Element(_)) => Err(wrong_kind(key, ViewKind::List)),
        None => Err(FormError::ViewNotFound(key.clone())),
    }
}

/// Writes pending edits; on failure the outcome to return instead
fn commit(
    view: &mut ElementView,
    notifications: &mut NotificationService,
) -> Result<(), CommandOutcome> {
    let result = view.binder.commit(&mut *view.entity.borrow_mut());
    match result {
        Ok(()) => Ok(()),
        Err(BindError::Conversion(err)) => {
            warn!(key = %view.key, member = %err.member, reason = %err.reason, "rejected pending edits");
            let message = if err.numeric {
                format!("Value in field \"{}\" must be a number", err.caption)
            } else {
                format!("Value in field \"{}\" is wrong", err.caption)
            };
            notifications.notify(Notification::error(message).with_source(view.key.to_string()));
            Err(CommandOutcome::Rejected(err))
        }
        Err(err) => Err(report_failure(notifications, &view.key, err.to_string())),
    }
}

fn report_failure(
    notifications: &mut NotificationService,
    key: &IdentityKey,
    message: String,
) -> CommandOutcome {
    error!(key = %key, error = %message, "command failed");
    notifications.notify(Notification::error(message.clone()).with_source(key.to_string()));
    CommandOutcome::Failed { message }
}
