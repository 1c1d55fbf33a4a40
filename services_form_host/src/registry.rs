//! Open-view registry
//!
//! At most one view per key. Tracks open order so that closing the focused
//! view hands focus to the most recently opened remaining one.

use crate::command::{CommandBar, ViewHandle};
use crate::element::ElementView;
use crate::list::ListView;
use form_types::{IdentityKey, ViewId, ViewKind};
use std::collections::HashMap;

/// A view held by the registry
#[derive(Debug)]
pub enum OpenView {
    Element(ElementView),
    List(ListView),
}

impl OpenView {
    pub fn id(&self) -> ViewId {
        match self {
            OpenView::Element(view) => view.id(),
            OpenView::List(view) => view.id(),
        }
    }

    pub fn kind(&self) -> ViewKind {
        match self {
            OpenView::Element(_) => ViewKind::Element,
            OpenView::List(_) => ViewKind::List,
        }
    }

    pub fn key(&self) -> &IdentityKey {
        match self {
            OpenView::Element(view) => view.key(),
            OpenView::List(view) => view.key(),
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            OpenView::Element(view) => view.caption(),
            OpenView::List(view) => view.caption(),
        }
    }

    pub fn commands(&self) -> &CommandBar {
        match self {
            OpenView::Element(view) => view.commands(),
            OpenView::List(view) => view.commands(),
        }
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            id: self.id(),
            kind: self.kind(),
        }
    }

    pub fn as_element(&self) -> Option<&ElementView> {
        match self {
            OpenView::Element(view) => Some(view),
            OpenView::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListView> {
        match self {
            OpenView::List(view) => Some(view),
            OpenView::Element(_) => None,
        }
    }

    fn set_key(&mut self, key: IdentityKey) {
        match self {
            OpenView::Element(view) => view.key = key,
            OpenView::List(view) => view.key = key,
        }
    }
}

/// Session-scoped map of open views
#[derive(Debug, Default)]
pub struct OpenViewRegistry {
    views: HashMap<IdentityKey, OpenView>,
    /// Keys in open order, oldest first
    order: Vec<IdentityKey>,
    focused: Option<IdentityKey>,
}

impl OpenViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a view under its own key and focuses it
    ///
    /// Returns the view previously stored under that key, if any.
    pub fn insert(&mut self, view: OpenView) -> Option<OpenView> {
        let key = view.key().clone();
        let previous = self.views.insert(key.clone(), view);
        self.order.retain(|k| k != &key);
        self.order.push(key.clone());
        self.focused = Some(key);
        previous
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&OpenView> {
        self.views.get(key)
    }

    pub fn get_mut(&mut self, key: &IdentityKey) -> Option<&mut OpenView> {
        self.views.get_mut(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.views.contains_key(key)
    }

    /// Focuses an open view; returns false if the key is unknown
    pub fn focus(&mut self, key: &IdentityKey) -> bool {
        if self.views.contains_key(key) {
            self.focused = Some(key.clone());
            true
        } else {
            false
        }
    }

    pub fn focused(&self) -> Option<&IdentityKey> {
        self.focused.as_ref()
    }

    /// Moves a view to a new key, keeping its place in open order and focus
    ///
    /// Returns false if `old` is unknown. An existing view under `new` is
    /// replaced.
    pub fn rekey(&mut self, old: &IdentityKey, new: IdentityKey) -> bool {
        let Some(mut view) = self.views.remove(old) else {
            return false;
        };
        if old == &new {
            self.views.insert(new, view);
            return true;
        }
        if self.views.remove(&new).is_some() {
            self.order.retain(|k| k != &new);
        }
        view.set_key(new.clone());
        self.views.insert(new.clone(), view);
        for key in self.order.iter_mut().filter(|k| **k == *old) {
            *key = new.clone();
        }
        if self.focused.as_ref() == Some(old) || self.focused.as_ref() == Some(&new) {
            self.focused = Some(new);
        }
        true
    }

    /// Removes a view; focus falls back to the most recently opened remaining view
    pub fn remove(&mut self, key: &IdentityKey) -> Option<OpenView> {
        let view = self.views.remove(key)?;
        self.order.retain(|k| k != key);
        if self.focused.as_ref() == Some(key) {
            self.focused = self.order.last().cloned();
        }
        Some(view)
    }

    /// Finds the key of a view by id
    pub fn key_of(&self, id: ViewId) -> Option<&IdentityKey> {
        self.views
            .iter()
            .find(|(_, view)| view.id() == id)
            .map(|(key, _)| key)
    }

    /// Keys in open order, oldest first
    pub fn keys(&self) -> &[IdentityKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
