//! # Notification Service
//!
//! Toast notifications raised by open views: save results, rejected input,
//! failed commands and closing tabs.
//!
//! Every notification may name the view key it came from. When a view is
//! re-keyed its notifications follow it, and closing a view dismisses the
//! errors it left behind.
//!
//! Timestamps come from a logical clock the host advances.
//!
//! ## Example
//!
//! ```ignore
//! use services_notification::{Notification, NotificationService};
//!
//! let mut service = NotificationService::new();
//! service.notify(Notification::success("Customer:7 saved").with_source("DEF_ELEM_Customer@7"));
//! service.advance_time(Notification::SUCCESS_TTL_NS);
//! assert!(service.active_toasts().is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Maximum number of notifications kept in history
pub const MAX_NOTIFICATION_HISTORY: usize = 100;

/// Unique identifier for a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub level: NotificationLevel,
    pub message: String,
    /// Key of the view that raised it, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Logical time of delivery, set by the service
    pub timestamp_ns: u64,
    pub dismissed: bool,
    /// Time-to-live in nanoseconds; 0 never expires
    pub ttl_ns: u64,
}

impl Notification {
    pub const INFO_TTL_NS: u64 = 5_000_000_000;
    pub const SUCCESS_TTL_NS: u64 = 3_000_000_000;
    pub const WARNING_TTL_NS: u64 = 7_000_000_000;
    /// Errors stay until dismissed
    pub const ERROR_TTL_NS: u64 = 0;

    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        let ttl_ns = match level {
            NotificationLevel::Info => Self::INFO_TTL_NS,
            NotificationLevel::Success => Self::SUCCESS_TTL_NS,
            NotificationLevel::Warning => Self::WARNING_TTL_NS,
            NotificationLevel::Error => Self::ERROR_TTL_NS,
        };
        Self {
            id: NotificationId::new(),
            level,
            message: message.into(),
            source: None,
            timestamp_ns: 0,
            dismissed: false,
            ttl_ns,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Checks if this notification has expired at the given time
    pub fn is_expired(&self, current_time_ns: u64) -> bool {
        if self.ttl_ns == 0 {
            return false;
        }
        current_time_ns >= self.timestamp_ns.saturating_add(self.ttl_ns)
    }
}

/// Notification service
///
/// Keeps a bounded history; expired toasts stay in history but are no longer
/// active.
#[derive(Debug, Default)]
pub struct NotificationService {
    notifications: VecDeque<Notification>,
    current_time_ns: u64,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the logical clock
    pub fn advance_time(&mut self, delta_ns: u64) {
        self.current_time_ns = self.current_time_ns.saturating_add(delta_ns);
    }

    pub fn current_time(&self) -> u64 {
        self.current_time_ns
    }

    /// Delivers a notification, stamped with the current logical time
    pub fn notify(&mut self, mut notification: Notification) -> NotificationId {
        notification.timestamp_ns = self.current_time_ns;
        let id = notification.id;
        self.notifications.push_back(notification);
        while self.notifications.len() > MAX_NOTIFICATION_HISTORY {
            self.notifications.pop_front();
        }
        id
    }

    /// Non-dismissed, non-expired notifications, oldest first
    pub fn active_toasts(&self) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| !n.dismissed && !n.is_expired(self.current_time_ns))
            .collect()
    }

    /// Most recent notifications first, including dismissed ones
    pub fn recent(&self, limit: usize) -> Vec<&Notification> {
        self.notifications.iter().rev().take(limit).collect()
    }

    /// The most recent notification
    pub fn last(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    pub fn by_level(&self, level: NotificationLevel) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.level == level)
            .collect()
    }

    /// Dismisses a notification; returns false if it is unknown
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.dismissed = true;
                true
            }
            None => false,
        }
    }

    /// Notifications raised by one view, oldest first
    pub fn from_source(&self, source: &str) -> Vec<&Notification> {
        self.notifications
            .iter()
            .filter(|n| n.source.as_deref() == Some(source))
            .collect()
    }

    /// Moves notifications of a view to its new key
    pub fn retarget(&mut self, old: &str, new: &str) -> usize {
        let mut moved = 0;
        for notification in self
            .notifications
            .iter_mut()
            .filter(|n| n.source.as_deref() == Some(old))
        {
            notification.source = Some(new.to_string());
            moved += 1;
        }
        moved
    }

    /// Dismisses the pending errors of a view
    pub fn dismiss_errors_from(&mut self, source: &str) -> usize {
        let mut dismissed = 0;
        for notification in self.notifications.iter_mut().filter(|n| {
            n.level == NotificationLevel::Error
                && !n.dismissed
                && n.source.as_deref() == Some(source)
        }) {
            notification.dismissed = true;
            dismissed += 1;
        }
        dismissed
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}
