//! Host notification and permission capabilities
//!
//! The engine depends on two narrow traits rather than any concrete host
//! API: [`Notifier`] for surfacing report/backup alerts and
//! [`PermissionsQuery`] for checking whether a host capability may be
//! used. Log-backed and in-memory implementations cover production and
//! test use respectively.

use tracing::info;

use crate::error::FinReportResult;

/// A notification to surface to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Dedup/replace key for hosts that support it
    pub tag: String,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tag: tag.into(),
        }
    }
}

/// Notification sink capability
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> FinReportResult<()>;
}

/// Permissions the engine may need to ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Notifications,
    PeriodicWake,
}

/// Outcome of a permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The host has no such capability at all
    Unsupported,
}

/// Host permission query capability
pub trait PermissionsQuery: Send + Sync {
    fn query(&self, permission: Permission) -> PermissionState;
}

/// Notifier that writes to the log; the default for headless hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) -> FinReportResult<()> {
        info!(
            title = %notification.title,
            tag = %notification.tag,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Notifier that records everything, for assertions in tests
#[derive(Default)]
pub struct MemoryNotifier {
    sent: std::sync::Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) -> FinReportResult<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Fixed-answer permission query
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions {
    pub notifications: PermissionState,
    pub periodic_wake: PermissionState,
}

impl StaticPermissions {
    /// Everything granted
    pub fn all_granted() -> Self {
        Self {
            notifications: PermissionState::Granted,
            periodic_wake: PermissionState::Granted,
        }
    }

    /// No host capabilities at all
    pub fn unsupported() -> Self {
        Self {
            notifications: PermissionState::Unsupported,
            periodic_wake: PermissionState::Unsupported,
        }
    }
}

impl PermissionsQuery for StaticPermissions {
    fn query(&self, permission: Permission) -> PermissionState {
        match permission {
            Permission::Notifications => self.notifications,
            Permission::PeriodicWake => self.periodic_wake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::new();
        notifier
            .notify(Notification::new("Report ready", "Weekly Summary", "report"))
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Report ready");
    }

    #[test]
    fn test_static_permissions() {
        let perms = StaticPermissions::unsupported();
        assert_eq!(
            perms.query(Permission::PeriodicWake),
            PermissionState::Unsupported
        );
    }
}
