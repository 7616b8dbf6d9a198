//! User-facing outcome messages
//!
//! Services return results; hosts turn them into [`Notification`]s and hand them to a
//! [`NotificationSink`](crate::traits::NotificationSink). Presentation stays outside
//! this crate.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Account, Platform, SyncReport};

/// Notification severity
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Structured outcome: kind plus a human-readable message
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Notification for a failed operation.
    ///
    /// Expected errors (duplicates, missing session, ...) are warnings.
    #[must_use]
    pub fn from_error(err: &CoreError) -> Self {
        let kind = if err.is_expected() {
            NotificationKind::Warning
        } else {
            NotificationKind::Error
        };
        Self::new(kind, err.user_message())
    }

    #[must_use]
    pub fn connected(account: &Account) -> Self {
        let message = if account.is_local() {
            format!(
                "{} account @{} saved on this device. Sign in to keep it across devices.",
                account.platform.display_name(),
                account.username
            )
        } else {
            format!(
                "{} account @{} connected.",
                account.platform.display_name(),
                account.username
            )
        };
        Self::new(NotificationKind::Success, message)
    }

    #[must_use]
    pub fn disconnected(platform: Platform) -> Self {
        Self::new(
            NotificationKind::Success,
            format!("{} account disconnected.", platform.display_name()),
        )
    }

    /// Summary of a migration run, `None` when there was nothing to migrate.
    #[must_use]
    pub fn sync_completed(report: &SyncReport) -> Option<Self> {
        if report.is_empty() {
            return None;
        }
        if report.failed_count() > 0 {
            return Some(Self::new(
                NotificationKind::Warning,
                format!(
                    "{} of {} saved accounts could not be synced. They stay on this device; please try again later.",
                    report.failed_count(),
                    report.migrated_count() + report.failed_count()
                ),
            ));
        }
        Some(Self::new(
            NotificationKind::Success,
            format!("{} saved account(s) synced to your profile.", report.migrated_count()),
        ))
    }
}
