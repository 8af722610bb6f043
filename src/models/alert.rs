//! Alert model and lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{AlertPriority, AlertType, EntityType};

/// Notification record about an actionable condition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Alert {
    pub id: Uuid,
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub entity_type: Option<EntityType>,
    /// Equipment or bean that raised the alert (lookup only)
    pub entity_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub priority: AlertPriority,
    pub is_read: bool,
    pub is_dismissed: bool,
    pub triggered_at: DateTime<Utc>,
}

impl Alert {
    pub fn state(&self) -> AlertState {
        AlertState::from_flags(self.is_read, self.is_dismissed)
    }
}

/// Lifecycle of an alert. `Dismissed` is terminal; the read flag survives
/// dismissal so a dismissed-but-unread alert stays representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Active { read: bool },
    Dismissed { read: bool },
}

impl AlertState {
    pub fn from_flags(is_read: bool, is_dismissed: bool) -> Self {
        if is_dismissed {
            AlertState::Dismissed { read: is_read }
        } else {
            AlertState::Active { read: is_read }
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, AlertState::Active { .. })
    }

    pub fn dismiss(self) -> Self {
        match self {
            AlertState::Active { read } | AlertState::Dismissed { read } => {
                AlertState::Dismissed { read }
            }
        }
    }

    pub fn mark_read(self) -> Self {
        match self {
            AlertState::Active { .. } => AlertState::Active { read: true },
            AlertState::Dismissed { .. } => AlertState::Dismissed { read: true },
        }
    }
}

/// Forward-only change to an alert's flags. Each action only ever sets a
/// flag, so concurrent actions commute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Dismiss,
    MarkRead,
}

impl AlertAction {
    pub fn apply(self, state: AlertState) -> AlertState {
        match self {
            AlertAction::Dismiss => state.dismiss(),
            AlertAction::MarkRead => state.mark_read(),
        }
    }
}

/// Alert about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub account_id: Uuid,
    pub alert_type: AlertType,
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub priority: AlertPriority,
    pub triggered_at: DateTime<Utc>,
}

/// User-created alert request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAlert {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Message is too long"))]
    pub message: Option<String>,
    pub priority: Option<AlertPriority>,
    /// Bean to reorder; turns the alert into a reorder reminder
    pub bean_id: Option<Uuid>,
}

/// Alert list filter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AlertQuery {
    /// Include dismissed alerts (default false)
    pub include_dismissed: Option<bool>,
    /// Only unread alerts (default false)
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dismiss_is_terminal_and_idempotent() {
        let unread = AlertState::Active { read: false };
        let dismissed = unread.dismiss();
        assert_eq!(dismissed, AlertState::Dismissed { read: false });
        assert_eq!(dismissed.dismiss(), dismissed);
        assert_eq!(dismissed.mark_read(), AlertState::Dismissed { read: true });
        assert!(!dismissed.mark_read().is_active());
    }

    #[test]
    fn test_read_then_dismiss() {
        let state = AlertState::from_flags(false, false).mark_read();
        assert_eq!(state, AlertState::Active { read: true });
        assert_eq!(state.mark_read(), state);
        assert_eq!(state.dismiss(), AlertState::from_flags(true, true));
    }

    #[test]
    fn test_actions_commute() {
        let start = AlertState::Active { read: false };
        let read_first = AlertAction::Dismiss.apply(AlertAction::MarkRead.apply(start));
        let dismiss_first = AlertAction::MarkRead.apply(AlertAction::Dismiss.apply(start));
        assert_eq!(read_first, dismiss_first);
        assert_eq!(read_first, AlertState::Dismissed { read: true });
    }
}
