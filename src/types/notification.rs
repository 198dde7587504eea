use serde::{Deserialize, Serialize};

/// A user notification synthesized from a `notification` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Locally unique id, derived from the wall clock at synthesis time.
    pub id: i64,
    /// Server-side notification type; free-form.
    pub kind: String,
    pub title: String,
    pub message: String,
    /// Always false at synthesis; flipped by the notifications page.
    pub read: bool,
    /// Epoch milliseconds from the originating frame.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Transient user-facing alert emitted once per notification, carrying a
/// deep-link action the UI can navigate on.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub action_label: String,
    pub action_route: String,
}

impl Alert {
    /// Route the alert action deep-links to.
    pub const NOTIFICATIONS_ROUTE: &'static str = "/notifications";

    pub(crate) fn for_notification(title: String, message: String) -> Self {
        Self {
            title,
            message,
            action_label: "View".to_string(),
            action_route: Self::NOTIFICATIONS_ROUTE.to_string(),
        }
    }
}
