//! Turn-complete notification payload.

use serde::{Deserialize, Serialize};

use crate::message::{HostMessage, latest_with_role, recent_user_inputs};
use crate::types::Role;

pub const NOTIFICATION_KIND: &str = "agent-turn-complete";

/// Number of recent user prompts included in a notification.
pub const MAX_INPUT_MESSAGES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "last-assistant-message")]
    pub last_assistant_message: String,
    pub input_messages: Vec<String>,
}

impl NotificationPayload {
    /// Build a payload from a session listing.
    ///
    /// Returns `None` when there is no assistant message or its text is
    /// empty: a turn without assistant text is not worth a notification.
    pub fn from_messages(messages: &[HostMessage]) -> Option<Self> {
        let assistant = latest_with_role(messages, Role::Assistant)?;
        let text = assistant.summary();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            kind: NOTIFICATION_KIND.to_string(),
            last_assistant_message: text,
            input_messages: recent_user_inputs(messages, MAX_INPUT_MESSAGES),
        })
    }
}
