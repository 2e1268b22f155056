//! Messages returned by the host's session message listing.

use serde::{Deserialize, Serialize};

use crate::summary::summarize;
use crate::types::Role;

/// One message in a session listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    #[serde(default)]
    pub info: MessageInfo,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A content part. Only `"text"` parts contribute to summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            ignored: None,
        }
    }

    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = Some(true);
        self
    }

    pub fn is_summarizable(&self) -> bool {
        self.kind == "text" && !self.ignored.unwrap_or(false)
    }
}

impl HostMessage {
    pub fn new(role: &str, parts: Vec<MessagePart>) -> Self {
        Self {
            info: MessageInfo {
                id: None,
                role: Some(role.to_string()),
            },
            parts,
        }
    }

    pub fn role(&self) -> Role {
        self.info.role.as_deref().map_or(Role::Unknown, Role::parse)
    }

    pub fn summary(&self) -> String {
        summarize(&self.parts)
    }
}

/// Most recent message with the given role.
pub fn latest_with_role(messages: &[HostMessage], role: Role) -> Option<&HostMessage> {
    messages.iter().rev().find(|m| m.role() == role)
}

/// Summaries of the last `limit` user messages, oldest first.
/// Messages whose summary is empty are dropped after the window is taken.
pub fn recent_user_inputs(messages: &[HostMessage], limit: usize) -> Vec<String> {
    let users: Vec<&HostMessage> = messages.iter().filter(|m| m.role() == Role::User).collect();
    let start = users.len().saturating_sub(limit);
    users[start..]
        .iter()
        .map(|m| m.summary())
        .filter(|s| !s.is_empty())
        .collect()
}
