use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Pane context ─────────────────────────────────────────────────

/// tmux identifiers for the pane the host runs in.
///
/// `session_id` and `window_id` are only known when the tmux query
/// succeeded; the degraded form carries the raw pane id alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<String>,
    pub pane_id: String,
}

impl PaneContext {
    /// Fully resolved context.
    pub fn resolved(
        session_id: impl Into<String>,
        window_id: impl Into<String>,
        pane_id: impl Into<String>,
    ) -> Self {
        Self {
            session_id: Some(session_id.into()),
            window_id: Some(window_id.into()),
            pane_id: pane_id.into(),
        }
    }

    /// Fallback context carrying only the raw pane identifier.
    pub fn pane_only(pane_id: impl Into<String>) -> Self {
        Self {
            session_id: None,
            window_id: None,
            pane_id: pane_id.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.session_id.is_none() || self.window_id.is_none()
    }
}

impl fmt::Display for PaneContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.session_id.as_deref().unwrap_or("-"),
            self.window_id.as_deref().unwrap_or("-"),
            self.pane_id
        )
    }
}

// ─── Role ─────────────────────────────────────────────────────────

/// Author of a host message.
///
/// `Unknown` means no `message.updated` event has tagged the message yet.
/// `Other` is a tagged role that is neither user nor assistant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    Other,
    #[default]
    Unknown,
}

impl Role {
    /// Parse a host role string. Empty strings are treated as untagged.
    pub fn parse(s: &str) -> Self {
        match s {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "" => Self::Unknown,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse() {
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("assistant"), Role::Assistant);
        assert_eq!(Role::parse("system"), Role::Other);
        assert_eq!(Role::parse(""), Role::Unknown);
    }

    #[test]
    fn pane_context_serializes_camel_case_without_missing_fields() {
        let full = PaneContext::resolved("$1", "@2", "%3");
        let json = serde_json::to_value(&full).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"sessionId": "$1", "windowId": "@2", "paneId": "%3"})
        );

        let degraded = PaneContext::pane_only("%3");
        let json = serde_json::to_value(&degraded).expect("serialize");
        assert_eq!(json, serde_json::json!({"paneId": "%3"}));
        assert!(degraded.is_degraded());
        assert!(!full.is_degraded());
    }

    #[test]
    fn pane_context_display() {
        assert_eq!(PaneContext::resolved("$1", "@2", "%3").to_string(), "$1:@2:%3");
        assert_eq!(PaneContext::pane_only("%9").to_string(), "-:-:%9");
    }
}
