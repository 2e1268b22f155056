//! Host lifecycle events and their reduction to [`Signal`]s.
//!
//! Events are decoded leniently: every nested field is optional so that a
//! structurally valid event with missing data decodes fine and simply yields
//! no signal. Only events whose fields have the wrong JSON type fail to decode.

use serde::Deserialize;

use crate::task::StatusKind;
use crate::types::Role;

/// A host event, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    #[serde(rename = "message.updated")]
    MessageUpdated {
        #[serde(default)]
        properties: MessageUpdatedProps,
    },
    #[serde(rename = "message.part.updated")]
    MessagePartUpdated {
        #[serde(default)]
        properties: PartUpdatedProps,
    },
    #[serde(rename = "session.status")]
    SessionStatus {
        #[serde(default)]
        properties: SessionStatusProps,
    },
    /// Any other event type; never acted upon.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageUpdatedProps {
    #[serde(default)]
    pub info: Option<UpdatedInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdatedInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartUpdatedProps {
    #[serde(default)]
    pub part: Option<UpdatedPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdatedPart {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "messageID", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub ignored: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionStatusProps {
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<StatusBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusBody {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// What an event means for the bridge, with all required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A message was tagged with its author.
    RoleTagged { message_id: String, role: Role },
    /// Text arrived for a message whose author may not be known yet.
    TextCaptured { message_id: String, text: String },
    /// The session's busy/idle status changed.
    Status {
        session_id: String,
        status: StatusKind,
    },
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl HostEvent {
    /// Decode a raw event value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Reduce the event to a signal, or `None` when it is irrelevant or
    /// missing a required field.
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Self::MessageUpdated { properties } => {
                let info = properties.info.as_ref()?;
                let message_id = non_empty(info.id.as_ref())?;
                let role = non_empty(info.role.as_ref())?;
                Some(Signal::RoleTagged {
                    message_id: message_id.to_string(),
                    role: Role::parse(role),
                })
            }
            Self::MessagePartUpdated { properties } => {
                let part = properties.part.as_ref()?;
                if part.kind.as_deref() != Some("text") {
                    return None;
                }
                let text = non_empty(part.text.as_ref())?;
                let message_id = non_empty(part.message_id.as_ref())?;
                Some(Signal::TextCaptured {
                    message_id: message_id.to_string(),
                    text: text.to_string(),
                })
            }
            Self::SessionStatus { properties } => {
                let session_id = non_empty(properties.session_id.as_ref())?;
                let status = properties.status.as_ref()?;
                Some(Signal::Status {
                    session_id: session_id.to_string(),
                    status: StatusKind::parse(status.kind.as_deref().unwrap_or("")),
                })
            }
            Self::Other => None,
        }
    }

    /// Event type name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageUpdated { .. } => "message.updated",
            Self::MessagePartUpdated { .. } => "message.part.updated",
            Self::SessionStatus { .. } => "session.status",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> HostEvent {
        HostEvent::from_value(value).expect("decodes")
    }

    #[test]
    fn message_updated_yields_role() {
        let ev = decode(json!({
            "type": "message.updated",
            "properties": {"info": {"id": "msg_1", "role": "user", "time": {"created": 1}}}
        }));
        assert_eq!(
            ev.signal(),
            Some(Signal::RoleTagged {
                message_id: "msg_1".to_string(),
                role: Role::User,
            })
        );
    }

    #[test]
    fn message_updated_without_role_is_ignored() {
        let ev = decode(json!({"type": "message.updated", "properties": {"info": {"id": "m"}}}));
        assert_eq!(ev.signal(), None);
        let ev = decode(json!({"type": "message.updated"}));
        assert_eq!(ev.signal(), None);
    }

    #[test]
    fn text_part_yields_capture() {
        let ev = decode(json!({
            "type": "message.part.updated",
            "properties": {"part": {"type": "text", "text": "fix bug", "messageID": "m2"}}
        }));
        assert_eq!(
            ev.signal(),
            Some(Signal::TextCaptured {
                message_id: "m2".to_string(),
                text: "fix bug".to_string(),
            })
        );
    }

    #[test]
    fn non_text_or_incomplete_parts_are_ignored() {
        let cases = [
            json!({"type": "message.part.updated", "properties": {"part": {"type": "tool", "text": "x", "messageID": "m"}}}),
            json!({"type": "message.part.updated", "properties": {"part": {"type": "text", "text": "", "messageID": "m"}}}),
            json!({"type": "message.part.updated", "properties": {"part": {"type": "text", "text": "x"}}}),
            json!({"type": "message.part.updated", "properties": {}}),
        ];
        for case in cases {
            assert_eq!(decode(case.clone()).signal(), None, "case: {case}");
        }
    }

    #[test]
    fn session_status_yields_status() {
        let ev = decode(json!({
            "type": "session.status",
            "properties": {"sessionID": "ses_1", "status": {"type": "busy"}}
        }));
        assert_eq!(
            ev.signal(),
            Some(Signal::Status {
                session_id: "ses_1".to_string(),
                status: StatusKind::Busy,
            })
        );
    }

    #[test]
    fn session_status_requires_session_and_status() {
        let ev = decode(json!({"type": "session.status", "properties": {"status": {"type": "idle"}}}));
        assert_eq!(ev.signal(), None);
        let ev = decode(json!({"type": "session.status", "properties": {"sessionID": "s"}}));
        assert_eq!(ev.signal(), None);
    }

    #[test]
    fn retry_status_maps_to_other() {
        let ev = decode(json!({
            "type": "session.status",
            "properties": {"sessionID": "s", "status": {"type": "retry", "attempt": 2}}
        }));
        assert_eq!(
            ev.signal(),
            Some(Signal::Status {
                session_id: "s".to_string(),
                status: StatusKind::Other("retry".to_string()),
            })
        );
    }

    #[test]
    fn unknown_event_type_decodes_as_other() {
        let ev = decode(json!({"type": "file.edited", "properties": {"file": "a.rs"}}));
        assert_eq!(ev, HostEvent::Other);
        assert_eq!(ev.signal(), None);
    }

    #[test]
    fn wrong_field_types_fail_to_decode() {
        let raw = json!({"type": "session.status", "properties": {"sessionID": 42}});
        assert!(HostEvent::from_value(raw).is_err());
        assert!(HostEvent::from_value(json!({"no_type": true})).is_err());
    }
}
