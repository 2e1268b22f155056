//! Role attribution and user-text capture.
//!
//! Part-text events can arrive before the `message.updated` event that tags
//! their message with a role. Untagged text seen while no task is running is
//! taken to be the user's prompt, since the prompt precedes the busy status.

use std::collections::HashMap;

use crate::summary::{MAX_SUMMARY_CHARS, truncate_chars};
use crate::types::Role;

/// Whether text for a message with `role` should be kept as the user's
/// latest prompt.
pub fn should_capture(role: Role, task_active: bool) -> bool {
    match role {
        Role::User => true,
        Role::Unknown => !task_active,
        Role::Assistant | Role::Other => false,
    }
}

/// Message id → role, filled from `message.updated` events.
///
/// Entries are never evicted; the index lives as long as the host session.
#[derive(Debug, Clone, Default)]
pub struct MessageRoleIndex {
    roles: HashMap<String, Role>,
}

impl MessageRoleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message_id: impl Into<String>, role: Role) {
        self.roles.insert(message_id.into(), role);
    }

    /// Role for `message_id`, or [`Role::Unknown`] if it was never tagged.
    pub fn role_of(&self, message_id: &str) -> Role {
        self.roles.get(message_id).copied().unwrap_or(Role::Unknown)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Role index plus the most recent captured user text.
#[derive(Debug, Clone, Default)]
pub struct TextCapture {
    roles: MessageRoleIndex,
    last_user_message: Option<String>,
}

impl TextCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_role(&mut self, message_id: impl Into<String>, role: Role) {
        self.roles.record(message_id, role);
    }

    pub fn role_of(&self, message_id: &str) -> Role {
        self.roles.role_of(message_id)
    }

    /// Offer text for `message_id`. Returns `true` if it replaced the
    /// buffered user message.
    pub fn capture_text(&mut self, message_id: &str, text: &str, task_active: bool) -> bool {
        if !should_capture(self.roles.role_of(message_id), task_active) {
            return false;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.last_user_message = Some(truncate_chars(trimmed, MAX_SUMMARY_CHARS));
        true
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.last_user_message.as_deref()
    }

    /// Consume the buffered user message, leaving the buffer empty.
    pub fn take_last_user_message(&mut self) -> Option<String> {
        self.last_user_message.take()
    }

    pub fn indexed_roles(&self) -> usize {
        self.roles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table() {
        assert!(should_capture(Role::User, false));
        assert!(should_capture(Role::User, true));
        assert!(should_capture(Role::Unknown, false));
        assert!(!should_capture(Role::Unknown, true));
        assert!(!should_capture(Role::Assistant, false));
        assert!(!should_capture(Role::Assistant, true));
        assert!(!should_capture(Role::Other, false));
    }

    #[test]
    fn role_index_upserts() {
        let mut index = MessageRoleIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.role_of("m1"), Role::Unknown);

        index.record("m1", Role::Assistant);
        index.record("m1", Role::Assistant);
        assert_eq!(index.len(), 1);
        assert_eq!(index.role_of("m1"), Role::Assistant);

        index.record("m1", Role::User);
        assert_eq!(index.role_of("m1"), Role::User);
    }

    #[test]
    fn captures_tagged_user_text_even_while_active() {
        let mut capture = TextCapture::new();
        capture.record_role("m1", Role::User);
        assert!(capture.capture_text("m1", "  fix bug \n", true));
        assert_eq!(capture.last_user_message(), Some("fix bug"));
    }

    #[test]
    fn role_index_grows_per_distinct_message() {
        let mut capture = TextCapture::new();
        assert_eq!(capture.indexed_roles(), 0);
        capture.record_role("m1", Role::User);
        capture.record_role("m2", Role::Assistant);
        capture.record_role("m1", Role::Assistant);
        assert_eq!(capture.indexed_roles(), 2);
    }

    #[test]
    fn untagged_text_only_captured_when_idle() {
        let mut capture = TextCapture::new();
        assert!(!capture.capture_text("m1", "streamed reply", true));
        assert_eq!(capture.last_user_message(), None);

        assert!(capture.capture_text("m2", "early prompt", false));
        assert_eq!(capture.last_user_message(), Some("early prompt"));
    }

    #[test]
    fn assistant_text_never_captured() {
        let mut capture = TextCapture::new();
        capture.record_role("m1", Role::Assistant);
        assert!(!capture.capture_text("m1", "answer", false));
        assert_eq!(capture.last_user_message(), None);
    }

    #[test]
    fn later_capture_overwrites_and_take_clears() {
        let mut capture = TextCapture::new();
        capture.capture_text("m1", "first", false);
        capture.capture_text("m2", "second", false);
        assert_eq!(capture.take_last_user_message(), Some("second".to_string()));
        assert_eq!(capture.take_last_user_message(), None);
    }

    #[test]
    fn whitespace_text_does_not_clobber_buffer() {
        let mut capture = TextCapture::new();
        capture.capture_text("m1", "keep me", false);
        assert!(!capture.capture_text("m2", "   ", false));
        assert_eq!(capture.last_user_message(), Some("keep me"));
    }

    #[test]
    fn captured_text_is_capped() {
        let mut capture = TextCapture::new();
        let long = "y".repeat(MAX_SUMMARY_CHARS * 2);
        capture.capture_text("m1", &long, false);
        let stored = capture.last_user_message().expect("captured");
        assert_eq!(stored.chars().count(), MAX_SUMMARY_CHARS);
    }
}
