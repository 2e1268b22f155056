//! Bounded-retry lookup of the latest message text for a role.
//!
//! Status events can arrive before the message listing reflects the turn
//! they belong to, so an empty answer is retried a few times.

use tracker_notify_core::Role;
use tracker_notify_core::message::latest_with_role;

use crate::config::RetryPolicy;
use crate::host::HostApi;

/// Summary of the newest `role` message in `session_id`, or `""` when
/// every attempt came back empty. Query errors count as empty attempts.
pub async fn fetch_latest_text(
    host: &impl HostApi,
    session_id: &str,
    role: Role,
    retry: RetryPolicy,
) -> String {
    let attempts = retry.attempts.max(1);
    for attempt in 1..=attempts {
        match host.session_messages(session_id).await {
            Ok(messages) => {
                let text = latest_with_role(&messages, role)
                    .map(|m| m.summary())
                    .unwrap_or_default();
                if !text.is_empty() {
                    tracing::debug!(session_id, %role, attempt, "latest text found");
                    return text;
                }
            }
            Err(e) => {
                tracing::debug!(session_id, %role, attempt, error = %e, "message query failed");
            }
        }
        if attempt < attempts {
            tokio::time::sleep(retry.delay).await;
        }
    }
    tracing::debug!(session_id, %role, attempts, "no latest text");
    String::new()
}
