//! Host query API seen from the bridge.

use std::future::Future;

use tracker_notify_core::HostMessage;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("host disconnected")]
    Disconnected,

    #[error("host error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed host response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("host IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Queries the host answers for the bridge. A trait so the state machine
/// and notifier run against a scripted host in tests.
pub trait HostApi: Send + Sync + 'static {
    /// All messages of a session, oldest first.
    fn session_messages(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<HostMessage>, HostError>> + Send;
}
