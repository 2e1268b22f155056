//! Turn-complete notifications forwarded to an external process.

use std::path::PathBuf;
use std::sync::Arc;

use tracker_notify_core::NotificationPayload;

use crate::host::{HostApi, HostError};
use crate::process::{ProcessInvoker, SPAWN_FAILED};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("message query failed: {0}")]
    Host(#[from] HostError),

    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("notify process could not start: {0}")]
    Spawn(String),

    #[error("notify process exited with {exit_code}: {stderr}")]
    NonZeroExit { exit_code: i32, stderr: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No assistant text to report.
    Skipped,
}

pub struct Notifier<H, P> {
    host: Arc<H>,
    invoker: Arc<P>,
    notify_bin: PathBuf,
    notify_script: Option<PathBuf>,
}

impl<H: HostApi, P: ProcessInvoker> Notifier<H, P> {
    pub fn new(
        host: Arc<H>,
        invoker: Arc<P>,
        notify_bin: impl Into<PathBuf>,
        notify_script: Option<PathBuf>,
    ) -> Self {
        Self {
            host,
            invoker,
            notify_bin: notify_bin.into(),
            notify_script,
        }
    }

    /// Argument list for one payload: the optional script, then the JSON.
    fn args(&self, payload_json: String) -> Vec<String> {
        let mut args = Vec::with_capacity(2);
        if let Some(ref script) = self.notify_script {
            args.push(script.to_string_lossy().into_owned());
        }
        args.push(payload_json);
        args
    }

    /// Build the payload for `session_id` and hand it to the notify process.
    pub async fn notify(&self, session_id: &str) -> Result<NotifyOutcome, NotifyError> {
        let messages = self.host.session_messages(session_id).await?;
        let Some(payload) = NotificationPayload::from_messages(&messages) else {
            tracing::debug!(session_id, "notification skipped: no assistant text");
            return Ok(NotifyOutcome::Skipped);
        };

        let json = serde_json::to_string(&payload)?;
        let outcome = self.invoker.run(&self.notify_bin, &self.args(json)).await;
        match outcome.exit_code {
            0 => {
                tracing::debug!(
                    session_id,
                    inputs = payload.input_messages.len(),
                    "notification sent"
                );
                Ok(NotifyOutcome::Sent)
            }
            SPAWN_FAILED => Err(NotifyError::Spawn(outcome.stderr)),
            exit_code => Err(NotifyError::NonZeroExit {
                exit_code,
                stderr: outcome.stderr.trim().to_string(),
            }),
        }
    }
}
