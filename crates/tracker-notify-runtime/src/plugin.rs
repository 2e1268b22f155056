//! Event handler driving the task state machine.
//!
//! Owns the task state, the text capture buffer and the resolved pane
//! context. Events are handled one at a time through `&mut self`, so
//! transitions never interleave. Reconciliation runs to completion before
//! the first event. Notifications run as background tasks in a `JoinSet`,
//! reaped on every event and drained on shutdown.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracker_notify_core::{
    HostEvent, PaneContext, Role, Signal, StatusKind, TaskState, TextCapture, Transition,
};

use crate::config::RetryPolicy;
use crate::fetch::fetch_latest_text;
use crate::host::HostApi;
use crate::notifier::Notifier;
use crate::process::ProcessInvoker;
use crate::tracker::{DONE_SUMMARY, TrackerClient};

/// Start summary when neither a captured nor a fetched user message exists.
pub const WORKING_SUMMARY: &str = "working...";

pub struct Plugin<H, P> {
    context: PaneContext,
    task: TaskState,
    capture: TextCapture,
    tracker: TrackerClient<P>,
    host: Arc<H>,
    notifier: Arc<Notifier<H, P>>,
    retry: RetryPolicy,
    background: JoinSet<()>,
}

impl<H: HostApi, P: ProcessInvoker> Plugin<H, P> {
    pub fn new(
        context: PaneContext,
        tracker: TrackerClient<P>,
        host: Arc<H>,
        notifier: Arc<Notifier<H, P>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            context,
            task: TaskState::default(),
            capture: TextCapture::new(),
            tracker,
            host,
            notifier,
            retry,
            background: JoinSet::new(),
        }
    }

    /// Log the load and finish any task left over from a previous run.
    /// Must complete before the first event is handled, otherwise the
    /// stale finish can close a task started by that event.
    pub async fn start(&mut self) {
        tracing::info!(
            pane = %self.context,
            degraded = self.context.is_degraded(),
            tracker = %self.tracker.bin().display(),
            "plugin loaded"
        );
        self.tracker.finish_stale(&self.context).await;
    }

    pub async fn handle(&mut self, event: HostEvent) {
        self.reap();
        let Some(signal) = event.signal() else {
            tracing::trace!(kind = event.kind(), "event without signal");
            return;
        };
        match signal {
            Signal::RoleTagged { message_id, role } => {
                self.capture.record_role(message_id, role);
                tracing::trace!(%role, indexed = self.capture.indexed_roles(), "role recorded");
            }
            Signal::TextCaptured { message_id, text } => {
                if self
                    .capture
                    .capture_text(&message_id, &text, self.task.is_active())
                {
                    tracing::debug!(%message_id, "user text captured");
                }
            }
            Signal::Status { session_id, status } => {
                self.on_status(&session_id, &status).await;
            }
        }
    }

    async fn on_status(&mut self, session_id: &str, status: &StatusKind) {
        tracing::debug!(session_id, %status, active = self.task.is_active(), "session status");
        match self.task.evaluate(session_id, status) {
            Transition::Start { session_id } => self.start_task(session_id).await,
            Transition::Finish { session_id } => self.finish_task(session_id).await,
            Transition::Ignore(reason) => {
                tracing::debug!(session_id, %reason, "status ignored");
            }
        }
    }

    async fn start_task(&mut self, session_id: String) {
        let summary = match self.capture.take_last_user_message() {
            Some(text) => text,
            None => {
                let fetched =
                    fetch_latest_text(&*self.host, &session_id, Role::User, self.retry).await;
                if fetched.is_empty() {
                    WORKING_SUMMARY.to_string()
                } else {
                    fetched
                }
            }
        };

        if !self.tracker.is_ready() {
            tracing::info!(%session_id, "start skipped: tracker not ready");
            return;
        }
        tracing::info!(%session_id, %summary, "task start");
        self.task.begin(session_id);
        self.tracker.start_task(&self.context, &summary).await;
    }

    async fn finish_task(&mut self, session_id: String) {
        let fetched = fetch_latest_text(&*self.host, &session_id, Role::Assistant, self.retry).await;
        let summary = if fetched.is_empty() {
            DONE_SUMMARY.to_string()
        } else {
            fetched
        };

        if !self.tracker.is_ready() {
            tracing::info!(%session_id, "finish skipped: tracker not ready, task stays active");
            return;
        }
        tracing::info!(%session_id, %summary, "task finish");
        self.task.end();
        self.tracker.finish_task(&self.context, &summary).await;

        let notifier = Arc::clone(&self.notifier);
        self.background.spawn(async move {
            match notifier.notify(&session_id).await {
                Ok(outcome) => tracing::debug!(%session_id, ?outcome, "notification done"),
                Err(e) => tracing::debug!(%session_id, error = %e, "notification discarded"),
            }
        });
    }

    fn reap(&mut self) {
        while let Some(result) = self.background.try_join_next() {
            if let Err(e) = result {
                tracing::warn!(error = %e, "background task failed");
            }
        }
    }

    /// Wait for every background task spawned so far.
    pub async fn settle(&mut self) {
        while let Some(result) = self.background.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "background task failed");
            }
        }
    }

    pub async fn shutdown(mut self) {
        let pending = self.background.len();
        if pending > 0 {
            tracing::debug!(pending, "waiting for background tasks");
        }
        self.settle().await;
        tracing::info!(active = self.task.is_active(), "plugin stopped");
    }
}

#[cfg(test)]
impl<H, P> Plugin<H, P> {
    pub fn task(&self) -> &TaskState {
        &self.task
    }

    pub fn capture(&self) -> &TextCapture {
        &self.capture
    }
}
