//! External tracker client: readiness check and start/finish actions.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracker_notify_core::PaneContext;

use crate::process::{ProcessInvoker, RunOutcome};

/// Summary used for a finish with nothing better to say.
pub const DONE_SUMMARY: &str = "done";
/// Summary used when reconciling a task left behind by an earlier instance.
pub const STALE_SUMMARY: &str = "stale";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerAction {
    StartTask,
    FinishTask,
}

impl TrackerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartTask => "start_task",
            Self::FinishTask => "finish_task",
        }
    }
}

impl fmt::Display for TrackerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the tracker argv. Flags precede the subcommand token; absent
/// context fields are omitted.
pub fn tracker_args(ctx: &PaneContext, summary: &str, action: TrackerAction) -> Vec<String> {
    let mut args = vec!["command".to_string()];
    if let Some(ref session) = ctx.session_id {
        args.extend(["-session-id".to_string(), session.clone()]);
    }
    if let Some(ref window) = ctx.window_id {
        args.extend(["-window-id".to_string(), window.clone()]);
    }
    args.extend(["-pane".to_string(), ctx.pane_id.clone()]);
    args.extend(["-summary".to_string(), summary.to_string()]);
    args.push(action.as_str().to_string());
    args
}

/// True when `path` is a regular file with any execute bit set.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Handle to the tracker executable.
pub struct TrackerClient<P> {
    bin: PathBuf,
    invoker: Arc<P>,
}

impl<P: ProcessInvoker> TrackerClient<P> {
    pub fn new(bin: impl Into<PathBuf>, invoker: Arc<P>) -> Self {
        Self {
            bin: bin.into(),
            invoker,
        }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Checked on every call; the binary may appear or vanish at any time.
    pub fn is_ready(&self) -> bool {
        let ready = is_executable(&self.bin);
        if !ready {
            tracing::debug!(bin = %self.bin.display(), "tracker not ready");
        }
        ready
    }

    /// Run `start_task`. An empty summary is refused and returns `None`.
    pub async fn start_task(&self, ctx: &PaneContext, summary: &str) -> Option<RunOutcome> {
        if summary.is_empty() {
            tracing::warn!(pane = %ctx, "start_task refused: empty summary");
            return None;
        }
        Some(self.run_action(ctx, summary, TrackerAction::StartTask).await)
    }

    /// Run `finish_task`, substituting [`DONE_SUMMARY`] for an empty summary.
    pub async fn finish_task(&self, ctx: &PaneContext, summary: &str) -> RunOutcome {
        let summary = if summary.is_empty() {
            DONE_SUMMARY
        } else {
            summary
        };
        self.run_action(ctx, summary, TrackerAction::FinishTask).await
    }

    /// Finish whatever task an earlier instance left open for this pane.
    /// Returns `None` when the tracker is not ready.
    pub async fn finish_stale(&self, ctx: &PaneContext) -> Option<RunOutcome> {
        if !self.is_ready() {
            tracing::info!(pane = %ctx, "stale reconciliation skipped: tracker not ready");
            return None;
        }
        Some(self.finish_task(ctx, STALE_SUMMARY).await)
    }

    async fn run_action(&self, ctx: &PaneContext, summary: &str, action: TrackerAction) -> RunOutcome {
        let args = tracker_args(ctx, summary, action);
        tracing::debug!(bin = %self.bin.display(), argv = ?args, "tracker invoke");
        let outcome = self.invoker.run(&self.bin, &args).await;
        if outcome.success() {
            tracing::info!(%action, pane = %ctx, "tracker action ok");
        } else {
            tracing::warn!(
                %action,
                pane = %ctx,
                exit_code = outcome.exit_code,
                stderr = %outcome.stderr.trim(),
                "tracker action failed"
            );
        }
        outcome
    }
}
