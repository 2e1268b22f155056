//! `tracker-notify reconcile`: finish a stale task for the pane and exit.

use std::sync::Arc;

use crate::bridge::resolve_context;
use crate::config::Config;
use crate::process::{RunOutcome, TokioInvoker};
use crate::tracker::TrackerClient;

pub(crate) fn describe_outcome(outcome: &RunOutcome) -> String {
    let stderr = outcome.stderr.trim();
    if stderr.is_empty() {
        format!("finish_task stale: exit {}", outcome.exit_code)
    } else {
        format!("finish_task stale: exit {} ({stderr})", outcome.exit_code)
    }
}

/// Returns the process exit code: 1 without a pane or when the tracker
/// reports failure, 0 otherwise (including when it is not installed).
pub async fn cmd_reconcile(config: &Config) -> anyhow::Result<i32> {
    let Some(ref pane) = config.pane else {
        eprintln!("no tmux pane: set TMUX_PANE or pass --pane");
        return Ok(1);
    };
    let context = resolve_context(config, pane).await;
    let tracker = TrackerClient::new(config.tracker_bin.clone(), Arc::new(TokioInvoker));

    match tracker.finish_stale(&context).await {
        None => {
            println!("tracker not ready: {}", tracker.bin().display());
            Ok(0)
        }
        Some(outcome) => {
            println!("{}", describe_outcome(&outcome));
            Ok(if outcome.success() { 0 } else { 1 })
        }
    }
}
