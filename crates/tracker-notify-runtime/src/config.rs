//! Resolved runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;

use crate::cli::GlobalOpts;

/// Fallback when `$HOME` is unset.
const FALLBACK_HOME: &str = "/tmp";

/// Everything the bridge needs, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Raw tmux pane id; `None` makes the bridge inert.
    pub pane: Option<String>,
    pub tracker_bin: PathBuf,
    pub notify_bin: PathBuf,
    pub notify_script: Option<PathBuf>,
    pub debug_log: PathBuf,
    pub directory: String,
    pub retry: RetryPolicy,
    pub tmux_bin: String,
    pub tmux_socket: Option<String>,
    pub log_utc_offset: Option<FixedOffset>,
}

/// Bounded retry for message lookups that may lag behind status events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Build from CLI/env options using the process environment for
    /// `$HOME` and the working directory.
    pub fn from_env(opts: &GlobalOpts) -> Self {
        let home = std::env::var("HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| FALLBACK_HOME.to_string());
        let cwd = std::env::current_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_opts(opts, Path::new(&home), &cwd)
    }

    pub fn from_opts(opts: &GlobalOpts, home: &Path, cwd: &str) -> Self {
        let config_dir = home.join(".config");
        let notify_script = match &opts.notify_script {
            Some(p) if p.as_os_str().is_empty() => None,
            Some(p) => Some(p.clone()),
            None => Some(config_dir.join("agent-tracker/notify.py")),
        };

        Self {
            pane: opts.pane.clone().filter(|p| !p.is_empty()),
            tracker_bin: opts
                .tracker_bin
                .clone()
                .unwrap_or_else(|| config_dir.join("agent-tracker/bin/tracker-client")),
            notify_bin: opts
                .notify_bin
                .clone()
                .unwrap_or_else(|| PathBuf::from("python3")),
            notify_script,
            debug_log: opts
                .debug_log
                .clone()
                .unwrap_or_else(|| config_dir.join("opencode/tracker-debug.log")),
            directory: opts.directory.clone().unwrap_or_else(|| cwd.to_string()),
            retry: RetryPolicy {
                attempts: opts.fetch_attempts.max(1),
                delay: Duration::from_millis(opts.retry_delay_ms),
            },
            tmux_bin: opts.tmux_bin.clone(),
            tmux_socket: opts.tmux_socket.clone(),
            log_utc_offset: opts
                .log_utc_offset
                .and_then(|hours| FixedOffset::east_opt(hours.checked_mul(3600)?)),
        }
    }
}
