//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tracker-notify",
    about = "Forward agent busy/idle status to the task tracker",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub opts: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bridge host events from stdin (JSON-RPC) to the tracker (default)
    Run,
    /// Resolve and print the tmux pane context as JSON
    Context,
    /// Finish any stale task left for this pane, then exit
    Reconcile,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// tmux pane this host runs in; the bridge is inert without it
    #[arg(long, global = true, env = "TMUX_PANE")]
    pub pane: Option<String>,

    /// tracker client executable
    #[arg(long, global = true, env = "TRACKER_NOTIFY_TRACKER_BIN")]
    pub tracker_bin: Option<PathBuf>,

    /// Program that receives the notification payload
    #[arg(long, global = true, env = "TRACKER_NOTIFY_NOTIFY_BIN")]
    pub notify_bin: Option<PathBuf>,

    /// Script passed to the notify program before the payload (empty: none)
    #[arg(long, global = true, env = "TRACKER_NOTIFY_NOTIFY_SCRIPT")]
    pub notify_script: Option<PathBuf>,

    /// Append-only debug log
    #[arg(long, global = true, env = "TRACKER_NOTIFY_DEBUG_LOG")]
    pub debug_log: Option<PathBuf>,

    /// Working directory sent with message queries (default: current dir)
    #[arg(long, global = true, env = "TRACKER_NOTIFY_DIRECTORY")]
    pub directory: Option<String>,

    /// Message queries per summary lookup
    #[arg(long, global = true, env = "TRACKER_NOTIFY_FETCH_ATTEMPTS", default_value_t = 3)]
    pub fetch_attempts: u32,

    /// Delay between message query attempts in milliseconds
    #[arg(long, global = true, env = "TRACKER_NOTIFY_RETRY_DELAY_MS", default_value_t = 100)]
    pub retry_delay_ms: u64,

    /// tmux executable
    #[arg(long, global = true, env = "TRACKER_NOTIFY_TMUX_BIN", default_value = "tmux")]
    pub tmux_bin: String,

    /// tmux server socket (default: tmux finds it through $TMUX)
    #[arg(long, global = true, env = "TRACKER_NOTIFY_TMUX_SOCKET")]
    pub tmux_socket: Option<String>,

    /// Fixed UTC offset in hours for debug log timestamps (default: local time)
    #[arg(long, global = true, env = "TRACKER_NOTIFY_LOG_UTC_OFFSET", allow_hyphen_values = true)]
    pub log_utc_offset: Option<i32>,
}
