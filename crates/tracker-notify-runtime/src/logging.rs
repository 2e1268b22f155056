//! Debug log setup: synchronous appends to the debug log file plus
//! warnings on stderr. Stdout is reserved for the host protocol.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use chrono::{FixedOffset, Local, SecondsFormat, Utc};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// RFC 3339 timestamps with milliseconds, in local time or a fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct LogTimer {
    offset: Option<FixedOffset>,
}

impl LogTimer {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }

    pub fn timestamp(&self) -> String {
        match self.offset {
            Some(offset) => Utc::now()
                .with_timezone(&offset)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
            None => Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }
}

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", self.timestamp())
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn file_filter() -> EnvFilter {
    let directive = std::env::var("TRACKER_NOTIFY_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "debug".to_string());
    EnvFilter::new(directive)
}

/// Install the global subscriber. Falls back to stderr only when the
/// debug log cannot be opened.
pub fn init(debug_log: &Path, offset: Option<FixedOffset>) {
    let timer = LogTimer::new(offset);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer)
        .with_filter(LevelFilter::WARN);

    match open_log_file(debug_log) {
        Ok(file) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_timer(timer)
                .with_filter(file_filter());
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .init();
        }
        Err(e) => {
            tracing_subscriber::registry().with(stderr_layer).init();
            tracing::warn!(path = %debug_log.display(), error = %e, "debug log unavailable");
        }
    }
}
