//! External process invocation that never fails.
//!
//! Spawn errors are folded into the outcome (`exit_code = -1`, message in
//! `stderr`) so callers treat every run as fire-and-forget.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Exit code used when the process could not be spawned or was killed
/// by a signal.
pub const SPAWN_FAILED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub stderr: String,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn spawn_failed(err: &std::io::Error) -> Self {
        Self {
            exit_code: SPAWN_FAILED,
            stderr: err.to_string(),
        }
    }
}

/// Runs external programs. A trait so tests can record invocations.
pub trait ProcessInvoker: Send + Sync + 'static {
    fn run(&self, program: &Path, args: &[String]) -> impl Future<Output = RunOutcome> + Send;
}

/// Real invoker on `tokio::process`. Stdout is discarded; stderr is read
/// to the end before waiting so a chatty child never blocks on the pipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioInvoker;

impl ProcessInvoker for TokioInvoker {
    async fn run(&self, program: &Path, args: &[String]) -> RunOutcome {
        let mut child = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => return RunOutcome::spawn_failed(&e),
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                tracing::debug!(program = %program.display(), error = %e, "stderr read failed");
            }
            stderr = String::from_utf8_lossy(&buf).into_owned();
        }

        match child.wait().await {
            Ok(status) => RunOutcome {
                exit_code: status.code().unwrap_or(SPAWN_FAILED),
                stderr,
            },
            Err(e) => RunOutcome::spawn_failed(&e),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Invocation {
        pub program: PathBuf,
        pub args: Vec<String>,
    }

    /// Records every call and answers with a fixed outcome.
    #[derive(Debug)]
    pub struct RecordingInvoker {
        calls: Mutex<Vec<Invocation>>,
        outcome: RunOutcome,
    }

    impl RecordingInvoker {
        pub fn new() -> Self {
            Self::with_outcome(RunOutcome {
                exit_code: 0,
                stderr: String::new(),
            })
        }

        pub fn with_outcome(outcome: RunOutcome) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outcome,
            }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl ProcessInvoker for RecordingInvoker {
        async fn run(&self, program: &Path, args: &[String]) -> RunOutcome {
            self.calls.lock().expect("lock").push(Invocation {
                program: program.to_path_buf(),
                args: args.to_vec(),
            });
            self.outcome.clone()
        }
    }
}
