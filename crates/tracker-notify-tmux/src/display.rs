//! The single tmux command this crate issues: `display-message -p`.

use crate::error::ContextError;

/// Expands a tmux format string against a target pane.
///
/// Implemented by [`TmuxCli`] and by scripted runners in tests.
pub trait DisplayMessage: Send + Sync {
    fn display(&self, target: &str, format: &str) -> Result<String, ContextError>;
}

impl<T: DisplayMessage + ?Sized> DisplayMessage for &T {
    fn display(&self, target: &str, format: &str) -> Result<String, ContextError> {
        (**self).display(target, format)
    }
}

/// `tmux display-message` through a blocking subprocess.
///
/// Without a socket, tmux finds the server through `$TMUX`, which is set
/// inside every pane.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    bin: String,
    socket: Option<String>,
}

impl TmuxCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            socket: None,
        }
    }

    #[must_use]
    pub fn with_socket(mut self, path: impl Into<String>) -> Self {
        self.socket = Some(path.into());
        self
    }

    fn argv(&self, target: &str, format: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(7);
        if let Some(ref socket) = self.socket {
            args.extend(["-S".to_string(), socket.clone()]);
        }
        args.extend(
            ["display-message", "-p", "-t", target, format]
                .into_iter()
                .map(str::to_string),
        );
        args
    }
}

impl Default for TmuxCli {
    fn default() -> Self {
        Self::new("tmux")
    }
}

impl DisplayMessage for TmuxCli {
    fn display(&self, target: &str, format: &str) -> Result<String, ContextError> {
        let output = std::process::Command::new(&self.bin)
            .args(self.argv(target, format))
            .output()?;
        if !output.status.success() {
            return Err(ContextError::Rejected {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_targets_pane() {
        let cli = TmuxCli::default();
        assert_eq!(
            cli.argv("%4", "#{pane_id}"),
            vec!["display-message", "-p", "-t", "%4", "#{pane_id}"]
        );
    }

    #[test]
    fn socket_goes_before_subcommand() {
        let cli = TmuxCli::new("/usr/bin/tmux").with_socket("/tmp/t.sock");
        let argv = cli.argv("%4", "#{pane_id}");
        assert_eq!(&argv[..3], ["-S", "/tmp/t.sock", "display-message"]);
    }

    #[test]
    fn missing_binary_fails_to_launch() {
        let cli = TmuxCli::new("/nonexistent/tmux-binary-for-test");
        let err = cli.display("%1", "#{pane_id}").expect_err("launch must fail");
        assert!(matches!(err, ContextError::Launch(_)), "got {err:?}");
    }

    #[test]
    fn reference_forwards_to_runner() {
        struct Echo;
        impl DisplayMessage for Echo {
            fn display(&self, target: &str, _format: &str) -> Result<String, ContextError> {
                Ok(target.to_string())
            }
        }
        let echo = Echo;
        let by_ref: &Echo = &echo;
        assert_eq!(by_ref.display("%9", "").expect("ok"), "%9");
    }
}
