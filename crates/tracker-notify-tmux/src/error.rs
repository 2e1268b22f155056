//! Why a pane context query produced no context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("could not launch tmux: {0}")]
    Launch(#[from] std::io::Error),

    #[error("tmux display-message exited with {code:?}: {stderr}")]
    Rejected { code: Option<i32>, stderr: String },

    #[error("expected session:::window:::pane, got {fields} field(s) in {output:?}")]
    Malformed { output: String, fields: usize },
}
