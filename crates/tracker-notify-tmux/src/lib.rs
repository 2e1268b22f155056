//! tracker-notify-tmux: tmux IO boundary.
//! Asks tmux which session and window a pane belongs to. No task logic.

pub mod context;
pub mod display;
pub mod error;

pub use context::{
    CONTEXT_DELIMITER, ContextResolver, PANE_CONTEXT_FORMAT, parse_pane_context, query_pane_context,
};
pub use display::{DisplayMessage, TmuxCli};
pub use error::ContextError;
