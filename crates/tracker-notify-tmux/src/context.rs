//! Pane context query and memoizing resolver.

use tracker_notify_core::PaneContext;

use crate::display::DisplayMessage;
use crate::error::ContextError;

/// Separator between fields in [`PANE_CONTEXT_FORMAT`] output.
pub const CONTEXT_DELIMITER: &str = ":::";

/// Format string for `tmux display-message -p`.
pub const PANE_CONTEXT_FORMAT: &str = "#{session_id}:::#{window_id}:::#{pane_id}";

/// Ask tmux for the session/window/pane ids of `pane`.
pub fn query_pane_context(
    runner: &impl DisplayMessage,
    pane: &str,
) -> Result<PaneContext, ContextError> {
    let output = runner.display(pane, PANE_CONTEXT_FORMAT)?;
    parse_pane_context(&output)
}

/// Parse `<session>:::<window>:::<pane>`; anything but three parts is an error.
pub fn parse_pane_context(output: &str) -> Result<PaneContext, ContextError> {
    let trimmed = output.trim();
    let parts: Vec<&str> = trimmed.split(CONTEXT_DELIMITER).collect();
    match parts.as_slice() {
        [session, window, pane] => Ok(PaneContext::resolved(*session, *window, *pane)),
        _ => Err(ContextError::Malformed {
            output: trimmed.to_string(),
            fields: parts.len(),
        }),
    }
}

/// Resolves the pane context once and caches a successful result.
///
/// A failed query yields the pane-only fallback without caching it, so a
/// later `resolve` may still succeed. Callers that need a stable identity
/// resolve once and keep the value.
pub struct ContextResolver<R> {
    runner: R,
    raw_pane: String,
    cached: Option<PaneContext>,
}

impl<R: DisplayMessage> ContextResolver<R> {
    pub fn new(runner: R, raw_pane: impl Into<String>) -> Self {
        Self {
            runner,
            raw_pane: raw_pane.into(),
            cached: None,
        }
    }

    pub fn resolve(&mut self) -> PaneContext {
        self.resolve_verbose().0
    }

    /// Like [`resolve`](Self::resolve) but also returns the query error
    /// behind a fallback, for logging.
    pub fn resolve_verbose(&mut self) -> (PaneContext, Option<ContextError>) {
        if let Some(ref ctx) = self.cached {
            return (ctx.clone(), None);
        }
        match query_pane_context(&self.runner, &self.raw_pane) {
            Ok(ctx) => {
                self.cached = Some(ctx.clone());
                (ctx, None)
            }
            Err(e) => (PaneContext::pane_only(self.raw_pane.clone()), Some(e)),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedRunner {
        replies: Mutex<Vec<Result<String, ContextError>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRunner {
        fn new(replies: Vec<Result<String, ContextError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("lock").len()
        }
    }

    fn rejected(stderr: &str) -> ContextError {
        ContextError::Rejected {
            code: Some(1),
            stderr: stderr.to_string(),
        }
    }

    impl DisplayMessage for ScriptedRunner {
        fn display(&self, target: &str, format: &str) -> Result<String, ContextError> {
            self.calls
                .lock()
                .expect("lock")
                .push((target.to_string(), format.to_string()));
            let mut replies = self.replies.lock().expect("lock");
            if replies.is_empty() {
                return Err(rejected("no scripted reply"));
            }
            replies.remove(0)
        }
    }

    #[test]
    fn parse_three_fields() {
        let ctx = parse_pane_context("$3:::@7:::%12\n").expect("parse");
        assert_eq!(ctx, PaneContext::resolved("$3", "@7", "%12"));
    }

    #[test]
    fn parse_rejects_wrong_field_count() {
        assert!(matches!(
            parse_pane_context("$3:::@7"),
            Err(ContextError::Malformed { fields: 2, .. })
        ));
        assert!(parse_pane_context("a:::b:::c:::d").is_err());
        assert!(parse_pane_context("").is_err());
    }

    #[test]
    fn query_passes_pane_target_and_format() {
        let runner = ScriptedRunner::new(vec![Ok("$0:::@1:::%2\n".to_string())]);
        let ctx = query_pane_context(&runner, "%2").expect("ok");
        assert_eq!(ctx.pane_id, "%2");
        let calls = runner.calls.lock().expect("lock");
        assert_eq!(calls[0], ("%2".to_string(), PANE_CONTEXT_FORMAT.to_string()));
    }

    #[test]
    fn resolver_memoizes_success() {
        let runner = ScriptedRunner::new(vec![Ok("$0:::@1:::%2".to_string())]);
        let mut resolver = ContextResolver::new(&runner, "%2");
        let first = resolver.resolve();
        let second = resolver.resolve();
        assert_eq!(first, second);
        assert!(resolver.is_cached());
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn resolver_falls_back_on_command_failure() {
        let runner = ScriptedRunner::new(vec![Err(rejected("no server running"))]);
        let mut resolver = ContextResolver::new(&runner, "%5");
        let (ctx, err) = resolver.resolve_verbose();
        assert_eq!(ctx, PaneContext::pane_only("%5"));
        assert!(matches!(err, Some(ContextError::Rejected { .. })), "got {err:?}");
        assert!(!resolver.is_cached());
    }

    #[test]
    fn resolver_falls_back_on_malformed_output() {
        let runner = ScriptedRunner::new(vec![Ok("garbage".to_string())]);
        let mut resolver = ContextResolver::new(&runner, "%5");
        assert_eq!(resolver.resolve(), PaneContext::pane_only("%5"));
    }

    #[test]
    fn resolver_retries_after_fallback() {
        let runner = ScriptedRunner::new(vec![
            Err(rejected("transient")),
            Ok("$1:::@1:::%5".to_string()),
        ]);
        let mut resolver = ContextResolver::new(&runner, "%5");
        assert!(resolver.resolve().is_degraded());
        assert!(!resolver.resolve().is_degraded());
        assert!(resolver.is_cached());
        assert_eq!(runner.call_count(), 2);
    }
}
