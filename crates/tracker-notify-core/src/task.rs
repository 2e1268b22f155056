//! Busy/idle task state machine.
//!
//! ```text
//! Idle             --busy-->  Active(session)   start_task
//! Active(session)  --idle-->  Idle              finish_task (same session only)
//! anything else    -->        no-op
//! ```
//!
//! [`TaskState::evaluate`] is pure: it only decides. The caller applies the
//! decision with [`TaskState::begin`] / [`TaskState::end`] once its own
//! guards (tracker readiness) pass. The flip happens before the external
//! action runs, so a failed action leaves the external tracker diverged
//! from this state until the next transition.

use std::fmt;

/// Session status reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Busy,
    Idle,
    Other(String),
}

impl StatusKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "busy" => Self::Busy,
            "idle" => Self::Idle,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Busy => "busy",
            Self::Idle => "idle",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a task is being tracked, and for which host session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskState {
    #[default]
    Idle,
    Active { session_id: String },
}

/// Decision for one status event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Start { session_id: String },
    Finish { session_id: String },
    Ignore(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Busy while a task is already running.
    AlreadyActive,
    /// Idle with no task running.
    NotActive,
    /// Idle for a session other than the tracked one.
    SessionMismatch { tracked: String, incoming: String },
    /// Status other than busy/idle.
    UnhandledStatus(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive => write!(f, "task already active"),
            Self::NotActive => write!(f, "no active task"),
            Self::SessionMismatch { tracked, incoming } => {
                write!(f, "session mismatch: tracked {tracked}, got {incoming}")
            }
            Self::UnhandledStatus(s) => write!(f, "unhandled status {s:?}"),
        }
    }
}

impl TaskState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Active { session_id } => Some(session_id),
        }
    }

    /// Decide what a status event means in the current state.
    pub fn evaluate(&self, session_id: &str, status: &StatusKind) -> Transition {
        match (self, status) {
            (Self::Idle, StatusKind::Busy) => Transition::Start {
                session_id: session_id.to_string(),
            },
            (Self::Active { .. }, StatusKind::Busy) => {
                Transition::Ignore(IgnoreReason::AlreadyActive)
            }
            (Self::Active { session_id: tracked }, StatusKind::Idle) => {
                if tracked != session_id {
                    Transition::Ignore(IgnoreReason::SessionMismatch {
                        tracked: tracked.clone(),
                        incoming: session_id.to_string(),
                    })
                } else {
                    Transition::Finish {
                        session_id: tracked.clone(),
                    }
                }
            }
            (Self::Idle, StatusKind::Idle) => Transition::Ignore(IgnoreReason::NotActive),
            (_, StatusKind::Other(s)) => Transition::Ignore(IgnoreReason::UnhandledStatus(s.clone())),
        }
    }

    /// Enter `Active` for `session_id`.
    pub fn begin(&mut self, session_id: impl Into<String>) {
        *self = Self::Active {
            session_id: session_id.into(),
        };
    }

    /// Return to `Idle`, yielding the session that was tracked.
    pub fn end(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Self::Active { session_id } => Some(session_id),
            Self::Idle => None,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_status() -> impl Strategy<Value = StatusKind> {
        prop_oneof![
            Just(StatusKind::Busy),
            Just(StatusKind::Idle),
            Just(StatusKind::Other("retry".to_string())),
        ]
    }

    fn arb_event() -> impl Strategy<Value = (String, StatusKind)> {
        (prop_oneof![Just("a".to_string()), Just("b".to_string())], arb_status())
    }

    proptest! {
        /// Starts and finishes strictly alternate for any event sequence.
        #[test]
        fn starts_never_repeat_without_finish(
            events in proptest::collection::vec(arb_event(), 0..40),
        ) {
            let mut state = TaskState::default();
            let mut open = 0i32;
            for (sid, status) in &events {
                match state.evaluate(sid, status) {
                    Transition::Start { session_id } => {
                        prop_assert_eq!(open, 0);
                        open += 1;
                        state.begin(session_id);
                    }
                    Transition::Finish { session_id } => {
                        prop_assert_eq!(open, 1);
                        open -= 1;
                        prop_assert_eq!(state.end(), Some(session_id));
                    }
                    Transition::Ignore(_) => {}
                }
                prop_assert_eq!(state.is_active(), open == 1);
            }
        }

        /// An idle for a different session never changes the state.
        #[test]
        fn mismatched_idle_is_inert(tracked in "[a-z]{1,8}", incoming in "[a-z]{1,8}") {
            prop_assume!(tracked != incoming);
            let mut state = TaskState::default();
            state.begin(tracked.clone());
            let transition = state.evaluate(&incoming, &StatusKind::Idle);
            let is_mismatch = matches!(transition, Transition::Ignore(IgnoreReason::SessionMismatch { .. }));
            prop_assert!(is_mismatch);
            prop_assert_eq!(state.session_id(), Some(tracked.as_str()));
        }
    }
}
