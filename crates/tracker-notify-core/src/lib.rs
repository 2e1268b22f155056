//! tracker-notify-core: pure domain logic for the task tracker bridge.
//! Decodes host events, attributes message text to roles, summarizes
//! message parts, and decides busy/idle task transitions. No IO.

pub mod capture;
pub mod events;
pub mod message;
pub mod notification;
pub mod summary;
pub mod task;
pub mod types;

pub use capture::{MessageRoleIndex, TextCapture, should_capture};
pub use events::{HostEvent, Signal};
pub use message::{HostMessage, MessageInfo, MessagePart};
pub use notification::{NOTIFICATION_KIND, NotificationPayload};
pub use summary::{MAX_SUMMARY_CHARS, summarize, truncate_chars};
pub use task::{IgnoreReason, StatusKind, TaskState, Transition};
pub use types::{PaneContext, Role};
