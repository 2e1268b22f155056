//! JSON-RPC 2.0 link to the host over newline-delimited streams.
//!
//! The host pushes events as `event` notifications and answers
//! `session.messages` requests. One reader task demultiplexes incoming
//! lines into responses (routed to the waiting request by id) and events
//! (queued in arrival order). One writer task owns the output stream so
//! concurrent requests never interleave partial lines.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracker_notify_core::HostMessage;

use crate::host::{HostApi, HostError};

pub const EVENT_METHOD: &str = "event";
pub const SESSION_MESSAGES_METHOD: &str = "session.messages";

type Reply = Result<serde_json::Value, HostError>;

/// In-flight requests by id. `None` once the input stream has closed.
type PendingMap = Arc<Mutex<Option<HashMap<u64, oneshot::Sender<Reply>>>>>;

/// Queue of raw event payloads, in arrival order. Ends when the host
/// input closes.
pub type EventStream = mpsc::UnboundedReceiver<serde_json::Value>;

/// Request side of the host link.
pub struct RpcHost {
    outgoing: mpsc::UnboundedSender<String>,
    pending: PendingMap,
    next_id: AtomicU64,
    directory: String,
}

impl RpcHost {
    /// Start the reader and writer tasks. Must be called inside a tokio
    /// runtime.
    pub fn spawn<R, W>(reader: R, writer: W, directory: impl Into<String>) -> (Self, EventStream)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let pending: PendingMap = Arc::new(Mutex::new(Some(HashMap::new())));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(read_loop(reader, Arc::clone(&pending), event_tx));
        tokio::spawn(write_loop(writer, out_rx));

        let host = Self {
            outgoing: out_tx,
            pending,
            next_id: AtomicU64::new(1),
            directory: directory.into(),
        };
        (host, event_rx)
    }

    async fn request(&self, method: &str, params: serde_json::Value) -> Reply {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(map) = pending.as_mut() else {
                return Err(HostError::Disconnected);
            };
            map.insert(id, tx);
        }

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let line = serde_json::to_string(&request)?;
        if self.outgoing.send(line).is_err() {
            self.forget(id);
            return Err(HostError::Disconnected);
        }

        rx.await.unwrap_or(Err(HostError::Disconnected))
    }

    fn forget(&self, id: u64) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(map) = pending.as_mut() {
            map.remove(&id);
        }
    }
}

impl HostApi for RpcHost {
    async fn session_messages(&self, session_id: &str) -> Result<Vec<HostMessage>, HostError> {
        let params = serde_json::json!({
            "id": session_id,
            "directory": self.directory,
        });
        let result = self.request(SESSION_MESSAGES_METHOD, params).await?;
        Ok(serde_json::from_value(result)?)
    }
}

async fn read_loop<R>(reader: R, pending: PendingMap, events: mpsc::UnboundedSender<serde_json::Value>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let failure = loop {
        match lines.next_line().await {
            Ok(Some(line)) => dispatch_line(&line, &pending, &events),
            Ok(None) => break None,
            Err(e) => {
                tracing::warn!(error = %e, "host input read failed");
                break Some(e);
            }
        }
    };

    let waiting = pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .unwrap_or_default();
    tracing::debug!(pending = waiting.len(), "host input closed");
    for (_, tx) in waiting {
        let reply = match failure {
            Some(ref e) => HostError::Io(std::io::Error::new(e.kind(), e.to_string())),
            None => HostError::Disconnected,
        };
        let _ = tx.send(Err(reply));
    }
}

fn dispatch_line(
    line: &str,
    pending: &PendingMap,
    events: &mpsc::UnboundedSender<serde_json::Value>,
) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    let mut msg: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "malformed host line ignored");
            return;
        }
    };

    if let Some(method) = msg.get("method").and_then(|m| m.as_str()) {
        if method != EVENT_METHOD {
            tracing::debug!(method, "unhandled host notification");
            return;
        }
        let params = msg
            .get_mut("params")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);
        if events.send(params).is_err() {
            tracing::debug!("event queue closed; event dropped");
        }
        return;
    }

    let Some(id) = msg.get("id").and_then(|v| v.as_u64()) else {
        tracing::debug!("host message without method or numeric id ignored");
        return;
    };
    let waiter = pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_mut()
        .and_then(|map| map.remove(&id));
    let Some(tx) = waiter else {
        tracing::debug!(id, "response for unknown request ignored");
        return;
    };

    let reply = match msg.get("error") {
        Some(err) => Err(HostError::Rpc {
            code: err.get("code").and_then(|c| c.as_i64()).unwrap_or(0),
            message: err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
                .to_string(),
        }),
        None => Ok(msg
            .get_mut("result")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null)),
    };
    let _ = tx.send(reply);
}

async fn write_loop<W>(mut writer: W, mut outgoing: mpsc::UnboundedReceiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = outgoing.recv().await {
        line.push('\n');
        let written = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = written {
            tracing::warn!(error = %e, "host output write failed");
            break;
        }
    }
}
