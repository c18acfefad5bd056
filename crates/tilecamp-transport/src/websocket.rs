//! WebSocket client transport using `tokio-tungstenite`.
//!
//! The socket lives in a background tokio task (the "link"). The frame
//! loop talks to it only through unbounded channels and an atomic flag, so
//! every [`Transport`] method returns immediately:
//!
//! ```text
//! frame loop ──send──▶ outbound chan ──▶ link task ──▶ server
//! frame loop ◀─receive── inbound chan ◀── link task ◀── server
//!                         closed flag ◀── link task (on exit)
//! ```
//!
//! Reconnecting drops the old link's outbound sender, which makes that
//! task close its socket and exit, and spawns a new link.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::{Transport, TransportError};

/// One live (or connecting) socket task and its channel ends.
struct Link {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    inbound: mpsc::UnboundedReceiver<Vec<u8>>,
    closed: Arc<AtomicBool>,
}

/// A [`Transport`] that speaks to the world server over a WebSocket.
pub struct WebSocketTransport {
    url: String,
    runtime: Handle,
    link: Link,
    /// How many links have been spawned, including the first.
    generation: u64,
}

impl WebSocketTransport {
    /// Starts connecting to `url` (e.g. `ws://127.0.0.1:8080/ws`).
    ///
    /// Must be called from inside a tokio runtime; the link task is spawned
    /// on that runtime. Returns before the handshake completes; sends made
    /// in the meantime are queued and delivered once connected.
    ///
    /// # Errors
    /// [`TransportError::ConnectFailed`] if there is no current runtime.
    pub fn connect(url: impl Into<String>) -> Result<Self, TransportError> {
        let runtime = Handle::try_current()
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        let url = url.into();
        let link = spawn_link(&runtime, url.clone(), 1);
        Ok(Self {
            url,
            runtime,
            link,
            generation: 1,
        })
    }

    /// The URL this transport (re)connects to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// How many connections have been started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, batch: &[u8]) -> Result<(), TransportError> {
        if self.closed() {
            return Err(TransportError::ConnectionClosed(self.url.clone()));
        }
        self.link.outbound.send(batch.to_vec()).map_err(|_| {
            // The task dropped its receiver but hasn't raised the flag yet.
            self.link.closed.store(true, Ordering::Release);
            TransportError::ConnectionClosed("link task has exited".into())
        })
    }

    fn closed(&self) -> bool {
        self.link.closed.load(Ordering::Acquire)
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        self.generation += 1;
        tracing::info!(url = %self.url, generation = self.generation, "reconnecting");
        // Replacing the link drops the old sender; the old task sees its
        // outbound channel close and shuts its socket down.
        self.link = spawn_link(&self.runtime, self.url.clone(), self.generation);
        Ok(())
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        self.link.inbound.try_recv().ok()
    }
}

fn spawn_link(runtime: &Handle, url: String, generation: u64) -> Link {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&closed);
    runtime.spawn(async move {
        run_link(&url, generation, out_rx, in_tx).await;
        flag.store(true, Ordering::Release);
    });

    Link {
        outbound: out_tx,
        inbound: in_rx,
        closed,
    }
}

/// Drives one socket until either side goes away.
async fn run_link(
    url: &str,
    generation: u64,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    inbound: mpsc::UnboundedSender<Vec<u8>>,
) {
    let ws = match tokio_tungstenite::connect_async(url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::warn!(url, generation, error = %e, "WebSocket connect failed");
            return;
        }
    };
    tracing::debug!(url, generation, "WebSocket connected");

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            out = outbound.recv() => match out {
                Some(batch) => {
                    if let Err(e) = sink.send(frame(batch)).await {
                        tracing::debug!(generation, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                None => {
                    // The transport moved on to a newer link or was dropped.
                    let _ = sink.close().await;
                    break;
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound.send(text.as_bytes().to_vec());
                }
                Some(Ok(Message::Binary(data))) => {
                    let _ = inbound.send(data.into());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    tracing::debug!(generation, error = %e, "WebSocket receive failed");
                    break;
                }
            },
        }
    }

    tracing::debug!(url, generation, "WebSocket link closed");
}

/// JSON batches go out as text frames; anything else as binary.
fn frame(batch: Vec<u8>) -> Message {
    match String::from_utf8(batch) {
        Ok(text) => Message::Text(text.into()),
        Err(e) => Message::Binary(e.into_bytes().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_utf8_batch_is_text() {
        assert!(matches!(frame(b"[]".to_vec()), Message::Text(_)));
    }

    #[test]
    fn test_frame_non_utf8_batch_is_binary() {
        assert!(matches!(frame(vec![0xff, 0xfe]), Message::Binary(_)));
    }

    #[tokio::test]
    async fn test_send_after_link_exit_marks_closed() {
        let (outbound, out_rx) = mpsc::unbounded_channel();
        let (_in_tx, inbound) = mpsc::unbounded_channel();
        drop(out_rx);
        let mut transport = WebSocketTransport {
            url: "ws://127.0.0.1:1".into(),
            runtime: Handle::current(),
            link: Link {
                outbound,
                inbound,
                closed: Arc::new(AtomicBool::new(false)),
            },
            generation: 1,
        };

        assert!(!transport.closed());
        let result = transport.send(b"[]");
        assert!(matches!(result, Err(TransportError::ConnectionClosed(_))));
        assert!(transport.closed());
    }

    #[test]
    fn test_connect_outside_runtime_fails() {
        let result = WebSocketTransport::connect("ws://127.0.0.1:1");
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }
}
