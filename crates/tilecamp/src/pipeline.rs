//! The outbound event queue.
//!
//! Everything the client wants to tell the server during a frame goes on
//! one queue; [`EventPipeline::flush`] sends it as a single batch at the
//! end of the frame. Delivery is at-most-once: the queue is emptied before
//! the send is attempted, so a failed batch is gone. After a failure on a
//! closed connection the pipeline reconnects and queues a fresh identify,
//! which goes out with the next frame's batch.

use std::mem;

use tilecamp_protocol::{ClientEvent, Codec, Envelope, EventSink, JsonCodec, ProtocolError};
use tilecamp_session::{SessionIdentity, TokenStore};
use tilecamp_transport::Transport;

/// Outcome of one [`EventPipeline::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushResult {
    /// Nothing was queued; the transport wasn't touched.
    Empty,
    /// The batch was handed to the transport.
    Sent { events: usize },
    /// The batch was lost, either because it couldn't be encoded or
    /// because the transport rejected it.
    Dropped { events: usize, reconnected: bool },
}

/// Per-frame outbound queue.
#[derive(Debug)]
pub struct EventPipeline<C: Codec = JsonCodec> {
    queue: Vec<ClientEvent>,
    codec: C,
}

impl EventPipeline {
    /// A pipeline that encodes batches as JSON.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for EventPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> EventPipeline<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            queue: Vec::new(),
            codec,
        }
    }

    /// Number of events waiting for the next flush.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The queued events, oldest first.
    pub fn pending(&self) -> &[ClientEvent] {
        &self.queue
    }

    /// Sends everything queued this frame as one batch.
    ///
    /// The queue is empty afterwards whatever the outcome. If the send
    /// fails and the transport reports itself closed, this reconnects and
    /// asks `identity` to queue an identify for the next frame.
    pub fn flush<T, S>(
        &mut self,
        transport: &mut T,
        identity: &mut SessionIdentity<S>,
    ) -> FlushResult
    where
        T: Transport + ?Sized,
        S: TokenStore,
    {
        if self.queue.is_empty() {
            return FlushResult::Empty;
        }

        let batch = mem::take(&mut self.queue);
        let events = batch.len();

        let bytes = match self.encode(&batch) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(events, error = %e, "failed to encode batch; dropping it");
                return FlushResult::Dropped {
                    events,
                    reconnected: false,
                };
            }
        };

        match transport.send(&bytes) {
            Ok(()) => {
                tracing::debug!(events, bytes = bytes.len(), "batch sent");
                FlushResult::Sent { events }
            }
            Err(e) => {
                tracing::warn!(events, error = %e, "send failed; batch dropped");
                let reconnected = transport.closed() && self.reconnect(transport, identity);
                FlushResult::Dropped {
                    events,
                    reconnected,
                }
            }
        }
    }

    fn encode(&self, batch: &[ClientEvent]) -> Result<Vec<u8>, ProtocolError> {
        let envelopes = batch
            .iter()
            .map(ClientEvent::to_envelope)
            .collect::<Result<Vec<Envelope>, _>>()?;
        self.codec.encode(&envelopes)
    }

    fn reconnect<T, S>(&mut self, transport: &mut T, identity: &mut SessionIdentity<S>) -> bool
    where
        T: Transport + ?Sized,
        S: TokenStore,
    {
        if let Err(e) = transport.reconnect() {
            tracing::warn!(error = %e, "reconnect failed");
            return false;
        }
        if let Err(e) = identity.identify(self) {
            tracing::warn!(error = %e, "reconnected but could not re-identify");
        }
        true
    }
}

impl<C: Codec> EventSink for EventPipeline<C> {
    fn enqueue(&mut self, event: ClientEvent) {
        self.queue.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecamp_protocol::{EditEvent, IdentifyEvent, TileEdit};
    use tilecamp_session::MemoryTokenStore;
    use tilecamp_transport::TransportError;

    /// Records sends; fails every send while `fail` is set.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<Vec<u8>>,
        fail: bool,
        closed: bool,
        reconnects: u32,
    }

    impl Transport for Recorder {
        fn send(&mut self, batch: &[u8]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::SendFailed("scripted".into()));
            }
            self.sent.push(batch.to_vec());
            Ok(())
        }

        fn closed(&self) -> bool {
            self.closed
        }

        fn reconnect(&mut self) -> Result<(), TransportError> {
            self.reconnects += 1;
            self.closed = false;
            Ok(())
        }

        fn receive(&mut self) -> Option<Vec<u8>> {
            None
        }
    }

    fn tile(x: i32) -> ClientEvent {
        EditEvent::Tile(TileEdit::from([x, 0, 0, 1])).into()
    }

    #[test]
    fn test_flush_empty_does_not_touch_transport() {
        let mut pipeline = EventPipeline::new();
        let mut transport = Recorder::default();
        let mut identity = SessionIdentity::new(MemoryTokenStore::new());

        assert_eq!(pipeline.flush(&mut transport, &mut identity), FlushResult::Empty);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_flush_sends_in_enqueue_order_and_clears() {
        let mut pipeline = EventPipeline::new();
        let mut transport = Recorder::default();
        let mut identity = SessionIdentity::new(MemoryTokenStore::new());

        pipeline.enqueue(IdentifyEvent { token: "t".into() }.into());
        pipeline.enqueue(tile(4));

        assert_eq!(
            pipeline.flush(&mut transport, &mut identity),
            FlushResult::Sent { events: 2 }
        );
        assert!(pipeline.is_empty());
        assert_eq!(
            transport.sent,
            vec![br#"[["identify",{"token":"t"}],["edit",{"tile":[4,0,0,1]}]]"#.to_vec()]
        );
    }

    #[test]
    fn test_flush_failure_on_open_transport_drops_without_reconnect() {
        let mut pipeline = EventPipeline::new();
        let mut transport = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let mut identity = SessionIdentity::new(MemoryTokenStore::new());

        pipeline.enqueue(tile(1));
        assert_eq!(
            pipeline.flush(&mut transport, &mut identity),
            FlushResult::Dropped {
                events: 1,
                reconnected: false
            }
        );
        assert_eq!(transport.reconnects, 0);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_flush_failure_on_closed_transport_reconnects_and_reidentifies() {
        let mut pipeline = EventPipeline::new();
        let mut transport = Recorder {
            fail: true,
            closed: true,
            ..Recorder::default()
        };
        let mut identity = SessionIdentity::new(MemoryTokenStore::new());

        pipeline.enqueue(tile(1));
        pipeline.enqueue(tile(2));
        assert_eq!(
            pipeline.flush(&mut transport, &mut identity),
            FlushResult::Dropped {
                events: 2,
                reconnected: true
            }
        );

        assert_eq!(transport.reconnects, 1);
        // Only the identify survives; the edits are gone.
        assert_eq!(pipeline.len(), 1);
        assert!(matches!(pipeline.pending()[0], ClientEvent::Identify(_)));
    }
}
