//! Routing inbound envelopes to handlers.
//!
//! One handler per [`EventKind`]. A batch is processed entry by entry: an
//! entry that can't be routed (unknown type id, payload of the wrong
//! shape, no handler) is logged and skipped, and the rest of the batch
//! still runs.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tilecamp_protocol::{Codec, Envelope, EventKind, JsonCodec, ProtocolError};

/// A handler over the raw envelope. Typed handlers are wrapped into this.
type Handler<Ctx> = Box<dyn FnMut(&mut Ctx, &Envelope) -> Result<(), ProtocolError>>;

/// Counts from one dispatched batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Entries a handler accepted.
    pub handled: usize,
    /// Entries skipped as malformed.
    pub skipped: usize,
}

impl DispatchReport {
    /// Adds another report's counts to this one.
    pub fn merge(&mut self, other: DispatchReport) {
        self.handled += other.handled;
        self.skipped += other.skipped;
    }
}

/// Maps event kinds to handlers that mutate a context `Ctx`.
///
/// The context is passed per call rather than captured, so handlers can
/// mutate state the dispatcher's owner also holds (e.g. the client's map).
pub struct InboundDispatcher<Ctx, C: Codec = JsonCodec> {
    handlers: HashMap<EventKind, Handler<Ctx>>,
    codec: C,
}

impl<Ctx: 'static> InboundDispatcher<Ctx> {
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl<Ctx: 'static> Default for InboundDispatcher<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx: 'static, C: Codec> InboundDispatcher<Ctx, C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            handlers: HashMap::new(),
            codec,
        }
    }

    /// Registers a handler over raw envelopes.
    ///
    /// # Errors
    /// [`ProtocolError::DuplicateHandler`] if `kind` already has one.
    pub fn register<F>(&mut self, kind: EventKind, handler: F) -> Result<(), ProtocolError>
    where
        F: FnMut(&mut Ctx, &Envelope) -> Result<(), ProtocolError> + 'static,
    {
        if self.handlers.contains_key(&kind) {
            return Err(ProtocolError::DuplicateHandler(format!("{kind:?}")));
        }
        self.handlers.insert(kind, Box::new(handler));
        tracing::debug!(?kind, "inbound handler registered");
        Ok(())
    }

    /// Registers a handler that receives the payload decoded as `E`.
    ///
    /// A payload that doesn't decode as `E` is skipped as malformed and
    /// the handler isn't called.
    ///
    /// # Errors
    /// [`ProtocolError::DuplicateHandler`] if `kind` already has one.
    pub fn register_typed<E, F>(&mut self, kind: EventKind, mut handler: F) -> Result<(), ProtocolError>
    where
        E: DeserializeOwned + 'static,
        F: FnMut(&mut Ctx, E) + 'static,
    {
        self.register(kind, move |ctx, envelope| {
            let event = envelope.decode_payload::<E>().map_err(|e| {
                ProtocolError::MalformedEvent(format!("{}: {e}", envelope.type_id))
            })?;
            handler(ctx, event);
            Ok(())
        })
    }

    /// Returns `true` if `kind` has a handler.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Runs every entry of `batch` through its handler, in order.
    pub fn dispatch(&mut self, ctx: &mut Ctx, batch: &[Envelope]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for envelope in batch {
            match self.route(ctx, envelope) {
                Ok(()) => report.handled += 1,
                Err(e) => {
                    tracing::warn!(type_id = %envelope.type_id, error = %e, "skipping inbound event");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Decodes one inbound frame and dispatches it.
    ///
    /// Each element of the frame is read as an envelope on its own, so a
    /// bad pair (numeric type id, missing payload) is skipped like any
    /// other malformed entry. A frame that isn't a JSON array is skipped
    /// whole and counts as one skipped entry.
    pub fn dispatch_bytes(&mut self, ctx: &mut Ctx, frame: &[u8]) -> DispatchReport {
        let elements = match self.codec.decode::<Vec<serde_json::Value>>(frame) {
            Ok(elements) => elements,
            Err(e) => {
                tracing::warn!(bytes = frame.len(), error = %e, "skipping undecodable inbound frame");
                return DispatchReport {
                    handled: 0,
                    skipped: 1,
                };
            }
        };

        let mut report = DispatchReport::default();
        for element in elements {
            match Envelope::from_value(element) {
                Ok(envelope) => report.merge(self.dispatch(ctx, std::slice::from_ref(&envelope))),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping inbound event");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    fn route(&mut self, ctx: &mut Ctx, envelope: &Envelope) -> Result<(), ProtocolError> {
        let kind = envelope
            .kind()
            .map_err(|_| ProtocolError::MalformedEvent(format!("unknown type id {:?}", envelope.type_id)))?;
        let handler = self
            .handlers
            .get_mut(&kind)
            .ok_or_else(|| ProtocolError::MalformedEvent(format!("no handler for {:?}", envelope.type_id)))?;
        handler(ctx, envelope)
    }
}

impl<Ctx, C: Codec> std::fmt::Debug for InboundDispatcher<Ctx, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundDispatcher")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
