//! Transport abstraction for Tilecamp.
//!
//! The client core is frame-driven and never awaits, so [`Transport`] is a
//! synchronous, non-blocking interface: `send` hands a batch off and
//! returns, `receive` polls for an inbound batch that already arrived. An
//! asynchronous transport reports the outcome of a send on a later frame,
//! through [`Transport::closed`].
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`], a WebSocket client
//!   running in a tokio task behind channels.

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

/// A connection to the world server, as seen from the frame loop.
///
/// Every method must return without blocking.
pub trait Transport {
    /// Hands one encoded batch to the connection.
    ///
    /// `Ok` means the batch was accepted for delivery, not that the server
    /// has it. An `Err` means the batch is gone.
    fn send(&mut self, batch: &[u8]) -> Result<(), TransportError>;

    /// Returns `true` once the underlying connection is known to be closed.
    fn closed(&self) -> bool;

    /// Starts a fresh connection, replacing the current one.
    ///
    /// Completion is observed on later frames; this does not wait for the
    /// new connection to be established.
    fn reconnect(&mut self) -> Result<(), TransportError>;

    /// Returns the next inbound batch that has already arrived, if any.
    fn receive(&mut self) -> Option<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, batch: &[u8]) -> Result<(), TransportError> {
        (**self).send(batch)
    }

    fn closed(&self) -> bool {
        (**self).closed()
    }

    fn reconnect(&mut self) -> Result<(), TransportError> {
        (**self).reconnect()
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        (**self).receive()
    }
}
