//! Error types for the protocol layer.
//!
//! Registry errors (`DuplicateKind`, `UnknownKind`) are programming
//! errors: the kind tables are fixed at compile time, so hitting one means
//! a table or a caller is wrong. `MalformedEvent` and `Decode` describe bad
//! data coming off the wire and are recovered by skipping the entry.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A name or a kind was registered twice.
    ///
    /// The registry is a bijection, so both directions are checked.
    #[error("duplicate kind registration: {0}")]
    DuplicateKind(String),

    /// A lookup missed. The registry never falls back to a default.
    #[error("unknown kind: {0}")]
    UnknownKind(String),

    /// A handler was already registered for this kind.
    #[error("handler already registered for kind {0}")]
    DuplicateHandler(String),

    /// An inbound envelope that can't be routed to a handler: unknown
    /// type id, a payload of the wrong shape, or no handler for the kind.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Serialization failed (turning a Rust value into JSON).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes or a JSON value into a Rust
    /// value). Usually a truncated frame or a payload from a newer server.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
