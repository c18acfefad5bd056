//! Wire protocol for Tilecamp.
//!
//! This crate defines what the client and the world server say to each
//! other:
//!
//! - **Registry** ([`TypeRegistry`], [`EventKind`], [`ObjectKind`]): the
//!   bijection between wire names and in-memory kinds.
//! - **Types** ([`ClientEvent`], [`EditEvent`], [`MapEvent`], [`Envelope`],
//!   ...): the payloads and the `(typeId, payload)` envelope.
//! - **Codec** ([`Codec`], [`JsonCodec`]): frames ⇄ envelope batches.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope batch) → Client (handlers, editor)
//! ```

mod codec;
mod error;
mod kinds;
mod registry;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use kinds::{EventKind, ObjectKind};
pub use registry::TypeRegistry;
pub use types::{
    ClientEvent, EditEvent, Envelope, EventSink, IdentifyEvent, LeaveEvent,
    MapEvent, ObjDef, ObjState, TileEdit,
};
