//! # Tilecamp
//!
//! Frame-driven client core for a shared, persistent tile world.
//!
//! A player walks around a map everyone sees and, with the editor switched
//! on, paints tiles and places or drags objects. Every edit is applied
//! locally first and queued for the server; once per frame the queue goes
//! out as one batch. Inbound batches from the server are routed to
//! handlers that keep the local map authoritative.
//!
//! ```text
//! input → Editor → MapCollaborator (optimistic)
//!               ↘ EventPipeline ──(end of frame)──▶ Transport ──▶ server
//! server ──▶ Transport ──▶ InboundDispatcher ──▶ MapCollaborator
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tilecamp::prelude::*;
//!
//! # async fn start() -> Result<(), TilecampError> {
//! let transport = WebSocketTransport::connect("ws://127.0.0.1:8080/ws")?;
//! let store = FileTokenStore::open("tilecamp.json")?;
//!
//! let mut client = ClientBuilder::new()
//!     .frame_rate(30)
//!     .build(transport, store, GridMap::default(), NullUi)?;
//!
//! client.run(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! # Ok(())
//! # }
//! ```

mod client;
mod dispatch;
mod error;
mod pipeline;

pub use client::{Client, ClientBuilder, FrameReport};
pub use dispatch::{DispatchReport, InboundDispatcher};
pub use error::TilecampError;
pub use pipeline::{EventPipeline, FlushResult};

/// Everything a host needs to wire up a client.
pub mod prelude {
    pub use crate::{
        Client, ClientBuilder, DispatchReport, EventPipeline, FlushResult, FrameReport,
        InboundDispatcher, TilecampError,
    };
    pub use tilecamp_editor::{
        Cell, DialogContent, Editor, EditorConfig, GridMap, MapCollaborator, MapTile, NullUi,
        PenMode, Tool, UiCollaborator, Viewport, WorldObject, WorldPos,
    };
    pub use tilecamp_protocol::{
        ClientEvent, EditEvent, Envelope, EventKind, EventSink, ObjectKind, ProtocolError,
    };
    pub use tilecamp_session::{FileTokenStore, MemoryTokenStore, SessionIdentity, TokenStore};
    pub use tilecamp_tick::{TickConfig, TickScheduler};
    pub use tilecamp_transport::{Transport, TransportError, WebSocketTransport};
}
