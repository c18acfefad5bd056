//! Client identity for Tilecamp.
//!
//! A client install is known to the server by a random token it creates
//! once and keeps forever:
//!
//! 1. **Storage**: where the token lives ([`TokenStore`],
//!    [`MemoryTokenStore`], [`FileTokenStore`])
//! 2. **Identity**: loading or creating the token and announcing it
//!    ([`SessionIdentity`])
//!
//! ```text
//! Client (above)   ← calls identify() at startup and after reconnects
//!     ↕
//! Session (this crate)
//!     ↕
//! Protocol (below) ← IdentifyEvent, EventSink
//! ```

mod error;
mod identity;
mod store;

pub use error::SessionError;
pub use identity::{SessionIdentity, TOKEN_KEY};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
