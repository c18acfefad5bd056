//! The durable identity of this client install.
//!
//! The server recognizes a returning player by an opaque token the client
//! generated on its first run. [`SessionIdentity::identify`] loads that
//! token (creating and persisting it if needed) and queues an identify
//! event. The host calls it once at startup and the event pipeline calls
//! it again after every reconnect.

use rand::Rng;
use tilecamp_protocol::{EventSink, IdentifyEvent};

use crate::{SessionError, TokenStore};

/// Key the token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Owns the token store and the cached token.
#[derive(Debug)]
pub struct SessionIdentity<S: TokenStore> {
    store: S,
    token: Option<String>,
}

impl<S: TokenStore> SessionIdentity<S> {
    /// Wraps a store. Nothing is read until the first `identify`.
    pub fn new(store: S) -> Self {
        Self { store, token: None }
    }

    /// Loads or creates the token and queues an `IdentifyEvent` for it.
    ///
    /// The store is read once; later calls reuse the cached token, so a
    /// reconnect identifies with exactly the same value.
    ///
    /// # Errors
    /// [`SessionError`] if a freshly generated token can't be persisted.
    /// Nothing is queued in that case: identifying with a token that won't
    /// survive a restart would orphan this player's server state.
    pub fn identify(
        &mut self,
        sink: &mut impl EventSink,
    ) -> Result<String, SessionError> {
        let token = self.load_or_create()?;
        sink.enqueue(IdentifyEvent { token: token.clone() }.into());
        tracing::info!("identify queued");
        Ok(token)
    }

    /// The token, if `identify` has run.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_or_create(&mut self) -> Result<String, SessionError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        let token = match self.store.get(TOKEN_KEY).filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::debug!("reusing persisted session token");
                token
            }
            None => {
                let token = generate_token();
                self.store.set(TOKEN_KEY, &token)?;
                tracing::info!("generated new session token");
                token
            }
        };

        self.token = Some(token.clone());
        Ok(token)
    }
}

/// A 32-character lowercase hex string carrying 128 random bits.
///
/// `rand::rng()` is the thread-local generator, a CSPRNG seeded from the
/// OS, so two installs colliding is out of the question in practice.
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
