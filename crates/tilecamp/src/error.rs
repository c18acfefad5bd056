//! Unified error type for the Tilecamp client.

use tilecamp_editor::EditorError;
use tilecamp_protocol::ProtocolError;
use tilecamp_session::SessionError;
use tilecamp_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TilecampError {
    /// Connecting, sending, or reconnecting failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Registry, encode, decode, or handler registration failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session token couldn't be loaded or persisted.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The editor couldn't turn input into an edit.
    #[error(transparent)]
    Editor(#[from] EditorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let tc_err: TilecampError = err.into();
        assert!(matches!(tc_err, TilecampError::Transport(_)));
        assert!(tc_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::UnknownKind("teleport".into());
        let tc_err: TilecampError = err.into();
        assert!(matches!(tc_err, TilecampError::Protocol(_)));
        assert!(tc_err.to_string().contains("teleport"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Store("read-only".into());
        let tc_err: TilecampError = err.into();
        assert!(matches!(tc_err, TilecampError::Session(_)));
    }

    #[test]
    fn test_from_editor_error() {
        let err = EditorError::from(ProtocolError::UnknownKind("ghost".into()));
        let tc_err: TilecampError = err.into();
        assert!(matches!(tc_err, TilecampError::Editor(_)));
    }
}
