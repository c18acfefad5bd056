//! Error types for the editor.

use tilecamp_protocol::ProtocolError;

/// Errors the editor can surface while turning input into edits.
///
/// Bad input is never an error (clicking empty space in move mode just
/// does nothing). What's left is registry misuse, which means a kind
/// table is out of sync with the palette.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
