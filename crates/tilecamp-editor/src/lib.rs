//! Map editor for Tilecamp.
//!
//! The editor is a small state machine that turns pointer and key input
//! into edit events while keeping the local map optimistically up to date.
//!
//! # Key types
//!
//! - [`Editor`]: the state machine (enabled/disabled, pen mode, selection)
//! - [`PenMode`], [`Tool`]: what a click means, and the toolbar buttons
//! - [`MapCollaborator`], [`UiCollaborator`]: what the host provides
//! - [`GridMap`], [`NullUi`]: headless implementations of both
//! - [`EditorConfig`]: keys, tile sheets, object palette

mod config;
mod editor;
mod error;
mod grid;
mod world;

pub use config::{EditorConfig, PenMode, Tool};
pub use editor::Editor;
pub use error::EditorError;
pub use grid::{GridMap, Viewport};
pub use world::{
    Cell, DialogContent, MapCollaborator, MapTile, NullUi, UiCollaborator,
    WorldObject, WorldPos,
};
