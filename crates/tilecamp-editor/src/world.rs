//! The world as the editor sees it: positions, tiles, objects, and the two
//! collaborator traits the host implements.
//!
//! The editor never owns the map or the UI. It borrows them per call
//! through [`MapCollaborator`] and [`UiCollaborator`], which keeps the
//! dependency one-directional: editor → map, editor → UI, never back.

use serde::{Deserialize, Serialize};
use tilecamp_protocol::ObjectKind;

// ---------------------------------------------------------------------------
// Positions and contents
// ---------------------------------------------------------------------------

/// Integer coordinates of one map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A continuous position on the ground plane, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: WorldPos) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<WorldPos> for [f32; 2] {
    fn from(p: WorldPos) -> Self {
        [p.x, p.y]
    }
}

impl From<[f32; 2]> for WorldPos {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// What is painted in a cell: a tile set and an index into its sheet.
///
/// A negative `index` means "no tile" (see [`MapTile::EMPTY`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapTile {
    pub tile_set: usize,
    pub index: i32,
}

impl MapTile {
    pub const EMPTY: MapTile = MapTile {
        tile_set: 0,
        index: -1,
    };

    pub fn new(tile_set: usize, index: i32) -> Self {
        Self { tile_set, index }
    }

    pub fn is_empty(&self) -> bool {
        self.index < 0
    }
}

/// A placed object.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: String,
    pub kind: ObjectKind,
    pub pos: WorldPos,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Spatial queries and mutations on the local map.
///
/// The editor writes here optimistically; inbound server events write here
/// authoritatively. Implementations must not assume the two agree.
pub trait MapCollaborator {
    /// The cell under a screen point.
    fn cell_from_screen(&self, x: f32, y: f32) -> Cell;

    /// The ground position under a screen point.
    fn world_from_screen(&self, x: f32, y: f32) -> WorldPos;

    /// What is painted at `cell`, if anything.
    fn tile_at(&self, cell: Cell) -> Option<MapTile>;

    /// Paints `cell`.
    fn set_tile(&mut self, cell: Cell, tile: MapTile);

    /// The first object at `pos`, for in-place mutation.
    fn first_object_at(&mut self, pos: WorldPos) -> Option<&mut WorldObject>;

    /// Inserts an object, or replaces the one with the same id.
    fn upsert_object(&mut self, object: WorldObject);

    /// Removes an object. Returns `false` if no object had that id.
    fn remove_object(&mut self, id: &str) -> bool;

    /// The tile under a screen point, or [`MapTile::EMPTY`].
    fn pick_tile(&self, x: f32, y: f32) -> MapTile {
        self.tile_at(self.cell_from_screen(x, y))
            .unwrap_or(MapTile::EMPTY)
    }
}

/// What the asset-picker dialog should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogContent {
    /// A tile sheet to pick a tile from.
    Tiles { tile_set: usize, image: String },
    /// A palette of placeable object kinds.
    Objects { kinds: Vec<ObjectKind> },
}

/// The on-screen parts of the editor.
pub trait UiCollaborator {
    fn show_toolbar(&mut self);
    fn hide_toolbar(&mut self);
    fn show_dialog(&mut self, content: &DialogContent);
    fn hide_dialog(&mut self);
}

/// A [`UiCollaborator`] with nothing on screen. For headless clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl UiCollaborator for NullUi {
    fn show_toolbar(&mut self) {}
    fn hide_toolbar(&mut self) {}
    fn show_dialog(&mut self, _content: &DialogContent) {}
    fn hide_dialog(&mut self) {}
}
