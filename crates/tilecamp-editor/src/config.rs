//! Editor configuration, pen modes, and toolbar tools.

use serde::{Deserialize, Serialize};
use tilecamp_protocol::ObjectKind;

// ---------------------------------------------------------------------------
// EditorConfig
// ---------------------------------------------------------------------------

/// Configuration for the editor.
///
/// Key names are DOM-style `KeyboardEvent.code` values (`"KeyE"`,
/// `"ControlLeft"`), which is what the host's input layer reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Key that switches the editor on and off.
    pub toggle_key: String,

    /// Holding any of these while clicking picks the tile under the
    /// pointer instead of drawing.
    pub pick_modifiers: Vec<String>,

    /// Columns (and rows) in each tile sheet.
    pub tiles_per_row: u32,

    /// Tile sheet images, indexed by tile-set number.
    pub tile_sets: Vec<String>,

    /// Object kinds offered by the object picker, top to bottom.
    pub object_palette: Vec<ObjectKind>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            toggle_key: "KeyE".into(),
            pick_modifiers: vec!["ControlLeft".into(), "ControlRight".into()],
            tiles_per_row: 8,
            tile_sets: vec![
                "/assets/grassy_tiles.png".into(),
                "/assets/underground_tiles.png".into(),
            ],
            object_palette: vec![
                ObjectKind::Butterfly,
                ObjectKind::Player,
                ObjectKind::FlowerSpawnArea,
            ],
        }
    }
}

impl EditorConfig {
    /// Fixes values the editor can't work with.
    ///
    /// Called by [`Editor::new`](crate::Editor::new). Rules:
    /// - `tiles_per_row` is at least 1.
    /// - `tile_sets` is never empty (falls back to the default sheets).
    pub fn validated(mut self) -> Self {
        if self.tiles_per_row == 0 {
            tracing::warn!("tiles_per_row is 0; using 1");
            self.tiles_per_row = 1;
        }
        if self.tile_sets.is_empty() {
            tracing::warn!("no tile sets configured; using defaults");
            self.tile_sets = Self::default().tile_sets;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// PenMode / Tool
// ---------------------------------------------------------------------------

/// How pointer input is interpreted while the editor is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenMode {
    /// Paint the selected tile into the cell under the pointer.
    #[default]
    Tile,
    /// Ask the server to create the selected object kind.
    Object,
    /// Drag an existing object to the pointer.
    Move,
}

impl std::fmt::Display for PenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tile => write!(f, "tile"),
            Self::Object => write!(f, "object"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// A toolbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    TilePicker,
    ObjectPicker,
    Move,
}
