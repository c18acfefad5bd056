//! The editor state machine.
//!
//! ```text
//!                 toggle key
//!   ┌──────────┐ ───────────▶ ┌────────────────────────────┐
//!   │ Disabled │              │ Enabled { pen: Tile |      │
//!   └──────────┘ ◀─────────── │           Object | Move }  │
//!                 toggle key  └────────────────────────────┘
//! ```
//!
//! While enabled, each pointer interaction ([`Editor::draw`]) becomes at
//! most one edit event. Tile and move edits are applied to the local map
//! first (optimistic); object creation is not, because the server assigns
//! the new object's id.

use tilecamp_protocol::{EditEvent, EventSink, ObjDef, ObjectKind, TileEdit};

use crate::{
    DialogContent, EditorConfig, EditorError, MapCollaborator, MapTile, PenMode,
    Tool, UiCollaborator,
};

/// Turns pointer and key input into map edits.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    enabled: bool,
    pen_mode: PenMode,
    /// Tile set and index painted in `Tile` mode.
    selected_tile: MapTile,
    /// Kind created in `Object` mode. `None` until one is picked.
    selected_object: Option<ObjectKind>,
    /// Picker dialog currently on screen.
    dialog: Option<DialogContent>,
}

impl Editor {
    /// Creates a disabled editor in `Tile` mode with tile 0 of set 0
    /// selected.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config: config.validated(),
            enabled: false,
            pen_mode: PenMode::Tile,
            selected_tile: MapTile::new(0, 0),
            selected_object: None,
            dialog: None,
        }
    }

    // -- Accessors --------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pen_mode(&self) -> PenMode {
        self.pen_mode
    }

    pub fn selected_tile(&self) -> MapTile {
        self.selected_tile
    }

    pub fn selected_object(&self) -> Option<ObjectKind> {
        self.selected_object
    }

    /// The picker dialog on screen, if any.
    pub fn dialog(&self) -> Option<&DialogContent> {
        self.dialog.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Returns `true` if `key` turns a click into a tile pick.
    pub fn is_pick_modifier(&self, key: &str) -> bool {
        self.config.pick_modifiers.iter().any(|k| k == key)
    }

    // -- Enable / disable -------------------------------------------------

    /// Runs once per frame with the keys pressed during that frame.
    ///
    /// Returns `Some(enabled)` when the toggle key flipped the editor, so
    /// the caller can react (e.g. pause player movement) without an
    /// observer list.
    pub fn update<'a, U>(
        &mut self,
        pressed: impl IntoIterator<Item = &'a str>,
        ui: &mut U,
    ) -> Option<bool>
    where
        U: UiCollaborator + ?Sized,
    {
        let toggled = pressed.into_iter().any(|k| k == self.config.toggle_key);
        if !toggled {
            return None;
        }
        let next = !self.enabled;
        self.set_enabled(next, ui);
        Some(next)
    }

    /// Enables or disables the editor. Returns `false` if nothing changed.
    ///
    /// Enabling shows the toolbar. Disabling hides the toolbar and any open
    /// picker dialog; the pen mode and selections are kept for next time.
    pub fn set_enabled<U>(&mut self, enabled: bool, ui: &mut U) -> bool
    where
        U: UiCollaborator + ?Sized,
    {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;

        if enabled {
            ui.show_toolbar();
        } else {
            ui.hide_toolbar();
            self.close_dialog(ui);
        }

        tracing::info!(enabled, pen_mode = %self.pen_mode, "editor toggled");
        true
    }

    // -- Toolbar and picker -----------------------------------------------

    /// Handles a toolbar button. Returns `true` if the click was consumed,
    /// meaning the host should not also treat it as a map click.
    ///
    /// The picker buttons open their dialog, or close it if that same
    /// dialog is already open.
    pub fn select_tool<U>(&mut self, tool: Tool, ui: &mut U) -> bool
    where
        U: UiCollaborator + ?Sized,
    {
        if !self.enabled {
            return false;
        }
        match tool {
            Tool::TilePicker => {
                let content = self.tile_dialog();
                self.toggle_dialog(content, ui);
            }
            Tool::ObjectPicker => {
                let content = DialogContent::Objects {
                    kinds: self.config.object_palette.clone(),
                };
                self.toggle_dialog(content, ui);
            }
            Tool::Move => {
                self.pen_mode = PenMode::Move;
            }
        }
        true
    }

    /// Handles a click on the tile sheet in the picker dialog.
    ///
    /// `(local_x, local_y)` is the click relative to the sheet's top-left
    /// corner and `(width, height)` the sheet's on-screen size. Sheet rows
    /// are numbered from the bottom. Selects the tile, switches to `Tile`
    /// mode, and closes the dialog.
    pub fn pick_tile<U>(
        &mut self,
        local_x: f32,
        local_y: f32,
        width: f32,
        height: f32,
        ui: &mut U,
    ) -> bool
    where
        U: UiCollaborator + ?Sized,
    {
        if !self.enabled || width <= 0.0 || height <= 0.0 {
            return false;
        }
        let n = self.config.tiles_per_row as f32;
        let col = (local_x / width * n).floor().clamp(0.0, n - 1.0) as i32;
        let row = ((height - local_y) / height * n).floor().clamp(0.0, n - 1.0) as i32;

        self.selected_tile.index = row * self.config.tiles_per_row as i32 + col;
        self.pen_mode = PenMode::Tile;
        self.close_dialog(ui);

        tracing::debug!(tile = ?self.selected_tile, "tile picked from sheet");
        true
    }

    /// Switches the picker to the next tile sheet, wrapping around.
    pub fn next_tile_set<U>(&mut self, ui: &mut U) -> bool
    where
        U: UiCollaborator + ?Sized,
    {
        if !self.enabled {
            return false;
        }
        let count = self.config.tile_sets.len();
        self.selected_tile.tile_set = (self.selected_tile.tile_set + 1) % count;

        if matches!(self.dialog, Some(DialogContent::Tiles { .. })) {
            let content = self.tile_dialog();
            ui.show_dialog(&content);
            self.dialog = Some(content);
        }
        true
    }

    /// Handles a click on an object in the picker: selects the kind,
    /// switches to `Object` mode, and closes the dialog.
    pub fn pick_object<U>(&mut self, kind: ObjectKind, ui: &mut U) -> bool
    where
        U: UiCollaborator + ?Sized,
    {
        if !self.enabled {
            return false;
        }
        self.selected_object = Some(kind);
        self.pen_mode = PenMode::Object;
        self.close_dialog(ui);
        true
    }

    /// Selects a tile picked from elsewhere (e.g. ctrl-click on the map).
    ///
    /// Ignored while disabled or for the empty-tile sentinel. Otherwise
    /// switches to `Tile` mode with `tile` selected.
    pub fn use_tile(&mut self, tile: MapTile) -> bool {
        if !self.enabled || tile.is_empty() {
            return false;
        }
        self.pen_mode = PenMode::Tile;
        self.selected_tile = tile;
        true
    }

    // -- Drawing ----------------------------------------------------------

    /// Handles a pointer press or drag at screen `(x, y)`.
    ///
    /// Returns `Ok(false)` without touching anything when disabled, and
    /// `Ok(true)` otherwise, whether or not an edit came out of it.
    ///
    /// # Errors
    /// [`EditorError::Protocol`] if the selected object kind has no wire
    /// name. Nothing is queued in that case.
    pub fn draw<M, S>(
        &mut self,
        x: f32,
        y: f32,
        map: &mut M,
        sink: &mut S,
    ) -> Result<bool, EditorError>
    where
        M: MapCollaborator + ?Sized,
        S: EventSink + ?Sized,
    {
        if !self.enabled {
            return Ok(false);
        }
        match self.pen_mode {
            PenMode::Tile => self.draw_tile(x, y, map, sink),
            PenMode::Object => self.draw_object(x, y, map, sink)?,
            PenMode::Move => self.draw_move(x, y, map, sink),
        }
        Ok(true)
    }

    fn draw_tile<M, S>(&self, x: f32, y: f32, map: &mut M, sink: &mut S)
    where
        M: MapCollaborator + ?Sized,
        S: EventSink + ?Sized,
    {
        let cell = map.cell_from_screen(x, y);
        let tile = self.selected_tile;

        // Dragging across an already-painted cell must not flood the
        // server with identical edits.
        if map.tile_at(cell) == Some(tile) {
            return;
        }

        map.set_tile(cell, tile);
        sink.enqueue(
            EditEvent::Tile(TileEdit {
                x: cell.x,
                y: cell.y,
                tile_set: tile.tile_set as i32,
                tile_index: tile.index,
            })
            .into(),
        );
        tracing::debug!(?cell, ?tile, "tile painted");
    }

    fn draw_object<M, S>(
        &self,
        x: f32,
        y: f32,
        map: &mut M,
        sink: &mut S,
    ) -> Result<(), EditorError>
    where
        M: MapCollaborator + ?Sized,
        S: EventSink + ?Sized,
    {
        let Some(kind) = self.selected_object else {
            tracing::debug!("object mode without a selected kind; ignoring click");
            return Ok(());
        };
        // Resolve the wire name now so a palette/registry mismatch shows up
        // at the click, not as a dropped batch a frame later.
        let name = kind.name()?;
        let pos = map.world_from_screen(x, y);

        sink.enqueue(EditEvent::AddObj(ObjDef::add(kind, pos.into())).into());
        tracing::debug!(kind = name, ?pos, "object add requested");
        Ok(())
    }

    fn draw_move<M, S>(&self, x: f32, y: f32, map: &mut M, sink: &mut S)
    where
        M: MapCollaborator + ?Sized,
        S: EventSink + ?Sized,
    {
        let pos = map.world_from_screen(x, y);
        let Some(object) = map.first_object_at(pos) else {
            return;
        };

        object.pos = pos;
        sink.enqueue(
            EditEvent::MoveObj(ObjDef::moved(object.id.clone(), pos.into())).into(),
        );
        tracing::debug!(id = %object.id, ?pos, "object moved");
    }

    // -- Dialog helpers ---------------------------------------------------

    fn tile_dialog(&self) -> DialogContent {
        let tile_set = self.selected_tile.tile_set;
        // `use_tile` accepts tiles from the map, whose set may not be one
        // this client has a sheet for.
        let image = self
            .config
            .tile_sets
            .get(tile_set)
            .cloned()
            .unwrap_or_default();
        DialogContent::Tiles { tile_set, image }
    }

    fn toggle_dialog<U>(&mut self, content: DialogContent, ui: &mut U)
    where
        U: UiCollaborator + ?Sized,
    {
        if self.dialog.as_ref() == Some(&content) {
            self.close_dialog(ui);
        } else {
            ui.show_dialog(&content);
            self.dialog = Some(content);
        }
    }

    fn close_dialog<U>(&mut self, ui: &mut U)
    where
        U: UiCollaborator + ?Sized,
    {
        if self.dialog.take().is_some() {
            ui.hide_dialog();
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
