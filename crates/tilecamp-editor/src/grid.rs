//! A plain in-memory [`MapCollaborator`].
//!
//! Tiles are one world unit square, so a cell is the floor of a world
//! position. Screen points map to the world through a [`Viewport`]. Good
//! enough for headless clients, bots, and tests; a rendering host would
//! implement the trait over its own scene instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Cell, MapCollaborator, MapTile, WorldObject, WorldPos};

/// How screen pixels map onto the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// World position under screen pixel `(0, 0)`.
    pub origin: WorldPos,
    /// Screen pixels per world unit. Must be positive.
    pub pixels_per_unit: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: WorldPos::default(),
            pixels_per_unit: 1.0,
        }
    }
}

/// Tiles in a hash map, objects in insertion order.
#[derive(Debug, Clone)]
pub struct GridMap {
    tiles: HashMap<Cell, MapTile>,
    objects: Vec<WorldObject>,
    viewport: Viewport,
    /// How close a click must be to an object to hit it.
    pick_radius: f32,
}

impl GridMap {
    /// Default hit radius for object lookups, in world units.
    pub const DEFAULT_PICK_RADIUS: f32 = 0.5;

    pub fn new(viewport: Viewport) -> Self {
        Self {
            tiles: HashMap::new(),
            objects: Vec::new(),
            viewport,
            pick_radius: Self::DEFAULT_PICK_RADIUS,
        }
    }

    pub fn with_pick_radius(mut self, radius: f32) -> Self {
        self.pick_radius = radius;
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Pans or zooms the view.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of painted cells.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All objects, oldest first.
    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    /// Looks up an object by id.
    pub fn object(&self, id: &str) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == id)
    }
}

impl Default for GridMap {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapCollaborator for GridMap {
    fn cell_from_screen(&self, x: f32, y: f32) -> Cell {
        let pos = self.world_from_screen(x, y);
        Cell::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    fn world_from_screen(&self, x: f32, y: f32) -> WorldPos {
        let v = self.viewport;
        WorldPos::new(
            v.origin.x + x / v.pixels_per_unit,
            v.origin.y + y / v.pixels_per_unit,
        )
    }

    fn tile_at(&self, cell: Cell) -> Option<MapTile> {
        self.tiles.get(&cell).copied()
    }

    fn set_tile(&mut self, cell: Cell, tile: MapTile) {
        if tile.is_empty() {
            self.tiles.remove(&cell);
        } else {
            self.tiles.insert(cell, tile);
        }
    }

    fn first_object_at(&mut self, pos: WorldPos) -> Option<&mut WorldObject> {
        let radius = self.pick_radius;
        self.objects
            .iter_mut()
            .find(|o| o.pos.distance(pos) <= radius)
    }

    fn upsert_object(&mut self, object: WorldObject) {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => self.objects.push(object),
        }
    }

    fn remove_object(&mut self, id: &str) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        self.objects.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecamp_protocol::ObjectKind;

    fn obj(id: &str, x: f32, y: f32) -> WorldObject {
        WorldObject {
            id: id.into(),
            kind: ObjectKind::Butterfly,
            pos: WorldPos::new(x, y),
        }
    }

    #[test]
    fn test_screen_to_cell_uses_viewport() {
        let map = GridMap::new(Viewport {
            origin: WorldPos::new(-10.0, 5.0),
            pixels_per_unit: 16.0,
        });
        // 40px / 16 = 2.5 units → world x -7.5 → cell -8.
        assert_eq!(map.cell_from_screen(40.0, 8.0), Cell::new(-8, 5));
        assert_eq!(map.world_from_screen(40.0, 8.0), WorldPos::new(-7.5, 5.5));
    }

    #[test]
    fn test_set_viewport_pans_the_view() {
        let mut map = GridMap::default();
        map.set_viewport(Viewport {
            origin: WorldPos::new(100.0, 0.0),
            ..map.viewport()
        });
        assert_eq!(map.cell_from_screen(0.5, 0.5), Cell::new(100, 0));
    }

    #[test]
    fn test_with_pick_radius_widens_hits() {
        let mut map = GridMap::default().with_pick_radius(2.0);
        map.upsert_object(obj("a", 0.0, 0.0));
        assert_eq!(map.first_object_at(WorldPos::new(1.5, 0.0)).unwrap().id, "a");
    }

    #[test]
    fn test_set_tile_then_tile_at() {
        let mut map = GridMap::default();
        map.set_tile(Cell::new(1, 2), MapTile::new(1, 9));
        assert_eq!(map.tile_at(Cell::new(1, 2)), Some(MapTile::new(1, 9)));
        assert_eq!(map.tile_at(Cell::new(2, 1)), None);
    }

    #[test]
    fn test_set_empty_tile_clears_cell() {
        let mut map = GridMap::default();
        map.set_tile(Cell::new(0, 0), MapTile::new(0, 3));
        map.set_tile(Cell::new(0, 0), MapTile::EMPTY);
        assert_eq!(map.tile_count(), 0);
    }

    #[test]
    fn test_pick_tile_on_empty_cell_is_sentinel() {
        let map = GridMap::default();
        assert!(map.pick_tile(3.0, 3.0).is_empty());
    }

    #[test]
    fn test_first_object_at_respects_radius_and_order() {
        let mut map = GridMap::default();
        map.upsert_object(obj("a", 0.0, 0.0));
        map.upsert_object(obj("b", 0.2, 0.0));

        assert_eq!(map.first_object_at(WorldPos::new(0.1, 0.0)).unwrap().id, "a");
        assert!(map.first_object_at(WorldPos::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut map = GridMap::default();
        map.upsert_object(obj("a", 0.0, 0.0));
        map.upsert_object(obj("a", 4.0, 4.0));

        assert_eq!(map.objects().len(), 1);
        assert_eq!(map.object("a").unwrap().pos, WorldPos::new(4.0, 4.0));
    }

    #[test]
    fn test_remove_object_missing_returns_false() {
        let mut map = GridMap::default();
        map.upsert_object(obj("a", 0.0, 0.0));
        assert!(map.remove_object("a"));
        assert!(!map.remove_object("a"));
    }
}
