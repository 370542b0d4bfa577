use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use bubble_core::input::Direction;

use crate::items::{Item, ItemDropTable, ItemKind};

/// Tile types for the arena grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    WallHard,
    WallSoft,
}

/// Integer grid coordinate. Signed so neighbour arithmetic can step off the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell `steps` away in `direction`.
    pub fn offset(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Cell containing the pixel point `(px, py)`.
    pub fn containing(px: f32, py: f32, tile_size: f32) -> Self {
        Self {
            x: (px / tile_size).floor() as i32,
            y: (py / tile_size).floor() as i32,
        }
    }
}

/// The tile matrix plus per-cell item occupancy.
///
/// Dimensions are fixed for the lifetime of a level. Hard walls never change;
/// [`GridWorld::destroy_soft_wall`] is the only path that mutates a wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridWorld {
    width: u32,
    height: u32,
    /// Tile data stored row-major (y * width + x).
    tiles: Vec<Tile>,
    items: BTreeMap<Cell, ItemKind>,
}

impl GridWorld {
    /// An all-empty grid. Level generation fills it in.
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; (width * height) as usize],
            items: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width as i32 && cell.y < self.height as i32
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Tile at `cell`. Everything outside the grid reads as hard wall.
    pub fn tile_at(&self, cell: Cell) -> Tile {
        self.index(cell).map_or(Tile::WallHard, |i| self.tiles[i])
    }

    /// Whether a mover may occupy `cell`. Soft walls are passable only with
    /// `pass_through_soft`; hard walls never are.
    pub fn is_walkable(&self, cell: Cell, pass_through_soft: bool) -> bool {
        match self.tile_at(cell) {
            Tile::Empty => true,
            Tile::WallSoft => pass_through_soft,
            Tile::WallHard => false,
        }
    }

    /// Used by level generation only.
    pub(crate) fn set_tile(&mut self, cell: Cell, tile: Tile) {
        if let Some(i) = self.index(cell) {
            self.tiles[i] = tile;
        }
    }

    /// Turn a soft wall into floor and maybe drop an item there.
    ///
    /// Returns the dropped item. Does nothing (and returns `None`) unless the
    /// cell currently holds a soft wall.
    pub fn destroy_soft_wall<R: Rng + ?Sized>(
        &mut self,
        cell: Cell,
        drops: &ItemDropTable,
        rng: &mut R,
    ) -> Option<ItemKind> {
        let i = self.index(cell)?;
        if self.tiles[i] != Tile::WallSoft {
            return None;
        }
        self.tiles[i] = Tile::Empty;
        let kind = drops.roll(rng)?;
        self.place_item(cell, kind).then_some(kind)
    }

    /// Put an item on an empty, unoccupied cell. Returns false if refused.
    pub fn place_item(&mut self, cell: Cell, kind: ItemKind) -> bool {
        if self.tile_at(cell) != Tile::Empty || self.items.contains_key(&cell) {
            return false;
        }
        self.items.insert(cell, kind);
        true
    }

    pub fn item_at(&self, cell: Cell) -> Option<ItemKind> {
        self.items.get(&cell).copied()
    }

    /// Remove and return the item at `cell`.
    pub fn consume_item(&mut self, cell: Cell) -> Option<ItemKind> {
        self.items.remove(&cell)
    }

    /// Items in cell order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.items.iter().map(|(&cell, &kind)| Item { cell, kind })
    }

    pub fn count_tiles(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Every in-bounds cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Cell::new(x, y)))
    }

    /// Pixel extent of the whole grid.
    pub fn pixel_size(&self, tile_size: f32) -> (f32, f32) {
        (self.width as f32 * tile_size, self.height as f32 * tile_size)
    }
}
