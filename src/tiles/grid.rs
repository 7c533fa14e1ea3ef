//! Visible tile grid
//!
//! Derives which tiles cover the viewport (plus a one-tile margin on every
//! side) and where each one is drawn. Columns wrap around the antimeridian;
//! rows beyond the poles are dropped, since Web Mercator has nothing there.

use crate::{
    core::{
        constants::GRID_OVERSCAN,
        geo::{tiles_per_axis, wrap_tile_x, Point, TileCoord},
        viewport::Viewport,
    },
    prelude::HashSet,
};
use serde::{Deserialize, Serialize};

/// One visible tile and its draw offset inside the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Column wrapped into `[0, 2^zoom)`
    pub x: u32,
    /// Row, always inside `[0, 2^zoom)`
    pub y: u32,
    /// Pixel offset of the tile's top-left corner from the viewport's top-left corner
    pub left: f64,
    pub top: f64,
}

impl TileDescriptor {
    pub fn coord(&self, zoom: u8) -> TileCoord {
        TileCoord::new(self.x, self.y, zoom)
    }
}

/// Dimensions and origin of the grid, in tile units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    /// Unwrapped column of the leftmost grid column
    pub start_col: i64,
    /// Unclipped row of the topmost grid row
    pub start_row: i64,
}

impl GridLayout {
    /// Computes the layout for a viewport: enough tiles to span it, plus overscan
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let tile_size = viewport.tile_size() as f64;
        let size = viewport.size();
        let cols = ((size.x / tile_size).ceil().max(0.0) as u32).saturating_add(GRID_OVERSCAN);
        let rows = ((size.y / tile_size).ceil().max(0.0) as u32).saturating_add(GRID_OVERSCAN);

        let center = viewport.pixel_center().multiply(1.0 / tile_size);
        let start_col = (center.x - cols as f64 / 2.0).floor() as i64;
        let start_row = (center.y - rows as f64 / 2.0).floor() as i64;

        Self {
            cols,
            rows,
            start_col,
            start_row,
        }
    }
}

/// The ordered (row-major) set of tiles needed to draw a viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub zoom: u8,
    pub tile_size: u32,
    pub layout: GridLayout,
    pub tiles: Vec<TileDescriptor>,
}

impl TileGrid {
    /// Builds the grid for the viewport's current pixel center and zoom.
    ///
    /// A tile with unwrapped index `(tx, ty)` is drawn at
    /// `size / 2 + (tx, ty) * tile_size - pixel_center`, which puts the
    /// fractional pixel center exactly on the middle of the viewport.
    pub fn compute(viewport: &Viewport) -> Self {
        let layout = GridLayout::for_viewport(viewport);
        let zoom = viewport.zoom();
        let max_tiles = tiles_per_axis(zoom) as i64;
        let tile_size = viewport.tile_size() as f64;
        let origin = viewport
            .size()
            .multiply(0.5)
            .subtract(&viewport.pixel_center())
            .add(&Point::new(
                layout.start_col as f64 * tile_size,
                layout.start_row as f64 * tile_size,
            ));

        let first_row = layout.start_row.max(0);
        let end_row = (layout.start_row + layout.rows as i64).min(max_tiles);
        let visible_rows = (end_row - first_row).max(0) as usize;
        let mut tiles = Vec::with_capacity(visible_rows.saturating_mul(layout.cols as usize));
        for r in 0..layout.rows {
            let ty = layout.start_row + r as i64;
            if ty < 0 || ty >= max_tiles {
                continue;
            }
            for c in 0..layout.cols {
                let tx = layout.start_col + c as i64;
                tiles.push(TileDescriptor {
                    x: wrap_tile_x(tx, zoom),
                    y: ty as u32,
                    left: origin.x + c as f64 * tile_size,
                    top: origin.y + r as f64 * tile_size,
                });
            }
        }

        Self {
            zoom,
            tile_size: viewport.tile_size(),
            layout,
            tiles,
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter()
    }

    /// Distinct tiles in the grid. A narrow world can show the same tile twice.
    pub fn keys(&self) -> HashSet<TileCoord> {
        self.tiles.iter().map(|tile| tile.coord(self.zoom)).collect()
    }
}

/// Tiles that entered or left the view between two grids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileSetDiff {
    pub added: Vec<TileCoord>,
    pub removed: Vec<TileCoord>,
}

impl TileSetDiff {
    pub fn between(previous: &HashSet<TileCoord>, current: &HashSet<TileCoord>) -> Self {
        let mut added: Vec<_> = current.difference(previous).copied().collect();
        let mut removed: Vec<_> = previous.difference(current).copied().collect();
        added.sort_by_key(|c| (c.z, c.y, c.x));
        removed.sort_by_key(|c| (c.z, c.y, c.x));
        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
