use crate::{
    error::GenerationError,
    rect::{Point, Rect},
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[repr(u8)]
pub enum TileType {
    Empty = 0,
    MainRoom,
    /// Floor of a secondary room, i.e. a non-main room kept because a hall runs through it.
    HallRoom,
    Hall,
}

impl Default for TileType {
    fn default() -> Self {
        TileType::Empty
    }
}

/// The most cells a rasterized grid may hold.
pub const MAX_TILES: usize = 1 << 26;

/// Implement this to let a generated dungeon write its tiles into your own map.
pub trait TileEncoder {
    /// `point` is in world coordinates. Only non-empty tiles are encoded.
    fn encode_tile(&mut self, point: &Point, tile: TileType);
}

/// Row-major grid of tiles covering `[origin, origin + (width, height))` in world space.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct TileGrid {
    origin: Point,
    width: usize,
    height: usize,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// An all-empty grid covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        let width = bounds.width.max(0) as usize;
        let height = bounds.height.max(0) as usize;

        TileGrid {
            origin: bounds.min(),
            width,
            height,
            tiles: vec![TileType::Empty; width * height],
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True iff the grid has zero area.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The world-space rectangle the grid covers.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.width as i32,
            self.height as i32,
        )
    }

    /// Looks up a tile by grid coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<TileType> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    fn world_index(&self, p: &Point) -> Option<usize> {
        let x = p.x - self.origin.x;
        let y = p.y - self.origin.y;
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }

        Some(y as usize * self.width + x as usize)
    }

    /// Looks up a tile by world coordinates.
    pub fn tile_at(&self, p: &Point) -> Option<TileType> {
        self.world_index(p).map(|i| self.tiles[i])
    }

    /// Paints `tile` into every cell of `rect` that is still empty. Cells outside the grid are
    /// ignored. Returns the number of cells painted.
    pub fn paint_if_empty(&mut self, rect: &Rect, tile: TileType) -> usize {
        let mut num_painted = 0;
        for p in rect.points() {
            if let Some(i) = self.world_index(&p) {
                if self.tiles[i] == TileType::Empty {
                    self.tiles[i] = tile;
                    num_painted += 1;
                }
            }
        }

        num_painted
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Every cell with its world coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Point, TileType)> + '_ {
        let (origin, width) = (self.origin, self.width);
        self.tiles.iter().enumerate().map(move |(i, t)| {
            let p = Point::new(origin.x + (i % width) as i32, origin.y + (i / width) as i32);
            (p, *t)
        })
    }
}

pub fn bounding_rect<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc, r| match acc {
        None => Some(*r),
        Some(b) => Some(b.union(r)),
    })
}

/// Paints main rooms, then secondary rooms, then halls into a grid sized to their bounding box.
/// A cell keeps the first tile painted into it, so room floors always win over corridors.
///
/// Returns a zero-area grid when there is no geometry at all, and `GridTooLarge` instead of
/// allocating when the bounding box spans more than `MAX_TILES` cells.
pub fn rasterize(
    main_rooms: &[Rect],
    secondary_rooms: &[Rect],
    halls: &[Rect],
) -> Result<TileGrid, GenerationError> {
    let layers = [
        (main_rooms, TileType::MainRoom),
        (secondary_rooms, TileType::HallRoom),
        (halls, TileType::Hall),
    ];

    let bounds = match bounding_rect(layers.iter().flat_map(|(rects, _)| rects.iter())) {
        Some(b) => b,
        None => return Ok(TileGrid::default()),
    };
    let num_tiles = (bounds.width.max(0) as usize).saturating_mul(bounds.height.max(0) as usize);
    if num_tiles > MAX_TILES {
        return Err(GenerationError::GridTooLarge {
            width: bounds.width,
            height: bounds.height,
        });
    }

    let mut grid = TileGrid::new(bounds);
    for (rects, tile) in layers.iter() {
        let num_painted: usize = rects.iter().map(|r| grid.paint_if_empty(r, *tile)).sum();
        log::debug!("Painted {} {:?} tiles", num_painted, tile);
    }

    Ok(grid)
}
