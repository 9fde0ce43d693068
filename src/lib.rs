//! Procedural 2D dungeon layouts: scattered rooms pushed apart, the largest rooms joined by a
//! relative neighborhood graph, corridors built along its edges, and the result painted into a
//! tile grid.

pub mod error;
pub mod graph;
pub mod hall;
pub mod map_types;
pub mod pipeline;
pub mod rect;
pub mod room;
pub mod sampling;
pub mod separation;
pub mod tile;

mod symmetric_map;

pub use error::{ConfigError, GenerationError};
pub use map_types::dungeon::{Dungeon, DungeonSpec, DungeonStatus};
pub use pipeline::{GenerationSteps, Snapshot, Stage};
pub use rect::{Point, Rect};
pub use room::{Room, RoomId};
pub use tile::{TileEncoder, TileGrid, TileType};

/// Generates the dungeon described by `spec` for `seed`.
pub fn generate(spec: &DungeonSpec, seed: u64) -> Result<Dungeon, GenerationError> {
    spec.generate(seed)
}
