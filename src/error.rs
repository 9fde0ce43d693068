use crate::{
    map_types::dungeon::{MAX_DIMENSION, MAX_ROOM_RADIUS, MAX_SEPARATION_MULTIPLIER},
    room::Room,
    tile::MAX_TILES,
};

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("room radius must be in (0, {max}], got {0}", max = MAX_ROOM_RADIUS)]
    RoomRadius(f32),

    #[error("{name} must be at least 1, got {value}")]
    NonPositiveDimension { name: &'static str, value: i32 },

    #[error("{min_name} ({min}) exceeds {max_name} ({max})")]
    InvertedBounds {
        min_name: &'static str,
        min: i32,
        max_name: &'static str,
        max: i32,
    },

    #[error("{name} must be at most {max}, got {value}", max = MAX_DIMENSION)]
    DimensionTooLarge { name: &'static str, value: i32 },

    #[error("hall edge offset must be in [0, {max}], got {0}", max = MAX_DIMENSION)]
    HallEdgeOffset(i32),

    #[error("main room fraction must be a non-negative finite number, got {0}")]
    MainRoomFraction(f32),

    #[error(
        "separation multiplier must be in [1, {max}], got {0}",
        max = MAX_SEPARATION_MULTIPLIER
    )]
    SeparationMultiplier(f32),

    #[error("max separation passes must be at least 1")]
    NoSeparationPasses,

    #[error("failed to parse dungeon spec: {0}")]
    Parse(String),

    #[error("failed to read dungeon spec: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The rooms still overlapped after the last allowed separation pass. `rooms` is the layout
    /// as it stood when the relaxation gave up.
    #[error("rooms still overlap after {passes} separation passes")]
    NonConvergence { passes: usize, rooms: Vec<Room> },

    /// The kept geometry spans more than `MAX_TILES` cells.
    #[error("a {width} x {height} tile grid exceeds the {max} tile limit", max = MAX_TILES)]
    GridTooLarge { width: i32, height: i32 },
}
