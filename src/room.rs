use crate::{hall::Hall, rect::Rect};

use serde::{Deserialize, Serialize};

/// Index of a room in sampler order. Stable for the whole generation, since rooms are flagged
/// rather than removed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct RoomId(pub usize);

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub rect: Rect,
    pub is_main: bool,
    /// Set on non-main rooms that touch a hall, meaning they belong to the dungeon as
    /// secondary rooms.
    pub is_hall: bool,
    pub disabled: bool,
}

impl Room {
    pub fn new(id: RoomId, rect: Rect) -> Self {
        Room {
            id,
            rect,
            is_main: false,
            is_hall: false,
            disabled: false,
        }
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_main && self.is_hall && !self.disabled
    }
}

/// Flags every room strictly wider than `max_width * fraction` and strictly taller than
/// `max_height * fraction` as a main room. Returns the IDs of the main rooms in sampler order.
pub fn select_main_rooms(
    rooms: &mut [Room],
    max_width: i32,
    max_height: i32,
    fraction: f32,
) -> Vec<RoomId> {
    let min_width = max_width as f32 * fraction;
    let min_height = max_height as f32 * fraction;

    rooms
        .iter_mut()
        .filter(|r| r.rect.width as f32 > min_width && r.rect.height as f32 > min_height)
        .map(|r| {
            r.is_main = true;
            r.id
        })
        .collect()
}

/// Keeps the non-main rooms that overlap at least one hall and disables the rest. Main rooms
/// are never touched. Returns the number of kept secondary rooms.
pub fn classify_secondary_rooms(rooms: &mut [Room], halls: &[Hall]) -> usize {
    let mut num_kept = 0;
    for room in rooms.iter_mut().filter(|r| !r.is_main) {
        if halls.iter().any(|h| h.rect.overlaps(&room.rect)) {
            room.is_hall = true;
            num_kept += 1;
        } else {
            room.disabled = true;
        }
    }

    num_kept
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
