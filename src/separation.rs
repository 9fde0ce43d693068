use crate::{
    error::GenerationError,
    rect::{Rect, COORD_LIMIT},
    room::Room,
};

fn to_coord(v: f32) -> i32 {
    let limit = COORD_LIMIT as f32;

    v.floor().max(-limit).min(limit) as i32
}

/// Pushes two overlapping rectangles apart along the axis with the smaller penetration depth.
/// Each rectangle takes half of the correction, scaled by `multiplier`, and is then floored
/// back onto the integer grid, never leaving `[-COORD_LIMIT, COORD_LIMIT]`. Ties go to the y
/// axis.
pub fn push_rects_apart(a: Rect, b: Rect, multiplier: f32) -> (Rect, Rect) {
    let dx = (a.right() - b.left()).min(a.left() - b.right());
    let dy = (a.bottom() - b.top()).min(a.top() - b.bottom());

    let (mut a, mut b) = (a, b);
    if dx.abs() < dy.abs() {
        let half = dx as f32 / 2.0 * multiplier;
        a.x = to_coord(a.x as f32 - half);
        b.x = to_coord(b.x as f32 + half);
    } else {
        let half = dy as f32 / 2.0 * multiplier;
        a.y = to_coord(a.y as f32 - half);
        b.y = to_coord(b.y as f32 + half);
    }

    (a, b)
}

/// One sweep over all unordered pairs. Returns true iff any pair overlapped.
fn relax_once(rooms: &mut [Room], multiplier: f32) -> bool {
    let num_rooms = rooms.len();
    let mut moved = false;
    for i in 0..num_rooms {
        for j in i + 1..num_rooms {
            let (r1, r2) = (rooms[i].rect, rooms[j].rect);
            if !r1.overlaps(&r2) {
                continue;
            }

            moved = true;
            let (r1, r2) = push_rects_apart(r1, r2, multiplier);
            rooms[i].rect = r1;
            rooms[j].rect = r2;
        }
    }

    moved
}

pub fn any_overlaps(rooms: &[Room]) -> bool {
    rooms
        .iter()
        .enumerate()
        .any(|(i, a)| rooms[i + 1..].iter().any(|b| a.rect.overlaps(&b.rect)))
}

/// Relaxes the layout until no two rooms overlap, running at most `max_passes` sweeps.
///
/// On success returns the number of sweeps that had to move something. Gives up with
/// `GenerationError::NonConvergence`, carrying the current layout, once the cap is spent.
pub fn resolve_room_overlaps(
    rooms: &mut [Room],
    multiplier: f32,
    max_passes: usize,
) -> Result<usize, GenerationError> {
    // PERF: N^2 per pass gets slow for >1000 rooms
    for pass in 0..max_passes {
        if !relax_once(rooms, multiplier) {
            return Ok(pass);
        }
    }

    if any_overlaps(rooms) {
        log::warn!(
            "Rooms still overlap after {} separation passes",
            max_passes
        );
        Err(GenerationError::NonConvergence {
            passes: max_passes,
            rooms: rooms.to_vec(),
        })
    } else {
        Ok(max_passes)
    }
}
