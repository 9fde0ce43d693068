use crate::{
    graph::RoomGraph,
    rect::Rect,
    room::{Room, RoomId},
};

use petgraph::visit::EdgeRef;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Corridor geometry joining the two rooms of one graph edge.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Hall {
    pub rect: Rect,
    pub connects: (RoomId, RoomId),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HallShape {
    /// One segment bridging a vertical gap between rooms that share enough x extent.
    Vertical(Rect),
    /// One segment bridging a horizontal gap between rooms that share enough y extent.
    Horizontal(Rect),
    /// An L of a horizontal and a vertical segment meeting at the bend.
    Dogleg { horizontal: Rect, vertical: Rect },
}

impl HallShape {
    pub fn rects(&self) -> Vec<Rect> {
        match *self {
            HallShape::Vertical(r) | HallShape::Horizontal(r) => vec![r],
            HallShape::Dogleg {
                horizontal,
                vertical,
            } => vec![horizontal, vertical],
        }
    }
}

/// Picks the corridor shape for rooms `a` and `b`.
///
/// Straight halls keep `edge_offset` tiles from the nearer room edge and are only used when the
/// rooms share more than `2 * edge_offset + hall_width` tiles along the other axis. Otherwise a
/// dogleg runs between the floored room centers, and one coin flip from `rng` decides whether it
/// bends at the right room's column or at the left room's column.
pub fn hall_shape(
    a: &Rect,
    b: &Rect,
    hall_width: i32,
    edge_offset: i32,
    rng: &mut impl Rng,
) -> HallShape {
    let min_shared = 2 * edge_offset + hall_width;

    if a.right() - b.left() > min_shared && b.right() - a.left() > min_shared {
        let x = a.right().min(b.right()) - edge_offset - hall_width;
        let (y, height) = if b.bottom() <= a.top() {
            (b.bottom(), a.top() - b.bottom())
        } else {
            (a.bottom(), (b.top() - a.bottom()).abs())
        };

        return HallShape::Vertical(Rect::new(x, y, hall_width, height));
    }

    if b.bottom() - a.top() > min_shared && a.bottom() - b.top() > min_shared {
        let (x, width) = if a.right() <= b.left() {
            (a.right(), b.left() - a.right())
        } else {
            (b.right(), (a.left() - b.right()).abs())
        };
        let y = a.bottom().min(b.bottom()) - edge_offset - hall_width;

        return HallShape::Horizontal(Rect::new(x, y, width, hall_width));
    }

    let (left, right) = if a.center().0 < b.center().0 {
        (a, b)
    } else {
        (b, a)
    };
    let (lx, ly) = left.center();
    let (rx, ry) = right.center();
    let (x, y) = (lx.floor(), ly.floor());
    let dx = (rx - x).floor() as i32;
    let dy = (ry - y).floor() as i32;
    let (x, y) = (x as i32, y as i32);

    let (horizontal_y, vertical_x) = if rng.gen_bool(0.5) {
        (y, x + dx)
    } else {
        (y + dy, x)
    };
    let vertical = if dy > 0 {
        Rect::new(vertical_x, y, hall_width, dy)
    } else {
        Rect::new(vertical_x, y + dy, hall_width, -dy)
    };

    HallShape::Dogleg {
        horizontal: Rect::new(x, horizontal_y, dx + hall_width, hall_width),
        vertical,
    }
}

/// Emits the halls for every edge of `graph`, in edge order, then pads each one by a tile on
/// every side so it overlaps the rooms it joins even where it only touched their edges.
pub fn synthesize_halls(
    graph: &RoomGraph,
    rooms: &[Room],
    hall_width: i32,
    edge_offset: i32,
    rng: &mut impl Rng,
) -> Vec<Hall> {
    let mut halls = Vec::new();
    for e in graph.edge_references() {
        let (a, b) = (graph[e.source()], graph[e.target()]);
        let shape = hall_shape(&rooms[a.0].rect, &rooms[b.0].rect, hall_width, edge_offset, rng);
        log::trace!("{:?} -> {:?}: {:?}", a, b, shape);

        halls.extend(shape.rects().into_iter().map(|rect| Hall {
            rect,
            connects: (a, b),
        }));
    }

    pad_halls(&mut halls);

    halls
}

pub fn pad_halls(halls: &mut [Hall]) {
    for h in halls.iter_mut() {
        h.rect = h.rect.padded(1);
    }
}
