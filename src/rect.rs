use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Bound on how far from the origin a room may be pushed. Leaves room for any valid width or
/// padding to be added without overflowing `i32`.
pub const COORD_LIMIT: i32 = 1 << 29;

/// An axis-aligned rectangle of whole tiles. `y` grows downward, so `top` is the minimum row
/// and `bottom` is one past the maximum row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    pub fn min(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Strict overlap: rectangles that only share an edge or a corner do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }

    /// Squared distance between the centers of two rectangles.
    pub fn center_distance_sq(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();

        (ax - bx).powi(2) + (ay - by).powi(2)
    }

    /// Grows the rectangle by `amount` tiles on every side.
    pub fn padded(&self, amount: i32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2 * amount,
            self.height + 2 * amount,
        )
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect::new(left, top, right - left, bottom - top)
    }

    /// Iterates over every tile in `[left, right) x [top, bottom)`, row by row.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let Rect {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height.max(0))
            .flat_map(move |py| (x..x + width.max(0)).map(move |px| Point::new(px, py)))
    }
}
