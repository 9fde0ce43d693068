use crate::{
    rect::Rect,
    room::{Room, RoomId},
};

use rand::{prelude::*, rngs::SmallRng};
use rand_distr::{Distribution, Uniform};
use stats::OnlineStats;
use std::f32::consts::PI;

pub fn small_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Folds `s`, the sum of two unit uniforms, back into `[0, 1]`.
pub fn fold_radial(s: f32) -> f32 {
    if s > 1.0 {
        2.0 - s
    } else {
        s
    }
}

/// Points in a disk of `radius` around the origin. The radial fraction is `fold_radial` of two
/// uniform draws, so its density is triangular rather than uniform over the disk's area.
#[derive(Clone, Copy, Debug)]
pub struct DiskDist {
    pub radius: f32,
}

impl Distribution<(f32, f32)> for DiskDist {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        let theta = 2.0 * PI * rng.gen::<f32>();
        let rho = fold_radial(rng.gen::<f32>() + rng.gen::<f32>());

        (
            self.radius * rho * theta.cos(),
            self.radius * rho * theta.sin(),
        )
    }
}

pub struct RoomSizeDist {
    pub width: Uniform<i32>,
    pub height: Uniform<i32>,
}

impl RoomSizeDist {
    /// Both ranges are inclusive. Callers must ensure `min <= max`.
    pub fn new(width: (i32, i32), height: (i32, i32)) -> Self {
        RoomSizeDist {
            width: Uniform::new_inclusive(width.0, width.1),
            height: Uniform::new_inclusive(height.0, height.1),
        }
    }
}

impl Distribution<(i32, i32)> for RoomSizeDist {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, i32) {
        let width = rng.sample(self.width);
        let height = rng.sample(self.height);

        (width, height)
    }
}

/// Places `num_rooms` rooms at random points of a disk of `radius`, shifted by `(radius,
/// radius)` so the disk sits in positive coordinates.
pub fn sample_rooms(
    num_rooms: usize,
    radius: f32,
    size_distr: &RoomSizeDist,
    rng: &mut impl Rng,
) -> Vec<Room> {
    let location_distr = DiskDist { radius };
    let mut widths = OnlineStats::new();
    let mut heights = OnlineStats::new();

    let rooms: Vec<Room> = (0..num_rooms)
        .map(|i| {
            let (px, py) = location_distr.sample(rng);
            let (width, height) = size_distr.sample(rng);
            widths.add(width);
            heights.add(height);

            let rect = Rect::new(
                (px + radius).round() as i32,
                (py + radius).round() as i32,
                width,
                height,
            );

            Room::new(RoomId(i), rect)
        })
        .collect();

    if !rooms.is_empty() {
        log::debug!(
            "Room widths: mean = {:.2}, std dev = {:.2}; heights: mean = {:.2}, std dev = {:.2}",
            widths.mean(),
            widths.stddev(),
            heights.mean(),
            heights.stddev()
        );
    }

    rooms
}
