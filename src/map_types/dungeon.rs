use crate::{
    error::{ConfigError, GenerationError},
    hall::Hall,
    pipeline::{GenerationSteps, Pipeline},
    room::{Room, RoomId},
    symmetric_map::SymmetricMap,
    tile::{TileEncoder, TileGrid, TileType},
};

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const DEFAULT_MAX_SEPARATION_PASSES: usize = 10_000;

// Upper bounds that keep every coordinate, pad and hall offset well inside `i32`.
pub const MAX_ROOM_RADIUS: f32 = 1_000_000.0;
pub const MAX_DIMENSION: i32 = 100_000;
pub const MAX_SEPARATION_MULTIPLIER: f32 = 16.0;

/// Everything that shapes a dungeon apart from the seed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DungeonSpec {
    pub room_count: usize,
    /// Radius of the disk the rooms are scattered in before separation.
    pub room_radius: f32,
    pub room_min_width: i32,
    pub room_max_width: i32,
    pub room_min_height: i32,
    pub room_max_height: i32,
    pub hall_width: i32,
    /// Main rooms are strictly larger than this fraction of the maximum room size in both axes.
    pub main_room_fraction: f32,
    /// Tiles a straight hall keeps from the nearer edge of the rooms it joins.
    pub hall_edge_offset: i32,
    /// Values above 1 over-correct each push, which speeds up separation.
    pub separation_multiplier: f32,
    pub max_separation_passes: usize,
}

impl Default for DungeonSpec {
    fn default() -> Self {
        DungeonSpec {
            room_count: 50,
            room_radius: 60.0,
            room_min_width: 9,
            room_max_width: 30,
            room_min_height: 9,
            room_max_height: 30,
            hall_width: 3,
            main_room_fraction: 0.7,
            hall_edge_offset: 1,
            separation_multiplier: 1.1,
            max_separation_passes: DEFAULT_MAX_SEPARATION_PASSES,
        }
    }
}

fn check_dimension(name: &'static str, value: i32) -> Result<(), ConfigError> {
    if value < 1 {
        return Err(ConfigError::NonPositiveDimension { name, value });
    }
    if value > MAX_DIMENSION {
        return Err(ConfigError::DimensionTooLarge { name, value });
    }

    Ok(())
}

fn check_bounds(
    min_name: &'static str,
    min: i32,
    max_name: &'static str,
    max: i32,
) -> Result<(), ConfigError> {
    check_dimension(min_name, min)?;
    check_dimension(max_name, max)?;
    if min > max {
        return Err(ConfigError::InvertedBounds {
            min_name,
            min,
            max_name,
            max,
        });
    }

    Ok(())
}

impl DungeonSpec {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        ron::de::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;

        Self::from_ron_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.room_radius.is_finite()
            || self.room_radius <= 0.0
            || self.room_radius > MAX_ROOM_RADIUS
        {
            return Err(ConfigError::RoomRadius(self.room_radius));
        }
        check_bounds(
            "room_min_width",
            self.room_min_width,
            "room_max_width",
            self.room_max_width,
        )?;
        check_bounds(
            "room_min_height",
            self.room_min_height,
            "room_max_height",
            self.room_max_height,
        )?;
        check_dimension("hall_width", self.hall_width)?;
        if self.hall_edge_offset < 0 || self.hall_edge_offset > MAX_DIMENSION {
            return Err(ConfigError::HallEdgeOffset(self.hall_edge_offset));
        }
        if !self.main_room_fraction.is_finite() || self.main_room_fraction < 0.0 {
            return Err(ConfigError::MainRoomFraction(self.main_room_fraction));
        }
        if !self.separation_multiplier.is_finite()
            || self.separation_multiplier < 1.0
            || self.separation_multiplier > MAX_SEPARATION_MULTIPLIER
        {
            return Err(ConfigError::SeparationMultiplier(
                self.separation_multiplier,
            ));
        }
        if self.max_separation_passes == 0 {
            return Err(ConfigError::NoSeparationPasses);
        }

        Ok(())
    }

    /// Runs the whole pipeline for `seed`. The same spec and seed always produce the same
    /// dungeon.
    pub fn generate(&self, seed: u64) -> Result<Dungeon, GenerationError> {
        self.validate()?;

        let mut pipeline = Pipeline::start(self.clone(), seed);
        while let Some(stage) = pipeline.advance() {
            stage?;
        }

        Ok(pipeline.into_dungeon())
    }

    /// Like `generate`, but yields a snapshot after each stage.
    pub fn steps(&self, seed: u64) -> Result<GenerationSteps, ConfigError> {
        self.validate()?;

        Ok(GenerationSteps::new(self.clone(), seed))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DungeonStatus {
    Populated,
    /// No room was large enough to be a main room, so there is nothing to connect and the
    /// tile grid has zero area.
    NoMainRooms,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dungeon {
    /// Every sampled room in sampler order, including the disabled ones. `RoomId` indexes this.
    pub rooms: Vec<Room>,
    pub edges: Vec<(RoomId, RoomId)>,
    pub halls: Vec<Hall>,
    pub tiles: TileGrid,
    pub separation_passes: usize,
    hall_index: SymmetricMap<Vec<usize>>,
}

impl Dungeon {
    pub(crate) fn new(
        rooms: Vec<Room>,
        edges: Vec<(RoomId, RoomId)>,
        halls: Vec<Hall>,
        tiles: TileGrid,
        separation_passes: usize,
    ) -> Self {
        let mut hall_index: SymmetricMap<Vec<usize>> = SymmetricMap::new();
        for (i, h) in halls.iter().enumerate() {
            hall_index
                .get_or_default(h.connects.0, h.connects.1)
                .push(i);
        }

        Dungeon {
            rooms,
            edges,
            halls,
            tiles,
            separation_passes,
            hall_index,
        }
    }

    pub fn status(&self) -> DungeonStatus {
        if self.main_rooms().next().is_some() {
            DungeonStatus::Populated
        } else {
            DungeonStatus::NoMainRooms
        }
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    pub fn main_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.is_main)
    }

    pub fn secondary_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.is_secondary())
    }

    pub fn disabled_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.disabled)
    }

    /// The halls built for the graph edge between `a` and `b`, in either order.
    pub fn halls_between(&self, a: RoomId, b: RoomId) -> Vec<&Hall> {
        self.hall_index
            .get(a, b)
            .map(|ids| ids.iter().map(|i| &self.halls[*i]).collect())
            .unwrap_or_default()
    }

    /// Writes every non-empty tile into `encoder` at its world coordinates.
    pub fn encode_into(&self, encoder: &mut impl TileEncoder) {
        for (p, tile) in self.tiles.iter() {
            if tile != TileType::Empty {
                encoder.encode_tile(&p, tile);
            }
        }
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        rect::{Point, Rect},
        separation::any_overlaps,
        tile::{rasterize, MAX_TILES},
    };

    use quickcheck::{quickcheck, TestResult};
    use std::collections::HashMap;

    fn small_spec() -> DungeonSpec {
        DungeonSpec {
            room_count: 30,
            room_radius: 30.0,
            room_min_width: 4,
            room_max_width: 16,
            room_min_height: 4,
            room_max_height: 16,
            ..DungeonSpec::default()
        }
    }

    fn rects<'a>(rooms: impl Iterator<Item = &'a Room>) -> Vec<Rect> {
        rooms.map(|r| r.rect).collect()
    }

    #[test]
    fn test_default_spec_is_valid() {
        assert!(DungeonSpec::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_specs_are_rejected_before_generation() {
        let cases = vec![
            DungeonSpec {
                room_radius: 0.0,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                room_min_width: 0,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                room_min_height: 12,
                room_max_height: 11,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                hall_width: -2,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                hall_edge_offset: -1,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                main_room_fraction: f32::NAN,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                separation_multiplier: 0.9,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                max_separation_passes: 0,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                hall_edge_offset: i32::MAX,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                room_radius: 3.0e9,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                room_max_width: i32::MAX,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                hall_width: MAX_DIMENSION + 1,
                ..DungeonSpec::default()
            },
            DungeonSpec {
                separation_multiplier: 1.0e9,
                ..DungeonSpec::default()
            },
        ];

        for spec in cases {
            match spec.generate(0) {
                Err(GenerationError::InvalidConfiguration(_)) => {}
                other => panic!("{:?} was accepted: {:?}", spec, other),
            }
            assert!(spec.steps(0).is_err());
        }
    }

    #[test]
    fn test_inverted_bounds_name_both_fields() {
        let spec = DungeonSpec {
            room_min_width: 20,
            room_max_width: 10,
            ..DungeonSpec::default()
        };

        let message = spec.validate().unwrap_err().to_string();
        assert_eq!(message, "room_min_width (20) exceeds room_max_width (10)");
    }

    #[test]
    fn test_oversized_options_overflow_nothing() {
        let offset = DungeonSpec {
            hall_edge_offset: i32::MAX,
            ..DungeonSpec::default()
        };
        match offset.validate() {
            Err(ConfigError::HallEdgeOffset(v)) => assert_eq!(v, i32::MAX),
            other => panic!("expected a hall edge offset error, got {:?}", other),
        }

        let radius = DungeonSpec {
            room_count: 2,
            room_radius: 3.0e9,
            ..DungeonSpec::default()
        };
        match radius.generate(0) {
            Err(GenerationError::InvalidConfiguration(ConfigError::RoomRadius(_))) => {}
            other => panic!("expected a room radius error, got {:?}", other),
        }

        let width = DungeonSpec {
            room_max_width: i32::MAX,
            ..DungeonSpec::default()
        };
        match width.validate() {
            Err(ConfigError::DimensionTooLarge { name, value }) => {
                assert_eq!((name, value), ("room_max_width", i32::MAX));
            }
            other => panic!("expected a dimension error, got {:?}", other),
        }
    }

    #[test]
    fn test_widest_valid_disk_is_refused_at_rasterization() {
        let spec = DungeonSpec {
            room_count: 2,
            room_radius: MAX_ROOM_RADIUS,
            main_room_fraction: 0.0,
            ..DungeonSpec::default()
        };
        assert!(spec.validate().is_ok());

        // Find a seed whose two rooms land far enough apart for the grid to be refused.
        let refused = (0..16).any(|seed| match spec.generate(seed) {
            Err(GenerationError::GridTooLarge { width, height }) => {
                (width as usize) * (height as usize) > MAX_TILES
            }
            _ => false,
        });
        assert!(refused);
    }

    #[test]
    fn test_spec_from_ron() {
        let text = "(
            room_count: 12,
            room_radius: 25.5,
            room_min_width: 4,
            room_max_width: 10,
            room_min_height: 5,
            room_max_height: 11,
            hall_width: 2,
            main_room_fraction: 0.6,
            hall_edge_offset: 0,
            separation_multiplier: 1.25,
            max_separation_passes: 500,
        )";

        let spec = DungeonSpec::from_ron_str(text).unwrap();

        assert_eq!(
            spec,
            DungeonSpec {
                room_count: 12,
                room_radius: 25.5,
                room_min_width: 4,
                room_max_width: 10,
                room_min_height: 5,
                room_max_height: 11,
                hall_width: 2,
                main_room_fraction: 0.6,
                hall_edge_offset: 0,
                separation_multiplier: 1.25,
                max_separation_passes: 500,
            }
        );
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_every_ron_option_is_required() {
        match DungeonSpec::from_ron_str("(room_count: 12, hall_width: 2, room_radius: 25.5)") {
            Err(ConfigError::Parse(message)) => assert!(message.contains("room_min_width")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_ron_is_a_parse_error() {
        match DungeonSpec::from_ron_str("(room_count: \"lots\")") {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_spec_file_is_an_io_error() {
        match DungeonSpec::load("/nonexistent/dungeon.ron") {
            Err(ConfigError::Io(_)) => {}
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_rooms_is_an_empty_dungeon() {
        let spec = DungeonSpec {
            room_count: 0,
            ..DungeonSpec::default()
        };

        let dungeon = spec.generate(42).unwrap();

        assert_eq!(dungeon.status(), DungeonStatus::NoMainRooms);
        assert!(dungeon.tiles.is_empty());
        assert_eq!((dungeon.tiles.width(), dungeon.tiles.height()), (0, 0));
        assert!(dungeon.rooms.is_empty());
        assert!(dungeon.edges.is_empty());
        assert!(dungeon.halls.is_empty());
    }

    #[test]
    fn test_unreachable_threshold_disables_every_room() {
        let spec = DungeonSpec {
            main_room_fraction: 1.0,
            ..small_spec()
        };

        let dungeon = spec.generate(9).unwrap();

        assert_eq!(dungeon.status(), DungeonStatus::NoMainRooms);
        assert!(dungeon.tiles.is_empty());
        assert_eq!(dungeon.disabled_rooms().count(), spec.room_count);
        assert_eq!(dungeon.secondary_rooms().count(), 0);
    }

    #[test]
    fn test_crowded_disk_fails_to_converge() {
        let spec = DungeonSpec {
            room_count: 60,
            room_radius: 1.0,
            separation_multiplier: 1.0,
            max_separation_passes: 1,
            ..DungeonSpec::default()
        };

        match spec.generate(5) {
            Err(GenerationError::NonConvergence { passes, rooms }) => {
                assert_eq!(passes, 1);
                assert_eq!(rooms.len(), 60);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn test_default_dungeon_is_populated() {
        let dungeon = DungeonSpec::default().generate(2020).unwrap();

        assert_eq!(dungeon.rooms.len(), 50);
        assert_eq!(dungeon.status(), DungeonStatus::Populated);
        assert!(dungeon.main_rooms().count() > 0);
        assert!(!dungeon.tiles.is_empty());
        assert_eq!(
            dungeon.tiles.count(TileType::MainRoom),
            dungeon
                .main_rooms()
                .map(|r| (r.rect.width * r.rect.height) as usize)
                .sum::<usize>()
        );
    }

    #[test]
    fn test_halls_between_finds_edge_halls() {
        let dungeon = small_spec().generate(77).unwrap();

        for (a, b) in dungeon.edges.iter() {
            let forward = dungeon.halls_between(*a, *b);
            let backward = dungeon.halls_between(*b, *a);
            assert!(!forward.is_empty() && forward.len() <= 2);
            assert_eq!(forward, backward);
            assert!(forward.iter().all(|h| h.connects == (*a, *b)));
        }
    }

    #[test]
    fn test_encode_into_writes_non_empty_tiles() {
        struct MapEncoder(HashMap<Point, TileType>);

        impl TileEncoder for MapEncoder {
            fn encode_tile(&mut self, point: &Point, tile: TileType) {
                self.0.insert(*point, tile);
            }
        }

        let dungeon = small_spec().generate(3).unwrap();
        let mut encoder = MapEncoder(HashMap::new());
        dungeon.encode_into(&mut encoder);

        let non_empty: Vec<_> = dungeon
            .tiles
            .iter()
            .filter(|(_, t)| *t != TileType::Empty)
            .collect();
        assert_eq!(encoder.0.len(), non_empty.len());
        for (p, t) in non_empty {
            assert_eq!(encoder.0.get(&p), Some(&t));
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        fn prop(seed: u64) -> bool {
            let spec = small_spec();
            match (spec.generate(seed), spec.generate(seed)) {
                (Ok(a), Ok(b)) => a == b,
                (Err(_), Err(_)) => true,
                _ => false,
            }
        }
        quickcheck(prop as fn(u64) -> bool);
    }

    #[test]
    fn test_generated_dungeons_hold_their_invariants() {
        fn prop(seed: u64) -> TestResult {
            let dungeon = match small_spec().generate(seed) {
                Ok(d) => d,
                Err(_) => return TestResult::discard(),
            };

            // Separation.
            if any_overlaps(&dungeon.rooms) {
                return TestResult::error("rooms overlap");
            }

            // Main rooms are never disabled.
            if dungeon.main_rooms().any(|r| r.disabled || r.is_hall) {
                return TestResult::error("main room was reclassified");
            }

            // Edges only join main rooms, and no third main room shadows an edge.
            let main: Vec<&Room> = dungeon.main_rooms().collect();
            for (a, b) in dungeon.edges.iter() {
                let (a, b) = (&dungeon.rooms[a.0], &dungeon.rooms[b.0]);
                if !a.is_main || !b.is_main || a.id >= b.id {
                    return TestResult::error("edge between wrong rooms");
                }
                let ab = a.rect.center_distance_sq(&b.rect);
                let shadowed = main.iter().filter(|c| c.id != a.id && c.id != b.id).any(|c| {
                    a.rect.center_distance_sq(&c.rect) < ab
                        && b.rect.center_distance_sq(&c.rect) < ab
                });
                if shadowed {
                    return TestResult::error("edge is shadowed by a closer room");
                }
            }

            // Every hall has area, and hall contact decides which rooms are kept.
            if dungeon.halls.iter().any(|h| h.rect.is_empty()) {
                return TestResult::error("empty hall");
            }
            let touches_hall = |r: &Room| dungeon.halls.iter().any(|h| h.rect.overlaps(&r.rect));
            if !dungeon.secondary_rooms().all(|r| touches_hall(r)) {
                return TestResult::error("secondary room misses every hall");
            }
            if dungeon.disabled_rooms().any(|r| touches_hall(r)) {
                return TestResult::error("disabled room touches a hall");
            }
            if dungeon.rooms.iter().any(|r| !r.is_main && !r.is_hall && !r.disabled) {
                return TestResult::error("unclassified room");
            }

            // Main room floor is never painted over.
            let all_main_floor = dungeon.main_rooms().all(|r| {
                r.rect
                    .points()
                    .all(|p| dungeon.tiles.tile_at(&p) == Some(TileType::MainRoom))
            });
            if !all_main_floor {
                return TestResult::error("main room floor was overwritten");
            }

            // Repainting the same geometry gives the same grid.
            let hall_rects: Vec<Rect> = dungeon.halls.iter().map(|h| h.rect).collect();
            let repainted = rasterize(
                &rects(dungeon.main_rooms()),
                &rects(dungeon.secondary_rooms()),
                &hall_rects,
            );
            if repainted.ok().as_ref() != Some(&dungeon.tiles) {
                return TestResult::error("rasterization is not repeatable");
            }

            TestResult::passed()
        }
        quickcheck(prop as fn(u64) -> TestResult);
    }
}
