//! The generation stages as a resumable state machine.
//!
//! `DungeonSpec::generate` runs every stage back to back. `GenerationSteps` runs the same
//! machine one stage per `next` call and hands out an owned snapshot after each, for callers
//! that want to show the dungeon taking shape.

use crate::{
    error::GenerationError,
    graph::{is_connected, relative_neighborhood_graph, room_edges, RoomGraph},
    hall::{synthesize_halls, Hall},
    map_types::dungeon::{Dungeon, DungeonSpec},
    rect::Rect,
    room::{classify_secondary_rooms, select_main_rooms, Room, RoomId},
    sampling::{sample_rooms, small_rng, RoomSizeDist},
    separation::resolve_room_overlaps,
    tile::{rasterize, TileGrid},
};

use petgraph::dot::{Config, Dot};
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Sampled,
    Separated,
    MainRoomsSelected,
    Connected,
    HallsSynthesized,
    Classified,
    Rasterized,
}

impl Stage {
    fn next(self) -> Option<Stage> {
        match self {
            Stage::Sampled => Some(Stage::Separated),
            Stage::Separated => Some(Stage::MainRoomsSelected),
            Stage::MainRoomsSelected => Some(Stage::Connected),
            Stage::Connected => Some(Stage::HallsSynthesized),
            Stage::HallsSynthesized => Some(Stage::Classified),
            Stage::Classified => Some(Stage::Rasterized),
            Stage::Rasterized => None,
        }
    }
}

/// The state of a generation right after `stage` finished.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub stage: Stage,
    pub rooms: Vec<Room>,
    pub edges: Vec<(RoomId, RoomId)>,
    pub halls: Vec<Hall>,
    /// Zero-area until `Stage::Rasterized`.
    pub tiles: TileGrid,
}

pub(crate) struct Pipeline {
    spec: DungeonSpec,
    rng: SmallRng,
    next_stage: Option<Stage>,
    rooms: Vec<Room>,
    separation_passes: usize,
    graph: RoomGraph,
    halls: Vec<Hall>,
    tiles: TileGrid,
}

impl Pipeline {
    /// `spec` must already be validated.
    pub fn start(spec: DungeonSpec, seed: u64) -> Self {
        log::debug!("Generating dungeon with seed {}", seed);

        Pipeline {
            spec,
            rng: small_rng(seed),
            next_stage: Some(Stage::Sampled),
            rooms: Vec::new(),
            separation_passes: 0,
            graph: RoomGraph::new(),
            halls: Vec::new(),
            tiles: TileGrid::default(),
        }
    }

    /// Runs the next stage. Returns `None` once every stage has run or a stage has failed.
    pub fn advance(&mut self) -> Option<Result<Stage, GenerationError>> {
        let stage = self.next_stage.take()?;
        if let Err(e) = self.run(stage) {
            return Some(Err(e));
        }
        self.next_stage = stage.next();

        Some(Ok(stage))
    }

    fn run(&mut self, stage: Stage) -> Result<(), GenerationError> {
        let spec = &self.spec;
        match stage {
            Stage::Sampled => {
                let sizes = RoomSizeDist::new(
                    (spec.room_min_width, spec.room_max_width),
                    (spec.room_min_height, spec.room_max_height),
                );
                self.rooms =
                    sample_rooms(spec.room_count, spec.room_radius, &sizes, &mut self.rng);
                log::debug!("Sampled {} rooms", self.rooms.len());
            }
            Stage::Separated => {
                self.separation_passes = resolve_room_overlaps(
                    &mut self.rooms,
                    spec.separation_multiplier,
                    spec.max_separation_passes,
                )?;
                log::debug!(
                    "Done resolving room overlaps after {} passes",
                    self.separation_passes
                );
            }
            Stage::MainRoomsSelected => {
                let main = select_main_rooms(
                    &mut self.rooms,
                    spec.room_max_width,
                    spec.room_max_height,
                    spec.main_room_fraction,
                );
                if main.is_empty() {
                    log::debug!("No main rooms; the dungeon will be empty");
                } else {
                    log::debug!("{} main rooms", main.len());
                }
            }
            Stage::Connected => {
                let main: Vec<&Room> = self.rooms.iter().filter(|r| r.is_main).collect();
                self.graph = relative_neighborhood_graph(&main);
                log::debug!(
                    "{} edges between main rooms, connected = {}",
                    self.graph.edge_count(),
                    is_connected(&self.graph)
                );
                log::trace!(
                    "Room graph = {:?}",
                    Dot::with_config(&self.graph, &[Config::EdgeNoLabel])
                );
            }
            Stage::HallsSynthesized => {
                self.halls = synthesize_halls(
                    &self.graph,
                    &self.rooms,
                    spec.hall_width,
                    spec.hall_edge_offset,
                    &mut self.rng,
                );
                log::debug!("Synthesized {} halls", self.halls.len());
            }
            Stage::Classified => {
                let num_kept = classify_secondary_rooms(&mut self.rooms, &self.halls);
                log::debug!(
                    "{} secondary rooms kept, {} disabled",
                    num_kept,
                    self.rooms.iter().filter(|r| r.disabled).count()
                );
            }
            Stage::Rasterized => {
                let main = self.rects(|r| r.is_main);
                let secondary = self.rects(Room::is_secondary);
                let halls: Vec<Rect> = self.halls.iter().map(|h| h.rect).collect();
                self.tiles = rasterize(&main, &secondary, &halls)?;
                log::debug!(
                    "Tile grid is {} x {} at {:?}",
                    self.tiles.width(),
                    self.tiles.height(),
                    self.tiles.origin()
                );
            }
        }

        Ok(())
    }

    fn rects(&self, keep: impl Fn(&Room) -> bool) -> Vec<Rect> {
        self.rooms
            .iter()
            .filter(|r| keep(r))
            .map(|r| r.rect)
            .collect()
    }

    fn snapshot(&self, stage: Stage) -> Snapshot {
        Snapshot {
            stage,
            rooms: self.rooms.clone(),
            edges: room_edges(&self.graph),
            halls: self.halls.clone(),
            tiles: self.tiles.clone(),
        }
    }

    pub fn into_dungeon(self) -> Dungeon {
        let edges = room_edges(&self.graph);

        Dungeon::new(
            self.rooms,
            edges,
            self.halls,
            self.tiles,
            self.separation_passes,
        )
    }
}

/// Iterator over the stages of one generation. Yields seven snapshots on success. If the
/// rooms fail to separate it yields that error and ends.
pub struct GenerationSteps {
    seed: u64,
    pipeline: Pipeline,
}

impl GenerationSteps {
    pub(crate) fn new(spec: DungeonSpec, seed: u64) -> Self {
        GenerationSteps {
            seed,
            pipeline: Pipeline::start(spec, seed),
        }
    }

    /// Rewinds to before the first stage. The replay is identical to the first run.
    pub fn restart(&mut self) {
        self.pipeline = Pipeline::start(self.pipeline.spec.clone(), self.seed);
    }
}

impl Iterator for GenerationSteps {
    type Item = Result<Snapshot, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let stage = match self.pipeline.advance()? {
            Ok(stage) => stage,
            Err(e) => return Some(Err(e)),
        };

        Some(Ok(self.pipeline.snapshot(stage)))
    }
}
