//! Procedural row generation
//!
//! Every decision draws from the run's seeded stream in a fixed order, so a
//! seed plus settings fully determine the level:
//! obstacle count, then lanes, then per slot the kind followed by whatever the
//! kind draws on activation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::lanes::LaneRegistry;
use super::pool::{EntityId, EntityPool};
use super::rng::RunRng;
use crate::consts::{ENTITY_Y, ROW_MIN_FILL};
use crate::settings::LevelSettings;
use crate::tuning::Tuning;

/// Generator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorPhase {
    /// Run not started yet
    Idle,
    /// Producing the initial burst of visible rows
    Generating,
    /// One row per progression event
    Steady,
    /// Run over, no more rows
    Finished,
}

/// Borrowed pieces of the run a row is built from
pub struct SpawnContext<'a> {
    pub lanes: &'a LaneRegistry,
    pub pool: &'a mut EntityPool,
    pub rng: &'a mut RunRng,
    pub tuning: &'a Tuning,
}

/// Output of one generation step
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub z: f32,
    pub obstacles: Vec<EntityId>,
    pub powerup: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowGenerator {
    phase: GeneratorPhase,
    next_row_z: f32,
    rows_passed: u32,
    next_powerup_threshold: u32,

    visible_rows: usize,
    distance_to_first_row: f32,
    distance_between_rows: f32,
    grey_chance: f32,
    blue_chance: f32,
}

impl RowGenerator {
    pub fn new(settings: &LevelSettings, tuning: &Tuning) -> Self {
        Self {
            phase: GeneratorPhase::Idle,
            next_row_z: settings.distance_to_first_row,
            rows_passed: 0,
            next_powerup_threshold: tuning.powerup_spawn_rate,
            visible_rows: settings.visible_rows(),
            distance_to_first_row: settings.distance_to_first_row,
            distance_between_rows: settings.distance_between_rows,
            grey_chance: settings.grey_obstacle_chance,
            blue_chance: settings.blue_obstacle_chance,
        }
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    /// Z the next row will be placed at
    pub fn next_row_z(&self) -> f32 {
        self.next_row_z
    }

    pub fn rows_passed(&self) -> u32 {
        self.rows_passed
    }

    /// Produce the initial burst of visible rows
    pub fn start(&mut self, ctx: &mut SpawnContext) -> Vec<Row> {
        if self.phase != GeneratorPhase::Idle {
            log::warn!("Row generator already started ({:?})", self.phase);
            return Vec::new();
        }

        self.phase = GeneratorPhase::Generating;
        self.next_row_z = self.distance_to_first_row;

        let mut rows = Vec::with_capacity(self.visible_rows);
        for _ in 0..self.visible_rows {
            rows.push(self.spawn_row(self.next_row_z, ctx));
            self.next_row_z += self.distance_between_rows;
        }

        log::info!(
            "Generated {} rows up to z={} (seed {})",
            rows.len(),
            self.next_row_z - self.distance_between_rows,
            ctx.rng.seed()
        );
        self.phase = GeneratorPhase::Steady;
        rows
    }

    /// The player passed the frontmost row: add one row at the far end.
    ///
    /// Power-ups spawn between rows once enough rows have been passed and the
    /// chance roll succeeds.
    pub fn on_progression(&mut self, ctx: &mut SpawnContext) -> Option<Row> {
        if self.phase != GeneratorPhase::Steady {
            log::debug!("Ignoring progression while {:?}", self.phase);
            return None;
        }

        let mut row = self.spawn_row(self.next_row_z, ctx);
        self.rows_passed += 1;

        if self.rows_passed >= self.next_powerup_threshold
            && ctx.rng.value() < ctx.tuning.powerup_spawn_chance
        {
            self.next_powerup_threshold += ctx.tuning.powerup_spawn_rate;
            let z = self.next_row_z + self.distance_between_rows / 2.0;
            row.powerup = Some(self.spawn_powerup(z, ctx));
        }

        self.next_row_z += self.distance_between_rows;
        Some(row)
    }

    /// Stop generating for the rest of the run
    pub fn finish(&mut self) {
        self.phase = GeneratorPhase::Finished;
    }

    fn spawn_row(&self, z: f32, ctx: &mut SpawnContext) -> Row {
        let count = obstacle_count(ctx.lanes.count(), ctx.tuning.row_percentage(), ctx.rng);
        let lanes = ctx.lanes.random_unique(count, ctx.rng);

        let mut obstacles = Vec::with_capacity(lanes.len());
        for lane in lanes {
            let kind = self.pick_obstacle_kind(ctx.rng);
            obstacles.push(place(kind, lane, z, ctx));
        }

        log::debug!("Row at z={}: {} obstacles", z, obstacles.len());
        Row {
            z,
            obstacles,
            powerup: None,
        }
    }

    fn spawn_powerup(&self, z: f32, ctx: &mut SpawnContext) -> EntityId {
        let kind = if ctx.rng.coin() {
            EntityKind::LaneExpander
        } else {
            EntityKind::LaneClearer
        };
        let lane = ctx.lanes.random_lane(ctx.rng);
        log::debug!("{} power-up at z={} lane {}", kind.as_str(), z, lane);
        place(kind, lane, z, ctx)
    }

    /// Cumulative weights; orange takes whatever grey and blue leave
    fn pick_obstacle_kind(&self, rng: &mut RunRng) -> EntityKind {
        let roll = rng.value();
        if roll < self.grey_chance {
            EntityKind::Grey
        } else if roll < self.grey_chance + self.blue_chance {
            EntityKind::Blue
        } else {
            EntityKind::Orange
        }
    }
}

/// Obstacles in a row: `[floor(n*0.7), floor(n*pct))`, at least one.
///
/// When that range is empty the lower bound is used.
pub fn obstacle_count(lane_count: usize, row_percentage: f32, rng: &mut RunRng) -> usize {
    if lane_count == 0 {
        return 0;
    }
    let lo = (lane_count as f32 * ROW_MIN_FILL).floor() as usize;
    let hi = (lane_count as f32 * row_percentage).floor() as usize;
    let count = if hi > lo { rng.range(lo, hi) } else { lo };
    count.clamp(1, lane_count)
}

fn place(kind: EntityKind, lane: usize, z: f32, ctx: &mut SpawnContext) -> EntityId {
    let id = ctx.pool.acquire(kind);
    if let Some(entity) = ctx.pool.get_mut(id) {
        entity.activate(lane, Vec3::new(0.0, ENTITY_Y, z), ctx.lanes, ctx.rng, ctx.tuning);
    }
    id
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn generate(settings: &LevelSettings, passes: usize) -> Vec<(f32, usize, EntityKind)> {
        let tuning = Tuning::default();
        let lanes = LaneRegistry::new(settings.start_lanes(), tuning.lane_width);
        let mut pool = EntityPool::new();
        let mut rng = RunRng::new(settings.run_seed());
        let mut ctx = SpawnContext {
            lanes: &lanes,
            pool: &mut pool,
            rng: &mut rng,
            tuning: &tuning,
        };
        let mut generator = RowGenerator::new(settings, &tuning);
        let mut rows = generator.start(&mut ctx);
        for _ in 0..passes {
            rows.extend(generator.on_progression(&mut ctx));
        }
        drop(ctx);

        rows.iter()
            .flat_map(|row| row.obstacles.iter().chain(row.powerup.iter()))
            .map(|id| {
                let e = pool.get(*id).unwrap();
                (e.pos.z, e.lane, e.kind)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(
            seed in 0i64..(i32::MAX as i64),
            lanes in 1i32..10,
            rows in 1i32..12,
            grey in 0.0f32..=1.0,
            blue in 0.0f32..=1.0,
        ) {
            let settings = LevelSettings {
                number_of_visible_obstacle_rows: rows,
                start_number_of_lanes: lanes,
                grey_obstacle_chance: grey,
                blue_obstacle_chance: blue,
                seed,
                ..Default::default()
            };
            prop_assert_eq!(generate(&settings, 15), generate(&settings, 15));
        }

        #[test]
        fn rows_never_reuse_a_lane(seed in any::<u32>(), lanes in 1i32..12) {
            let settings = LevelSettings {
                start_number_of_lanes: lanes,
                seed: seed as i64,
                ..Default::default()
            };
            let tuning = Tuning::default();
            let registry = LaneRegistry::new(settings.start_lanes(), tuning.lane_width);
            let mut pool = EntityPool::new();
            let mut rng = RunRng::new(settings.run_seed());
            let mut ctx = SpawnContext {
                lanes: &registry,
                pool: &mut pool,
                rng: &mut rng,
                tuning: &tuning,
            };
            let mut generator = RowGenerator::new(&settings, &tuning);
            for row in generator.start(&mut ctx) {
                prop_assert!(!row.obstacles.is_empty());
                let mut used: Vec<usize> = row
                    .obstacles
                    .iter()
                    .map(|id| ctx.pool.get(*id).unwrap().lane)
                    .collect();
                used.sort_unstable();
                let before = used.len();
                used.dedup();
                prop_assert_eq!(used.len(), before);
            }
        }
    }
}
