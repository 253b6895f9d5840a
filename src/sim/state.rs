//! Run state
//!
//! `GameState` is the explicit context for one run: it owns the lane registry,
//! pools, random stream, generator and player, and is the only place that
//! mutates them. Hosts drive it through `tick` and read `GameEvent`s back.

use std::collections::BTreeSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::entity::{EntityKind, Interaction};
use super::generator::{Row, RowGenerator, SpawnContext};
use super::lanes::{LaneRegistry, LaneSide};
use super::pool::{EntityId, EntityPool};
use super::progression::ProgressionTrigger;
use super::rng::RunRng;
use crate::consts::PASS_MARGIN;
use crate::settings::LevelSettings;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Built, waiting for `start`
    Idle,
    /// Level generated, player held until the countdown ends
    Countdown,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Notifications produced by the run, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    CountdownFinished,
    Paused,
    Resumed,
    GameOver { score: u32, elapsed: f32 },
    RowGenerated { z: f32, obstacles: usize },
    PowerUpSpawned { id: EntityId, kind: EntityKind, lane: usize },
    EntityActivated(EntityId),
    EntityDeactivated(EntityId),
    /// Holders of lane indices must shift them when `side` is `Left`
    LaneAdded { side: LaneSide, index: usize },
    LaneCleared { lane: usize },
    PlayerSwitchedLane { lane: usize },
    PlayerHit { lives: u8 },
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lane: usize,
    pub pos: Vec3,
    /// X the player is sliding toward
    pub target_x: f32,
    pub forward_speed: f32,
    pub side_speed: f32,
    /// Seconds of hit immunity left
    pub immunity: f32,
}

impl Player {
    fn new(tuning: &Tuning) -> Self {
        Self {
            lane: 0,
            pos: Vec3::ZERO,
            target_x: 0.0,
            forward_speed: tuning.forward_speed,
            side_speed: tuning.side_speed,
            immunity: 0.0,
        }
    }
}

/// Complete run state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Settings frozen at construction
    pub settings: LevelSettings,
    pub tuning: Tuning,
    pub rng: RunRng,
    pub lanes: LaneRegistry,
    pub pool: EntityPool,
    pub generator: RowGenerator,
    pub progression: ProgressionTrigger,
    pub difficulty: Difficulty,
    pub player: Player,
    pub phase: GamePhase,
    pub lives: u8,
    /// Rows passed
    pub score: u32,
    /// Seconds spent running (excludes countdown and pauses)
    pub elapsed: f32,
    /// Seconds of countdown left
    pub countdown: f32,
    /// Obstacle pairs touching as of the last tick
    #[serde(skip)]
    pub(crate) touching: BTreeSet<(EntityId, EntityId)>,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build a run from settings. Nothing is generated until `start`.
    pub fn new(settings: &LevelSettings, tuning: &Tuning) -> Self {
        let mut settings = settings.clone();
        settings.validate();

        Self {
            rng: RunRng::new(settings.run_seed()),
            lanes: LaneRegistry::new(settings.start_lanes(), tuning.lane_width),
            pool: EntityPool::with_prewarm(tuning.pool_prewarm),
            generator: RowGenerator::new(&settings, tuning),
            progression: ProgressionTrigger::new(PASS_MARGIN),
            difficulty: Difficulty::new(tuning),
            player: Player::new(tuning),
            phase: GamePhase::Idle,
            lives: tuning.lives,
            score: 0,
            elapsed: 0.0,
            countdown: 0.0,
            touching: BTreeSet::new(),
            events: Vec::new(),
            settings,
            tuning: tuning.clone(),
        }
    }

    /// Generate the visible rows, place the player and begin the countdown
    pub fn start(&mut self) {
        if self.phase != GamePhase::Idle {
            log::warn!("Run already started");
            return;
        }

        self.player.lane = self.lanes.count() / 2;
        if let Ok(x) = self.lanes.lane_x(self.player.lane) {
            self.player.pos.x = x;
            self.player.target_x = x;
        }

        let rows = {
            let mut ctx = SpawnContext {
                lanes: &self.lanes,
                pool: &mut self.pool,
                rng: &mut self.rng,
                tuning: &self.tuning,
            };
            self.generator.start(&mut ctx)
        };
        for row in rows {
            self.record_row(row);
        }

        self.countdown = self.tuning.countdown;
        self.phase = if self.countdown > 0.0 {
            GamePhase::Countdown
        } else {
            GamePhase::Running
        };
        self.events.push(GameEvent::GameStarted);
        log::info!(
            "Run started: seed {}, {} lanes, player on lane {}",
            self.rng.seed(),
            self.lanes.count(),
            self.player.lane
        );
    }

    /// Throw this run away and start a fresh one with the same settings
    pub fn restart(&mut self) {
        log::info!("Restarting run");
        *self = Self::new(&self.settings, &self.tuning);
        self.start();
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running | GamePhase::Countdown => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = if self.countdown > 0.0 {
                    GamePhase::Countdown
                } else {
                    GamePhase::Running
                };
                self.events.push(GameEvent::Resumed);
            }
            GamePhase::Idle | GamePhase::GameOver => {}
        }
    }

    /// Try to move the player one lane left (`-1`) or right (`1`).
    ///
    /// Orange obstacles react to a successful switch.
    pub fn switch_lane(&mut self, direction: i32) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        let Some(target) = self.lanes.neighbour(self.player.lane, direction.signum()) else {
            return false;
        };
        let Ok(x) = self.lanes.lane_x(target) else {
            return false;
        };

        self.player.lane = target;
        self.player.target_x = x;
        self.events.push(GameEvent::PlayerSwitchedLane { lane: target });

        for id in self.pool.active_ids() {
            if let Some(entity) = self.pool.get_mut(id) {
                entity.on_player_lane_switch(&self.lanes, &mut self.rng, &self.tuning);
            }
        }
        true
    }

    /// The player touched an entity
    pub fn touch(&mut self, id: EntityId) {
        let Some(interaction) = self.pool.get_mut(id).and_then(|e| e.interact()) else {
            return;
        };

        match interaction {
            Interaction::Hit => self.hit_player(),
            Interaction::AddLane => {
                let side = self.lanes.side_nearest(self.player.lane);
                self.insert_lane(side);
                self.release(id);
            }
            Interaction::ClearLane => {
                let lane = self.player.lane;
                self.clear_lane(lane);
                self.release(id);
            }
        }
    }

    /// Two obstacles touched; movers head back to their last lane
    pub fn obstacle_contact(&mut self, a: EntityId, b: EntityId) {
        for id in [a, b] {
            if let Some(entity) = self.pool.get_mut(id) {
                entity.on_obstacle_contact(&self.lanes);
            }
        }
    }

    /// Add a lane on `side`, re-indexing every lane holder on a left insert
    pub fn insert_lane(&mut self, side: LaneSide) -> usize {
        let index = self.lanes.insert(side);
        if side == LaneSide::Left {
            self.player.lane += 1;
            for entity in self.pool.active_mut() {
                entity.on_lane_inserted_left();
            }
        }
        log::info!("Lane added on {:?}, now {} lanes", side, self.lanes.count());
        self.events.push(GameEvent::LaneAdded { side, index });
        index
    }

    /// Return every obstacle on `lane` to its pool
    pub fn clear_lane(&mut self, lane: usize) {
        self.events.push(GameEvent::LaneCleared { lane });
        let cleared: Vec<EntityId> = self
            .pool
            .active()
            .filter(|e| e.kind.is_obstacle() && e.lane == lane)
            .map(|e| e.id)
            .collect();
        log::debug!("Clearing {} obstacles from lane {}", cleared.len(), lane);
        for id in cleared {
            self.release(id);
        }
    }

    /// External signal that the player passed the frontmost row
    pub fn on_row_passed(&mut self) {
        if let Some(z) = self.progression.pop_nearest() {
            self.handle_row_passed(z);
        }
    }

    /// Release everything up to the passed row and extend the level by one
    pub(crate) fn handle_row_passed(&mut self, row_z: f32) {
        let behind: Vec<EntityId> = self
            .pool
            .active()
            .filter(|e| e.pos.z <= row_z)
            .map(|e| e.id)
            .collect();
        for id in behind {
            self.release(id);
        }

        if self.phase == GamePhase::GameOver {
            return;
        }
        self.score += 1;

        let row = {
            let mut ctx = SpawnContext {
                lanes: &self.lanes,
                pool: &mut self.pool,
                rng: &mut self.rng,
                tuning: &self.tuning,
            };
            self.generator.on_progression(&mut ctx)
        };
        if let Some(row) = row {
            self.record_row(row);
        }
    }

    /// Take all notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn hit_player(&mut self) {
        if self.player.immunity > 0.0 || self.phase == GamePhase::GameOver {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        self.player.immunity = self.tuning.hit_immunity;
        self.events.push(GameEvent::PlayerHit { lives: self.lives });
        log::info!("Player hit, {} lives left", self.lives);

        if self.lives == 0 {
            self.game_over();
        }
    }

    pub(crate) fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.generator.finish();
        self.events.push(GameEvent::GameOver {
            score: self.score,
            elapsed: self.elapsed,
        });
        log::info!(
            "Game over: score {}, {:.1}s, {} entities allocated",
            self.score,
            self.elapsed,
            self.pool.len()
        );
    }

    fn release(&mut self, id: EntityId) {
        match self.pool.release(id) {
            Ok(()) => self.events.push(GameEvent::EntityDeactivated(id)),
            Err(e) => log::warn!("{}", e),
        }
    }

    fn record_row(&mut self, row: Row) {
        self.progression.push_row(row.z);
        self.events.push(GameEvent::RowGenerated {
            z: row.z,
            obstacles: row.obstacles.len(),
        });
        for &id in &row.obstacles {
            self.events.push(GameEvent::EntityActivated(id));
        }
        if let Some(id) = row.powerup {
            self.events.push(GameEvent::EntityActivated(id));
            if let Some(entity) = self.pool.get(id) {
                self.events.push(GameEvent::PowerUpSpawned {
                    id,
                    kind: entity.kind,
                    lane: entity.lane,
                });
            }
        }
    }
}
