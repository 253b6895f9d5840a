//! Obstacle and power-up entities
//!
//! Every pooled entity carries a kind tag plus the per-kind behaviour state.
//! Shared "hit once" and reset semantics live on `Entity`; the kind-specific
//! movement lives in `Behaviour` and is advanced by `tick`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::lanes::LaneRegistry;
use super::pool::EntityId;
use super::rng::RunRng;
use crate::move_toward;
use crate::tuning::Tuning;

/// Entity categories, each with its own pool queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Neutral obstacle, static in its lane
    Grey,
    /// Steps between lanes on a timer
    Blue,
    /// Moves to an adjacent lane when the player switches lanes
    Orange,
    /// Power-up that adds a lane
    LaneExpander,
    /// Power-up that clears obstacles from the player's lane
    LaneClearer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Grey,
        EntityKind::Blue,
        EntityKind::Orange,
        EntityKind::LaneExpander,
        EntityKind::LaneClearer,
    ];

    /// Dense index used for per-kind tables
    pub fn index(self) -> usize {
        match self {
            EntityKind::Grey => 0,
            EntityKind::Blue => 1,
            EntityKind::Orange => 2,
            EntityKind::LaneExpander => 3,
            EntityKind::LaneClearer => 4,
        }
    }

    pub fn is_obstacle(self) -> bool {
        matches!(self, EntityKind::Grey | EntityKind::Blue | EntityKind::Orange)
    }

    pub fn is_powerup(self) -> bool {
        !self.is_obstacle()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Grey => "grey",
            EntityKind::Blue => "blue",
            EntityKind::Orange => "orange",
            EntityKind::LaneExpander => "lane-expander",
            EntityKind::LaneClearer => "lane-clearer",
        }
    }
}

/// A lane move in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transit {
    pub target_x: f32,
    pub speed: f32,
}

/// Per-kind behaviour state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behaviour {
    Static,
    Oscillating {
        /// -1 = left, 1 = right
        direction: i32,
        /// Seconds left at rest before the next step
        timer: f32,
        last_lane: usize,
        transit: Option<Transit>,
    },
    AdjacentMover {
        last_lane: usize,
        transit: Option<Transit>,
    },
    PowerUp,
}

impl Behaviour {
    fn initial(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Grey => Behaviour::Static,
            EntityKind::Blue => Behaviour::Oscillating {
                direction: 1,
                timer: 0.0,
                last_lane: 0,
                transit: None,
            },
            EntityKind::Orange => Behaviour::AdjacentMover {
                last_lane: 0,
                transit: None,
            },
            EntityKind::LaneExpander | EntityKind::LaneClearer => Behaviour::PowerUp,
        }
    }
}

/// What touching an entity does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Obstacle hit the player
    Hit,
    AddLane,
    ClearLane,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub lane: usize,
    pub pos: Vec3,
    /// Placed in the world and collidable
    pub active: bool,
    /// One-shot interaction guard
    pub triggered: bool,
    pub behaviour: Behaviour,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            lane: 0,
            pos: Vec3::ZERO,
            active: false,
            triggered: false,
            behaviour: Behaviour::initial(kind),
        }
    }

    /// Place the entity on `lane` at `pos.z` and start its behaviour
    pub fn activate(
        &mut self,
        lane: usize,
        pos: Vec3,
        lanes: &LaneRegistry,
        rng: &mut RunRng,
        tuning: &Tuning,
    ) {
        self.lane = lane;
        self.pos = pos;
        if let Ok(x) = lanes.lane_x(lane) {
            self.pos.x = x;
        }
        self.active = true;
        self.triggered = false;

        self.behaviour = match self.kind {
            EntityKind::Blue => Behaviour::Oscillating {
                direction: if rng.value() > 0.5 { -1 } else { 1 },
                timer: rng.range_f32(tuning.blue_interval),
                last_lane: lane,
                transit: None,
            },
            EntityKind::Orange => Behaviour::AdjacentMover {
                last_lane: lane,
                transit: None,
            },
            kind => Behaviour::initial(kind),
        };
    }

    /// Player touched this entity. Returns the effect the first time only.
    pub fn interact(&mut self) -> Option<Interaction> {
        if self.triggered || !self.active {
            return None;
        }
        self.triggered = true;

        Some(match self.kind {
            EntityKind::Grey | EntityKind::Blue | EntityKind::Orange => Interaction::Hit,
            EntityKind::LaneExpander => Interaction::AddLane,
            EntityKind::LaneClearer => Interaction::ClearLane,
        })
    }

    /// Advance movement by `dt` seconds
    pub fn tick(&mut self, dt: f32, lanes: &LaneRegistry, tuning: &Tuning) {
        if !self.active {
            return;
        }

        match &mut self.behaviour {
            Behaviour::Oscillating {
                direction,
                timer,
                last_lane,
                transit,
            } => {
                if transit.is_none() {
                    *timer -= dt;
                    if *timer > 0.0 {
                        return;
                    }
                    *timer = tuning.blue_interval;

                    if lanes.neighbour(self.lane, *direction).is_none() {
                        *direction = -*direction;
                    }
                    let Some(next) = lanes.neighbour(self.lane, *direction) else {
                        return;
                    };
                    let Ok(target_x) = lanes.lane_x(next) else {
                        return;
                    };
                    *last_lane = self.lane;
                    self.lane = next;
                    *transit = Some(Transit {
                        target_x,
                        speed: tuning.blue_speed,
                    });
                } else {
                    step_transit(&mut self.pos, transit, dt);
                }
            }
            Behaviour::AdjacentMover { transit, .. } => step_transit(&mut self.pos, transit, dt),
            Behaviour::Static | Behaviour::PowerUp => {}
        }
    }

    /// Orange obstacles react to the player changing lanes
    pub fn on_player_lane_switch(
        &mut self,
        lanes: &LaneRegistry,
        rng: &mut RunRng,
        tuning: &Tuning,
    ) {
        if !self.active {
            return;
        }
        let Behaviour::AdjacentMover { last_lane, transit } = &mut self.behaviour else {
            return;
        };
        if transit.is_some() {
            return;
        }

        let Some(next) = lanes.random_adjacent(self.lane, rng) else {
            return;
        };
        let Ok(target_x) = lanes.lane_x(next) else {
            return;
        };
        *last_lane = self.lane;
        self.lane = next;
        *transit = Some(Transit {
            target_x,
            speed: tuning.orange_speed,
        });
    }

    /// Another obstacle was touched mid-move: head back to the last lane
    pub fn on_obstacle_contact(&mut self, lanes: &LaneRegistry) {
        if !self.active {
            return;
        }
        let (last_lane, transit) = match &mut self.behaviour {
            Behaviour::Oscillating {
                direction,
                last_lane,
                transit: transit @ Some(_),
                ..
            } => {
                *direction = -*direction;
                (*last_lane, transit)
            }
            Behaviour::AdjacentMover {
                last_lane,
                transit: transit @ Some(_),
            } => (*last_lane, transit),
            _ => return,
        };

        let Ok(target_x) = lanes.lane_x(last_lane) else {
            return;
        };
        self.lane = last_lane;
        if let Some(t) = transit {
            t.target_x = target_x;
        }
    }

    /// A lane was prepended: every index this entity holds moves up by one
    pub fn on_lane_inserted_left(&mut self) {
        self.lane += 1;
        match &mut self.behaviour {
            Behaviour::Oscillating { last_lane, .. } | Behaviour::AdjacentMover { last_lane, .. } => {
                *last_lane += 1;
            }
            Behaviour::Static | Behaviour::PowerUp => {}
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(
            self.behaviour,
            Behaviour::Oscillating {
                transit: Some(_),
                ..
            } | Behaviour::AdjacentMover {
                transit: Some(_),
                ..
            }
        )
    }

    /// Return to the pooled state
    pub fn reset(&mut self) {
        self.active = false;
        self.triggered = false;
        self.behaviour = Behaviour::initial(self.kind);
    }
}

fn step_transit(pos: &mut Vec3, transit: &mut Option<Transit>, dt: f32) {
    let Some(t) = *transit else {
        return;
    };
    pos.x = move_toward(pos.x, t.target_x, t.speed * dt);
    if pos.x == t.target_x {
        *transit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn setup(kind: EntityKind, lane: usize) -> (Entity, LaneRegistry, RunRng, Tuning) {
        let lanes = LaneRegistry::new(3, 3.0);
        let mut rng = RunRng::new(5);
        let tuning = Tuning::default();
        let mut entity = Entity::new(EntityId(0), kind);
        entity.activate(lane, Vec3::new(0.0, 0.0, 20.0), &lanes, &mut rng, &tuning);
        (entity, lanes, rng, tuning)
    }

    fn run_until_still(entity: &mut Entity, lanes: &LaneRegistry, tuning: &Tuning) {
        for _ in 0..10_000 {
            entity.tick(SIM_DT, lanes, tuning);
            if !entity.is_moving() {
                return;
            }
        }
        panic!("entity never came to rest");
    }

    #[test]
    fn test_activate_places_on_lane() {
        let (entity, _, _, _) = setup(EntityKind::Grey, 2);
        assert!(entity.active);
        assert_eq!(entity.pos, Vec3::new(3.0, 0.0, 20.0));
    }

    #[test]
    fn test_interact_once() {
        let (mut entity, _, _, _) = setup(EntityKind::Grey, 0);
        assert_eq!(entity.interact(), Some(Interaction::Hit));
        assert_eq!(entity.interact(), None);

        let (mut entity, _, _, _) = setup(EntityKind::LaneExpander, 0);
        assert_eq!(entity.interact(), Some(Interaction::AddLane));
        let (mut entity, _, _, _) = setup(EntityKind::LaneClearer, 0);
        assert_eq!(entity.interact(), Some(Interaction::ClearLane));
    }

    #[test]
    fn test_blue_steps_after_timer() {
        let (mut entity, lanes, _, tuning) = setup(EntityKind::Blue, 1);

        // Timer phase is below one interval, so a step starts within it
        let ticks = (tuning.blue_interval / SIM_DT) as usize + 2;
        for _ in 0..ticks {
            entity.tick(SIM_DT, &lanes, &tuning);
            if entity.is_moving() {
                break;
            }
        }
        assert!(entity.is_moving());
        assert!(entity.lane == 0 || entity.lane == 2);

        run_until_still(&mut entity, &lanes, &tuning);
        assert_eq!(Ok(entity.pos.x), lanes.lane_x(entity.lane));
    }

    #[test]
    fn test_blue_reverses_at_edge() {
        let (mut entity, lanes, _, tuning) = setup(EntityKind::Blue, 2);
        entity.behaviour = Behaviour::Oscillating {
            direction: 1,
            timer: 0.0,
            last_lane: 2,
            transit: None,
        };
        entity.tick(SIM_DT, &lanes, &tuning);
        assert_eq!(entity.lane, 1);
        assert!(matches!(
            entity.behaviour,
            Behaviour::Oscillating { direction: -1, last_lane: 2, .. }
        ));
    }

    #[test]
    fn test_blue_contact_returns_to_last_lane() {
        let (mut entity, lanes, _, tuning) = setup(EntityKind::Blue, 1);
        entity.behaviour = Behaviour::Oscillating {
            direction: 1,
            timer: 0.0,
            last_lane: 1,
            transit: None,
        };
        entity.tick(SIM_DT, &lanes, &tuning);
        assert_eq!(entity.lane, 2);

        entity.on_obstacle_contact(&lanes);
        assert_eq!(entity.lane, 1);
        assert!(matches!(
            entity.behaviour,
            Behaviour::Oscillating { direction: -1, .. }
        ));
        run_until_still(&mut entity, &lanes, &tuning);
        assert_eq!(entity.pos.x, 0.0);
    }

    #[test]
    fn test_orange_moves_once_per_switch() {
        let (mut entity, lanes, mut rng, tuning) = setup(EntityKind::Orange, 0);
        entity.on_player_lane_switch(&lanes, &mut rng, &tuning);
        assert_eq!(entity.lane, 1);
        assert!(entity.is_moving());

        // Guarded while a move is in flight
        entity.on_player_lane_switch(&lanes, &mut rng, &tuning);
        assert_eq!(entity.lane, 1);

        run_until_still(&mut entity, &lanes, &tuning);
        assert_eq!(entity.pos.x, 0.0);
    }

    #[test]
    fn test_orange_contact_cancels_move() {
        let (mut entity, lanes, mut rng, tuning) = setup(EntityKind::Orange, 0);
        entity.on_player_lane_switch(&lanes, &mut rng, &tuning);
        entity.tick(SIM_DT, &lanes, &tuning);
        entity.on_obstacle_contact(&lanes);
        assert_eq!(entity.lane, 0);
        run_until_still(&mut entity, &lanes, &tuning);
        assert_eq!(entity.pos.x, -3.0);
    }

    #[test]
    fn test_contact_at_rest_is_ignored() {
        let (mut entity, lanes, _, _) = setup(EntityKind::Orange, 2);
        entity.on_obstacle_contact(&lanes);
        assert_eq!(entity.lane, 2);
        assert!(!entity.is_moving());
    }

    #[test]
    fn test_lane_inserted_left_reindexes() {
        let (mut entity, _, _, _) = setup(EntityKind::Blue, 1);
        entity.on_lane_inserted_left();
        assert_eq!(entity.lane, 2);
        assert!(matches!(
            entity.behaviour,
            Behaviour::Oscillating { last_lane: 2, .. }
        ));
    }

    #[test]
    fn test_reset_clears_transient_state() {
        let (mut entity, lanes, mut rng, tuning) = setup(EntityKind::Orange, 1);
        entity.on_player_lane_switch(&lanes, &mut rng, &tuning);
        let _ = entity.interact();
        entity.reset();
        assert!(!entity.active);
        assert!(!entity.triggered);
        assert!(!entity.is_moving());
    }
}
