//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically.

use super::contacts::{obstacle_pairs, player_contacts};
use super::pool::EntityId;
use super::state::{GameEvent, GamePhase, GameState};
use crate::move_toward;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Lane switch request: -1 = left, 1 = right
    pub lane_switch: Option<i32>,
    /// Pause toggle
    pub pause: bool,
    /// Entities the host's physics reported touching the player
    pub touched: Vec<EntityId>,
    /// Obstacle pairs the host's physics reported touching each other
    pub obstacle_contacts: Vec<(EntityId, EntityId)>,
    /// Run built-in box overlap detection as well
    pub detect_contacts: bool,
    /// Idle/demo mode - AI dodges obstacles
    pub idle_mode: bool,
}

impl TickInput {
    /// Input for hosts without their own physics
    pub fn headless() -> Self {
        Self {
            detect_contacts: true,
            ..Default::default()
        }
    }
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Don't tick if not started, paused or over
    match state.phase {
        GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::Countdown | GamePhase::Running => {}
    }

    if state.phase == GamePhase::Countdown {
        state.countdown -= dt;
        if state.countdown <= 0.0 {
            state.countdown = 0.0;
            state.phase = GamePhase::Running;
            state.push_event(GameEvent::CountdownFinished);
            log::info!("Countdown finished");
        }
    } else if input.idle_mode && input.lane_switch.is_none() {
        let input = TickInput {
            lane_switch: idle_lane_choice(state),
            ..input.clone()
        };
        advance_player(state, &input, dt);
    } else {
        advance_player(state, input, dt);
    }

    // Obstacles move during the countdown too
    for entity in state.pool.active_mut() {
        entity.tick(dt, &state.lanes, &state.tuning);
    }

    resolve_contacts(state, input);

    for z in state.progression.update(state.player.pos.z) {
        state.handle_row_passed(z);
    }
}

fn advance_player(state: &mut GameState, input: &TickInput, dt: f32) {
    state.elapsed += dt;

    let player = &mut state.player;
    state.difficulty.update(
        &mut player.forward_speed,
        &mut player.side_speed,
        state.elapsed,
        dt,
        &state.tuning,
    );
    player.immunity = (player.immunity - dt).max(0.0);

    if let Some(direction) = input.lane_switch {
        state.switch_lane(direction);
    }

    let player = &mut state.player;
    player.pos.z += player.forward_speed * dt;
    player.pos.x = move_toward(player.pos.x, player.target_x, player.side_speed * dt);
}

/// How far ahead the demo AI looks for obstacles
const IDLE_LOOKAHEAD: f32 = 4.0;

/// Pick a lane switch that steps out of the way of the nearest obstacle ahead
fn idle_lane_choice(state: &GameState) -> Option<i32> {
    let player = &state.player;
    // Still sliding into the last chosen lane
    if player.pos.x != player.target_x {
        return None;
    }

    let blocked = |lane: usize| {
        let Ok(x) = state.lanes.lane_x(lane) else {
            return true;
        };
        state.pool.active().any(|e| {
            e.kind.is_obstacle()
                && (e.pos.x - x).abs() < 1.5
                && e.pos.z > player.pos.z
                && e.pos.z - player.pos.z < IDLE_LOOKAHEAD
        })
    };

    if !blocked(player.lane) {
        return None;
    }
    [-1, 1]
        .into_iter()
        .find(|&dir| state.lanes.neighbour(player.lane, dir).is_some_and(|lane| !blocked(lane)))
}

fn resolve_contacts(state: &mut GameState, input: &TickInput) {
    let mut pairs: Vec<(EntityId, EntityId)> = input.obstacle_contacts.clone();
    if input.detect_contacts {
        // Only newly touching pairs count, like a trigger enter
        let now = obstacle_pairs(state.pool.active());
        pairs.extend(now.difference(&state.touching).copied());
        state.touching = now;
    }
    for (a, b) in pairs {
        state.obstacle_contact(a, b);
    }

    if state.phase != GamePhase::Running {
        return;
    }

    let mut touched = input.touched.clone();
    if input.detect_contacts {
        touched.extend(player_contacts(state.player.pos, state.pool.active()));
    }
    for id in touched {
        state.touch(id);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::LevelSettings;
    use crate::sim::entity::EntityKind;
    use crate::sim::lanes::LaneSide;
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn started(seed: i64, tuning: &Tuning) -> GameState {
        let settings = LevelSettings {
            seed,
            ..Default::default()
        };
        let mut state = GameState::new(&settings, tuning);
        state.start();
        state
    }

    #[test]
    fn test_tick_countdown_to_running() {
        let tuning = Tuning::default();
        let mut state = started(12345, &tuning);
        assert_eq!(state.phase, GamePhase::Countdown);

        let input = TickInput::default();
        let ticks = (tuning.countdown / SIM_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            tick(&mut state, &input, SIM_DT);
            // Player is held during the countdown
            if state.phase == GamePhase::Countdown {
                assert_eq!(state.player.pos.z, 0.0);
            }
        }
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.drain_events().contains(&GameEvent::CountdownFinished));
    }

    #[test]
    fn test_tick_pause() {
        let tuning = Tuning {
            countdown: 0.0,
            ..Default::default()
        };
        let mut state = started(12345, &tuning);
        tick(&mut state, &TickInput::default(), SIM_DT);
        let z = state.player.pos.z;
        assert!(z > 0.0);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.pos.z, z);

        // Unpause
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.player.pos.z > z);
    }

    #[test]
    fn test_lane_switch_slides_player() {
        let tuning = Tuning {
            countdown: 0.0,
            ..Default::default()
        };
        let mut state = started(5, &tuning);
        let switch = TickInput {
            lane_switch: Some(-1),
            ..Default::default()
        };
        tick(&mut state, &switch, SIM_DT);
        assert_eq!(state.player.lane, 0);

        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.player.pos.x, -3.0);
    }

    #[test]
    fn test_passing_rows_keeps_level_ahead() {
        let tuning = Tuning {
            countdown: 0.0,
            lives: 255,
            ..Default::default()
        };
        let mut state = started(31, &tuning);
        let input = TickInput::headless();

        for _ in 0..(60 * 20) {
            tick(&mut state, &input, SIM_DT);
        }

        assert!(state.score > 0);
        // One row replaces each passed row
        assert_eq!(state.progression.pending(), 10);
        let front = state.progression.nearest().unwrap();
        assert!(front + 1.0 >= state.player.pos.z);
        // Nothing behind the player stays active
        for entity in state.pool.active() {
            assert!(entity.pos.z + 8.0 > state.player.pos.z);
        }
    }

    #[test]
    fn test_headless_contact_hits_player() {
        let tuning = Tuning {
            countdown: 0.0,
            ..Default::default()
        };
        let mut state = started(8, &tuning);
        let id = state.pool.acquire(EntityKind::Grey);
        let lane = state.player.lane;
        let entity = state.pool.get_mut(id).unwrap();
        entity.activate(lane, Vec3::new(0.0, 0.0, 0.3), &state.lanes, &mut state.rng, &state.tuning);

        tick(&mut state, &TickInput::headless(), SIM_DT);
        assert_eq!(state.lives, tuning.lives - 1);
    }

    #[test]
    fn test_host_reported_touch() {
        let tuning = Tuning {
            countdown: 0.0,
            ..Default::default()
        };
        let mut state = started(8, &tuning);
        let id = state.pool.acquire(EntityKind::LaneExpander);
        let entity = state.pool.get_mut(id).unwrap();
        entity.activate(0, Vec3::new(0.0, 0.0, 90.0), &state.lanes, &mut state.rng, &state.tuning);

        let input = TickInput {
            touched: vec![id],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.lanes.count(), 4);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::LaneAdded {
                side: LaneSide::Right,
                ..
            }
        )));
    }

    #[test]
    fn test_idle_mode_dodges_obstacle_ahead() {
        let tuning = Tuning {
            countdown: 0.0,
            ..Default::default()
        };
        let mut state = started(4, &tuning);
        assert_eq!(state.player.lane, 1);
        let id = state.pool.acquire(EntityKind::Grey);
        let entity = state.pool.get_mut(id).unwrap();
        entity.activate(1, Vec3::new(0.0, 0.0, 3.0), &state.lanes, &mut state.rng, &state.tuning);

        let input = TickInput {
            idle_mode: true,
            ..TickInput::headless()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.lane, 0);

        // Lane is clear now, so it stays put while sliding
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.lane, 0);
    }

    #[test]
    fn test_determinism() {
        // Two runs with the same seed and inputs stay identical
        let tuning = Tuning {
            countdown: 0.5,
            ..Default::default()
        };
        let mut state1 = started(99999, &tuning);
        let mut state2 = started(99999, &tuning);

        let inputs = [
            TickInput::headless(),
            TickInput {
                lane_switch: Some(1),
                detect_contacts: true,
                ..Default::default()
            },
            TickInput::headless(),
            TickInput {
                lane_switch: Some(-1),
                detect_contacts: true,
                ..Default::default()
            },
        ];

        for i in 0..(60 * 30) {
            let input = &inputs[(i / 45) % inputs.len()];
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.lives, state2.lives);
        assert_eq!(state1.drain_events(), state2.drain_events());
        let layout = |s: &GameState| -> Vec<(u32, usize, u32)> {
            s.pool
                .active()
                .map(|e| (e.id.0, e.lane, e.pos.x.to_bits()))
                .collect()
        };
        assert_eq!(layout(&state1), layout(&state2));
    }
}
