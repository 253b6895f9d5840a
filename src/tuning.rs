//! Data-driven game balance
//!
//! Values the settings file does not expose. A run copies its `Tuning` at
//! construction, the same way it freezes `LevelSettings`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Exclusive upper bound of a row's fill, as a fraction of the lane count
    pub row_percentage: f32,
    /// Rows between power-up opportunities
    pub powerup_spawn_rate: u32,
    /// Chance for a power-up once the threshold is reached
    pub powerup_spawn_chance: f32,
    pub lane_width: f32,
    pub pool_prewarm: usize,

    pub forward_speed: f32,
    pub side_speed: f32,
    pub max_forward_speed: f32,
    pub speed_increase_interval: f32,
    pub forward_speed_increase: f32,
    pub forward_increase_rate: f32,

    pub blue_speed: f32,
    pub blue_interval: f32,
    pub orange_speed: f32,

    pub lives: u8,
    pub hit_immunity: f32,
    pub countdown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            row_percentage: ROW_MAX_FILL,
            powerup_spawn_rate: POWERUP_SPAWN_RATE,
            powerup_spawn_chance: POWERUP_SPAWN_CHANCE,
            lane_width: LANE_WIDTH,
            pool_prewarm: POOL_PREWARM,

            forward_speed: PLAYER_FORWARD_SPEED,
            side_speed: PLAYER_SIDE_SPEED,
            max_forward_speed: PLAYER_MAX_FORWARD_SPEED,
            speed_increase_interval: SPEED_INCREASE_INTERVAL_SECS,
            forward_speed_increase: FORWARD_SPEED_INCREASE,
            forward_increase_rate: FORWARD_INCREASE_RATE,

            blue_speed: BLUE_SPEED,
            blue_interval: BLUE_INTERVAL_SECS,
            orange_speed: ORANGE_SPEED,

            lives: PLAYER_LIVES,
            hit_immunity: HIT_IMMUNITY_SECS,
            countdown: COUNTDOWN_SECS,
        }
    }
}

impl Tuning {
    /// Clamp row percentage to the range the generator supports
    pub fn row_percentage(&self) -> f32 {
        self.row_percentage.clamp(0.1, 1.0)
    }
}
