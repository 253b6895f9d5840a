//! Lane Runner - procedural level generation for an endless lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, pools, row generation, behaviours)
//! - `settings`: Persisted level generation settings
//! - `tuning`: Data-driven game balance
//! - `error`: Error types shared by the simulation and settings

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{LaneError, PoolError, SettingsError};
pub use settings::{LevelSettings, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Distance between neighbouring lanes
    pub const LANE_WIDTH: f32 = 3.0;
    /// Height at which obstacles and power-ups sit on the track
    pub const ENTITY_Y: f32 = 0.0;

    /// Lower bound of a row's fill, as a fraction of the lane count
    pub const ROW_MIN_FILL: f32 = 0.7;
    /// Default upper bound (exclusive) of a row's fill
    pub const ROW_MAX_FILL: f32 = 0.8;

    /// Instances materialised when a pool queue runs dry
    pub const POOL_BATCH: usize = 5;
    /// Instances created per kind when a run starts
    pub const POOL_PREWARM: usize = 12;

    /// Rows that must be passed before the first power-up can spawn
    pub const POWERUP_SPAWN_RATE: u32 = 6;
    /// Chance for a power-up once the cadence threshold is reached
    pub const POWERUP_SPAWN_CHANCE: f32 = 0.5;

    /// How far behind the player a row must be before it counts as passed
    pub const PASS_MARGIN: f32 = 1.0;

    /// Player defaults
    pub const PLAYER_LIVES: u8 = 3;
    pub const PLAYER_FORWARD_SPEED: f32 = 8.0;
    pub const PLAYER_SIDE_SPEED: f32 = 12.0;
    pub const PLAYER_MAX_FORWARD_SPEED: f32 = 24.0;
    /// Seconds of immunity after an obstacle hit
    pub const HIT_IMMUNITY_SECS: f32 = 3.0;

    /// Countdown before the player starts moving
    pub const COUNTDOWN_SECS: f32 = 3.0;

    /// Obstacle movement
    pub const BLUE_SPEED: f32 = 1.0;
    pub const BLUE_INTERVAL_SECS: f32 = 2.0;
    pub const ORANGE_SPEED: f32 = 1.0;

    /// Difficulty progression
    pub const SPEED_INCREASE_INTERVAL_SECS: f32 = 15.0;
    pub const FORWARD_SPEED_INCREASE: f32 = 2.5;
    pub const FORWARD_INCREASE_RATE: f32 = 0.1;
}

/// Move `current` toward `target` by at most `max_delta`, landing exactly on it
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}
