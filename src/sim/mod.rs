//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod contacts;
pub mod difficulty;
pub mod entity;
pub mod generator;
pub mod lanes;
pub mod pool;
pub mod progression;
pub mod rng;
pub mod state;
pub mod tick;

pub use entity::{Behaviour, Entity, EntityKind, Interaction, Transit};
pub use generator::{GeneratorPhase, Row, RowGenerator, SpawnContext, obstacle_count};
pub use lanes::{LaneRegistry, LaneSide};
pub use pool::{EntityId, EntityPool};
pub use progression::ProgressionTrigger;
pub use rng::RunRng;
pub use state::{GameEvent, GamePhase, GameState, Player};
pub use tick::{TickInput, tick};
