//! Contact detection between the player and track entities
//!
//! Stand-in for engine trigger volumes: every body is an axis-aligned box on
//! the XZ plane. Hosts with a real physics engine can feed touches through
//! `TickInput` instead and ignore this module.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};

use super::entity::Entity;
use super::pool::EntityId;

/// Half extents (x, z) of an obstacle or power-up
pub const ENTITY_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.5);
/// Half extents (x, z) of the player
pub const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(0.4, 0.4);

/// Whether two boxes centred at `a` and `b` overlap on the XZ plane
pub fn boxes_overlap(a: Vec3, a_half: Vec2, b: Vec3, b_half: Vec2) -> bool {
    (a.x - b.x).abs() < a_half.x + b_half.x && (a.z - b.z).abs() < a_half.y + b_half.y
}

/// Active entities the player currently overlaps, in id order
pub fn player_contacts<'a>(
    player_pos: Vec3,
    entities: impl IntoIterator<Item = &'a Entity>,
) -> Vec<EntityId> {
    entities
        .into_iter()
        .filter(|e| e.active)
        .filter(|e| boxes_overlap(player_pos, PLAYER_HALF_EXTENTS, e.pos, ENTITY_HALF_EXTENTS))
        .map(|e| e.id)
        .collect()
}

/// Overlapping obstacle pairs where at least one side is moving.
///
/// Pairs are ordered `(lower id, higher id)`.
pub fn obstacle_pairs<'a>(
    entities: impl IntoIterator<Item = &'a Entity>,
) -> BTreeSet<(EntityId, EntityId)> {
    let obstacles: Vec<&Entity> = entities
        .into_iter()
        .filter(|e| e.active && e.kind.is_obstacle())
        .collect();

    let mut pairs = BTreeSet::new();
    for (i, a) in obstacles.iter().enumerate() {
        for b in &obstacles[i + 1..] {
            if !(a.is_moving() || b.is_moving()) {
                continue;
            }
            if boxes_overlap(a.pos, ENTITY_HALF_EXTENTS, b.pos, ENTITY_HALF_EXTENTS) {
                pairs.insert((a.id.min(b.id), a.id.max(b.id)));
            }
        }
    }
    pairs
}
