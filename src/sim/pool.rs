//! Per-kind entity pools
//!
//! Entities live in one arena for the whole run and are addressed by
//! `EntityId`. Each kind has a FIFO queue of pooled ids; acquiring pops the
//! front, releasing pushes the back. An empty queue grows by a fixed batch.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use crate::consts::POOL_BATCH;
use crate::error::PoolError;

/// Stable handle into the pool arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityPool {
    entities: Vec<Entity>,
    queues: [VecDeque<EntityId>; EntityKind::ALL.len()],
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with `per_kind` pooled instances of every kind
    pub fn with_prewarm(per_kind: usize) -> Self {
        let mut pool = Self::new();
        for _ in 0..per_kind {
            for kind in EntityKind::ALL {
                let id = pool.materialise(kind);
                pool.queues[kind.index()].push_back(id);
            }
        }
        pool
    }

    /// Take a pooled entity of `kind`, growing the pool if none are left.
    ///
    /// The returned entity is marked active; the caller places it.
    pub fn acquire(&mut self, kind: EntityKind) -> EntityId {
        let id = match self.queues[kind.index()].pop_front() {
            Some(id) => id,
            None => {
                for _ in 0..POOL_BATCH - 1 {
                    let id = self.materialise(kind);
                    self.queues[kind.index()].push_back(id);
                }
                log::debug!(
                    "{} pool empty, grew to {} instances",
                    kind.as_str(),
                    self.count_of(kind)
                );
                self.materialise(kind)
            }
        };
        self.entities[id.0 as usize].active = true;
        id
    }

    /// Deactivate an entity, reset its state and queue it for reuse
    pub fn release(&mut self, id: EntityId) -> Result<(), PoolError> {
        let entity = self
            .entities
            .get_mut(id.0 as usize)
            .ok_or(PoolError::UnknownEntity(id))?;
        if !entity.active {
            return Err(PoolError::AlreadyPooled(id));
        }
        entity.reset();
        let kind = entity.kind;
        self.queues[kind.index()].push_back(id);
        Ok(())
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0 as usize)
    }

    /// Pooled (inactive) instances of `kind`
    pub fn queued(&self, kind: EntityKind) -> usize {
        self.queues[kind.index()].len()
    }

    /// Every instance ever created
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of active entities in id order
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.active().map(|e| e.id).collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active)
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter(|e| e.active)
    }

    fn count_of(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    fn materialise(&mut self, kind: EntityKind) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity::new(id, kind));
        id
    }
}
