//! Lane registry
//!
//! Ordered lane X positions, left to right. Lanes are only ever added during a
//! run; a new run builds a new registry.

use serde::{Deserialize, Serialize};

use super::rng::RunRng;
use crate::error::LaneError;

/// Side of the track a lane is inserted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneRegistry {
    lanes: Vec<f32>,
    width: f32,
}

impl LaneRegistry {
    /// `count` lanes centred on X = 0
    pub fn new(count: usize, width: f32) -> Self {
        let start = -((count.saturating_sub(1)) as f32 * width) / 2.0;
        let lanes = (0..count).map(|i| start + i as f32 * width).collect();
        Self { lanes, width }
    }

    pub fn count(&self) -> usize {
        self.lanes.len()
    }

    /// True iff `0 <= index < count`
    pub fn exists(&self, index: i64) -> bool {
        index >= 0 && (index as usize) < self.lanes.len()
    }

    /// X of lane `index`. Out-of-range lookups are logged.
    pub fn lane_x(&self, index: usize) -> Result<f32, LaneError> {
        self.lanes.get(index).copied().ok_or_else(|| {
            let err = LaneError::OutOfRange {
                index: index as i64,
                count: self.lanes.len(),
            };
            log::error!("{}", err);
            err
        })
    }

    /// Index one step from `lane` in `direction`, if that lane exists
    pub fn neighbour(&self, lane: usize, direction: i32) -> Option<usize> {
        let target = lane as i64 + direction as i64;
        self.exists(target).then_some(target as usize)
    }

    /// The edge a player on `lane` is closest to; the middle counts as right
    pub fn side_nearest(&self, lane: usize) -> LaneSide {
        let middle = self.lanes.len().saturating_sub(1) as f32 / 2.0;
        if (lane as f32) < middle {
            LaneSide::Left
        } else {
            LaneSide::Right
        }
    }

    /// Add a lane one width beyond the edge on `side`, returning its index.
    ///
    /// A left insertion shifts every existing index up by one; the caller
    /// must re-index everything that tracks a lane.
    pub fn insert(&mut self, side: LaneSide) -> usize {
        match side {
            LaneSide::Left => {
                let x = self.lanes.first().map_or(0.0, |x| x - self.width);
                self.lanes.insert(0, x);
                0
            }
            LaneSide::Right => {
                let x = self.lanes.last().map_or(0.0, |x| x + self.width);
                self.lanes.push(x);
                self.lanes.len() - 1
            }
        }
    }

    /// A random existing neighbour of `current`, trying the other side if the
    /// first pick is off the edge
    pub fn random_adjacent(&self, current: usize, rng: &mut RunRng) -> Option<usize> {
        let direction = rng.direction();
        self.neighbour(current, direction)
            .or_else(|| self.neighbour(current, -direction))
    }

    /// Uniform lane index
    pub fn random_lane(&self, rng: &mut RunRng) -> usize {
        rng.range(0, self.lanes.len())
    }

    /// `n` distinct lane indices in draw order.
    ///
    /// `n` is clamped to the lane count.
    pub fn random_unique(&self, n: usize, rng: &mut RunRng) -> Vec<usize> {
        let n = n.min(self.lanes.len());
        let mut taken = vec![false; self.lanes.len()];
        let mut picked = Vec::with_capacity(n);

        while picked.len() < n {
            let lane = self.random_lane(rng);
            if !taken[lane] {
                taken[lane] = true;
                picked.push(lane);
            }
        }
        picked
    }
}
