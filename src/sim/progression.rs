//! Progression trigger
//!
//! Remembers the Z of every generated row, front first, and reports each row
//! exactly once when the player is fully past it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressionTrigger {
    rows: VecDeque<f32>,
    margin: f32,
}

impl ProgressionTrigger {
    pub fn new(margin: f32) -> Self {
        Self {
            rows: VecDeque::new(),
            margin,
        }
    }

    /// Track a newly generated row. Rows arrive in increasing Z.
    pub fn push_row(&mut self, z: f32) {
        debug_assert!(self.rows.back().is_none_or(|&last| last < z));
        self.rows.push_back(z);
    }

    /// Frontmost row not yet passed
    pub fn nearest(&self) -> Option<f32> {
        self.rows.front().copied()
    }

    /// Pop the frontmost row regardless of player position
    pub fn pop_nearest(&mut self) -> Option<f32> {
        self.rows.pop_front()
    }

    /// Pop every row the player at `player_z` has fully passed
    pub fn update(&mut self, player_z: f32) -> Vec<f32> {
        let mut passed = Vec::new();
        while let Some(&z) = self.rows.front() {
            if z + self.margin >= player_z {
                break;
            }
            passed.push(z);
            self.rows.pop_front();
        }
        passed
    }

    pub fn pending(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_fire_once() {
        let mut trigger = ProgressionTrigger::new(1.0);
        for z in [15.0, 22.5, 30.0] {
            trigger.push_row(z);
        }

        assert!(trigger.update(10.0).is_empty());
        assert!(trigger.update(16.0).is_empty());
        assert_eq!(trigger.update(16.5), vec![15.0]);
        assert!(trigger.update(16.5).is_empty());
        assert_eq!(trigger.update(40.0), vec![22.5, 30.0]);
        assert_eq!(trigger.pending(), 0);
    }

    #[test]
    fn test_nearest() {
        let mut trigger = ProgressionTrigger::new(1.0);
        assert_eq!(trigger.nearest(), None);
        trigger.push_row(5.0);
        trigger.push_row(8.0);
        assert_eq!(trigger.pop_nearest(), Some(5.0));
        assert_eq!(trigger.nearest(), Some(8.0));
    }
}
