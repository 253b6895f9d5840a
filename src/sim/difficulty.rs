//! Difficulty progression
//!
//! Forward speed holds for an interval, then ramps up gradually by a fixed
//! step, then holds again, until the cap. Side speed follows in proportion.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    target_speed: f32,
    /// Elapsed time at which the next ramp may begin
    next_increase_at: f32,
    side_rate: f32,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        let ratio = if tuning.forward_speed > 0.0 {
            tuning.side_speed / tuning.forward_speed
        } else {
            0.0
        };
        Self {
            target_speed: tuning.forward_speed + tuning.forward_speed_increase,
            next_increase_at: tuning.speed_increase_interval,
            side_rate: ratio * tuning.forward_increase_rate,
        }
    }

    /// Advance the ramp; `elapsed` is run time including this step
    pub fn update(
        &mut self,
        forward_speed: &mut f32,
        side_speed: &mut f32,
        elapsed: f32,
        dt: f32,
        tuning: &Tuning,
    ) {
        if elapsed < self.next_increase_at || *forward_speed >= tuning.max_forward_speed {
            return;
        }

        if *forward_speed <= self.target_speed {
            *forward_speed += tuning.forward_increase_rate * dt;
            *side_speed += self.side_rate * dt;
            return;
        }

        self.target_speed = *forward_speed + tuning.forward_speed_increase;
        self.next_increase_at = elapsed + tuning.speed_increase_interval;
        log::debug!("Forward speed now {:.2}", forward_speed);
    }
}
