//! Difficulty ramp: the shared scroll speed

use serde::{Deserialize, Serialize};

use super::clock::clamp_dt;
use crate::tuning::WorldTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyRamp {
    pub base: f32,
    pub speed: f32,
    /// Speed gained per second of running
    pub increment: f32,
    pub max: f32,
}

impl DifficultyRamp {
    pub fn new(world: &WorldTuning) -> Self {
        Self {
            base: world.base_speed,
            speed: world.base_speed,
            increment: world.speed_increment,
            max: world.max_speed,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.speed = (self.speed + self.increment * clamp_dt(dt)).min(self.max);
    }

    /// Current speed relative to the starting speed
    pub fn speed_ratio(&self) -> f32 {
        if self.base > 0.0 { self.speed / self.base } else { 1.0 }
    }

    pub fn reset(&mut self) {
        self.speed = self.base;
    }
}
