//! Short-lived visual feedback data: score popups and stomp rings

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::clock::clamp_dt;
use crate::tuning::EffectsTuning;

/// Floating "+N" text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Popup {
    pub text: String,
    pub pos: Vec2,
    pub color: u32,
    pub alpha: f32,
}

/// Expanding ring left by a stomp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub popups: Vec<Popup>,
    pub rings: Vec<Ring>,
    /// Remaining near-miss highlight time
    pub near_miss_timer: f32,
}

impl Effects {
    pub fn popup(&mut self, text: impl Into<String>, pos: Vec2, color: u32) {
        self.popups.push(Popup {
            text: text.into(),
            pos,
            color,
            alpha: 1.0,
        });
    }

    pub fn ring(&mut self, center: Vec2, radius: f32) {
        self.rings.push(Ring {
            center,
            radius,
            alpha: 1.0,
        });
    }

    pub fn flag_near_miss(&mut self, tuning: &EffectsTuning) {
        self.near_miss_timer = tuning.near_miss_flash_duration;
    }

    /// Drift, grow and fade everything; drop what has faded out
    pub fn age(&mut self, dt: f32, tuning: &EffectsTuning) {
        let dt = clamp_dt(dt);
        for popup in &mut self.popups {
            popup.pos.y -= tuning.popup_rise_speed * dt;
            popup.alpha -= tuning.popup_fade_rate * dt;
        }
        self.popups.retain(|p| p.alpha > 0.0);

        for ring in &mut self.rings {
            ring.radius += tuning.ring_growth * dt;
            ring.alpha -= tuning.ring_fade_rate * dt;
        }
        self.rings.retain(|r| r.alpha > 0.0);

        self.near_miss_timer = (self.near_miss_timer - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
