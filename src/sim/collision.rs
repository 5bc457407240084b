//! Collision detection and outcome classification
//!
//! Obstacles are tested on forgiving shrunk hitboxes; genes on full boxes.
//! A contact from above within `stomp_threshold` of an obstacle's top is a
//! stomp instead of a death.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::genes::Gene;
use super::obstacles::Obstacle;
use super::player::PlayerBody;
use crate::tuning::Tuning;

/// Axis-aligned box in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Inset each side by `fraction` of the box's extent on that axis
    pub fn shrink(&self, fraction: f32) -> Self {
        let inset = self.size() * fraction.clamp(0.0, 0.5);
        Self {
            min: self.min + inset,
            max: self.max - inset,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Strict overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Player hitbox used against obstacles
pub fn player_hitbox(player: &PlayerBody, tuning: &Tuning) -> Aabb {
    player.bounds().shrink(tuning.player.hitbox_shrink)
}

/// How a hitbox contact resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactKind {
    Lethal,
    Stomp,
}

/// Classify a hitbox overlap from the player's vertical motion and depth
pub fn classify_contact(
    player_box: &Aabb,
    player_vy: f32,
    obstacle_box: &Aabb,
    threshold: f32,
) -> ContactKind {
    let penetration = player_box.bottom() - obstacle_box.top();
    if player_vy > 0.0 && penetration <= threshold {
        ContactKind::Stomp
    } else {
        ContactKind::Lethal
    }
}

/// Everything that happened between the player and the world this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Index of the obstacle that killed the player
    pub lethal: Option<usize>,
    /// Index of the obstacle the player landed on
    pub stomp: Option<usize>,
    /// Visual-only overlap without a hitbox overlap
    pub near_miss: bool,
    /// Indices of genes touched this frame, ascending
    pub collected: Vec<usize>,
}

impl Resolution {
    pub fn hit(&self) -> bool {
        self.lethal.is_some() || self.stomp.is_some()
    }
}

/// Test the player against every obstacle and gene.
///
/// Only the first overlapping obstacle is acted on.
pub fn resolve(
    player: &PlayerBody,
    obstacles: &[Obstacle],
    genes: &[Gene],
    tuning: &Tuning,
) -> Resolution {
    let mut out = Resolution::default();
    let player_box = player_hitbox(player, tuning);

    for (i, obstacle) in obstacles.iter().enumerate() {
        let obstacle_box = obstacle.hitbox();
        if player_box.overlaps(&obstacle_box) {
            match classify_contact(
                &player_box,
                player.vel.y,
                &obstacle_box,
                tuning.obstacles.stomp_threshold,
            ) {
                ContactKind::Stomp => out.stomp = Some(i),
                ContactKind::Lethal => out.lethal = Some(i),
            }
            break;
        }
    }

    if !out.hit() {
        let visual = player.bounds();
        out.near_miss = obstacles.iter().any(|o| visual.overlaps(&o.bounds()));
    }

    let visual = player.bounds();
    out.collected = genes
        .iter()
        .enumerate()
        .filter(|(_, g)| visual.overlaps(&g.bounds()))
        .map(|(i, _)| i)
        .collect();

    out
}
