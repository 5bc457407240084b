//! Obstacle field: timed spawner with progressive unlocks and clusters
//!
//! Spawns happen off the right edge. Kinds unlock with elapsed run time,
//! are picked by weight, and sometimes arrive in small same-placement
//! clusters whose spacing scales with scroll speed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::clamp_dt;
use super::collision::Aabb;
use crate::tuning::{ObstacleKind, Placement, Tuning};

/// A live obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Index into `tuning.obstacles.kinds`
    pub kind: usize,
    pub name: String,
    pub display_name: String,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub hitbox_shrink: f32,
    pub hp: u8,
    pub placement: Placement,
    /// Survived a stomp; drawn darker
    pub damaged: bool,
}

impl Obstacle {
    pub fn new(kind_index: usize, kind: &ObstacleKind, x: f32, tuning: &Tuning) -> Self {
        let bottom = match kind.placement {
            Placement::Ground => tuning.world.ground_y,
            Placement::Floating => tuning.world.ground_y - kind.float_height,
        };
        Self {
            kind: kind_index,
            name: kind.name.clone(),
            display_name: kind.display_name.clone(),
            pos: Vec2::new(x, bottom - kind.height),
            size: Vec2::new(kind.width, kind.height),
            color: kind.color,
            hitbox_shrink: kind.hitbox_shrink,
            hp: kind.hp,
            placement: kind.placement,
            damaged: false,
        }
    }

    /// Full sprite bounds
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Shrunk collision box
    pub fn hitbox(&self) -> Aabb {
        self.bounds().shrink(self.hitbox_shrink)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    /// Colour to draw with; damaged obstacles are darkened
    pub fn display_color(&self) -> u32 {
        if !self.damaged {
            return self.color;
        }
        let darken = |c: u32| (c as f32 * 0.6) as u32;
        let r = darken((self.color >> 16) & 0xFF);
        let g = darken((self.color >> 8) & 0xFF);
        let b = darken(self.color & 0xFF);
        (r << 16) | (g << 8) | b
    }
}

/// Result of stomping an obstacle
#[derive(Debug, Clone)]
pub enum StompOutcome {
    Damaged { remaining: u8 },
    Destroyed(Obstacle),
}

/// Pick from `(index, weight)` candidates with a draw in `[0, total)`.
///
/// Weights are subtracted in order; the first candidate that takes the
/// remainder to zero or below wins. Non-positive weights never win.
pub fn pick_weighted(candidates: &[(usize, f32)], draw: f32) -> Option<usize> {
    let mut remaining = draw;
    let mut last = None;
    for &(index, weight) in candidates {
        if weight <= 0.0 {
            continue;
        }
        remaining -= weight;
        last = Some(index);
        if remaining <= 0.0 {
            return Some(index);
        }
    }
    // Draw at or past the total from float rounding
    last
}

fn total_weight(candidates: &[(usize, f32)]) -> f32 {
    candidates.iter().map(|&(_, w)| w.max(0.0)).sum()
}

/// Kinds that may spawn after `elapsed` seconds of running
pub fn available_kinds(tuning: &Tuning, elapsed: f32) -> Vec<(usize, f32)> {
    let t = &tuning.obstacles;
    t.kinds
        .iter()
        .enumerate()
        .filter(|(_, k)| k.unlock_after <= elapsed)
        .filter(|(_, k)| k.placement != Placement::Floating || elapsed >= t.float_unlock_elapsed)
        .map(|(i, k)| (i, k.spawn_weight))
        .collect()
}

fn roll_weighted<R: Rng + ?Sized>(candidates: &[(usize, f32)], rng: &mut R) -> Option<usize> {
    let total = total_weight(candidates);
    if total <= 0.0 {
        return None;
    }
    pick_weighted(candidates, rng.random::<f32>() * total)
}

/// Live obstacles plus spawn timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
}

impl ObstacleField {
    pub fn new(tuning: &Tuning) -> Self {
        let o = &tuning.obstacles;
        Self {
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            spawn_interval: o.spawn_base_interval.max(o.spawn_min_interval),
        }
    }

    /// Scroll left and drop obstacles past the left edge
    pub fn advance(&mut self, dt: f32, scroll_speed: f32) {
        let dx = scroll_speed * clamp_dt(dt);
        for obstacle in &mut self.obstacles {
            obstacle.pos.x -= dx;
        }
        self.obstacles.retain(|o| o.right() >= 0.0);
    }

    /// Accumulate time and spawn when the interval elapses.
    ///
    /// Returns how many obstacles were created.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        elapsed_run_time: f32,
        scroll_speed: f32,
        tuning: &Tuning,
        rng: &mut R,
    ) -> usize {
        self.spawn_timer += clamp_dt(dt);
        if self.spawn_timer < self.spawn_interval {
            return 0;
        }
        self.spawn_timer -= self.spawn_interval;

        let spawned = self.spawn_event(elapsed_run_time, scroll_speed, tuning, rng);
        self.spawn_interval = next_interval(tuning, rng);
        spawned
    }

    fn spawn_event<R: Rng + ?Sized>(
        &mut self,
        elapsed: f32,
        scroll_speed: f32,
        tuning: &Tuning,
        rng: &mut R,
    ) -> usize {
        let t = &tuning.obstacles;
        let available = available_kinds(tuning, elapsed);
        let Some(lead_index) = roll_weighted(&available, rng) else {
            log::debug!("No obstacle kinds available at {elapsed:.1}s; skipping spawn");
            return 0;
        };

        let lead = Obstacle::new(lead_index, &t.kinds[lead_index], tuning.world.width, tuning);
        let placement = lead.placement;
        let mut next_x = lead.right();
        self.obstacles.push(lead);
        let mut spawned = 1;

        if t.cluster_size_max > 1 && rng.random::<f32>() < t.cluster_probability {
            let followers = rng.random_range(1..=t.cluster_size_max - 1);
            let mut same: Vec<(usize, f32)> = available
                .iter()
                .copied()
                .filter(|&(i, _)| t.kinds[i].placement == placement)
                .collect();
            if total_weight(&same) <= 0.0 {
                same = vec![(lead_index, 1.0)];
            }
            let gap = t.cluster_gap * scroll_speed;
            for _ in 0..followers {
                let index = roll_weighted(&same, rng).unwrap_or(lead_index);
                let member = Obstacle::new(index, &t.kinds[index], next_x + gap, tuning);
                next_x = member.right();
                self.obstacles.push(member);
                spawned += 1;
            }
        }

        self.remove_unfair_floaters(t.air_ground_min_gap * scroll_speed);
        spawned
    }

    /// Drop floating obstacles too close to any ground obstacle
    fn remove_unfair_floaters(&mut self, min_gap: f32) {
        let grounds: Vec<(f32, f32)> = self
            .obstacles
            .iter()
            .filter(|o| o.placement == Placement::Ground)
            .map(|o| (o.pos.x, o.right()))
            .collect();
        if grounds.is_empty() {
            return;
        }
        let before = self.obstacles.len();
        self.obstacles.retain(|o| {
            o.placement != Placement::Floating
                || grounds.iter().all(|&(left, right)| {
                    let gap = (left - o.right()).max(o.pos.x - right).max(0.0);
                    gap >= min_gap
                })
        });
        let removed = before - self.obstacles.len();
        if removed > 0 {
            log::debug!("Removed {removed} floating obstacle(s) too close to ground obstacles");
        }
    }

    /// Damage an obstacle by one hit point, removing it at zero
    pub fn stomp(&mut self, index: usize) -> Option<StompOutcome> {
        let obstacle = self.obstacles.get_mut(index)?;
        obstacle.hp = obstacle.hp.saturating_sub(1);
        if obstacle.hp == 0 {
            Some(StompOutcome::Destroyed(self.obstacles.remove(index)))
        } else {
            obstacle.damaged = true;
            Some(StompOutcome::Damaged {
                remaining: obstacle.hp,
            })
        }
    }

    /// Box of the newest obstacle still entering from the right edge
    pub fn incoming(&self, world_width: f32) -> Option<Aabb> {
        self.obstacles
            .iter()
            .rev()
            .find(|o| o.right() > world_width)
            .map(Obstacle::bounds)
    }
}

/// Re-randomised interval: base ± variation, floored
fn next_interval<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> f32 {
    let t = &tuning.obstacles;
    let jitter = (rng.random::<f32>() * 2.0 - 1.0) * t.spawn_interval_variation;
    (t.spawn_base_interval + jitter).max(t.spawn_min_interval)
}
