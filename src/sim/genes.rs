//! Gene tokens: floating collectibles that carry score and an info card

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::clamp_dt;
use super::collision::Aabb;
use crate::tuning::{GeneInfo, Tuning};

/// A live collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gene {
    pub kind: usize,
    pub info: GeneInfo,
    /// Top-left corner
    pub pos: Vec2,
    /// Resting y the float oscillates around
    pub base_y: f32,
    /// Float phase in radians
    pub phase: f32,
    pub size: Vec2,
    pub color: u32,
}

impl Gene {
    pub fn new(kind_index: usize, info: GeneInfo, pos: Vec2) -> Self {
        Self {
            kind: kind_index,
            size: Vec2::new(info.width, info.height),
            color: info.color,
            info,
            pos,
            base_y: pos.y,
            phase: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn points(&self) -> u32 {
        self.info.points
    }
}

/// Live genes plus spawn timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneField {
    pub genes: Vec<Gene>,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
}

impl GeneField {
    pub fn new(tuning: &Tuning) -> Self {
        let g = &tuning.genes;
        Self {
            genes: Vec::new(),
            spawn_timer: 0.0,
            spawn_interval: g.spawn_base_interval.max(g.spawn_min_interval),
        }
    }

    /// Scroll left, apply the float, and prune genes past the left edge
    pub fn advance(&mut self, dt: f32, scroll_speed: f32, tuning: &Tuning) {
        let dt = clamp_dt(dt);
        let t = &tuning.genes;
        for gene in &mut self.genes {
            gene.pos.x -= scroll_speed * dt;
            gene.phase += t.float_freq * dt;
            gene.pos.y = gene.base_y + gene.phase.sin() * t.float_amplitude;
        }
        self.genes.retain(|g| g.pos.x + g.size.x >= 0.0);
    }

    /// Accumulate time and spawn at most one gene.
    ///
    /// `risk_anchor` is the box of an obstacle still entering the screen;
    /// some genes are placed right above it.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        speed_ratio: f32,
        risk_anchor: Option<Aabb>,
        tuning: &Tuning,
        rng: &mut R,
    ) -> bool {
        self.spawn_timer += clamp_dt(dt);
        if self.spawn_timer < self.spawn_interval {
            return false;
        }
        self.spawn_timer -= self.spawn_interval;
        self.spawn_interval = next_interval(speed_ratio, tuning, rng);

        let t = &tuning.genes;
        if t.kinds.is_empty() {
            log::debug!("No gene kinds configured; skipping spawn");
            return false;
        }
        let kind = rng.random_range(0..t.kinds.len());
        let info = t.kinds[kind].clone();

        let pos = match risk_anchor {
            Some(anchor) if rng.random::<f32>() < t.risk_spawn_probability => Vec2::new(
                anchor.center().x - info.width * 0.5,
                anchor.top() - t.risk_gap - info.height,
            ),
            _ => {
                let span = t.spawn_y_max - t.spawn_y_min;
                Vec2::new(tuning.world.width, t.spawn_y_min + rng.random::<f32>() * span)
            }
        };
        self.genes.push(Gene::new(kind, info, pos));
        true
    }

    /// Remove the genes at `indices` and return them in index order
    pub fn collect(&mut self, indices: &[usize]) -> Vec<Gene> {
        let mut taken = Vec::with_capacity(indices.len());
        let mut i = 0;
        self.genes.retain(|gene| {
            let keep = !indices.contains(&i);
            if !keep {
                taken.push(gene.clone());
            }
            i += 1;
            keep
        });
        taken
    }
}

/// Re-randomised interval, shortened as the run speeds up
fn next_interval<R: Rng + ?Sized>(speed_ratio: f32, tuning: &Tuning, rng: &mut R) -> f32 {
    let t = &tuning.genes;
    let jitter = (rng.random::<f32>() * 2.0 - 1.0) * t.spawn_variation;
    ((t.spawn_base_interval + jitter) / speed_ratio.max(1.0)).max(t.spawn_min_interval)
}
