//! Run score: distance, gene points, collected history

use serde::{Deserialize, Serialize};

use super::clock::clamp_dt;
use super::genes::Gene;
use crate::consts::DISTANCE_PER_METER;
use crate::tuning::GeneInfo;

/// Name of the last collected gene, shown briefly on the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneFlash {
    pub name: String,
    pub remaining: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreKeeper {
    /// Pixels scrolled while running
    pub distance: f32,
    pub gene_score: u64,
    /// Every gene collected this run, in order
    pub history: Vec<GeneInfo>,
    pub flash: Option<GeneFlash>,
    /// Best total across runs; survives `reset`
    pub high_score: u64,
}

impl ScoreKeeper {
    pub fn new(high_score: u64) -> Self {
        Self {
            high_score,
            ..Self::default()
        }
    }

    pub fn add_distance(&mut self, scroll_speed: f32, dt: f32) {
        self.distance += scroll_speed.max(0.0) * clamp_dt(dt);
    }

    /// Whole metres run
    pub fn meters(&self) -> u64 {
        (self.distance / DISTANCE_PER_METER).floor() as u64
    }

    pub fn total(&self) -> u64 {
        self.meters() + self.gene_score
    }

    /// Add a gene's points, remember it, and flash its name
    pub fn record_gene(&mut self, gene: &Gene, flash_duration: f32) -> u32 {
        let points = gene.points();
        self.gene_score += u64::from(points);
        self.history.push(gene.info.clone());
        self.flash = Some(GeneFlash {
            name: gene.info.name.clone(),
            remaining: flash_duration,
        });
        points
    }

    pub fn tick_flash(&mut self, dt: f32) {
        if let Some(flash) = &mut self.flash {
            flash.remaining -= clamp_dt(dt);
            if flash.remaining <= 0.0 {
                self.flash = None;
            }
        }
    }

    /// Clear the run; the high score is kept
    pub fn reset(&mut self) {
        *self = Self::new(self.high_score);
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            distance: self.distance,
            meters: self.meters(),
            gene_score: self.gene_score,
            total: self.total(),
            high_score: self.high_score,
            history: self.history.iter().map(|g| g.name.clone()).collect(),
            flash: self.flash.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSnapshot {
    pub distance: f32,
    pub meters: u64,
    pub gene_score: u64,
    pub total: u64,
    pub high_score: u64,
    pub history: Vec<String>,
    pub flash: Option<GeneFlash>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn gene(kind: usize) -> Gene {
        let tuning = Tuning::default();
        Gene::new(kind, tuning.genes.kinds[kind].clone(), Vec2::ZERO)
    }

    #[test]
    fn test_total_is_meters_plus_genes() {
        let mut score = ScoreKeeper::new(0);
        score.distance = 1250.0;
        score.record_gene(&gene(0), 1.0);
        score.record_gene(&gene(2), 1.0);
        assert_eq!(score.meters(), 12);
        assert_eq!(score.gene_score, 30);
        assert_eq!(score.total(), 42);
        assert_eq!(score.history.len(), 2);
    }

    #[test]
    fn test_flash_expires() {
        let mut score = ScoreKeeper::new(0);
        score.record_gene(&gene(1), 0.15);
        score.tick_flash(0.1);
        assert_eq!(score.flash.as_ref().map(|f| f.name.as_str()), Some("COL4A5"));
        score.tick_flash(0.1);
        assert!(score.flash.is_none());
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut score = ScoreKeeper::new(77);
        score.add_distance(200.0, 0.1);
        score.record_gene(&gene(0), 1.0);
        score.reset();
        assert_eq!(score.distance, 0.0);
        assert_eq!(score.gene_score, 0);
        assert!(score.history.is_empty());
        assert!(score.flash.is_none());
        assert_eq!(score.high_score, 77);
    }

    #[test]
    fn test_distance_ignores_bad_dt() {
        let mut score = ScoreKeeper::new(0);
        score.add_distance(200.0, f32::NAN);
        score.add_distance(200.0, -1.0);
        assert_eq!(score.distance, 0.0);
    }
}
