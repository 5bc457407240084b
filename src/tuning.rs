//! Data-driven game balance
//!
//! Every tunable the simulation reads lives here. Sections deserialize with
//! `#[serde(default)]`, so a tuning file only needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Playfield geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    /// Y of the ground line (screen space, y grows downward)
    pub ground_y: f32,
    /// Starting scroll speed (px/s)
    pub base_speed: f32,
    /// Scroll speed gain per second of running (px/s²)
    pub speed_increment: f32,
    /// Scroll speed cap (px/s)
    pub max_speed: f32,
    /// Backdrop scroll speed on the title/countdown screens
    pub ready_scroll_speed: f32,
    /// Width of one repeating ground marker segment
    pub ground_segment: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            ground_y: 600.0,
            base_speed: 200.0,
            speed_increment: 2.0,
            max_speed: 500.0,
            ready_scroll_speed: 40.0,
            ground_segment: 50.0,
        }
    }
}

/// Player physics and feel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub start_x: f32,
    pub zone_left: f32,
    pub zone_right: f32,
    pub move_speed: f32,
    /// Fraction of speed kept when bouncing off a zone edge
    pub bounce_force: f32,
    pub gravity: f32,
    /// Gravity multiplier while descending
    pub fall_gravity_mult: f32,
    /// Launch velocity (negative = up)
    pub jump_velocity: f32,
    pub double_jump_mult: f32,
    pub jump_cut_multiplier: f32,
    pub coyote_time: f32,
    pub land_squash: (f32, f32),
    pub jump_stretch: (f32, f32),
    pub squash_relax_rate: f32,
    pub land_duration: f32,
    pub anim_fps: f32,
    /// Horizontal speed above which a grounded player reads as running
    pub run_threshold: f32,
    pub hitbox_shrink: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 80.0,
            start_x: 200.0,
            zone_left: 80.0,
            zone_right: 560.0,
            move_speed: 300.0,
            bounce_force: 0.5,
            gravity: 1800.0,
            fall_gravity_mult: 1.6,
            jump_velocity: -650.0,
            double_jump_mult: 0.8,
            jump_cut_multiplier: 0.5,
            coyote_time: 0.1,
            land_squash: (1.3, 0.7),
            jump_stretch: (0.8, 1.2),
            squash_relax_rate: 12.0,
            land_duration: 0.15,
            anim_fps: 10.0,
            run_threshold: 5.0,
            hitbox_shrink: 0.2,
        }
    }
}

/// Where an obstacle sits vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Ground,
    Floating,
}

/// Static description of one obstacle kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleKind {
    pub name: String,
    pub display_name: String,
    pub width: f32,
    pub height: f32,
    pub color: u32,
    pub hitbox_shrink: f32,
    pub placement: Placement,
    /// Gap between the ground line and the obstacle bottom (floating only)
    #[serde(default)]
    pub float_height: f32,
    pub spawn_weight: f32,
    /// Seconds of running before this kind can spawn
    pub unlock_after: f32,
    #[serde(default = "default_hp")]
    pub hp: u8,
}

fn default_hp() -> u8 {
    1
}

/// Obstacle spawner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub kinds: Vec<ObstacleKind>,
    pub spawn_base_interval: f32,
    pub spawn_interval_variation: f32,
    pub spawn_min_interval: f32,
    /// Seconds of running before any floating kind can spawn
    pub float_unlock_elapsed: f32,
    pub cluster_probability: f32,
    /// Largest cluster, lead included
    pub cluster_size_max: u32,
    /// Gap between cluster members, in seconds of scroll
    pub cluster_gap: f32,
    /// Minimum gap between floating and ground obstacles, in seconds of scroll
    pub air_ground_min_gap: f32,
    /// Max penetration below an obstacle's top that still counts as a stomp (px)
    pub stomp_threshold: f32,
    pub stomp_bounce_velocity: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            kinds: vec![
                ObstacleKind {
                    name: "kidney-stone".into(),
                    display_name: "Kidney Stone".into(),
                    width: 48.0,
                    height: 48.0,
                    color: 0x8B7355,
                    hitbox_shrink: 0.15,
                    placement: Placement::Ground,
                    float_height: 0.0,
                    spawn_weight: 3.0,
                    unlock_after: 0.0,
                    hp: 1,
                },
                ObstacleKind {
                    name: "toxin".into(),
                    display_name: "Toxin".into(),
                    width: 44.0,
                    height: 60.0,
                    color: 0x7B1FA2,
                    hitbox_shrink: 0.15,
                    placement: Placement::Ground,
                    float_height: 0.0,
                    spawn_weight: 2.0,
                    unlock_after: 10.0,
                    hp: 2,
                },
                ObstacleKind {
                    name: "salt-crystal".into(),
                    display_name: "Salt Crystal".into(),
                    width: 40.0,
                    height: 40.0,
                    color: 0xE0E0E0,
                    hitbox_shrink: 0.20,
                    placement: Placement::Floating,
                    float_height: 120.0,
                    spawn_weight: 1.0,
                    unlock_after: 20.0,
                    hp: 1,
                },
            ],
            spawn_base_interval: 2.0,
            spawn_interval_variation: 0.5,
            spawn_min_interval: 0.6,
            float_unlock_elapsed: 15.0,
            cluster_probability: 0.25,
            cluster_size_max: 3,
            cluster_gap: 0.35,
            air_ground_min_gap: 0.6,
            stomp_threshold: 14.0,
            stomp_bounce_velocity: -520.0,
        }
    }
}

/// One collectible gene and its educational card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneInfo {
    pub name: String,
    pub color: u32,
    pub points: u32,
    pub width: f32,
    pub height: f32,
    pub disease_name: String,
    pub description: String,
    pub inheritance: String,
    pub omim_id: String,
    pub omim_url: String,
    pub gene_reviews_url: String,
}

/// Collectible spawner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneTuning {
    pub kinds: Vec<GeneInfo>,
    pub spawn_base_interval: f32,
    pub spawn_variation: f32,
    pub spawn_min_interval: f32,
    pub spawn_y_min: f32,
    pub spawn_y_max: f32,
    pub float_amplitude: f32,
    /// Angular frequency of the float (rad/s)
    pub float_freq: f32,
    /// Chance a gene is placed right above an incoming obstacle
    pub risk_spawn_probability: f32,
    pub risk_gap: f32,
}

impl Default for GeneTuning {
    fn default() -> Self {
        Self {
            kinds: vec![
                GeneInfo {
                    name: "PKD1".into(),
                    color: 0x4CAF50,
                    points: 10,
                    width: 36.0,
                    height: 36.0,
                    disease_name: "Autosomal Dominant Polycystic Kidney Disease".into(),
                    description: "Fluid-filled cysts grow in both kidneys and slowly replace healthy tissue.".into(),
                    inheritance: "Autosomal dominant".into(),
                    omim_id: "173900".into(),
                    omim_url: "https://omim.org/entry/173900".into(),
                    gene_reviews_url: "https://www.ncbi.nlm.nih.gov/books/NBK1246/".into(),
                },
                GeneInfo {
                    name: "COL4A5".into(),
                    color: 0x2196F3,
                    points: 15,
                    width: 36.0,
                    height: 36.0,
                    disease_name: "Alport Syndrome".into(),
                    description: "Defective type IV collagen damages the kidney filters, the inner ear and the eye.".into(),
                    inheritance: "X-linked".into(),
                    omim_id: "301050".into(),
                    omim_url: "https://omim.org/entry/301050".into(),
                    gene_reviews_url: "https://www.ncbi.nlm.nih.gov/books/NBK1207/".into(),
                },
                GeneInfo {
                    name: "NPHS1".into(),
                    color: 0xFF9800,
                    points: 20,
                    width: 36.0,
                    height: 36.0,
                    disease_name: "Congenital Nephrotic Syndrome, Finnish Type".into(),
                    description: "Loss of nephrin lets protein leak into the urine from before birth.".into(),
                    inheritance: "Autosomal recessive".into(),
                    omim_id: "256300".into(),
                    omim_url: "https://omim.org/entry/256300".into(),
                    gene_reviews_url: "https://www.ncbi.nlm.nih.gov/books/NBK1484/".into(),
                },
            ],
            spawn_base_interval: 3.0,
            spawn_variation: 1.0,
            spawn_min_interval: 1.0,
            spawn_y_min: 380.0,
            spawn_y_max: 500.0,
            float_amplitude: 10.0,
            float_freq: 3.0,
            risk_spawn_probability: 0.3,
            risk_gap: 40.0,
        }
    }
}

/// Phase timers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Number of numbered countdown steps before "Go"
    pub countdown_from: u32,
    pub countdown_step: f32,
    pub death_duration: f32,
    pub restart_cooldown: f32,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            countdown_step: 0.8,
            death_duration: 0.5,
            restart_cooldown: 1.5,
        }
    }
}

/// Visual feedback timelines (data only; drawn elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsTuning {
    pub shake_amplitude: f32,
    pub shake_duration: f32,
    pub flash_interval: f32,
    pub near_miss_flash_duration: f32,
    pub gene_flash_duration: f32,
    pub popup_rise_speed: f32,
    pub popup_fade_rate: f32,
    pub ring_growth: f32,
    pub ring_fade_rate: f32,
    /// Demo-mode jump lookahead, in seconds of scroll
    pub autopilot_lookahead: f32,
}

impl Default for EffectsTuning {
    fn default() -> Self {
        Self {
            shake_amplitude: 8.0,
            shake_duration: 0.3,
            flash_interval: 0.1,
            near_miss_flash_duration: 0.3,
            gene_flash_duration: 1.0,
            popup_rise_speed: 60.0,
            popup_fade_rate: 1.25,
            ring_growth: 160.0,
            ring_fade_rate: 2.5,
            autopilot_lookahead: 0.35,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub genes: GeneTuning,
    pub timing: TimingTuning,
    pub effects: EffectsTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a file, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(TuningError::from)
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// Empty kind lists are allowed: spawners skip attempts instead.
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |what: &str| Err(TuningError::Invalid(what.to_string()));
        if self.world.max_speed < self.world.base_speed {
            return invalid("world.max_speed below world.base_speed");
        }
        if self.world.base_speed <= 0.0 {
            return invalid("world.base_speed must be positive");
        }
        if self.player.zone_right - self.player.zone_left < self.player.width {
            return invalid("player movement zone narrower than the player");
        }
        if self.obstacles.spawn_min_interval <= 0.0 || self.genes.spawn_min_interval <= 0.0 {
            return invalid("spawn_min_interval must be positive");
        }
        if self.timing.countdown_step <= 0.0 {
            return invalid("timing.countdown_step must be positive");
        }
        if self.genes.spawn_y_max < self.genes.spawn_y_min {
            return invalid("genes.spawn_y_max below genes.spawn_y_min");
        }
        if self.obstacles.kinds.iter().any(|k| k.spawn_weight < 0.0) {
            return invalid("negative obstacle spawn_weight");
        }
        Ok(())
    }

    /// Ground contact line for the player's top edge
    #[inline]
    pub fn player_contact_y(&self) -> f32 {
        self.world.ground_y - self.player.height
    }
}
