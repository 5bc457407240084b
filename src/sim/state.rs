//! Run session state
//!
//! Everything one run needs lives in `RunSession`. Per-frame logic is in
//! `tick`; this module owns construction, reset and the read-only views.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::anim::AnimState;
use super::clock::FrameClock;
use super::effects::{Effects, Popup, Ring};
use super::genes::{Gene, GeneField};
use super::obstacles::{Obstacle, ObstacleField};
use super::player::{JumpKind, PlayerBody};
use super::ramp::DifficultyRamp;
use super::score::{ScoreKeeper, ScoreSnapshot};
use super::tick::{TickInput, tick};
use crate::highscores::HighScoreBook;
use crate::persistence::HighScoreStore;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Title screen, waiting for the first action
    Ready,
    /// 3-2-1-Go
    Countdown,
    Running,
    Paused,
    /// Short death animation; input ignored
    Dying,
    /// Score shown; restart after a cooldown
    GameOver,
}

/// Things that happened during a tick, for audio and rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunEvent {
    /// Countdown now shows `value` (0 is "Go")
    CountdownStep { value: u32 },
    Started,
    Jumped(JumpKind),
    Landed,
    Stomped { obstacle: String, destroyed: bool },
    NearMiss,
    GeneCollected { name: String, points: u32 },
    Died { obstacle: String },
    GameOver { score: u64, new_record: bool },
    Paused,
    Resumed,
    Reset,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub value: u32,
    /// Time into the current value
    pub timer: f32,
}

/// What killed the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathRecord {
    pub kind: usize,
    pub name: String,
    pub display_name: String,
    pub pos: Vec2,
}

/// Ground scroll offset for the background layer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Backdrop {
    pub ground_offset: f32,
}

impl Backdrop {
    pub fn scroll(&mut self, speed: f32, dt: f32, segment: f32) {
        self.ground_offset += speed * dt;
        if segment > 0.0 {
            self.ground_offset = self.ground_offset.rem_euclid(segment);
        }
    }
}

/// One player's game, from title screen through any number of restarts
#[derive(Debug)]
pub struct RunSession {
    pub tuning: Tuning,
    pub phase: RunPhase,
    pub countdown: Countdown,
    pub death_timer: f32,
    pub game_over_timer: f32,
    /// Seconds spent in `Running` this run
    pub run_elapsed: f32,
    pub ramp: DifficultyRamp,
    pub player: PlayerBody,
    pub obstacles: ObstacleField,
    pub genes: GeneField,
    pub score: ScoreKeeper,
    pub effects: Effects,
    pub backdrop: Backdrop,
    pub death: Option<DeathRecord>,
    /// The last game over set a new high score
    pub new_record: bool,
    pub(crate) events: Vec<RunEvent>,
    pub(crate) high_scores: HighScoreBook,
    pub(crate) clock: FrameClock,
    pub(crate) rng: Pcg32,
    seed: u64,
}

impl RunSession {
    pub fn new(tuning: Tuning, seed: u64, store: Box<dyn HighScoreStore>) -> Self {
        let high_scores = HighScoreBook::new(store);
        log::info!("New session (seed {seed}, high score {})", high_scores.best());
        Self {
            phase: RunPhase::Ready,
            countdown: Countdown::default(),
            death_timer: 0.0,
            game_over_timer: 0.0,
            run_elapsed: 0.0,
            ramp: DifficultyRamp::new(&tuning.world),
            player: PlayerBody::new(&tuning),
            obstacles: ObstacleField::new(&tuning),
            genes: GeneField::new(&tuning),
            score: ScoreKeeper::new(high_scores.best()),
            effects: Effects::default(),
            backdrop: Backdrop::default(),
            death: None,
            new_record: false,
            events: Vec::new(),
            high_scores,
            clock: FrameClock::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            tuning,
        }
    }

    /// Session with default tuning and an in-memory high score
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            Tuning::default(),
            seed,
            Box::new(crate::persistence::MemoryStore::new()),
        )
    }

    /// Seed the session RNG was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rebuild the run and return to `Ready`. The high score and RNG carry over.
    pub fn reset(&mut self) {
        self.phase = RunPhase::Ready;
        self.countdown = Countdown::default();
        self.death_timer = 0.0;
        self.game_over_timer = 0.0;
        self.run_elapsed = 0.0;
        self.ramp.reset();
        self.player = PlayerBody::new(&self.tuning);
        self.obstacles = ObstacleField::new(&self.tuning);
        self.genes = GeneField::new(&self.tuning);
        self.score.reset();
        self.effects.clear();
        self.death = None;
        self.new_record = false;
        self.events.push(RunEvent::Reset);
        log::info!("Run reset");
    }

    /// Advance using a driver timestamp in seconds
    pub fn frame(&mut self, now_secs: f64, input: &TickInput) {
        let dt = self.clock.delta(now_secs);
        tick(self, input, dt);
    }

    /// Events from the most recent tick
    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn high_score(&self) -> u64 {
        self.high_scores.best()
    }

    /// Restart is accepted once the cooldown has run out
    pub fn can_restart(&self) -> bool {
        self.phase == RunPhase::GameOver
            && self.game_over_timer >= self.tuning.timing.restart_cooldown
    }

    /// Screen shake for the current death animation frame
    pub fn shake_offset(&self) -> Vec2 {
        let fx = &self.tuning.effects;
        if self.phase != RunPhase::Dying
            || fx.shake_duration <= 0.0
            || self.death_timer >= fx.shake_duration
        {
            return Vec2::ZERO;
        }
        let t = self.death_timer;
        let intensity = fx.shake_amplitude * (1.0 - t / fx.shake_duration);
        Vec2::new((t * 97.0).sin(), (t * 71.0).cos()) * intensity
    }

    /// Player blink while dying
    pub fn flash_visible(&self) -> bool {
        let interval = self.tuning.effects.flash_interval;
        if self.phase != RunPhase::Dying || interval <= 0.0 {
            return true;
        }
        ((self.death_timer / interval) as u32) % 2 == 0
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            phase: self.phase,
            countdown: (self.phase == RunPhase::Countdown).then_some(self.countdown),
            death_timer: self.death_timer,
            game_over_timer: self.game_over_timer,
            can_restart: self.can_restart(),
            shake_offset: self.shake_offset(),
            flash_visible: self.flash_visible(),
            speed: self.ramp.speed,
            ground_offset: self.backdrop.ground_offset,
            player: PlayerSnapshot {
                pos: self.player.pos,
                size: self.player.size,
                vel: self.player.vel,
                grounded: self.player.grounded,
                jump_charges: self.player.jump_charges,
                scale: self.player.scale,
                anim: self.player.anim.state,
                anim_frame: self.player.anim.frame,
            },
            obstacles: self.obstacles.obstacles.clone(),
            genes: self.genes.genes.clone(),
            score: self.score.snapshot(),
            popups: self.effects.popups.clone(),
            rings: self.effects.rings.clone(),
            near_miss: self.effects.near_miss_timer > 0.0,
            death: self.death.clone(),
            new_record: self.new_record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub jump_charges: u8,
    pub scale: Vec2,
    pub anim: AnimState,
    pub anim_frame: u32,
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub phase: RunPhase,
    pub countdown: Option<Countdown>,
    pub death_timer: f32,
    pub game_over_timer: f32,
    pub can_restart: bool,
    pub shake_offset: Vec2,
    pub flash_visible: bool,
    pub speed: f32,
    pub ground_offset: f32,
    pub player: PlayerSnapshot,
    pub obstacles: Vec<Obstacle>,
    pub genes: Vec<Gene>,
    pub score: ScoreSnapshot,
    pub popups: Vec<Popup>,
    pub rings: Vec<Ring>,
    pub near_miss: bool,
    pub death: Option<DeathRecord>,
    pub new_record: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_new_session_is_ready() {
        let session = RunSession::with_seed(1);
        assert_eq!(session.phase, RunPhase::Ready);
        assert_eq!(session.ramp.speed, session.tuning.world.base_speed);
        assert!(session.obstacles.obstacles.is_empty());
        assert_eq!(session.score.total(), 0);
    }

    #[test]
    fn test_high_score_loaded_from_store() {
        let session = RunSession::new(Tuning::default(), 1, Box::new(MemoryStore::with_score(900)));
        assert_eq!(session.high_score(), 900);
        assert_eq!(session.score.high_score, 900);
    }

    #[test]
    fn test_shake_decays_and_stops() {
        let mut session = RunSession::with_seed(2);
        session.phase = RunPhase::Dying;
        session.death_timer = 0.01;
        let early = session.shake_offset().length();
        session.death_timer = 0.25;
        let late = session.shake_offset().length();
        assert!(early <= session.tuning.effects.shake_amplitude * 1.5);
        assert!(late < session.tuning.effects.shake_amplitude * 0.25);
        session.death_timer = 0.4;
        assert_eq!(session.shake_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_flash_blinks_while_dying() {
        let mut session = RunSession::with_seed(3);
        assert!(session.flash_visible());
        session.phase = RunPhase::Dying;
        session.death_timer = 0.05;
        assert!(session.flash_visible());
        session.death_timer = 0.15;
        assert!(!session.flash_visible());
    }

    #[test]
    fn test_backdrop_wraps() {
        let mut backdrop = Backdrop::default();
        backdrop.scroll(40.0, 1.5, 50.0);
        assert!((backdrop.ground_offset - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = RunSession::with_seed(4);
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Ready\""));
    }
}
