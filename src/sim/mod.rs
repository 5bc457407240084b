//! Run simulation
//!
//! All gameplay logic lives here:
//! - Clamped frame deltas only
//! - Seeded RNG owned by the session
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod anim;
pub mod clock;
pub mod collision;
pub mod effects;
pub mod genes;
pub mod obstacles;
pub mod player;
pub mod ramp;
pub mod score;
pub mod state;
pub mod tick;

pub use anim::{AnimState, Animator, PhysicsView, derive_anim_state};
pub use clock::{FrameClock, clamp_dt};
pub use collision::{Aabb, ContactKind, Resolution, classify_contact, resolve};
pub use effects::{Effects, Popup, Ring};
pub use genes::{Gene, GeneField};
pub use obstacles::{Obstacle, ObstacleField, StompOutcome, pick_weighted};
pub use player::{JumpKind, PlayerBody};
pub use ramp::DifficultyRamp;
pub use score::{GeneFlash, ScoreKeeper, ScoreSnapshot};
pub use state::{RunEvent, RunPhase, RunSession, RunSnapshot};
pub use tick::{TickInput, tick};
