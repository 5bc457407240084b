//! KidneyQuest - an endless runner about kidney health
//!
//! Core modules:
//! - `sim`: Run simulation (player physics, spawners, collisions, run phases)
//! - `tuning`: Data-driven game balance
//! - `highscores`: The persisted best score
//! - `persistence`: High score storage backends
//!
//! Drawing, audio and input wiring live in the host page; they read
//! `RunSession::snapshot()` and the per-tick `RunEvent`s.

pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScoreBook;
pub use sim::{RunSession, TickInput};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Longest frame the simulation will integrate in one step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Scrolled pixels per metre on the HUD
    pub const DISTANCE_PER_METER: f32 = 100.0;

    /// Ground jump plus one air jump
    pub const MAX_JUMP_CHARGES: u8 = 2;
}
