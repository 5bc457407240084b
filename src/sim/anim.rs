//! Player animation state
//!
//! The pose is derived from physics every frame. The only stored state is
//! the one-shot landing pose and the frame counters for the current pose.

use serde::{Deserialize, Serialize};

/// Player pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    Land,
    DoubleJump,
}

/// The physics flags a pose is derived from
#[derive(Debug, Clone, Copy)]
pub struct PhysicsView {
    pub grounded: bool,
    pub vx: f32,
    pub vy: f32,
    pub jump_charges: u8,
    /// The world is scrolling under the player
    pub world_moving: bool,
}

/// Pose implied by the current physics (never `Land`)
pub fn derive_anim_state(view: &PhysicsView, run_threshold: f32) -> AnimState {
    if view.grounded {
        if view.world_moving || view.vx.abs() > run_threshold {
            AnimState::Run
        } else {
            AnimState::Idle
        }
    } else if view.vy < 0.0 {
        if view.jump_charges == 0 {
            AnimState::DoubleJump
        } else {
            AnimState::Jump
        }
    } else {
        AnimState::Fall
    }
}

/// Current pose plus frame counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Animator {
    pub state: AnimState,
    pub frame: u32,
    /// Time into the current frame
    pub frame_time: f32,
    /// Time spent in the current pose
    pub state_time: f32,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch pose, resetting counters when it changes
    fn enter(&mut self, state: AnimState) {
        if self.state != state {
            self.state = state;
            self.frame = 0;
            self.frame_time = 0.0;
            self.state_time = 0.0;
        }
    }

    /// Start the landing pose from its first frame
    pub fn play_land(&mut self) {
        self.state = AnimState::Land;
        self.frame = 0;
        self.frame_time = 0.0;
        self.state_time = 0.0;
    }

    /// Advance counters, then settle on the pose for this frame.
    ///
    /// `Land` holds for `land_duration` while grounded; leaving the ground
    /// cancels it.
    pub fn update(
        &mut self,
        view: &PhysicsView,
        dt: f32,
        land_duration: f32,
        fps: f32,
        run_threshold: f32,
    ) {
        self.state_time += dt;
        if fps > 0.0 {
            let frame_len = 1.0 / fps;
            self.frame_time += dt;
            while self.frame_time >= frame_len {
                self.frame_time -= frame_len;
                self.frame = self.frame.wrapping_add(1);
            }
        }

        let holding_land =
            self.state == AnimState::Land && view.grounded && self.state_time < land_duration;
        if !holding_land {
            self.enter(derive_anim_state(view, run_threshold));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(grounded: bool, vx: f32, vy: f32, charges: u8) -> PhysicsView {
        PhysicsView {
            grounded,
            vx,
            vy,
            jump_charges: charges,
            world_moving: false,
        }
    }

    #[test]
    fn test_derive_poses() {
        assert_eq!(derive_anim_state(&view(true, 0.0, 0.0, 2), 5.0), AnimState::Idle);
        assert_eq!(derive_anim_state(&view(true, 50.0, 0.0, 2), 5.0), AnimState::Run);
        assert_eq!(derive_anim_state(&view(false, 0.0, -100.0, 1), 5.0), AnimState::Jump);
        assert_eq!(
            derive_anim_state(&view(false, 0.0, -100.0, 0), 5.0),
            AnimState::DoubleJump
        );
        assert_eq!(derive_anim_state(&view(false, 0.0, 10.0, 0), 5.0), AnimState::Fall);
    }

    #[test]
    fn test_world_scroll_reads_as_run() {
        let mut v = view(true, 0.0, 0.0, 2);
        v.world_moving = true;
        assert_eq!(derive_anim_state(&v, 5.0), AnimState::Run);
    }

    #[test]
    fn test_land_plays_full_duration() {
        let mut anim = Animator::new();
        anim.play_land();
        let grounded = view(true, 0.0, 0.0, 2);

        anim.update(&grounded, 0.1, 0.15, 10.0, 5.0);
        assert_eq!(anim.state, AnimState::Land);

        anim.update(&grounded, 0.1, 0.15, 10.0, 5.0);
        assert_eq!(anim.state, AnimState::Idle);
        assert_eq!(anim.frame, 0);
        assert_eq!(anim.state_time, 0.0);
    }

    #[test]
    fn test_leaving_ground_cancels_land() {
        let mut anim = Animator::new();
        anim.play_land();
        anim.update(&view(false, 0.0, -600.0, 1), 0.016, 0.15, 10.0, 5.0);
        assert_eq!(anim.state, AnimState::Jump);
    }

    #[test]
    fn test_frames_advance_with_carry() {
        let mut anim = Animator::new();
        let idle = view(true, 0.0, 0.0, 2);
        for _ in 0..5 {
            anim.update(&idle, 0.05, 0.15, 10.0, 5.0);
        }
        assert_eq!(anim.frame, 2);
        assert!((anim.frame_time - 0.05).abs() < 1e-4);
    }
}
