//! Player body: jump physics, zone confinement and squash/stretch

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::anim::{AnimState, Animator, PhysicsView};
use super::clock::clamp_dt;
use super::collision::Aabb;
use crate::consts::MAX_JUMP_CHARGES;
use crate::tuning::Tuning;

/// Which jump a press produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    First,
    Double,
}

/// The single player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    /// 2 = both jumps available, 1 = first used, 0 = both used
    pub jump_charges: u8,
    /// Remaining grace time for a first jump after leaving the ground
    pub coyote_timer: f32,
    /// Squash/stretch scale (x, y); 1.0 is neutral
    pub scale: Vec2,
    pub anim: Animator,
    /// Set once the current jump has been cut
    jump_cut_applied: bool,
    /// A stomp refilled the ground jump while airborne
    #[serde(default)]
    bounce_charge: bool,
}

impl PlayerBody {
    /// A player standing on the ground at the start position
    pub fn new(tuning: &Tuning) -> Self {
        let p = &tuning.player;
        Self {
            pos: Vec2::new(p.start_x, tuning.player_contact_y()),
            vel: Vec2::ZERO,
            size: Vec2::new(p.width, p.height),
            grounded: true,
            jump_charges: MAX_JUMP_CHARGES,
            coyote_timer: p.coyote_time,
            scale: Vec2::ONE,
            anim: Animator::new(),
            jump_cut_applied: false,
            bounce_charge: false,
        }
    }

    /// Full sprite bounds
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn physics_view(&self, world_moving: bool) -> PhysicsView {
        PhysicsView {
            grounded: self.grounded,
            vx: self.vel.x,
            vy: self.vel.y,
            jump_charges: self.jump_charges,
            world_moving,
        }
    }

    pub fn anim_state(&self) -> AnimState {
        self.anim.state
    }

    /// Set horizontal velocity from a movement intent in [-1, 1]
    pub fn set_horizontal_intent(&mut self, direction: f32, tuning: &Tuning) {
        let direction = if direction.is_finite() {
            direction.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.vel.x = direction * tuning.player.move_speed;
    }

    /// Advance physics and animation by `dt` seconds
    pub fn integrate(&mut self, dt: f32, tuning: &Tuning, world_moving: bool) {
        let dt = clamp_dt(dt);
        let p = &tuning.player;

        // Horizontal: direct velocity, soft bounce at the zone edges
        self.pos.x += self.vel.x * dt;
        if self.pos.x < p.zone_left {
            self.pos.x = p.zone_left;
            self.vel.x = self.vel.x.abs() * p.bounce_force;
        }
        if self.pos.x + self.size.x > p.zone_right {
            self.pos.x = p.zone_right - self.size.x;
            self.vel.x = -self.vel.x.abs() * p.bounce_force;
        }

        // Vertical: asymmetric gravity, Euler step
        let was_grounded = self.grounded;
        if !self.grounded {
            let mult = if self.vel.y > 0.0 { p.fall_gravity_mult } else { 1.0 };
            self.vel.y += p.gravity * mult * dt;
        }
        self.pos.y += self.vel.y * dt;

        let contact = tuning.player_contact_y();
        if self.pos.y >= contact {
            self.pos.y = contact;
            self.vel.y = 0.0;
            self.grounded = true;
            self.jump_charges = MAX_JUMP_CHARGES;
            self.coyote_timer = p.coyote_time;
            self.bounce_charge = false;
            if !was_grounded {
                self.scale = Vec2::new(p.land_squash.0, p.land_squash.1);
                self.anim.play_land();
            }
        } else {
            self.grounded = false;
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }

        // Relax toward neutral scale
        let k = (p.squash_relax_rate * dt).min(1.0);
        self.scale += (Vec2::ONE - self.scale) * k;

        let view = self.physics_view(world_moving);
        self.anim
            .update(&view, dt, p.land_duration, p.anim_fps, p.run_threshold);
    }

    /// Try a first or double jump.
    ///
    /// A charge refilled by a stomp counts as a first jump even after the
    /// coyote window has closed.
    pub fn jump_press(&mut self, tuning: &Tuning) -> Option<JumpKind> {
        let p = &tuning.player;
        let full = self.jump_charges == MAX_JUMP_CHARGES;
        if full && (self.coyote_timer > 0.0 || (self.bounce_charge && !self.grounded)) {
            self.vel.y = p.jump_velocity;
            self.coyote_timer = 0.0;
            self.jump_charges = 1;
            self.grounded = false;
            self.jump_cut_applied = false;
            self.bounce_charge = false;
            self.scale = Vec2::new(p.jump_stretch.0, p.jump_stretch.1);
            Some(JumpKind::First)
        } else if self.jump_charges == 1 && !self.grounded {
            self.vel.y = p.jump_velocity * p.double_jump_mult;
            self.jump_charges = 0;
            self.jump_cut_applied = false;
            self.scale = Vec2::new(p.jump_stretch.0, p.jump_stretch.1);
            Some(JumpKind::Double)
        } else {
            None
        }
    }

    /// Cut an ascending jump short. Returns whether the cut was applied.
    pub fn jump_release(&mut self, tuning: &Tuning) -> bool {
        if self.vel.y < 0.0 && !self.jump_cut_applied {
            self.vel.y *= tuning.player.jump_cut_multiplier;
            self.jump_cut_applied = true;
            true
        } else {
            false
        }
    }

    /// Bounce off a stomped obstacle whose hitbox top is at `obstacle_top`.
    ///
    /// The player is lifted so its hitbox rests on that top, then launched
    /// upward with one jump charge restored.
    pub fn stomp_bounce(&mut self, obstacle_top: f32, tuning: &Tuning) {
        let foot = self.bounds().shrink(tuning.player.hitbox_shrink).bottom();
        self.pos.y -= (foot - obstacle_top).max(0.0);
        self.vel.y = tuning.obstacles.stomp_bounce_velocity;
        self.jump_charges = (self.jump_charges + 1).min(MAX_JUMP_CHARGES);
        self.bounce_charge = self.jump_charges == MAX_JUMP_CHARGES;
        self.grounded = false;
        self.jump_cut_applied = false;
    }
}
