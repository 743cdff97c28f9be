//! Jump and flip state machine.
//!
//! The runner cycles between [`JumpPhase::Grounded`] and one of two airborne
//! phases. A second jump while airborne (when the double-jump upgrade is
//! owned) starts a single full-turn flip tracked by `spin_progress`.

use std::f32::consts::TAU;

use bevy::prelude::*;

/// Which jump of a sequence was performed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpKind {
    /// Jump from the ground.
    Primary,
    /// Mid-air jump, starts the flip.
    Secondary,
}

/// Phase of the jump state machine.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    /// On the floor, no jumps consumed.
    #[default]
    Grounded,
    /// One jump consumed.
    SingleJump,
    /// Two jumps consumed, flipping.
    DoubleJump,
}

impl JumpPhase {
    /// Number of jumps consumed in the current sequence.
    pub fn jumps_used(self) -> u8 {
        match self {
            JumpPhase::Grounded => 0,
            JumpPhase::SingleJump => 1,
            JumpPhase::DoubleJump => 2,
        }
    }

    /// Whether the runner is in the air.
    pub fn is_airborne(self) -> bool {
        self != JumpPhase::Grounded
    }
}

/// Maximum jumps per sequence given the double-jump upgrade flag.
pub fn max_jumps(has_double_jump: bool) -> u8 {
    if has_double_jump { 2 } else { 1 }
}

/// Jump phase plus flip progress.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct JumpState {
    phase: JumpPhase,
    spin_progress: f32,
}

impl JumpState {
    /// Current phase.
    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    /// Jumps consumed in the current sequence.
    pub fn jumps_used(&self) -> u8 {
        self.phase.jumps_used()
    }

    /// Whether the runner is in the air.
    pub fn is_airborne(&self) -> bool {
        self.phase.is_airborne()
    }

    /// Whether the double-jump flip is running.
    pub fn is_spinning(&self) -> bool {
        self.phase == JumpPhase::DoubleJump
    }

    /// Flip angle in radians, in `[0, TAU]`.
    pub fn spin_progress(&self) -> f32 {
        self.spin_progress
    }

    /// Try to consume a jump.
    ///
    /// Returns the kind of jump performed, or `None` when the sequence has
    /// already used `max_jumps` jumps. The caller is responsible for setting
    /// the vertical velocity.
    pub fn request(&mut self, max_jumps: u8) -> Option<JumpKind> {
        match self.phase {
            JumpPhase::Grounded if max_jumps >= 1 => {
                self.phase = JumpPhase::SingleJump;
                self.spin_progress = 0.0;
                Some(JumpKind::Primary)
            }
            JumpPhase::SingleJump if max_jumps >= 2 => {
                self.phase = JumpPhase::DoubleJump;
                self.spin_progress = 0.0;
                Some(JumpKind::Secondary)
            }
            _ => None,
        }
    }

    /// Advance the flip by `rate * dt`, holding at one full turn.
    pub fn advance_spin(&mut self, dt: f32, rate: f32) {
        if self.is_spinning() && dt > 0.0 {
            self.spin_progress = (self.spin_progress + rate * dt).min(TAU);
        }
    }

    /// Ground contact: clear all jump and flip state.
    pub fn land(&mut self) {
        *self = Self::default();
    }
}

/// Limb and tail angles exposed to the presentation layer (radians).
///
/// Leg angles swing about the hip's lateral axis, positive swings the paw
/// backward. The tail angle lifts the tail, positive is up.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct RunnerPose {
    pub front_left: f32,
    pub front_right: f32,
    pub back_left: f32,
    pub back_right: f32,
    pub tail: f32,
}

impl RunnerPose {
    /// Mid-air stretch: front paws reaching forward, back paws trailing.
    pub const EXTENDED: Self = Self {
        front_left: -0.9,
        front_right: -0.9,
        back_left: 0.9,
        back_right: 0.9,
        tail: 0.6,
    };

    /// Running gait at the given cycle phase.
    ///
    /// Diagonal leg pairs move together.
    pub fn gait(phase: f32, amplitude: f32) -> Self {
        let swing = phase.sin() * amplitude;
        Self {
            front_left: swing,
            front_right: -swing,
            back_left: -swing,
            back_right: swing,
            tail: (phase * 0.5).sin() * amplitude * 0.5,
        }
    }

    /// Limb angles in front-left, front-right, back-left, back-right order.
    pub fn legs(&self) -> [f32; 4] {
        [
            self.front_left,
            self.front_right,
            self.back_left,
            self.back_right,
        ]
    }

    /// Move every angle a fraction `alpha` of the way toward `target`.
    pub fn blend_toward(&mut self, target: &Self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.front_left += (target.front_left - self.front_left) * alpha;
        self.front_right += (target.front_right - self.front_right) * alpha;
        self.back_left += (target.back_left - self.back_left) * alpha;
        self.back_right += (target.back_right - self.back_right) * alpha;
        self.tail += (target.tail - self.tail) * alpha;
    }
}
