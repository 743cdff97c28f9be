//! Vertical motion model.
//!
//! A single explicit Euler step per tick under constant gravity. Position is
//! advanced with the velocity from the start of the step, then velocity is
//! reduced by `gravity * dt`. This is deliberately not closed-form projectile
//! motion: trajectories must match the stepped scheme exactly.

use bevy::prelude::*;

/// Height and vertical velocity of the runner.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalMotion {
    /// Height above the floor. Never negative.
    pub height: f32,
    /// Signed vertical velocity, positive upward.
    pub velocity: f32,
}

/// Result of a single integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Still above the floor after the step.
    Airborne,
    /// The step reached or crossed the floor and was snapped to it.
    Ground,
}

impl VerticalMotion {
    /// Resting on the floor.
    pub const GROUNDED: Self = Self {
        height: 0.0,
        velocity: 0.0,
    };

    /// Create a motion state at the given height and velocity.
    ///
    /// Negative heights are clamped to the floor.
    pub fn new(height: f32, velocity: f32) -> Self {
        Self {
            height: height.max(0.0),
            velocity,
        }
    }

    /// Whether the runner is resting on the floor with no vertical speed.
    pub fn is_resting(&self) -> bool {
        self.height <= 0.0 && self.velocity == 0.0
    }

    /// Advance by `dt` seconds under `gravity`.
    ///
    /// Non-positive or non-finite `dt` leaves the state untouched and reports
    /// no contact, so a zero-length tick cannot cancel a jump that was just
    /// launched from the floor.
    pub fn step(self, dt: f32, gravity: f32) -> (Self, Contact) {
        if !(dt > 0.0) || !dt.is_finite() {
            let contact = if self.is_resting() {
                Contact::Ground
            } else {
                Contact::Airborne
            };
            return (self, contact);
        }

        let height = self.height + self.velocity * dt;
        let velocity = self.velocity - gravity * dt;

        if height <= 0.0 {
            (Self::GROUNDED, Contact::Ground)
        } else {
            (Self { height, velocity }, Contact::Airborne)
        }
    }
}
