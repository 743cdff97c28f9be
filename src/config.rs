//! Runner configuration components.
//!
//! This module defines the tuning constants for the runner's motion model
//! (gravity, jump impulse, lane smoothing, invincibility window) and the
//! cosmetic skin variants a runner can be built with.

use std::time::Duration;

use bevy::prelude::*;
use thiserror::Error;

use crate::jump::RunnerPose;

/// Errors reported when a runner configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A constant that must be strictly positive was zero, negative or not finite.
    #[error("`{field}` must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// A constant that must be non-negative was negative or not finite.
    #[error("`{field}` must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    /// The flicker square wave needs a non-zero period.
    #[error("flicker period must be at least one millisecond")]
    ZeroFlickerPeriod,

    /// A tap must be distinguishable from a swipe.
    #[error("tap tolerance ({tap}) must be smaller than the swipe threshold ({swipe})")]
    TapExceedsSwipe { tap: f32, swipe: f32 },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

/// Tuning parameters for the runner controller.
///
/// The defaults reproduce the reference feel of the game: a 50 units/s²
/// gravity, a 16 units/s jump impulse and a 1.5 s damage immunity window.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct RunnerConfig {
    // === Vertical Motion ===
    /// Constant downward acceleration (units/s²).
    pub gravity: f32,

    /// Vertical velocity set by every jump, primary or secondary (units/s).
    pub jump_impulse: f32,

    // === Lanes ===
    /// Horizontal distance between two adjacent lane centres.
    pub lane_width: f32,

    /// Rate factor for the exponential approach toward the lane centre.
    pub lane_smoothing: f32,

    /// Banking rotation per unit of remaining lateral distance.
    pub bank_factor: f32,

    // === Flip and Pose ===
    /// Angular speed of the double-jump flip (rad/s).
    pub spin_rate: f32,

    /// Blend rate toward the extended pose while airborne (1/s).
    pub pose_blend_rate: f32,

    /// Angular speed of the running gait cycle while grounded (rad/s).
    pub gait_rate: f32,

    /// Peak leg swing of the running gait (radians).
    pub gait_amplitude: f32,

    /// Pose the limbs reach for while airborne.
    pub extended_pose: RunnerPose,

    // === Damage ===
    /// How long a hit keeps the runner invincible.
    pub invincibility_duration: Duration,

    /// Half-period of the invincibility flicker square wave.
    pub flicker_period: Duration,

    // === Input ===
    /// Minimum dominant-axis displacement for a drag to count as a swipe.
    pub swipe_threshold: f32,

    /// Maximum displacement on both axes for a gesture to count as a tap.
    pub tap_tolerance: f32,

    // === Presentation ===
    /// Height at which the shadow hints reach their reference falloff.
    pub shadow_reference_height: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            // Vertical motion
            gravity: 50.0,
            jump_impulse: 16.0,

            // Lanes
            lane_width: 2.0,
            lane_smoothing: 15.0,
            bank_factor: 0.2,

            // Flip and pose
            spin_rate: 15.0,
            pose_blend_rate: 10.0,
            gait_rate: 12.0,
            gait_amplitude: 0.6,
            extended_pose: RunnerPose::EXTENDED,

            // Damage
            invincibility_duration: Duration::from_millis(1500),
            flicker_period: Duration::from_millis(50),

            // Input
            swipe_threshold: 30.0,
            tap_tolerance: 10.0,

            // Presentation
            shadow_reference_height: 2.5,
        }
    }
}

impl RunnerConfig {
    /// Create a config with the reference tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a snappier config: faster lane changes and a heavier, higher jump.
    pub fn arcade() -> Self {
        Self {
            gravity: 60.0,
            jump_impulse: 18.0,
            lane_smoothing: 20.0,
            ..default()
        }
    }

    /// Check that every constant is usable by the controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("gravity", self.gravity)?;
        positive("jump_impulse", self.jump_impulse)?;
        positive("lane_width", self.lane_width)?;
        positive("lane_smoothing", self.lane_smoothing)?;
        non_negative("bank_factor", self.bank_factor)?;
        positive("spin_rate", self.spin_rate)?;
        positive("pose_blend_rate", self.pose_blend_rate)?;
        non_negative("gait_rate", self.gait_rate)?;
        non_negative("gait_amplitude", self.gait_amplitude)?;
        positive("shadow_reference_height", self.shadow_reference_height)?;
        non_negative("swipe_threshold", self.swipe_threshold)?;
        non_negative("tap_tolerance", self.tap_tolerance)?;

        if self.flicker_period.as_millis() == 0 {
            return Err(ConfigError::ZeroFlickerPeriod);
        }
        if self.tap_tolerance >= self.swipe_threshold {
            return Err(ConfigError::TapExceedsSwipe {
                tap: self.tap_tolerance,
                swipe: self.swipe_threshold,
            });
        }
        Ok(())
    }

    /// Builder: set gravity.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set jump impulse.
    pub fn with_jump_impulse(mut self, impulse: f32) -> Self {
        self.jump_impulse = impulse;
        self
    }

    /// Builder: set lane width.
    pub fn with_lane_width(mut self, width: f32) -> Self {
        self.lane_width = width;
        self
    }

    /// Builder: set lane smoothing rate.
    pub fn with_lane_smoothing(mut self, rate: f32) -> Self {
        self.lane_smoothing = rate;
        self
    }

    /// Builder: set the double-jump flip speed.
    pub fn with_spin_rate(mut self, rate: f32) -> Self {
        self.spin_rate = rate;
        self
    }

    /// Builder: set the invincibility window.
    pub fn with_invincibility(mut self, duration: Duration) -> Self {
        self.invincibility_duration = duration;
        self
    }

    /// Builder: set the flicker half-period.
    pub fn with_flicker_period(mut self, period: Duration) -> Self {
        self.flicker_period = period;
        self
    }

    /// Builder: set gesture thresholds.
    pub fn with_gestures(mut self, swipe_threshold: f32, tap_tolerance: f32) -> Self {
        self.swipe_threshold = swipe_threshold;
        self.tap_tolerance = tap_tolerance;
        self
    }
}

/// Cosmetic variant of the runner: geometry constants and colours.
///
/// Skins carry no behaviour. Every skin is driven by the same controller,
/// only the presentation layer reads these values.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct RunnerSkin {
    /// Display name of the variant.
    pub name: String,
    /// Full extents of the torso.
    pub body_size: Vec3,
    /// Full extents of the head.
    pub head_size: Vec3,
    /// Length of each leg, from hip to paw.
    pub leg_length: f32,
    /// Thickness of each leg.
    pub leg_thickness: f32,
    /// Length of the tail.
    pub tail_length: f32,
    /// Radius of the ground shadow at rest.
    pub shadow_radius: f32,
    /// Main coat colour.
    pub body_color: Color,
    /// Colour of paws, ears and tail tip.
    pub accent_color: Color,
}

impl Default for RunnerSkin {
    fn default() -> Self {
        Self::cat()
    }
}

impl RunnerSkin {
    /// Slim, long-tailed runner.
    pub fn cat() -> Self {
        Self {
            name: "cat".into(),
            body_size: Vec3::new(0.5, 0.45, 1.0),
            head_size: Vec3::new(0.45, 0.4, 0.4),
            leg_length: 0.35,
            leg_thickness: 0.12,
            tail_length: 0.8,
            shadow_radius: 0.5,
            body_color: Color::srgb(0.95, 0.6, 0.25),
            accent_color: Color::srgb(1.0, 0.95, 0.9),
        }
    }

    /// Stockier, short-tailed runner.
    pub fn dog() -> Self {
        Self {
            name: "dog".into(),
            body_size: Vec3::new(0.6, 0.55, 1.15),
            head_size: Vec3::new(0.5, 0.45, 0.5),
            leg_length: 0.4,
            leg_thickness: 0.15,
            tail_length: 0.45,
            shadow_radius: 0.6,
            body_color: Color::srgb(0.55, 0.4, 0.3),
            accent_color: Color::srgb(0.15, 0.1, 0.1),
        }
    }

    /// Height of the torso centre above the ground when standing.
    pub fn standing_height(&self) -> f32 {
        self.leg_length + self.body_size.y * 0.5
    }

    /// Hip positions relative to the torso centre.
    ///
    /// Ordered front-left, front-right, back-left, back-right, matching
    /// [`RunnerPose`] limb order. The runner faces `-Z`.
    pub fn hip_offsets(&self) -> [Vec3; 4] {
        let x = (self.body_size.x - self.leg_thickness) * 0.5;
        let y = -self.body_size.y * 0.5;
        let z = (self.body_size.z - self.leg_thickness) * 0.5;
        [
            Vec3::new(-x, y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, z),
            Vec3::new(x, y, z),
        ]
    }

    /// Attachment point of the tail relative to the torso centre.
    pub fn tail_root(&self) -> Vec3 {
        Vec3::new(0.0, self.body_size.y * 0.25, self.body_size.z * 0.5)
    }

    /// Check that every dimension is drawable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("body_size.x", self.body_size.x)?;
        positive("body_size.y", self.body_size.y)?;
        positive("body_size.z", self.body_size.z)?;
        positive("head_size.x", self.head_size.x)?;
        positive("head_size.y", self.head_size.y)?;
        positive("head_size.z", self.head_size.z)?;
        positive("leg_length", self.leg_length)?;
        positive("leg_thickness", self.leg_thickness)?;
        non_negative("tail_length", self.tail_length)?;
        positive("shadow_radius", self.shadow_radius)?;
        Ok(())
    }
}
