//! Runner state.
//!
//! [`RunnerState`] is the single owned record the controller mutates each
//! tick. The marker components mirror it so game code can filter queries by
//! physical state; they are added and removed by the controller systems.

use std::time::Duration;

use bevy::prelude::*;

use crate::backend::RunStatus;
use crate::config::RunnerConfig;
use crate::damage::{HitOutcome, InvincibilityTimer};
use crate::jump::{JumpKind, JumpPhase, JumpState, RunnerPose};
use crate::kinematics::{Contact, VerticalMotion};
use crate::lane::{LaneDirection, LaneSelector, approach_factor, bank_angle};

/// Locomotion and combat state of a runner.
///
/// Created in the reset pose (centre lane, grounded, at rest) and reset again
/// every time the run enters [`RunStatus::Playing`].
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct RunnerState {
    lanes: LaneSelector,
    position_x: f32,
    motion: VerticalMotion,
    jump: JumpState,
    invincibility: InvincibilityTimer,
    visible: bool,
    bank: f32,
    pose: RunnerPose,
    gait_phase: f32,
    /// Run status seen on the previous tick, for transition detection.
    pub(crate) last_status: Option<RunStatus>,
}

impl Default for RunnerState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RunnerState {
    /// Reset-pose state for a run with `lane_count` lanes.
    pub fn new(lane_count: u32) -> Self {
        Self {
            lanes: LaneSelector::new(lane_count),
            position_x: 0.0,
            motion: VerticalMotion::GROUNDED,
            jump: JumpState::default(),
            invincibility: InvincibilityTimer::default(),
            visible: true,
            bank: 0.0,
            pose: RunnerPose::default(),
            gait_phase: 0.0,
            last_status: None,
        }
    }

    /// Return to the reset pose, keeping the status history.
    pub fn reset(&mut self, lane_count: u32) {
        let last_status = self.last_status;
        *self = Self::new(lane_count);
        self.last_status = last_status;
    }

    // === Accessors ===

    /// Current lane index.
    pub fn lane(&self) -> i32 {
        self.lanes.lane()
    }

    /// Current lane bound.
    pub fn max_lane(&self) -> i32 {
        self.lanes.max_lane()
    }

    /// Horizontal position of the current lane centre.
    pub fn target_x(&self, config: &RunnerConfig) -> f32 {
        self.lanes.target_x(config.lane_width)
    }

    /// Smoothed horizontal position.
    pub fn position_x(&self) -> f32 {
        self.position_x
    }

    /// Height above the floor.
    pub fn position_y(&self) -> f32 {
        self.motion.height
    }

    /// Signed vertical velocity.
    pub fn vertical_velocity(&self) -> f32 {
        self.motion.velocity
    }

    /// Jump phase.
    pub fn jump_phase(&self) -> JumpPhase {
        self.jump.phase()
    }

    /// Whether the runner is in the air.
    pub fn is_airborne(&self) -> bool {
        self.jump.is_airborne()
    }

    /// Jumps used in the current sequence.
    pub fn jumps_used(&self) -> u8 {
        self.jump.jumps_used()
    }

    /// Flip angle of the double jump.
    pub fn spin_progress(&self) -> f32 {
        self.jump.spin_progress()
    }

    /// Whether the damage immunity window is armed.
    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_active()
    }

    /// Time the immunity window was armed at.
    pub fn invincible_since(&self) -> Option<Duration> {
        self.invincibility.since()
    }

    /// Whether the runner should be drawn this tick.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Banking roll from the lane drift.
    pub fn bank(&self) -> f32 {
        self.bank
    }

    /// Current limb and tail pose.
    pub fn pose(&self) -> RunnerPose {
        self.pose
    }

    // === Operations ===

    /// Step one lane in `direction`. No-op at the bound.
    pub fn request_lane_shift(&mut self, direction: LaneDirection) -> bool {
        self.lanes.shift(direction)
    }

    /// Apply a new lane count and re-clamp the current lane.
    pub fn update_lane_bound(&mut self, lane_count: u32) -> bool {
        self.lanes.update_bound(lane_count)
    }

    /// Jump if the sequence allows it, setting the vertical velocity to
    /// `impulse`.
    pub fn request_jump(&mut self, max_jumps: u8, impulse: f32) -> Option<JumpKind> {
        let kind = self.jump.request(max_jumps)?;
        self.motion.velocity = impulse;
        Some(kind)
    }

    /// Advance the continuous simulation by `dt` seconds.
    ///
    /// Returns `true` if the runner landed during this step. Non-positive or
    /// non-finite `dt` leaves the state untouched.
    pub fn advance(&mut self, dt: f32, config: &RunnerConfig) -> bool {
        if !(dt > 0.0) || !dt.is_finite() {
            return false;
        }

        let was_airborne = self.jump.is_airborne();

        let (motion, contact) = self.motion.step(dt, config.gravity);
        self.motion = motion;

        let landed = match contact {
            Contact::Ground => {
                self.jump.land();
                was_airborne
            }
            Contact::Airborne => {
                self.jump.advance_spin(dt, config.spin_rate);
                false
            }
        };

        let target = self.target_x(config);
        self.position_x += (target - self.position_x) * approach_factor(config.lane_smoothing, dt);
        self.bank = bank_angle(target, self.position_x, config.bank_factor);

        if self.jump.is_airborne() {
            self.pose.blend_toward(
                &config.extended_pose,
                approach_factor(config.pose_blend_rate, dt),
            );
        } else {
            self.gait_phase = (self.gait_phase + config.gait_rate * dt) % std::f32::consts::TAU;
            self.pose = RunnerPose::gait(self.gait_phase, config.gait_amplitude);
        }

        landed
    }

    /// Register a hit at `now`.
    pub fn on_hit(&mut self, now: Duration, immortality_active: bool) -> HitOutcome {
        self.invincibility.hit(now, immortality_active)
    }

    /// Expire the immunity window and resolve visibility for this tick.
    ///
    /// Returns `true` on the tick the window expires.
    pub fn update_invincibility(
        &mut self,
        now: Duration,
        config: &RunnerConfig,
        immortality_active: bool,
    ) -> bool {
        self.invincibility.tick(
            now,
            config.invincibility_duration,
            config.flicker_period,
            immortality_active,
            &mut self.visible,
        )
    }
}

/// Marker component indicating the runner is on the floor.
///
/// Mutually exclusive with [`Airborne`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the runner is in the air.
///
/// Contains the number of jumps used in the current sequence.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct Airborne {
    pub jumps_used: u8,
}

impl Default for Airborne {
    fn default() -> Self {
        Self { jumps_used: 1 }
    }
}

impl Airborne {
    /// Whether this is the flipping second jump.
    pub fn is_double_jump(&self) -> bool {
        self.jumps_used >= 2
    }
}

/// Marker component present while the damage immunity window is armed.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Invincible;

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunnerConfig {
        RunnerConfig::default()
    }

    #[test]
    fn new_state_is_reset_pose() {
        let state = RunnerState::new(5);
        assert_eq!(state.lane(), 0);
        assert_eq!(state.max_lane(), 2);
        assert_eq!(state.position_y(), 0.0);
        assert_eq!(state.vertical_velocity(), 0.0);
        assert!(!state.is_airborne());
        assert!(state.is_visible());
        assert!(!state.is_invincible());
    }

    #[test]
    fn jump_from_ground_sets_impulse() {
        let mut state = RunnerState::new(3);
        assert_eq!(state.request_jump(1, 16.0), Some(JumpKind::Primary));
        assert_eq!(state.vertical_velocity(), 16.0);
        assert_eq!(state.jumps_used(), 1);
    }

    #[test]
    fn second_jump_without_upgrade_changes_nothing() {
        let mut state = RunnerState::new(3);
        state.request_jump(1, 16.0);
        state.advance(0.1, &config());
        let before = state.clone();

        assert_eq!(state.request_jump(1, 16.0), None);
        assert_eq!(state, before);
    }

    #[test]
    fn double_jump_resets_velocity() {
        let mut state = RunnerState::new(3);
        state.request_jump(2, 16.0);
        state.advance(0.1, &config());
        state.advance(0.1, &config());
        assert!(state.vertical_velocity() < 16.0);

        assert_eq!(state.request_jump(2, 16.0), Some(JumpKind::Secondary));
        assert_eq!(state.vertical_velocity(), 16.0);
        assert_eq!(state.spin_progress(), 0.0);
    }

    #[test]
    fn spin_advances_after_double_jump() {
        let mut state = RunnerState::new(3);
        state.request_jump(2, 16.0);
        state.request_jump(2, 16.0);
        state.advance(0.1, &config());
        assert!((state.spin_progress() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn landing_clears_jump_state() {
        let mut state = RunnerState::new(3);
        state.request_jump(2, 16.0);
        state.request_jump(2, 16.0);

        let mut landed = false;
        for _ in 0..40 {
            if state.advance(0.05, &config()) {
                landed = true;
                break;
            }
        }

        assert!(landed);
        assert_eq!(state.jumps_used(), 0);
        assert_eq!(state.vertical_velocity(), 0.0);
        assert_eq!(state.spin_progress(), 0.0);
        assert_eq!(state.position_y(), 0.0);
    }

    #[test]
    fn invalid_dt_changes_nothing() {
        let config = config();
        let mut state = RunnerState::new(3);
        state.request_lane_shift(LaneDirection::Right);
        state.request_jump(1, config.jump_impulse);
        let before = state.clone();

        assert!(!state.advance(0.0, &config));
        assert!(!state.advance(f32::NAN, &config));
        assert!(!state.advance(-0.1, &config));
        assert_eq!(state, before);
    }

    #[test]
    fn grounded_advance_does_not_report_landing() {
        let mut state = RunnerState::new(3);
        assert!(!state.advance(0.016, &config()));
    }

    #[test]
    fn position_x_approaches_lane_centre() {
        let config = config();
        let mut state = RunnerState::new(3);
        state.request_lane_shift(LaneDirection::Right);

        state.advance(0.01, &config);
        // 15% of the way to 2.0
        assert!((state.position_x() - 0.3).abs() < 1e-5);
        // Banking: -(2.0 - 0.3) * 0.2
        assert!((state.bank() + 0.34).abs() < 1e-5);

        for _ in 0..200 {
            state.advance(0.01, &config);
        }
        assert!((state.position_x() - 2.0).abs() < 1e-3);
        assert!(state.bank().abs() < 1e-3);
    }

    #[test]
    fn large_dt_snaps_to_lane() {
        let config = config();
        let mut state = RunnerState::new(3);
        state.request_lane_shift(LaneDirection::Left);
        state.advance(0.5, &config);
        assert_eq!(state.position_x(), -2.0);
    }

    #[test]
    fn airborne_pose_blends_toward_extended() {
        let config = config();
        let mut state = RunnerState::new(3);
        state.request_jump(1, 16.0);
        state.advance(0.05, &config);

        // Starting from the rest pose, half-way after alpha = 0.5
        let expected = RunnerPose::EXTENDED.front_left * 0.5;
        assert!((state.pose().front_left - expected).abs() < 1e-5);
    }

    #[test]
    fn reset_keeps_status_history() {
        let mut state = RunnerState::new(3);
        state.last_status = Some(RunStatus::Playing);
        state.request_lane_shift(LaneDirection::Left);
        state.reset(5);

        assert_eq!(state.lane(), 0);
        assert_eq!(state.max_lane(), 2);
        assert_eq!(state.last_status, Some(RunStatus::Playing));
    }

    #[test]
    fn hit_then_expire() {
        let config = config();
        let mut state = RunnerState::new(3);
        let t0 = Duration::from_secs(10);

        assert_eq!(state.on_hit(t0, false), HitOutcome::Armed);
        assert!(state.is_invincible());
        assert_eq!(state.invincible_since(), Some(t0));

        assert!(state.update_invincibility(t0 + Duration::from_millis(1501), &config, false));
        assert!(!state.is_invincible());
        assert!(state.is_visible());
    }

    #[test]
    fn airborne_marker_double_jump() {
        assert!(!Airborne::default().is_double_jump());
        assert!(Airborne { jumps_used: 2 }.is_double_jump());
    }
}
