//! Run store abstraction.
//!
//! This module defines the trait the owner of the global run state must
//! implement to drive the runner controller. The controller only ever reads
//! the run status, lane count and ability flags, and calls back into the
//! store to apply damage. This allows the controller to sit on top of any
//! game-state layer (a plain resource, a state machine, a network client).

use bevy::prelude::*;

use crate::jump::max_jumps;

/// Status of the current run, owned by the run store.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunStatus {
    /// Title screen, nothing is simulated.
    #[default]
    Idle,
    /// A run is in progress.
    Playing,
    /// Passive display of the runner (menus, character select).
    Showcase,
    /// Shop between runs.
    Shop,
    /// Run suspended.
    Paused,
    /// Run ended.
    GameOver,
}

impl RunStatus {
    /// Whether input and hits are accepted.
    #[inline]
    pub fn is_playing(self) -> bool {
        self == RunStatus::Playing
    }

    /// Whether the controller advances its state this tick.
    #[inline]
    pub fn advances_state(self) -> bool {
        matches!(self, RunStatus::Playing | RunStatus::Showcase)
    }
}

/// Read-only copy of the run store taken once at the start of each tick.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Resource)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub lane_count: u32,
    pub has_double_jump: bool,
    pub immortality_active: bool,
}

impl Default for RunSnapshot {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            lane_count: 3,
            has_double_jump: false,
            immortality_active: false,
        }
    }
}

impl RunSnapshot {
    /// Jumps allowed per sequence this tick.
    #[inline]
    pub fn max_jumps(&self) -> u8 {
        max_jumps(self.has_double_jump)
    }
}

/// Trait for run store implementations.
///
/// Implement this trait to connect the runner controller to the component
/// that owns the global run state. All reads happen once per tick through
/// [`RunBackend::snapshot`]; the controller never writes run state except
/// through [`RunBackend::apply_damage`].
///
/// # Example
///
/// For an example implementation, see the `store` module's `RunStoreBackend`
/// which keeps the run state in a plain resource.
pub trait RunBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Current run status.
    fn run_status(world: &World) -> RunStatus;

    /// Number of lanes configured for the current run.
    fn lane_count(world: &World) -> u32;

    /// Whether the double-jump upgrade is owned.
    fn has_double_jump(_world: &World) -> bool {
        false
    }

    /// Whether the temporary immortality power is active.
    fn immortality_active(_world: &World) -> bool {
        false
    }

    /// Apply one unit of damage on behalf of `runner`.
    ///
    /// Called exactly once per hit that arms the invincibility window.
    fn apply_damage(world: &mut World, runner: Entity);

    /// Read everything the controller needs for one tick.
    fn snapshot(world: &World) -> RunSnapshot {
        RunSnapshot {
            status: Self::run_status(world),
            lane_count: Self::lane_count(world),
            has_double_jump: Self::has_double_jump(world),
            immortality_active: Self::immortality_active(world),
        }
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
