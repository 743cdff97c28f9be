//! # `lane_runner_controller`
//!
//! Locomotion and combat-state controller for the player character of a
//! continuous lane runner, as a Bevy plugin.
//!
//! This crate turns discrete player intents and frame time into a
//! deterministic runner state:
//! - Discrete lanes with a bound that follows the run's lane count
//! - Jumping with a stepped Euler motion model and a landing snap
//! - An optional double jump that plays a single full-turn flip
//! - A damage immunity window with a flicker, overridden by immortality
//! - Keyboard, touch and mouse gestures mapped onto the same intents
//! - A run store abstraction so any game-state layer can drive it
//!
//! ## Architecture
//!
//! Each tick the controller:
//! 1. Copies the run status and ability flags from the run store
//! 2. Resets runners entering `Playing` and re-clamps their lane
//! 3. Applies queued intents (lane changes, jumps, ability requests)
//! 4. Integrates height and velocity, resolves landing and the flip
//! 5. Arms invincibility for hits and applies damage through the store
//! 6. Publishes a [`frame::RunnerFrame`] for the presentation layer
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use lane_runner_controller::prelude::*;
//!
//! // Components for a runner; spawn them alongside a Transform
//! let runner = RunnerBundle::try_new(RunnerConfig::default(), RunnerSkin::cat())
//!     .expect("reference tuning is valid");
//! let intent = RunnerIntent::new();
//! # let _ = (runner, intent);
//! ```

use bevy::ecs::schedule::{InternedScheduleLabel, ScheduleLabel};
use bevy::prelude::*;

pub mod backend;
pub mod bundle;
pub mod config;
pub mod damage;
pub mod frame;
pub mod input;
pub mod intent;
pub mod jump;
pub mod kinematics;
pub mod lane;
pub mod state;
pub mod store;
pub mod systems;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{RunBackend, RunSnapshot, RunStatus};
    pub use crate::bundle::RunnerBundle;
    pub use crate::config::{ConfigError, RunnerConfig, RunnerSkin};
    pub use crate::frame::{RunnerFrame, ShadowHint};
    pub use crate::input::{PlayerRunner, RunnerInputPlugin, RunnerKeyBindings};
    pub use crate::intent::{AbilityRequested, PlayerHit, RunnerAction, RunnerCue, RunnerIntent};
    pub use crate::jump::{JumpKind, JumpPhase, RunnerPose};
    pub use crate::lane::LaneDirection;
    pub use crate::state::{Airborne, Grounded, Invincible, RunnerState};
    pub use crate::store::{RunStore, RunStoreBackend};
    pub use crate::{LaneRunnerPlugin, RunSnapshotSystems, RunnerSystems};
}

/// System set that copies the run store into [`backend::RunSnapshot`].
///
/// Runs before [`RunnerSystems`]. Systems that gate on the run status, like
/// the input mappers, order themselves between the two sets so they see the
/// status of the current tick.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunSnapshotSystems;

/// System set containing the controller tick after the snapshot.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunnerSystems;

/// Main plugin for the runner controller.
///
/// This plugin is generic over a run store backend `B` which provides the
/// run status, lane count and ability flags, and applies damage.
///
/// # Type Parameters
/// - `B`: The run store implementation (e.g., `RunStoreBackend`)
///
/// # Examples
///
/// With the resource-backed store, ticking every frame:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use lane_runner_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(LaneRunnerPlugin::<RunStoreBackend>::default())
///     .add_plugins(RunnerInputPlugin)
///     .run();
/// ```
///
/// Ticking on the fixed timestep instead:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use lane_runner_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(LaneRunnerPlugin::<RunStoreBackend>::in_schedule(FixedUpdate))
///     .run();
/// ```
pub struct LaneRunnerPlugin<B: backend::RunBackend> {
    schedule: InternedScheduleLabel,
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::RunBackend> Default for LaneRunnerPlugin<B> {
    fn default() -> Self {
        Self::in_schedule(Update)
    }
}

impl<B: backend::RunBackend> LaneRunnerPlugin<B> {
    /// Run the controller tick in `schedule`.
    pub fn in_schedule(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::RunBackend> Plugin for LaneRunnerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::RunnerConfig>();
        app.register_type::<config::RunnerSkin>();
        app.register_type::<state::RunnerState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Invincible>();
        app.register_type::<intent::RunnerIntent>();
        app.register_type::<frame::RunnerFrame>();
        app.register_type::<backend::RunSnapshot>();

        app.add_event::<intent::PlayerHit>();
        app.add_event::<intent::RunnerCue>();
        app.add_event::<intent::AbilityRequested>();
        app.init_resource::<backend::RunSnapshot>();

        // Add the run store backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(self.schedule, RunnerSystems.after(RunSnapshotSystems));
        app.add_systems(
            self.schedule,
            systems::capture_run_snapshot::<B>.in_set(RunSnapshotSystems),
        );
        app.add_systems(
            self.schedule,
            (
                systems::handle_status_transitions,
                systems::consume_intents,
                systems::advance_runners,
                systems::resolve_hits::<B>,
                systems::update_invincibility,
                systems::publish_frames,
                systems::sync_state_markers,
            )
                .chain()
                .in_set(RunnerSystems),
        );
    }
}
