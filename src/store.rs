//! Resource-backed run store.
//!
//! A minimal implementation of [`RunBackend`] that keeps the run state in a
//! single [`RunStore`] resource. Games with their own state layer implement
//! the trait themselves; this backend is enough for demos, tools and tests.

use bevy::prelude::*;

use crate::backend::{RunBackend, RunStatus};

/// Global run state.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Eq)]
#[reflect(Resource)]
pub struct RunStore {
    pub status: RunStatus,
    pub lane_count: u32,
    pub has_double_jump: bool,
    pub immortality_active: bool,
    /// Number of hits that applied damage during the run.
    pub damage_taken: u32,
    /// Runner that took the last damage.
    pub last_damaged: Option<Entity>,
}

impl Default for RunStore {
    fn default() -> Self {
        Self {
            status: RunStatus::Idle,
            lane_count: 3,
            has_double_jump: false,
            immortality_active: false,
            damage_taken: 0,
            last_damaged: None,
        }
    }
}

impl RunStore {
    /// A store already in the `Playing` status with `lane_count` lanes.
    pub fn playing(lane_count: u32) -> Self {
        Self {
            status: RunStatus::Playing,
            lane_count,
            ..default()
        }
    }

    /// Begin a new run: clears the damage tally and switches to `Playing`.
    pub fn start_run(&mut self) {
        self.status = RunStatus::Playing;
        self.damage_taken = 0;
        self.last_damaged = None;
    }

    /// Builder: grant the double-jump upgrade.
    pub fn with_double_jump(mut self, enabled: bool) -> Self {
        self.has_double_jump = enabled;
        self
    }

    /// Builder: toggle immortality.
    pub fn with_immortality(mut self, active: bool) -> Self {
        self.immortality_active = active;
        self
    }
}

/// [`RunBackend`] reading from the [`RunStore`] resource.
pub struct RunStoreBackend;

impl RunBackend for RunStoreBackend {
    fn plugin() -> impl Plugin {
        RunStoreBackendPlugin
    }

    fn run_status(world: &World) -> RunStatus {
        world
            .get_resource::<RunStore>()
            .map(|store| store.status)
            .unwrap_or_default()
    }

    fn lane_count(world: &World) -> u32 {
        world
            .get_resource::<RunStore>()
            .map(|store| store.lane_count)
            .unwrap_or(0)
    }

    fn has_double_jump(world: &World) -> bool {
        world
            .get_resource::<RunStore>()
            .is_some_and(|store| store.has_double_jump)
    }

    fn immortality_active(world: &World) -> bool {
        world
            .get_resource::<RunStore>()
            .is_some_and(|store| store.immortality_active)
    }

    fn apply_damage(world: &mut World, runner: Entity) {
        if let Some(mut store) = world.get_resource_mut::<RunStore>() {
            store.damage_taken += 1;
            store.last_damaged = Some(runner);
        }
    }
}

/// Registers and initializes the [`RunStore`] resource.
pub struct RunStoreBackendPlugin;

impl Plugin for RunStoreBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<RunStore>();
        app.init_resource::<RunStore>();
    }
}
