//! Lane Runner Example
//!
//! A playable runner on an endless track:
//! - Lane lines follow the run store's lane count
//! - The runner model animates its gait, jump pose and flip
//! - A panel drives the run status and ability flags
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Change lane
//! - **W/Up/Space**: Jump (again in the air for a double jump)
//! - **E** or tap: Special ability
//! - Swipe left/right/up: Change lane / jump
//! - **H**: Take a hit
//! - **Tab**: Toggle the panel
//!
//! Pass `dog` as the first argument to run with the dog skin.

mod helpers;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use helpers::{RunPanelPlugin, animate_limbs, follow_shadows, spawn_runner_model};
use lane_runner_controller::prelude::*;

// ==================== Constants ====================

const TRACK_LENGTH: f32 = 80.0;
const TRACK_SCROLL_SPEED: f32 = 12.0;
const STRIPE_SPACING: f32 = 4.0;

// ==================== Main ====================

fn selected_skin() -> RunnerSkin {
    match std::env::args().nth(1).as_deref() {
        Some("dog") => RunnerSkin::dog(),
        _ => RunnerSkin::cat(),
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Lane Runner - Runner Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Runner controller, backed by the resource run store
        .add_plugins(LaneRunnerPlugin::<RunStoreBackend>::default())
        .add_plugins(RunnerInputPlugin)
        .insert_resource(RunStore::playing(3))
        // Egui for the run store panel
        .add_plugins(EguiPlugin::default())
        .add_plugins(RunPanelPlugin)
        // Systems
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                (animate_limbs, follow_shadows).after(RunnerSystems),
                draw_track,
                log_runner_events,
            ),
        )
        .run();
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 4.5, 7.0).looking_at(Vec3::new(0.0, 1.0, -4.0), Vec3::Y),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Floor
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(24.0, TRACK_LENGTH))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.3, 0.35))),
        Transform::from_xyz(0.0, 0.0, -TRACK_LENGTH * 0.5 + 6.0),
    ));

    spawn_player(&mut commands, &mut meshes, &mut materials);

    commands.spawn((
        Text::new("A/D: Lane | W/Space: Jump | E: Ability | H: Hit | Tab: Panel"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        Pickable::IGNORE,
    ));
}

fn spawn_player(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let skin = selected_skin();
    let bundle = match RunnerBundle::try_new(RunnerConfig::default(), skin.clone()) {
        Ok(bundle) => bundle,
        Err(err) => {
            error!("invalid runner setup: {err}");
            return;
        }
    };

    let runner = commands
        .spawn((
            Name::new(format!("Runner ({})", skin.name)),
            bundle,
            PlayerRunner,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    spawn_runner_model(commands, meshes, materials, runner, &skin);
}

// ==================== Systems ====================

/// Draw lane boundaries and scrolling stripes with gizmos.
fn draw_track(
    mut gizmos: Gizmos,
    time: Res<Time>,
    store: Res<RunStore>,
    q_config: Query<&RunnerConfig, With<PlayerRunner>>,
) {
    let Ok(config) = q_config.single() else {
        return;
    };

    let max_lane = (store.lane_count / 2) as f32;
    let half_width = (max_lane + 0.5) * config.lane_width;
    let near = 6.0;
    let far = near - TRACK_LENGTH;
    let line = Color::srgb(0.8, 0.8, 0.85);

    // Lane separators
    let mut x = -half_width;
    while x <= half_width + f32::EPSILON {
        gizmos.line(Vec3::new(x, 0.02, near), Vec3::new(x, 0.02, far), line);
        x += config.lane_width;
    }

    // Stripes scroll toward the camera while the run advances
    let offset = if store.status.advances_state() {
        (time.elapsed_secs() * TRACK_SCROLL_SPEED) % STRIPE_SPACING
    } else {
        0.0
    };
    let mut z = near - STRIPE_SPACING + offset;
    while z > far {
        gizmos.line(
            Vec3::new(-half_width, 0.02, z),
            Vec3::new(half_width, 0.02, z),
            Color::srgb(0.4, 0.45, 0.5),
        );
        z -= STRIPE_SPACING;
    }
}

fn log_runner_events(mut cues: EventReader<RunnerCue>, mut abilities: EventReader<AbilityRequested>) {
    for cue in cues.read() {
        info!("cue: {cue:?}");
    }
    for request in abilities.read() {
        info!("ability requested by {}", request.runner);
    }
}
