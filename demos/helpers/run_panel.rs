//! Run store panel.
//!
//! An egui window standing in for the game-state layer: it switches the run
//! status, edits the lane count and ability flags, sends hits and shows the
//! runner's live state.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use lane_runner_controller::prelude::*;

const STATUSES: [RunStatus; 6] = [
    RunStatus::Idle,
    RunStatus::Playing,
    RunStatus::Showcase,
    RunStatus::Shop,
    RunStatus::Paused,
    RunStatus::GameOver,
];

/// Resource containing the panel state.
#[derive(Resource)]
pub struct RunPanelState {
    /// Number of frames since startup (used to skip initial frames).
    pub frame_count: u32,
    /// Whether the panel is currently visible.
    pub show_panel: bool,
    /// Key to toggle panel visibility.
    pub toggle_key: KeyCode,
    /// Key that sends a hit to the player runner.
    pub hit_key: KeyCode,
}

impl Default for RunPanelState {
    fn default() -> Self {
        Self {
            frame_count: 0,
            show_panel: true,
            toggle_key: KeyCode::Tab,
            hit_key: KeyCode::KeyH,
        }
    }
}

/// Plugin adding the run store panel and the hit hotkey.
#[derive(Default)]
pub struct RunPanelPlugin;

impl Plugin for RunPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunPanelState>();
        app.add_systems(Update, send_hit_on_key.before(RunnerSystems));
        app.add_systems(EguiPrimaryContextPass, run_panel_ui_system);
    }
}

fn send_hit_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    panel: Res<RunPanelState>,
    q_player: Query<Entity, With<PlayerRunner>>,
    mut hits: EventWriter<PlayerHit>,
) {
    if !keyboard.just_pressed(panel.hit_key) {
        return;
    }
    for runner in &q_player {
        hits.write(PlayerHit::runner(runner));
    }
}

/// Renders the run store controls.
pub fn run_store_ui(ui: &mut egui::Ui, store: &mut RunStore) {
    ui.collapsing("Run Status", |ui| {
        ui.horizontal_wrapped(|ui| {
            for status in STATUSES {
                if ui
                    .selectable_label(store.status == status, format!("{status:?}"))
                    .clicked()
                {
                    if status == RunStatus::Playing && store.status != RunStatus::Paused {
                        store.start_run();
                    } else {
                        store.status = status;
                    }
                }
            }
        });
    });

    ui.collapsing("Track", |ui| {
        ui.horizontal(|ui| {
            ui.label("Lane Count:");
            ui.add(egui::DragValue::new(&mut store.lane_count).speed(0.1).range(0..=9));
        });
    });

    ui.collapsing("Abilities", |ui| {
        ui.checkbox(&mut store.has_double_jump, "Double Jump");
        ui.checkbox(&mut store.immortality_active, "Immortality");
    });
}

/// Renders the live state of a runner.
pub fn runner_state_ui(ui: &mut egui::Ui, state: &RunnerState, store: &RunStore) {
    ui.collapsing("Runner", |ui| {
        ui.label(format!("Lane: {} (max {})", state.lane(), state.max_lane()));
        ui.label(format!("X: {:.2}", state.position_x()));
        ui.label(format!("Height: {:.2}", state.position_y()));
        ui.label(format!("Vertical Velocity: {:.2}", state.vertical_velocity()));
        ui.label(format!("Jump: {:?}", state.jump_phase()));
        ui.label(format!("Spin: {:.2}", state.spin_progress()));
        ui.label(format!("Bank: {:.3}", state.bank()));
        ui.separator();
        ui.label(format!("Invincible: {}", state.is_invincible()));
        ui.label(format!("Visible: {}", state.is_visible()));
        ui.label(format!("Damage Taken: {}", store.damage_taken));
    });
}

fn run_panel_ui_system(
    mut contexts: EguiContexts,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut panel: ResMut<RunPanelState>,
    mut store: ResMut<RunStore>,
    q_player: Query<(Entity, &RunnerState), With<PlayerRunner>>,
    mut hits: EventWriter<PlayerHit>,
) {
    panel.frame_count += 1;

    // Skip the first few frames to ensure egui is fully initialized
    if panel.frame_count <= 2 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    if keyboard.just_pressed(panel.toggle_key) {
        panel.show_panel = !panel.show_panel;
    }

    egui::Area::new(egui::Id::new("run_panel_info_area"))
        .fixed_pos(egui::pos2(10.0, 40.0))
        .show(ctx, |ui| {
            ui.colored_label(
                egui::Color32::from_rgb(200, 200, 200),
                format!(
                    "Press {:?} to toggle the panel, {:?} to take a hit",
                    panel.toggle_key, panel.hit_key
                ),
            );
        });

    if !panel.show_panel {
        return;
    }

    egui::Window::new("Run Store")
        .default_pos([10.0, 80.0])
        .default_width(280.0)
        .collapsible(true)
        .resizable(true)
        .show(ctx, |ui| {
            run_store_ui(ui, &mut store);

            if let Ok((runner, state)) = q_player.single() {
                if ui.button("Hit").clicked() {
                    hits.write(PlayerHit::runner(runner));
                }
                runner_state_ui(ui, state, &store);
            }
        });
}
