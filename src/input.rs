//! Input mapping.
//!
//! Translates keyboard presses and touch or mouse drags into
//! [`RunnerAction`]s on runners marked with [`PlayerRunner`]. All input is
//! ignored unless the run is playing. The mapper never touches runner state
//! itself, it only queues intents.
//!
//! ## Controls
//! - **A/D** or **Left/Right**: change lane
//! - **W/Up/Space**: jump (twice for a double jump)
//! - **E**: activate the special ability
//! - Horizontal swipe: change lane
//! - Upward swipe: jump
//! - Tap or click: activate the special ability

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::{RunSnapshotSystems, RunnerSystems};
use crate::backend::RunSnapshot;
use crate::config::RunnerConfig;
use crate::intent::{RunnerAction, RunnerIntent};
use crate::lane::LaneDirection;

/// Marker component for runners driven by local input.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerRunner;

/// System set of the input mapping systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunnerInputSystems;

/// Keys bound to each runner action.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct RunnerKeyBindings {
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
    pub ability: Vec<KeyCode>,
}

impl Default for RunnerKeyBindings {
    fn default() -> Self {
        Self {
            left: vec![KeyCode::ArrowLeft, KeyCode::KeyA],
            right: vec![KeyCode::ArrowRight, KeyCode::KeyD],
            jump: vec![KeyCode::ArrowUp, KeyCode::KeyW, KeyCode::Space],
            ability: vec![KeyCode::KeyE],
        }
    }
}

impl RunnerKeyBindings {
    /// Action bound to `key`, if any.
    pub fn action_for(&self, key: KeyCode) -> Option<RunnerAction> {
        if self.left.contains(&key) {
            Some(RunnerAction::ShiftLane(LaneDirection::Left))
        } else if self.right.contains(&key) {
            Some(RunnerAction::ShiftLane(LaneDirection::Right))
        } else if self.jump.contains(&key) {
            Some(RunnerAction::Jump)
        } else if self.ability.contains(&key) {
            Some(RunnerAction::ActivateAbility)
        } else {
            None
        }
    }
}

/// Classify a finished drag by its screen-space displacement.
///
/// Screen `y` grows downward, so an upward swipe has a negative `y`.
/// - horizontal axis dominant and beyond `swipe_threshold`: lane change
/// - upward, vertical axis dominant and beyond `swipe_threshold`: jump
/// - within `tap_tolerance` on both axes: ability
/// - anything else (short drags, downward swipes): ignored
pub fn classify_gesture(delta: Vec2, swipe_threshold: f32, tap_tolerance: f32) -> Option<RunnerAction> {
    let (dx, dy) = (delta.x.abs(), delta.y.abs());

    if dx > dy && dx > swipe_threshold {
        LaneDirection::from_sign(delta.x).map(RunnerAction::ShiftLane)
    } else if delta.y < -swipe_threshold && dy > dx {
        Some(RunnerAction::Jump)
    } else if dx <= tap_tolerance && dy <= tap_tolerance {
        Some(RunnerAction::ActivateAbility)
    } else {
        None
    }
}

fn push_gesture(delta: Vec2, runners: &mut Query<(&RunnerConfig, &mut RunnerIntent), With<PlayerRunner>>) {
    for (config, mut intent) in runners.iter_mut() {
        if let Some(action) = classify_gesture(delta, config.swipe_threshold, config.tap_tolerance) {
            intent.push(action);
        }
    }
}

/// Queue actions for keys pressed this frame.
pub fn read_keyboard(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<RunnerKeyBindings>,
    snapshot: Res<RunSnapshot>,
    mut runners: Query<&mut RunnerIntent, With<PlayerRunner>>,
) {
    let Some(keys) = keys else {
        return;
    };
    if !snapshot.status.is_playing() {
        return;
    }

    for key in keys.get_just_pressed() {
        let Some(action) = bindings.action_for(*key) else {
            continue;
        };
        for mut intent in &mut runners {
            intent.push(action);
        }
    }
}

/// Queue actions for touches lifted this frame.
pub fn read_touch_gestures(
    touches: Option<Res<Touches>>,
    snapshot: Res<RunSnapshot>,
    mut runners: Query<(&RunnerConfig, &mut RunnerIntent), With<PlayerRunner>>,
) {
    let Some(touches) = touches else {
        return;
    };
    if !snapshot.status.is_playing() {
        return;
    }

    for touch in touches.iter_just_released() {
        push_gesture(touch.position() - touch.start_position(), &mut runners);
    }
}

/// Queue actions for left-button drags and clicks on the primary window.
pub fn read_mouse_gestures(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    snapshot: Res<RunSnapshot>,
    mut drag_start: Local<Option<Vec2>>,
    mut runners: Query<(&RunnerConfig, &mut RunnerIntent), With<PlayerRunner>>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    if !snapshot.status.is_playing() {
        *drag_start = None;
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if buttons.just_pressed(MouseButton::Left) {
        *drag_start = cursor;
    }
    if buttons.just_released(MouseButton::Left) {
        if let (Some(start), Some(end)) = (drag_start.take(), cursor) {
            push_gesture(end - start, &mut runners);
        }
    }
}

/// Plugin that maps keyboard, touch and mouse input to runner intents.
///
/// Add it next to [`LaneRunnerPlugin`](crate::LaneRunnerPlugin) and mark the
/// controlled runner with [`PlayerRunner`]. The mappers run in `Update`
/// between the snapshot and the tick, so a key pressed on the frame a run
/// starts already counts. With the controller in another schedule they read
/// the status of its last tick instead.
#[derive(Default)]
pub struct RunnerInputPlugin;

impl Plugin for RunnerInputPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerRunner>();
        app.register_type::<RunnerKeyBindings>();
        app.init_resource::<RunnerKeyBindings>();
        app.init_resource::<RunSnapshot>();

        app.add_systems(
            Update,
            (read_keyboard, read_touch_gestures, read_mouse_gestures)
                .in_set(RunnerInputSystems)
                .after(RunSnapshotSystems)
                .before(RunnerSystems),
        );
    }
}
