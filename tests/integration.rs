//! Integration tests for the runner controller.
//!
//! These tests drive a headless app with a manual clock so every tick has an
//! exact delta, and check the controller end to end: status transitions,
//! intents, the Euler jump trajectory, hits and the presentation output.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use lane_runner_controller::prelude::*;

/// Create a headless app ticking `step` per update.
///
/// `setup` runs before the plugins are finished, so it may add more plugins.
fn build_test_app(store: RunStore, step: Duration, setup: impl FnOnce(&mut App)) -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(LaneRunnerPlugin::<RunStoreBackend>::default());
    app.insert_resource(store);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    setup(&mut app);

    app.finish();
    app.cleanup();
    app
}

fn create_test_app_with_step(store: RunStore, step: Duration) -> App {
    build_test_app(store, step, |_| {})
}

/// Create a headless app ticking 100 ms per update.
fn create_test_app(store: RunStore) -> App {
    create_test_app_with_step(store, Duration::from_millis(100))
}

/// Spawn a runner with a presentation target.
fn spawn_runner(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            RunnerBundle::default(),
            Transform::from_xyz(0.0, 0.0, -4.0),
            Visibility::default(),
        ))
        .id()
}

/// Run the first update, which has a zero delta, so later updates are exact.
fn warm_up(app: &mut App) {
    app.update();
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn state(app: &App, runner: Entity) -> &RunnerState {
    app.world().get::<RunnerState>(runner).unwrap()
}

fn intent_mut(app: &mut App, runner: Entity) -> Mut<'_, RunnerIntent> {
    app.world_mut().get_mut::<RunnerIntent>(runner).unwrap()
}

fn store_mut(app: &mut App) -> Mut<'_, RunStore> {
    app.world_mut().resource_mut::<RunStore>()
}

fn drain_cues(app: &mut App) -> Vec<RunnerCue> {
    app.world_mut()
        .resource_mut::<Events<RunnerCue>>()
        .drain()
        .collect()
}

// ==================== Run Status Tests ====================

mod run_status {
    use super::*;

    #[test]
    fn entering_playing_resets_state() {
        let mut app = create_test_app(RunStore::playing(5));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).shift_lane(LaneDirection::Left);
        intent_mut(&mut app, runner).jump();
        run_frames(&mut app, 2);
        assert_eq!(state(&app, runner).lane(), -1);
        assert!(state(&app, runner).is_airborne());

        store_mut(&mut app).status = RunStatus::GameOver;
        app.update();
        store_mut(&mut app).start_run();
        app.update();

        let state = state(&app, runner);
        assert_eq!(state.lane(), 0);
        assert!(!state.is_airborne());
        assert_eq!(state.vertical_velocity(), 0.0);
    }

    #[test]
    fn paused_runner_is_frozen() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        run_frames(&mut app, 2);
        let height = state(&app, runner).position_y();
        assert!(height > 0.0);

        store_mut(&mut app).status = RunStatus::Paused;
        run_frames(&mut app, 5);
        assert_eq!(state(&app, runner).position_y(), height);
        assert!(state(&app, runner).is_airborne());
    }

    #[test]
    fn resuming_play_resets_mid_air_state() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();
        store_mut(&mut app).status = RunStatus::Paused;
        app.update();
        store_mut(&mut app).status = RunStatus::Playing;
        app.update();

        // Reset happens before the step, so the runner is at rest
        let state = state(&app, runner);
        assert_eq!(state.position_y(), 0.0);
        assert_eq!(state.jumps_used(), 0);
    }

    #[test]
    fn intents_outside_playing_are_dropped() {
        let mut app = create_test_app(RunStore {
            status: RunStatus::Shop,
            ..RunStore::playing(3)
        });
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        intent_mut(&mut app, runner).shift_lane(LaneDirection::Right);
        app.update();
        assert!(app.world().get::<RunnerIntent>(runner).unwrap().is_empty());

        store_mut(&mut app).status = RunStatus::Playing;
        app.update();
        assert!(!state(&app, runner).is_airborne());
        assert_eq!(state(&app, runner).lane(), 0);
    }

    #[test]
    fn showcase_animates_but_ignores_intents() {
        let mut app = create_test_app(RunStore {
            status: RunStatus::Showcase,
            ..RunStore::playing(3)
        });
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        run_frames(&mut app, 3);

        assert!(!state(&app, runner).is_airborne());
        let frame = app.world().get::<RunnerFrame>(runner).unwrap();
        assert_ne!(frame.pose, RunnerPose::default(), "gait should animate in showcase");
    }

    #[test]
    fn custom_schedule_still_ticks() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(LaneRunnerPlugin::<RunStoreBackend>::in_schedule(PostUpdate));
        app.insert_resource(RunStore::playing(3));
        let runner = spawn_runner(&mut app);

        app.update();
        intent_mut(&mut app, runner).shift_lane(LaneDirection::Right);
        app.update();

        assert_eq!(state(&app, runner).lane(), 1);
    }
}

// ==================== Jump Tests ====================

mod jumping {
    use super::*;

    #[test]
    fn jump_trajectory_matches_euler_steps() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();

        // Reference: same scheme, same precision
        let (dt, g) = (0.1_f32, 50.0_f32);
        let (mut y, mut v) = (0.0_f32, 16.0_f32);
        let mut landed_at = None;

        for tick in 0..10 {
            app.update();

            y += v * dt;
            v -= g * dt;
            if y <= 0.0 {
                y = 0.0;
                v = 0.0;
                landed_at.get_or_insert(tick);
            }

            let state = state(&app, runner);
            assert!(
                (state.position_y() - y).abs() < 1e-5,
                "tick {tick}: height {} expected {y}",
                state.position_y()
            );
            assert!(state.position_y() >= 0.0);
        }

        // 1.6, 2.7, 3.3, 3.4, 3.0, 2.1, 0.7, then the floor
        assert_eq!(landed_at, Some(7));
        assert_eq!(state(&app, runner).jumps_used(), 0);
    }

    #[test]
    fn jump_emits_primary_cue() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);
        drain_cues(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();

        assert_eq!(
            drain_cues(&mut app),
            vec![RunnerCue::Jump {
                runner,
                kind: JumpKind::Primary
            }]
        );
        assert_eq!(state(&app, runner).jumps_used(), 1);
    }

    #[test]
    fn second_jump_without_upgrade_is_ignored() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();
        drain_cues(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();

        let state = state(&app, runner);
        assert_eq!(state.jumps_used(), 1);
        // Second tick of a single jump: 16 - 50 * 0.2
        assert!((state.vertical_velocity() - 6.0).abs() < 1e-4);
        assert!(drain_cues(&mut app).is_empty());
    }

    #[test]
    fn double_jump_with_upgrade_flips() {
        let mut app = create_test_app(RunStore::playing(3).with_double_jump(true));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();
        drain_cues(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();

        let state = state(&app, runner);
        assert_eq!(state.jumps_used(), 2);
        // Velocity reset to 16 then one step of gravity
        assert!((state.vertical_velocity() - 11.0).abs() < 1e-4);
        assert!((state.spin_progress() - 1.5).abs() < 1e-4);
        assert_eq!(
            drain_cues(&mut app),
            vec![RunnerCue::Jump {
                runner,
                kind: JumpKind::Secondary
            }]
        );

        let airborne = app.world().get::<Airborne>(runner).unwrap();
        assert!(airborne.is_double_jump());
    }

    #[test]
    fn landing_restores_grounded_marker() {
        let mut app = create_test_app(RunStore::playing(3).with_double_jump(true));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        intent_mut(&mut app, runner).jump();
        app.update();
        assert!(app.world().get::<Airborne>(runner).is_some());
        assert!(app.world().get::<Grounded>(runner).is_none());

        run_frames(&mut app, 20);

        let state = state(&app, runner);
        assert_eq!(state.jumps_used(), 0);
        assert_eq!(state.spin_progress(), 0.0);
        assert_eq!(state.vertical_velocity(), 0.0);
        assert!(app.world().get::<Grounded>(runner).is_some());
        assert!(app.world().get::<Airborne>(runner).is_none());
    }
}

// ==================== Lane Tests ====================

mod lanes {
    use super::*;

    #[test]
    fn six_lanes_clamp_at_three() {
        let mut app = create_test_app(RunStore::playing(6));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        for _ in 0..5 {
            intent_mut(&mut app, runner).shift_lane(LaneDirection::Right);
        }
        app.update();

        let state = state(&app, runner);
        assert_eq!(state.max_lane(), 3);
        assert_eq!(state.lane(), 3);
    }

    #[test]
    fn transform_follows_the_lane() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).shift_lane(LaneDirection::Left);
        app.update();

        // 15 * 0.1 saturates the approach, so the runner lands on the lane centre
        let transform = app.world().get::<Transform>(runner).unwrap();
        assert_eq!(transform.translation.x, -2.0);
        assert_eq!(transform.translation.z, -4.0);
    }

    #[test]
    fn shrinking_lane_count_reclamps_without_input() {
        let mut app = create_test_app(RunStore::playing(7));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        for _ in 0..3 {
            intent_mut(&mut app, runner).shift_lane(LaneDirection::Right);
        }
        app.update();
        assert_eq!(state(&app, runner).lane(), 3);

        store_mut(&mut app).lane_count = 3;
        app.update();
        assert_eq!(state(&app, runner).lane(), 1);
    }

    #[test]
    fn zero_lanes_degrade_to_centre() {
        let mut app = create_test_app(RunStore::playing(0));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).shift_lane(LaneDirection::Left);
        app.update();
        assert_eq!(state(&app, runner).lane(), 0);
    }
}

// ==================== Damage Tests ====================

mod damage {
    use super::*;

    fn hit(app: &mut App) {
        app.world_mut().send_event(PlayerHit::any());
    }

    #[test]
    fn hit_applies_damage_once() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);
        drain_cues(&mut app);

        hit(&mut app);
        app.update();

        assert_eq!(app.world().resource::<RunStore>().damage_taken, 1);
        assert_eq!(app.world().resource::<RunStore>().last_damaged, Some(runner));
        assert!(state(&app, runner).is_invincible());
        assert!(app.world().get::<Invincible>(runner).is_some());
        assert_eq!(drain_cues(&mut app), vec![RunnerCue::Damage { runner }]);

        hit(&mut app);
        hit(&mut app);
        app.update();
        assert_eq!(app.world().resource::<RunStore>().damage_taken, 1);
        assert!(drain_cues(&mut app).is_empty());
    }

    #[test]
    fn immortality_blocks_damage() {
        let mut app = create_test_app(RunStore::playing(3).with_immortality(true));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);
        drain_cues(&mut app);

        hit(&mut app);
        app.update();

        assert_eq!(app.world().resource::<RunStore>().damage_taken, 0);
        assert!(!state(&app, runner).is_invincible());
        assert!(drain_cues(&mut app).is_empty());
    }

    #[test]
    fn hits_outside_playing_are_dropped() {
        let mut app = create_test_app(RunStore {
            status: RunStatus::Showcase,
            ..RunStore::playing(3)
        });
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        hit(&mut app);
        app.update();
        assert!(!state(&app, runner).is_invincible());

        store_mut(&mut app).status = RunStatus::Playing;
        app.update();
        assert!(!state(&app, runner).is_invincible());
        assert_eq!(app.world().resource::<RunStore>().damage_taken, 0);
    }

    #[test]
    fn invincibility_expires_after_window() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        hit(&mut app);
        app.update();
        let since = state(&app, runner).invincible_since().unwrap();

        // 1500 ms later the window is still open
        run_frames(&mut app, 15);
        assert!(state(&app, runner).is_invincible());

        // 1600 ms later it has closed
        app.update();
        let elapsed = app.world().resource::<Time>().elapsed();
        assert_eq!(elapsed - since, Duration::from_millis(1600));
        assert!(!state(&app, runner).is_invincible());
        assert!(state(&app, runner).is_visible());
        assert!(app.world().get::<Invincible>(runner).is_none());
        assert_eq!(
            *app.world().get::<Visibility>(runner).unwrap(),
            Visibility::Inherited
        );
    }

    #[test]
    fn invincible_runner_flickers() {
        let mut app = create_test_app_with_step(RunStore::playing(3), Duration::from_millis(50));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        hit(&mut app);
        app.update();

        let mut seen = Vec::new();
        for _ in 0..4 {
            app.update();
            seen.push(app.world().get::<RunnerFrame>(runner).unwrap().visible);
        }
        // 50 ms steps land on alternating slots of the square wave
        assert_eq!(seen[0], !seen[1]);
        assert_eq!(seen[1], !seen[2]);
        assert_eq!(seen[2], !seen[3]);
        assert!(seen.contains(&false));
    }

    #[test]
    fn immortality_overrides_flicker() {
        let mut app = create_test_app_with_step(RunStore::playing(3), Duration::from_millis(50));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        hit(&mut app);
        app.update();
        store_mut(&mut app).immortality_active = true;

        for _ in 0..4 {
            app.update();
            assert!(state(&app, runner).is_invincible());
            assert!(app.world().get::<RunnerFrame>(runner).unwrap().visible);
        }
    }
}

// ==================== Output Tests ====================

mod output {
    use super::*;

    #[test]
    fn ability_is_forwarded() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).activate_ability();
        app.update();

        let requests: Vec<AbilityRequested> = app
            .world_mut()
            .resource_mut::<Events<AbilityRequested>>()
            .drain()
            .collect();
        assert_eq!(requests, vec![AbilityRequested { runner }]);
        assert_eq!(state(&app, runner).lane(), 0);
        assert!(!state(&app, runner).is_airborne());
    }

    #[test]
    fn runner_without_transform_still_publishes_frame() {
        let mut app = create_test_app(RunStore::playing(3));
        let runner = app.world_mut().spawn(RunnerBundle::default()).id();
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        app.update();

        let frame = app.world().get::<RunnerFrame>(runner).unwrap();
        assert!((frame.position_y - 1.6).abs() < 1e-5);
        assert!(frame.shadow.scale < 1.0);
        assert!(frame.shadow.opacity < 0.3);
    }

    #[test]
    fn transform_height_and_spin() {
        let mut app = create_test_app(RunStore::playing(3).with_double_jump(true));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        intent_mut(&mut app, runner).jump();
        intent_mut(&mut app, runner).jump();
        app.update();

        let transform = *app.world().get::<Transform>(runner).unwrap();
        let frame = *app.world().get::<RunnerFrame>(runner).unwrap();
        assert!((transform.translation.y - 1.6).abs() < 1e-5);
        assert!(frame.spin_angle > 0.0);
        assert!(transform.rotation.angle_between(frame.rotation()) < 1e-4);
    }
}

// ==================== Input Tests ====================

mod input {
    use super::*;
    use bevy::input::touch::{TouchInput, TouchPhase, Touches, touch_screen_input_system};
    use bevy::window::PrimaryWindow;

    fn create_input_app(store: RunStore) -> App {
        build_test_app(store, Duration::from_millis(100), |app| {
            app.add_plugins(RunnerInputPlugin);
            app.init_resource::<ButtonInput<KeyCode>>();
            app.init_resource::<ButtonInput<MouseButton>>();
            app.init_resource::<Touches>();
            app.add_event::<TouchInput>();
            app.add_systems(PreUpdate, touch_screen_input_system);
        })
    }

    fn spawn_player(app: &mut App) -> Entity {
        let runner = spawn_runner(app);
        app.world_mut().entity_mut(runner).insert(PlayerRunner);
        runner
    }

    /// Send a complete touch from `start` to `end`, lifted this frame.
    fn swipe(app: &mut App, id: u64, start: Vec2, end: Vec2) {
        for (phase, position) in [
            (TouchPhase::Started, start),
            (TouchPhase::Moved, end),
            (TouchPhase::Ended, end),
        ] {
            app.world_mut().send_event(TouchInput {
                phase,
                position,
                window: Entity::PLACEHOLDER,
                force: None,
                id,
            });
        }
    }

    fn abilities(app: &mut App) -> Vec<AbilityRequested> {
        app.world_mut()
            .resource_mut::<Events<AbilityRequested>>()
            .drain()
            .collect()
    }

    fn press(app: &mut App, key: KeyCode) {
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(key);
    }

    fn release_all(app: &mut App) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release_all();
        keys.clear();
    }

    #[test]
    fn arrow_key_changes_lane() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        press(&mut app, KeyCode::ArrowRight);
        app.update();
        release_all(&mut app);
        app.update();

        assert_eq!(state(&app, runner).lane(), 1);
    }

    #[test]
    fn space_jumps() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        press(&mut app, KeyCode::Space);
        app.update();

        assert!(state(&app, runner).is_airborne());
    }

    #[test]
    fn keys_ignored_when_not_playing() {
        let mut app = create_input_app(RunStore {
            status: RunStatus::Idle,
            ..RunStore::playing(3)
        });
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        press(&mut app, KeyCode::ArrowLeft);
        app.update();

        assert!(app.world().get::<RunnerIntent>(runner).unwrap().is_empty());
        assert_eq!(state(&app, runner).lane(), 0);
    }

    #[test]
    fn key_counts_on_the_frame_the_run_starts() {
        let mut app = create_input_app(RunStore {
            status: RunStatus::Shop,
            ..RunStore::playing(3)
        });
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        store_mut(&mut app).start_run();
        press(&mut app, KeyCode::ArrowLeft);
        app.update();

        assert_eq!(state(&app, runner).lane(), -1);
    }

    #[test]
    fn unmarked_runners_ignore_keys() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_runner(&mut app);
        warm_up(&mut app);

        press(&mut app, KeyCode::ArrowLeft);
        app.update();

        assert_eq!(state(&app, runner).lane(), 0);
    }

    #[test]
    fn touch_tap_requests_ability() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_player(&mut app);
        warm_up(&mut app);
        abilities(&mut app);

        let point = Vec2::new(200.0, 300.0);
        swipe(&mut app, 1, point, point + Vec2::new(3.0, -4.0));
        app.update();

        assert_eq!(abilities(&mut app), vec![AbilityRequested { runner }]);
        assert!(!state(&app, runner).is_airborne());
        assert_eq!(state(&app, runner).lane(), 0);
    }

    #[test]
    fn touch_swipe_up_jumps() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        // Screen y grows downward
        swipe(&mut app, 1, Vec2::new(200.0, 400.0), Vec2::new(210.0, 300.0));
        app.update();

        assert!(state(&app, runner).is_airborne());
        assert!(abilities(&mut app).is_empty());

        // The lifted touch is not replayed on the next frame
        app.update();
        assert_eq!(state(&app, runner).jumps_used(), 1);
    }

    #[test]
    fn touch_swipe_sideways_changes_lane() {
        let mut app = create_input_app(RunStore::playing(5));
        let runner = spawn_player(&mut app);
        warm_up(&mut app);

        swipe(&mut app, 7, Vec2::new(300.0, 300.0), Vec2::new(380.0, 310.0));
        app.update();

        assert_eq!(state(&app, runner).lane(), 1);
    }

    #[test]
    fn touches_ignored_when_not_playing() {
        let mut app = create_input_app(RunStore {
            status: RunStatus::Paused,
            ..RunStore::playing(3)
        });
        let runner = spawn_player(&mut app);
        warm_up(&mut app);
        abilities(&mut app);

        swipe(&mut app, 1, Vec2::splat(100.0), Vec2::splat(100.0));
        app.update();

        assert!(abilities(&mut app).is_empty());
        assert!(app.world().get::<RunnerIntent>(runner).unwrap().is_empty());
    }

    #[test]
    fn mouse_drag_changes_lane() {
        let mut app = create_input_app(RunStore::playing(3));
        let runner = spawn_player(&mut app);
        let mut window = Window::default();
        window.set_cursor_position(Some(Vec2::new(400.0, 300.0)));
        let window = app.world_mut().spawn((window, PrimaryWindow)).id();
        warm_up(&mut app);

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();

        app.world_mut()
            .get_mut::<Window>(window)
            .unwrap()
            .set_cursor_position(Some(Vec2::new(320.0, 305.0)));
        {
            let mut buttons = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
            buttons.clear();
            buttons.release(MouseButton::Left);
        }
        app.update();

        assert_eq!(state(&app, runner).lane(), -1);
    }
}
