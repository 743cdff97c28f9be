//! Core controller systems.
//!
//! These systems implement one controller tick. The run store snapshot runs
//! first in its own set, then the rest run chained: handle status
//! transitions, consume intents, advance the simulation, resolve hits,
//! update invincibility, publish frames, sync marker components. The systems
//! that talk to the run store are generic over the backend.

use bevy::prelude::*;

use crate::backend::{RunBackend, RunSnapshot, RunStatus};
use crate::config::RunnerConfig;
use crate::damage::HitOutcome;
use crate::frame::RunnerFrame;
use crate::intent::{AbilityRequested, PlayerHit, RunnerAction, RunnerCue, RunnerIntent};
use crate::state::{Airborne, Grounded, Invincible, RunnerState};

/// Copy the run store into the [`RunSnapshot`] resource for this tick.
pub fn capture_run_snapshot<B: RunBackend>(world: &mut World) {
    let snapshot = B::snapshot(world);
    if let Some(mut current) = world.get_resource_mut::<RunSnapshot>() {
        // Avoid spurious change detection when nothing moved.
        current.set_if_neq(snapshot);
    } else {
        world.insert_resource(snapshot);
    }
}

/// Reset runners entering `Playing`, apply the lane bound, and drop intents
/// that arrived outside `Playing`.
pub fn handle_status_transitions(
    snapshot: Res<RunSnapshot>,
    mut q_runners: Query<(Entity, &mut RunnerState, &mut RunnerIntent)>,
) {
    for (entity, mut state, mut intent) in &mut q_runners {
        let previous = state.last_status.replace(snapshot.status);

        if previous != Some(snapshot.status) {
            debug!("runner {entity}: status {previous:?} -> {:?}", snapshot.status);
        }

        if snapshot.status == RunStatus::Playing && previous != Some(RunStatus::Playing) {
            info!("runner {entity}: run started, resetting state");
            state.reset(snapshot.lane_count);
        }

        if state.update_lane_bound(snapshot.lane_count) {
            debug!(
                "runner {entity}: lane bound now {} (lane {})",
                state.max_lane(),
                state.lane()
            );
        }

        if !snapshot.status.is_playing() && !intent.is_empty() {
            debug!("runner {entity}: dropping {} intents while {:?}", intent.len(), snapshot.status);
            intent.clear();
        }
    }
}

/// Apply every pending intent, in arrival order.
pub fn consume_intents(
    snapshot: Res<RunSnapshot>,
    mut q_runners: Query<(Entity, &RunnerConfig, &mut RunnerState, &mut RunnerIntent)>,
    mut cues: EventWriter<RunnerCue>,
    mut abilities: EventWriter<AbilityRequested>,
) {
    if !snapshot.status.is_playing() {
        return;
    }

    for (entity, config, mut state, mut intent) in &mut q_runners {
        if intent.is_empty() {
            continue;
        }

        for action in intent.drain() {
            match action {
                RunnerAction::ShiftLane(direction) => {
                    state.request_lane_shift(direction);
                }
                RunnerAction::Jump => {
                    if let Some(kind) = state.request_jump(snapshot.max_jumps(), config.jump_impulse) {
                        debug!("runner {entity}: {kind:?} jump");
                        cues.write(RunnerCue::Jump {
                            runner: entity,
                            kind,
                        });
                    }
                }
                RunnerAction::ActivateAbility => {
                    abilities.write(AbilityRequested { runner: entity });
                }
            }
        }
    }
}

/// Advance kinematics, flip, lane smoothing and pose by the frame delta.
pub fn advance_runners(
    time: Res<Time>,
    snapshot: Res<RunSnapshot>,
    mut q_runners: Query<(Entity, &RunnerConfig, &mut RunnerState)>,
) {
    if !snapshot.status.advances_state() {
        return;
    }

    let dt = time.delta_secs();
    for (entity, config, mut state) in &mut q_runners {
        if state.advance(dt, config) {
            debug!("runner {entity}: landed");
        }
    }
}

/// Arm invincibility for every hit notification and apply damage through the
/// backend, once per armed hit.
pub fn resolve_hits<B: RunBackend>(
    mut commands: Commands,
    time: Res<Time>,
    snapshot: Res<RunSnapshot>,
    mut hits: EventReader<PlayerHit>,
    mut q_runners: Query<(Entity, &mut RunnerState)>,
    mut cues: EventWriter<RunnerCue>,
) {
    if !snapshot.status.is_playing() {
        hits.clear();
        return;
    }

    let now = time.elapsed();
    for hit in hits.read() {
        for (entity, mut state) in &mut q_runners {
            if !hit.targets(entity) {
                continue;
            }

            match state.on_hit(now, snapshot.immortality_active) {
                HitOutcome::Armed => {
                    debug!("runner {entity}: hit at {now:?}, invincibility armed");
                    commands.queue(move |world: &mut World| B::apply_damage(world, entity));
                    cues.write(RunnerCue::Damage { runner: entity });
                }
                outcome => {
                    trace!("runner {entity}: hit ignored ({outcome:?})");
                }
            }
        }
    }
}

/// Expire invincibility windows and resolve visibility.
pub fn update_invincibility(
    time: Res<Time>,
    snapshot: Res<RunSnapshot>,
    mut q_runners: Query<(Entity, &RunnerConfig, &mut RunnerState)>,
) {
    if !snapshot.status.advances_state() {
        return;
    }

    let now = time.elapsed();
    for (entity, config, mut state) in &mut q_runners {
        if state.update_invincibility(now, config, snapshot.immortality_active) {
            debug!("runner {entity}: invincibility expired");
        }
    }
}

/// Build each runner's [`RunnerFrame`] and write it into the presentation
/// components that exist. Runners without a `Transform` only get the frame.
pub fn publish_frames(
    snapshot: Res<RunSnapshot>,
    mut q_runners: Query<(
        &RunnerConfig,
        &RunnerState,
        &mut RunnerFrame,
        Option<&mut Transform>,
        Option<&mut Visibility>,
    )>,
) {
    if !snapshot.status.advances_state() {
        return;
    }

    for (config, state, mut frame, transform, visibility) in &mut q_runners {
        let next = RunnerFrame::from_state(state, config);
        frame.set_if_neq(next);

        if let Some(mut transform) = transform {
            next.apply_to_transform(&mut transform);
        }
        if let Some(mut visibility) = visibility {
            visibility.set_if_neq(next.visibility());
        }
    }
}

/// Sync marker components with [`RunnerState`].
pub fn sync_state_markers(
    mut commands: Commands,
    q_runners: Query<(
        Entity,
        &RunnerState,
        Option<&Airborne>,
        Has<Grounded>,
        Has<Invincible>,
    )>,
) {
    for (entity, state, airborne, has_grounded, has_invincible) in &q_runners {
        if state.is_airborne() {
            let marker = Airborne {
                jumps_used: state.jumps_used(),
            };
            if airborne != Some(&marker) {
                commands.entity(entity).insert(marker);
            }
            if has_grounded {
                commands.entity(entity).remove::<Grounded>();
            }
        } else {
            if !has_grounded {
                commands.entity(entity).insert(Grounded);
            }
            if airborne.is_some() {
                commands.entity(entity).remove::<Airborne>();
            }
        }

        if state.is_invincible() && !has_invincible {
            commands.entity(entity).insert(Invincible);
        } else if !state.is_invincible() && has_invincible {
            commands.entity(entity).remove::<Invincible>();
        }
    }
}
