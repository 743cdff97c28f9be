//! Procedural runner model.
//!
//! Builds a box-limbed quadruped from a [`RunnerSkin`] and animates its legs
//! and tail from the runner's published [`RunnerFrame`]. The ground shadow is
//! a separate, unparented entity so it stays on the floor during jumps.

use bevy::prelude::*;
use lane_runner_controller::prelude::*;

/// Which pose channel drives a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimbSlot {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
    Tail,
}

impl LimbSlot {
    const LEGS: [LimbSlot; 4] = [
        LimbSlot::FrontLeft,
        LimbSlot::FrontRight,
        LimbSlot::BackLeft,
        LimbSlot::BackRight,
    ];

    fn angle(self, pose: &RunnerPose) -> f32 {
        match self {
            LimbSlot::FrontLeft => pose.front_left,
            LimbSlot::FrontRight => pose.front_right,
            LimbSlot::BackLeft => pose.back_left,
            LimbSlot::BackRight => pose.back_right,
            LimbSlot::Tail => pose.tail,
        }
    }
}

/// Joint pivot animated from the owning runner's pose.
#[derive(Component)]
pub struct Limb {
    pub runner: Entity,
    pub slot: LimbSlot,
    /// Rest rotation the pose angle is applied on top of.
    pub rest: Quat,
}

/// Ground shadow following a runner.
#[derive(Component)]
pub struct RunnerShadow {
    pub runner: Entity,
    pub material: Handle<StandardMaterial>,
}

/// Spawn the visual children of `runner` from its skin.
pub fn spawn_runner_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    runner: Entity,
    skin: &RunnerSkin,
) {
    let body = materials.add(StandardMaterial {
        base_color: skin.body_color,
        perceptual_roughness: 0.8,
        ..default()
    });
    let accent = materials.add(StandardMaterial {
        base_color: skin.accent_color,
        perceptual_roughness: 0.8,
        ..default()
    });

    let torso_y = skin.standing_height();

    commands.entity(runner).with_children(|parent| {
        // Torso
        parent.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(skin.body_size))),
            MeshMaterial3d(body.clone()),
            Transform::from_xyz(0.0, torso_y, 0.0),
        ));

        // Head, forward and slightly above the torso
        let head_offset = Vec3::new(
            0.0,
            torso_y + skin.body_size.y * 0.4,
            -(skin.body_size.z + skin.head_size.z) * 0.5,
        );
        parent.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(skin.head_size))),
            MeshMaterial3d(body.clone()),
            Transform::from_translation(head_offset),
        ));

        // Legs hang from hip pivots
        let leg_mesh = meshes.add(Cuboid::new(
            skin.leg_thickness,
            skin.leg_length,
            skin.leg_thickness,
        ));
        for (slot, hip) in LimbSlot::LEGS.into_iter().zip(skin.hip_offsets()) {
            parent
                .spawn((
                    Limb {
                        runner,
                        slot,
                        rest: Quat::IDENTITY,
                    },
                    Transform::from_translation(hip),
                    Visibility::default(),
                ))
                .with_children(|hip| {
                    hip.spawn((
                        Mesh3d(leg_mesh.clone()),
                        MeshMaterial3d(accent.clone()),
                        Transform::from_xyz(0.0, -skin.leg_length * 0.5, 0.0),
                    ));
                });
        }

        // Tail points backward and up from its root
        let rest = Quat::from_rotation_x(0.6);
        parent
            .spawn((
                Limb {
                    runner,
                    slot: LimbSlot::Tail,
                    rest,
                },
                Transform::from_translation(skin.tail_root()).with_rotation(rest),
                Visibility::default(),
            ))
            .with_children(|tail| {
                tail.spawn((
                    Mesh3d(meshes.add(Cuboid::new(0.08, 0.08, skin.tail_length))),
                    MeshMaterial3d(accent.clone()),
                    Transform::from_xyz(0.0, 0.0, skin.tail_length * 0.5),
                ));
            });
    });

    let shadow = materials.add(StandardMaterial {
        base_color: Color::srgba(0.0, 0.0, 0.0, 0.3),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    commands.spawn((
        RunnerShadow {
            runner,
            material: shadow.clone(),
        },
        Mesh3d(meshes.add(Circle::new(skin.shadow_radius))),
        MeshMaterial3d(shadow),
        Transform::from_xyz(0.0, 0.01, 0.0)
            .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    ));
}

/// Rotate limb pivots to the runner's current pose.
pub fn animate_limbs(q_frames: Query<&RunnerFrame>, mut q_limbs: Query<(&Limb, &mut Transform)>) {
    for (limb, mut transform) in &mut q_limbs {
        let Ok(frame) = q_frames.get(limb.runner) else {
            continue;
        };
        transform.rotation = limb.rest * Quat::from_rotation_x(limb.slot.angle(&frame.pose));
    }
}

/// Keep each shadow under its runner, shrinking and fading with height.
pub fn follow_shadows(
    q_runners: Query<(&RunnerFrame, &Transform), Without<RunnerShadow>>,
    mut q_shadows: Query<(&RunnerShadow, &mut Transform)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (shadow, mut transform) in &mut q_shadows {
        let Ok((frame, runner_transform)) = q_runners.get(shadow.runner) else {
            continue;
        };

        transform.translation.x = frame.position_x;
        transform.translation.z = runner_transform.translation.z;
        transform.scale = Vec3::splat(frame.shadow.scale);

        if let Some(material) = materials.get_mut(&shadow.material) {
            material.base_color = Color::srgba(0.0, 0.0, 0.0, frame.shadow.opacity);
        }
    }
}
