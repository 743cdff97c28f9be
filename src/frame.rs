//! Per-tick presentation output.
//!
//! [`RunnerFrame`] is the snapshot the rendering side consumes every tick:
//! position, rotation, visibility, limb pose and shadow hints. When the
//! runner entity also carries a `Transform` and `Visibility`, the controller
//! writes the frame into them directly.

use bevy::prelude::*;

use crate::config::RunnerConfig;
use crate::jump::RunnerPose;
use crate::state::RunnerState;

/// Ground shadow scale and opacity for the current height.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ShadowHint {
    pub scale: f32,
    pub opacity: f32,
}

impl Default for ShadowHint {
    fn default() -> Self {
        Self::from_height(0.0, 1.0)
    }
}

impl ShadowHint {
    /// Shadow for a runner `height` above the floor.
    ///
    /// Shrinks and fades as the runner rises, bottoming out at a scale of 0.2
    /// and an opacity of 0.1.
    pub fn from_height(height: f32, reference_height: f32) -> Self {
        let t = height / reference_height;
        Self {
            scale: (1.0 - t * 0.5).max(0.2),
            opacity: (0.3 - t * 0.2).max(0.1),
        }
    }
}

/// Everything the presentation layer reads for one tick.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Default)]
#[reflect(Component)]
pub struct RunnerFrame {
    pub position_x: f32,
    pub position_y: f32,
    /// Pitch, the double-jump flip.
    pub rotation_x: f32,
    /// Roll, the lane-change bank.
    pub rotation_z: f32,
    pub visible: bool,
    pub pose: RunnerPose,
    pub spin_angle: f32,
    pub shadow: ShadowHint,
}

impl RunnerFrame {
    /// Build the frame for the current state.
    pub fn from_state(state: &RunnerState, config: &RunnerConfig) -> Self {
        Self {
            position_x: state.position_x(),
            position_y: state.position_y(),
            rotation_x: state.spin_progress(),
            rotation_z: state.bank(),
            visible: state.is_visible(),
            pose: state.pose(),
            spin_angle: state.spin_progress(),
            shadow: ShadowHint::from_height(state.position_y(), config.shadow_reference_height),
        }
    }

    /// Orientation of the runner body.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation_x, 0.0, self.rotation_z)
    }

    /// Write position and rotation into `transform`, leaving depth untouched.
    pub fn apply_to_transform(&self, transform: &mut Transform) {
        transform.translation.x = self.position_x;
        transform.translation.y = self.position_y;
        transform.rotation = self.rotation();
    }

    /// Visibility matching the flicker state.
    pub fn visibility(&self) -> Visibility {
        if self.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        }
    }
}
