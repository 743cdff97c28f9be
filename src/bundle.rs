//! Spawn bundle for runners.

use bevy::prelude::*;

use crate::config::{ConfigError, RunnerConfig, RunnerSkin};
use crate::frame::RunnerFrame;
use crate::intent::RunnerIntent;
use crate::state::{Grounded, RunnerState};

/// Every component the controller needs on a runner entity.
///
/// Add a `Transform` and `Visibility` alongside to let the controller drive
/// the entity directly; without them only [`RunnerFrame`] is updated.
///
/// # Example
///
/// ```rust
/// use lane_runner_controller::prelude::*;
///
/// let bundle = RunnerBundle::try_new(RunnerConfig::default(), RunnerSkin::dog())
///     .expect("reference tuning is valid");
/// assert_eq!(bundle.skin.name, "dog");
/// ```
#[derive(Bundle, Debug, Clone)]
pub struct RunnerBundle {
    /// Tuning constants.
    pub config: RunnerConfig,
    /// Cosmetic variant.
    pub skin: RunnerSkin,
    /// Locomotion and combat state.
    pub state: RunnerState,
    /// Pending player intents.
    pub intent: RunnerIntent,
    /// Presentation output.
    pub frame: RunnerFrame,
    /// Runners spawn on the floor.
    pub grounded: Grounded,
}

impl Default for RunnerBundle {
    fn default() -> Self {
        Self::new(RunnerConfig::default(), RunnerSkin::default())
    }
}

impl RunnerBundle {
    /// Create a bundle without validating `config`.
    pub fn new(config: RunnerConfig, skin: RunnerSkin) -> Self {
        Self {
            config,
            skin,
            state: RunnerState::default(),
            intent: RunnerIntent::default(),
            frame: RunnerFrame {
                visible: true,
                ..default()
            },
            grounded: Grounded,
        }
    }

    /// Create a bundle, rejecting unusable tuning or skin dimensions.
    pub fn try_new(config: RunnerConfig, skin: RunnerSkin) -> Result<Self, ConfigError> {
        config.validate()?;
        skin.validate()?;
        Ok(Self::new(config, skin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_accepts_presets() {
        assert!(RunnerBundle::try_new(RunnerConfig::arcade(), RunnerSkin::cat()).is_ok());
    }

    #[test]
    fn try_new_rejects_bad_config() {
        let config = RunnerConfig::default().with_gravity(-5.0);
        let result = RunnerBundle::try_new(config, RunnerSkin::cat());
        assert!(matches!(result, Err(ConfigError::NotPositive { field: "gravity", .. })));
    }

    #[test]
    fn new_bundle_starts_visible_and_grounded() {
        let bundle = RunnerBundle::default();
        assert!(bundle.frame.visible);
        assert!(bundle.state.is_visible());
        assert!(!bundle.state.is_airborne());
    }
}
