//! Runner intents and notifications.
//!
//! Intents represent what the player wants the runner to do. Input sources
//! (keyboard, touch, AI, network) push [`RunnerAction`]s onto the runner's
//! [`RunnerIntent`] queue at any time; the controller drains the queue at the
//! start of the next tick. Actions pushed while the run is not playing are
//! dropped, never replayed later.
//!
//! The events in this module are the controller's boundary with the rest of
//! the game: [`PlayerHit`] comes in, [`RunnerCue`] and [`AbilityRequested`]
//! go out.

use bevy::prelude::*;

use crate::jump::JumpKind;
use crate::lane::LaneDirection;

/// A discrete player intent.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerAction {
    /// Move one lane left or right.
    ShiftLane(LaneDirection),
    /// Jump, or double-jump while airborne.
    Jump,
    /// Trigger the special ability. Forwarded, no local effect.
    ActivateAbility,
}

/// Pending actions for a runner, consumed atomically each tick.
///
/// # Example
///
/// ```rust
/// use lane_runner_controller::prelude::*;
///
/// let mut intent = RunnerIntent::new();
/// intent.shift_lane(LaneDirection::Left);
/// intent.jump();
/// assert_eq!(intent.len(), 2);
///
/// let actions = intent.drain();
/// assert_eq!(actions[1], RunnerAction::Jump);
/// assert!(intent.is_empty());
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct RunnerIntent {
    pending: Vec<RunnerAction>,
}

impl RunnerIntent {
    /// Create an empty intent queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action.
    pub fn push(&mut self, action: RunnerAction) {
        self.pending.push(action);
    }

    /// Queue a lane change.
    pub fn shift_lane(&mut self, direction: LaneDirection) {
        self.push(RunnerAction::ShiftLane(direction));
    }

    /// Queue a jump.
    pub fn jump(&mut self) {
        self.push(RunnerAction::Jump);
    }

    /// Queue a special ability activation.
    pub fn activate_ability(&mut self) {
        self.push(RunnerAction::ActivateAbility);
    }

    /// Take every pending action, in arrival order.
    pub fn drain(&mut self) -> Vec<RunnerAction> {
        std::mem::take(&mut self.pending)
    }

    /// Drop every pending action.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending actions, in arrival order.
    pub fn pending(&self) -> &[RunnerAction] {
        &self.pending
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Inbound notification: the runner collided with a hazard.
///
/// `runner: None` hits every runner; games with a single runner can send
/// [`PlayerHit::any`].
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerHit {
    pub runner: Option<Entity>,
}

impl PlayerHit {
    /// Hit addressed to a specific runner.
    pub fn runner(runner: Entity) -> Self {
        Self {
            runner: Some(runner),
        }
    }

    /// Hit addressed to every runner.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether this hit is addressed to `entity`.
    pub fn targets(&self, entity: Entity) -> bool {
        self.runner.is_none_or(|runner| runner == entity)
    }
}

/// Outbound sound cue for the audio layer.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerCue {
    /// A jump was performed.
    Jump { runner: Entity, kind: JumpKind },
    /// A hit applied damage.
    Damage { runner: Entity },
}

/// Outbound request to activate the special ability.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityRequested {
    pub runner: Entity,
}
