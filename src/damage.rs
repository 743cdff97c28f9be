//! Damage immunity window.
//!
//! A hit arms a fixed-length invincibility window. While armed, further hits
//! are ignored and the runner flickers on a square wave. An externally
//! granted immortality mode suppresses damage entirely and always forces the
//! runner visible, even over the flicker.

use std::time::Duration;

use bevy::prelude::*;

/// What happened to a hit notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Damage applies and the window is now armed.
    Armed,
    /// Immortality is active, nothing happens.
    Immortal,
    /// The window is already armed, nothing happens.
    AlreadyInvincible,
}

/// Invincibility window started by a hit.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvincibilityTimer {
    since: Option<Duration>,
}

impl InvincibilityTimer {
    /// Whether the window is armed.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.since.is_some()
    }

    /// Time the window was armed at.
    #[inline]
    pub fn since(&self) -> Option<Duration> {
        self.since
    }

    /// Register a hit at `now`.
    pub fn hit(&mut self, now: Duration, immortal: bool) -> HitOutcome {
        if immortal {
            HitOutcome::Immortal
        } else if self.is_active() {
            HitOutcome::AlreadyInvincible
        } else {
            self.since = Some(now);
            HitOutcome::Armed
        }
    }

    /// Disarm immediately.
    pub fn clear(&mut self) {
        self.since = None;
    }

    /// Per-tick update.
    ///
    /// Clears the window once more than `duration` has elapsed since it was
    /// armed, flickers `visible` while it is running, then lets immortality
    /// override the result. Returns `true` on the tick the window expires.
    pub fn tick(
        &mut self,
        now: Duration,
        duration: Duration,
        flicker_period: Duration,
        immortal: bool,
        visible: &mut bool,
    ) -> bool {
        let mut expired = false;

        if let Some(since) = self.since {
            if now.saturating_sub(since) > duration {
                self.since = None;
                *visible = true;
                expired = true;
            } else {
                *visible = flicker_visible(now, flicker_period);
            }
        }

        // Immortality wins over the flicker.
        if immortal {
            *visible = true;
        }

        expired
    }
}

/// Square wave with the given half-period: visible on even slots.
pub fn flicker_visible(now: Duration, period: Duration) -> bool {
    let period = period.as_millis().max(1);
    (now.as_millis() / period) % 2 == 0
}
