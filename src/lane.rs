//! Lane selection.
//!
//! Lanes are indexed symmetrically around the centre lane `0`, from
//! `-max_lane` to `max_lane`, where `max_lane = lane_count / 2`. A lane
//! count of zero degrades to a single permitted lane.

use bevy::prelude::*;

/// Direction of a lane change.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    /// Signed lane offset of this direction.
    #[inline]
    pub fn offset(self) -> i32 {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }

    /// Direction of a signed value, `None` for zero.
    pub fn from_sign(value: f32) -> Option<Self> {
        if value < 0.0 {
            Some(LaneDirection::Left)
        } else if value > 0.0 {
            Some(LaneDirection::Right)
        } else {
            None
        }
    }
}

/// Highest lane index reachable with `lane_count` lanes.
#[inline]
pub fn max_lane_for(lane_count: u32) -> i32 {
    i32::try_from(lane_count / 2).unwrap_or(i32::MAX)
}

/// Current lane and its bound.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaneSelector {
    lane: i32,
    max_lane: i32,
}

impl LaneSelector {
    /// Centre lane for the given lane count.
    pub fn new(lane_count: u32) -> Self {
        Self {
            lane: 0,
            max_lane: max_lane_for(lane_count),
        }
    }

    /// Current lane index.
    #[inline]
    pub fn lane(&self) -> i32 {
        self.lane
    }

    /// Current bound.
    #[inline]
    pub fn max_lane(&self) -> i32 {
        self.max_lane
    }

    /// Step one lane in `direction`, stopping at the bound.
    ///
    /// Returns `true` if the lane changed.
    pub fn shift(&mut self, direction: LaneDirection) -> bool {
        let next = (self.lane + direction.offset()).clamp(-self.max_lane, self.max_lane);
        let changed = next != self.lane;
        self.lane = next;
        changed
    }

    /// Recompute the bound from `lane_count` and re-clamp the current lane.
    ///
    /// Returns `true` if the bound changed.
    pub fn update_bound(&mut self, lane_count: u32) -> bool {
        let max_lane = max_lane_for(lane_count);
        let changed = max_lane != self.max_lane;
        self.max_lane = max_lane;
        self.lane = self.lane.clamp(-max_lane, max_lane);
        changed
    }

    /// Horizontal position of the current lane centre.
    #[inline]
    pub fn target_x(&self, lane_width: f32) -> f32 {
        self.lane as f32 * lane_width
    }
}

/// Fraction of the remaining distance covered this tick by an exponential
/// approach with the given rate.
#[inline]
pub fn approach_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Banking roll while drifting toward `target`.
#[inline]
pub fn bank_angle(target: f32, position: f32, factor: f32) -> f32 {
    -(target - position) * factor
}
