use std::f32::consts::TAU;
use std::time::Duration;

use log::debug;

use crate::animation::{AnimationRequest, AnimationSink, AnimationTarget, Easing, Motion};

/// Minimum-interval gate for input events.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    min_interval: Duration,
    last_fire: Option<Duration>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fire: None,
        }
    }

    /// Accepts the event if it is at least `min_interval` after the last
    /// accepted one. The first event is always accepted.
    pub fn try_fire(&mut self, timestamp: Duration) -> bool {
        if let Some(last) = self.last_fire {
            if timestamp.saturating_sub(last) < self.min_interval {
                return false;
            }
        }
        self.last_fire = Some(timestamp);
        true
    }

    pub fn last_fire(&self) -> Option<Duration> {
        self.last_fire
    }
}

/// Outcome of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    Rejected,
    /// Accepted; carries the new index and whether the cycle wrapped.
    Advanced { index: usize, wrapped: bool },
}

/// Maps throttled wheel input onto a wrapping orbit index and the
/// animations that present it.
#[derive(Debug)]
pub struct ScrollStateMachine {
    positions: usize,
    index: usize,
    throttle: Throttle,
    duration: Duration,
    easing: Easing,
}

impl ScrollStateMachine {
    /// `positions` is the number of stops on the orbit (one per planet).
    pub fn new(positions: usize, min_interval: Duration, duration: Duration) -> Self {
        Self {
            positions: positions.max(1),
            index: 0,
            throttle: Throttle::new(min_interval),
            duration,
            easing: Easing::Power2InOut,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn positions(&self) -> usize {
        self.positions
    }

    /// Rotation applied to the orbit group per accepted step.
    pub fn rotation_step(&self) -> f32 {
        -TAU / self.positions as f32
    }

    /// Handles a wheel event stamped with a monotonic `timestamp`.
    pub fn on_wheel_event(
        &mut self,
        timestamp: Duration,
        sink: &mut impl AnimationSink,
    ) -> WheelOutcome {
        if !self.throttle.try_fire(timestamp) {
            debug!("wheel event at {timestamp:?} throttled");
            return WheelOutcome::Rejected;
        }

        self.index = (self.index + 1) % self.positions;
        let wrapped = self.index == 0;

        sink.request(self.tween(AnimationTarget::OrbitRotation, Motion::By(self.rotation_step())));
        sink.request(self.tween(AnimationTarget::HeadingOffset, Motion::By(-1.0)));
        // Heading steps are relative, so a full cycle has to be zeroed explicitly.
        if wrapped {
            sink.request(self.tween(AnimationTarget::HeadingOffset, Motion::To(0.0)));
        }

        debug!("scroll index advanced to {}", self.index);
        WheelOutcome::Advanced {
            index: self.index,
            wrapped,
        }
    }

    fn tween(&self, target: AnimationTarget, motion: Motion) -> AnimationRequest {
        AnimationRequest {
            target,
            motion,
            duration: self.duration,
            easing: self.easing,
        }
    }
}
