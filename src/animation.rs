use std::collections::HashMap;
use std::time::Duration;

/// Easing curves, named after the tweening presets they reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Cubic ease-in.
    Power2In,
    /// Cubic ease-out.
    Power2Out,
    /// Cubic ease-in-out: accelerates, then decelerates.
    Power2InOut,
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power2In => t * t * t,
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Animatable scalar properties of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    /// Y rotation of the orbit group, radians.
    OrbitRotation,
    /// Vertical shift of the heading column, in heading heights.
    HeadingOffset,
    OverlayOpacity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Relative change from the value the target is heading to.
    By(f32),
    /// Absolute destination.
    To(f32),
}

/// One-way command for the animation scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub target: AnimationTarget,
    pub motion: Motion,
    pub duration: Duration,
    pub easing: Easing,
}

/// Receiver of fire-and-forget animation requests.
pub trait AnimationSink {
    fn request(&mut self, request: AnimationRequest);
}

impl AnimationSink for Vec<AnimationRequest> {
    fn request(&mut self, request: AnimationRequest) {
        self.push(request);
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl Tween {
    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.progress())
    }
}

/// Scheduler running at most one tween per target.
///
/// A relative request chains onto the destination of the tween in flight, so
/// back-to-back steps add up. An absolute request replaces whatever is in
/// flight and starts from the current value.
#[derive(Debug, Default)]
pub struct Animator {
    values: HashMap<AnimationTarget, f32>,
    tweens: HashMap<AnimationTarget, Tween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value immediately, cancelling any tween on the target.
    pub fn set(&mut self, target: AnimationTarget, value: f32) {
        self.tweens.remove(&target);
        self.values.insert(target, value);
    }

    /// Current value of the target; untouched targets read as zero.
    pub fn value(&self, target: AnimationTarget) -> f32 {
        self.values.get(&target).copied().unwrap_or(0.0)
    }

    /// Value the target will settle at once its tween finishes.
    pub fn destination(&self, target: AnimationTarget) -> f32 {
        self.tweens
            .get(&target)
            .map(|tween| tween.to)
            .unwrap_or_else(|| self.value(target))
    }

    pub fn is_idle(&self, target: AnimationTarget) -> bool {
        !self.tweens.contains_key(&target)
    }

    /// Steps every active tween by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let mut finished = Vec::new();
        for (target, tween) in self.tweens.iter_mut() {
            tween.elapsed += dt;
            self.values.insert(*target, tween.value());
            if tween.progress() >= 1.0 {
                finished.push(*target);
            }
        }
        for target in finished {
            if let Some(tween) = self.tweens.remove(&target) {
                self.values.insert(target, tween.to);
            }
        }
    }
}

impl AnimationSink for Animator {
    fn request(&mut self, request: AnimationRequest) {
        let from = self.value(request.target);
        let to = match request.motion {
            Motion::By(delta) => self.destination(request.target) + delta,
            Motion::To(value) => value,
        };
        self.tweens.insert(
            request.target,
            Tween {
                from,
                to,
                elapsed: Duration::ZERO,
                duration: request.duration,
                easing: request.easing,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    fn by(target: AnimationTarget, delta: f32) -> AnimationRequest {
        AnimationRequest {
            target,
            motion: Motion::By(delta),
            duration: SECOND,
            easing: Easing::Power2InOut,
        }
    }

    #[test]
    fn easing_curves_pin_their_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Power2In,
            Easing::Power2Out,
            Easing::Power2InOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::Power2InOut.apply(0.25) < 0.25);
        assert!(Easing::Power2InOut.apply(0.75) > 0.75);
    }

    #[test]
    fn tween_reaches_its_destination() {
        let mut animator = Animator::new();
        animator.request(by(AnimationTarget::OrbitRotation, -1.0));
        animator.advance(SECOND / 2);
        let halfway = animator.value(AnimationTarget::OrbitRotation);
        assert!((halfway + 0.5).abs() < 1e-5);
        animator.advance(SECOND);
        assert_eq!(animator.value(AnimationTarget::OrbitRotation), -1.0);
        assert!(animator.is_idle(AnimationTarget::OrbitRotation));
    }

    #[test]
    fn relative_requests_chain_onto_the_tween_in_flight() {
        let mut animator = Animator::new();
        animator.request(by(AnimationTarget::HeadingOffset, -1.0));
        animator.advance(SECOND / 4);
        animator.request(by(AnimationTarget::HeadingOffset, -1.0));
        assert_eq!(animator.destination(AnimationTarget::HeadingOffset), -2.0);
        animator.advance(SECOND * 2);
        assert_eq!(animator.value(AnimationTarget::HeadingOffset), -2.0);
    }

    #[test]
    fn absolute_request_replaces_the_tween_in_flight() {
        let mut animator = Animator::new();
        animator.set(AnimationTarget::HeadingOffset, -3.0);
        animator.request(by(AnimationTarget::HeadingOffset, -1.0));
        animator.request(AnimationRequest {
            motion: Motion::To(0.0),
            ..by(AnimationTarget::HeadingOffset, 0.0)
        });
        assert_eq!(animator.destination(AnimationTarget::HeadingOffset), 0.0);
        animator.advance(SECOND);
        assert_eq!(animator.value(AnimationTarget::HeadingOffset), 0.0);
    }

    #[test]
    fn targets_animate_independently() {
        let mut animator = Animator::new();
        animator.set(AnimationTarget::OverlayOpacity, 1.0);
        animator.request(by(AnimationTarget::OrbitRotation, 2.0));
        animator.advance(SECOND);
        assert_eq!(animator.value(AnimationTarget::OverlayOpacity), 1.0);
        assert_eq!(animator.value(AnimationTarget::OrbitRotation), 2.0);
    }

    #[test]
    fn zero_duration_jumps_on_next_advance() {
        let mut animator = Animator::new();
        animator.request(AnimationRequest {
            duration: Duration::ZERO,
            ..by(AnimationTarget::OrbitRotation, 1.5)
        });
        animator.advance(Duration::ZERO);
        assert_eq!(animator.value(AnimationTarget::OrbitRotation), 1.5);
    }
}
