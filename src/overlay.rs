use std::time::Duration;

use log::info;

use crate::animation::{AnimationRequest, AnimationSink, AnimationTarget, Animator, Easing, Motion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Visible,
    FadingOut,
    /// Terminal.
    Hidden,
}

/// Loading screen covering the scene until the assets are ready.
#[derive(Debug)]
pub struct LoadingOverlay {
    state: OverlayState,
    fade: Duration,
}

impl LoadingOverlay {
    pub fn new(fade: Duration) -> Self {
        Self {
            state: OverlayState::Visible,
            fade,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_drawn(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    /// Starts the fade-out. Calling it again has no effect.
    pub fn begin_fade(&mut self, sink: &mut impl AnimationSink) {
        if self.state != OverlayState::Visible {
            return;
        }
        info!("hiding loading overlay");
        self.state = OverlayState::FadingOut;
        sink.request(AnimationRequest {
            target: AnimationTarget::OverlayOpacity,
            motion: Motion::To(0.0),
            duration: self.fade,
            easing: Easing::Linear,
        });
    }

    /// Moves to `Hidden` once the fade has run its course.
    pub fn update(&mut self, animator: &Animator) {
        if self.state == OverlayState::FadingOut
            && animator.is_idle(AnimationTarget::OverlayOpacity)
            && animator.value(AnimationTarget::OverlayOpacity) <= 0.0
        {
            self.state = OverlayState::Hidden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_runs_once_and_ends_hidden() {
        let mut animator = Animator::new();
        animator.set(AnimationTarget::OverlayOpacity, 1.0);
        let mut overlay = LoadingOverlay::new(Duration::from_millis(500));

        overlay.begin_fade(&mut animator);
        assert_eq!(overlay.state(), OverlayState::FadingOut);

        animator.advance(Duration::from_millis(250));
        overlay.update(&animator);
        assert_eq!(overlay.state(), OverlayState::FadingOut);
        assert!((animator.value(AnimationTarget::OverlayOpacity) - 0.5).abs() < 1e-5);

        animator.advance(Duration::from_millis(250));
        overlay.update(&animator);
        assert_eq!(overlay.state(), OverlayState::Hidden);
        assert!(!overlay.is_drawn());
    }

    #[test]
    fn begin_fade_is_idempotent() {
        let mut requests = Vec::new();
        let mut overlay = LoadingOverlay::new(Duration::from_millis(500));
        overlay.begin_fade(&mut requests);
        overlay.begin_fade(&mut requests);
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn visible_overlay_stays_visible_without_a_fade() {
        let animator = Animator::new();
        let mut overlay = LoadingOverlay::new(Duration::from_millis(500));
        overlay.update(&animator);
        assert_eq!(overlay.state(), OverlayState::Visible);
    }
}
