#![forbid(unsafe_code)]

//! Timing primitives for panel transitions.
//!
//! A [`TransitionTimer`] accumulates frame deltas and reports eased progress
//! for one show or hide. Renderers read [`TransitionTimer::opacity`]; the
//! navigator only cares about [`TransitionTimer::is_complete`].

use std::time::Duration;

use crate::state::TransitionDirection;

/// Easing curve applied to raw transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Decelerating (cubic).
    #[default]
    EaseOut,
    /// Accelerating (cubic).
    EaseIn,
    /// Smooth S-curve.
    EaseInOut,
}

impl Easing {
    /// Map `t` in [0, 1] to eased output in [0, 1].
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(3),
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Elapsed-time tracker for a single show or hide.
///
/// Time is accumulated as [`Duration`] so repeated small ticks do not drift.
#[derive(Debug, Clone, Copy)]
pub struct TransitionTimer {
    direction: TransitionDirection,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl TransitionTimer {
    /// A timer of `duration`. A zero duration completes on the first check.
    #[must_use]
    pub fn new(direction: TransitionDirection, duration: Duration) -> Self {
        Self {
            direction,
            elapsed: Duration::ZERO,
            duration,
            easing: Easing::default(),
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear progress before easing, in [0, 1].
    #[must_use]
    pub fn raw_progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Eased progress, in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.easing.apply(self.raw_progress())
    }

    /// Visual opacity: rises during a show, falls during a hide.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self.direction {
            TransitionDirection::Show => self.progress(),
            TransitionDirection::Hide => 1.0 - self.progress(),
        }
    }

    /// Time elapsed past the end of the transition.
    #[must_use]
    pub fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::EaseOut, Easing::EaseIn, Easing::EaseInOut] {
            assert!((easing.apply(0.0)).abs() < 1e-6, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert_eq!(Easing::Linear.apply(-3.0), 0.0);
        assert_eq!(Easing::Linear.apply(4.0), 1.0);
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Easing::EaseOut.apply(0.3) > Easing::Linear.apply(0.3));
        assert!(Easing::EaseIn.apply(0.3) < Easing::Linear.apply(0.3));
    }

    #[test]
    fn timer_completes_after_duration() {
        let mut timer = TransitionTimer::new(TransitionDirection::Show, MS_100);
        timer.tick(Duration::from_millis(60));
        assert!(!timer.is_complete());
        timer.tick(Duration::from_millis(60));
        assert!(timer.is_complete());
        assert_eq!(timer.overshoot(), Duration::from_millis(20));
    }

    #[test]
    fn zero_duration_is_immediately_complete() {
        let timer = TransitionTimer::new(TransitionDirection::Hide, Duration::ZERO);
        assert!(timer.is_complete());
        assert_eq!(timer.raw_progress(), 1.0);
        assert_eq!(timer.opacity(), 0.0);
    }

    #[test]
    fn opacity_follows_direction() {
        let mut show = TransitionTimer::new(TransitionDirection::Show, MS_100).easing(Easing::Linear);
        let mut hide = TransitionTimer::new(TransitionDirection::Hide, MS_100).easing(Easing::Linear);
        show.tick(Duration::from_millis(25));
        hide.tick(Duration::from_millis(25));
        assert!((show.opacity() - 0.25).abs() < 1e-4);
        assert!((hide.opacity() - 0.75).abs() < 1e-4);
    }
}
