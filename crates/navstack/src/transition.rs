#![forbid(unsafe_code)]

//! Visual transition drivers and completion handles.
//!
//! The navigator never animates anything itself. When a panel starts a show
//! or hide it asks the [`TransitionDriver`] whether the visual step finishes
//! immediately or later. Pending steps end either when the driver reports
//! them from [`TransitionDriver::tick`] or when the host calls
//! `Navigator::complete_transition`.
//!
//! Every show/hide hands back a [`TransitionHandle`]. It can be polled once
//! per frame with [`TransitionHandle::is_complete`] or awaited as a future.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use navstack_core::NavConfig;
use navstack_core::animation::{Easing, TransitionTimer};
use navstack_core::{PanelId, PanelState, TransitionDirection};

/// How a visual step begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// Nothing to animate; the transition completes synchronously.
    Instant,
    /// The driver will report completion later.
    Pending,
}

/// The visual-transition collaborator.
pub trait TransitionDriver {
    /// A panel entered `Showing` or `Hiding` and its visual step should start.
    fn begin(&mut self, panel: PanelId, direction: TransitionDirection) -> TransitionStep;

    /// Advance time by `dt`, appending panels whose step finished.
    fn tick(&mut self, _dt: Duration, _completed: &mut Vec<PanelId>) {}

    /// The panel's step was completed out of band or the panel was destroyed.
    fn forget(&mut self, _panel: PanelId) {}
}

/// Driver that completes every transition immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantTransitions;

impl TransitionDriver for InstantTransitions {
    fn begin(&mut self, _panel: PanelId, _direction: TransitionDirection) -> TransitionStep {
        TransitionStep::Instant
    }
}

/// Driver whose transitions finish only when the host says so.
///
/// Useful when the host runs its own animation system, and in tests.
#[derive(Debug, Clone, Default)]
pub struct ManualTransitions {
    in_flight: BTreeMap<PanelId, TransitionDirection>,
}

impl ManualTransitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Panels whose visual step has begun and not yet finished.
    pub fn in_flight(&self) -> impl Iterator<Item = (PanelId, TransitionDirection)> + '_ {
        self.in_flight.iter().map(|(&id, &dir)| (id, dir))
    }

    #[must_use]
    pub fn is_in_flight(&self, panel: PanelId) -> bool {
        self.in_flight.contains_key(&panel)
    }
}

impl TransitionDriver for ManualTransitions {
    fn begin(&mut self, panel: PanelId, direction: TransitionDirection) -> TransitionStep {
        self.in_flight.insert(panel, direction);
        TransitionStep::Pending
    }

    fn forget(&mut self, panel: PanelId) {
        self.in_flight.remove(&panel);
    }
}

/// Time-based fade driver.
///
/// Each transition runs for the configured duration; renderers read the
/// current [`FadeTransitions::opacity`] of a panel while it runs. With
/// reduced motion every step is instant.
#[derive(Debug, Clone)]
pub struct FadeTransitions {
    duration: Duration,
    easing: Easing,
    reduced_motion: bool,
    timers: BTreeMap<PanelId, TransitionTimer>,
}

impl FadeTransitions {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: Easing::default(),
            reduced_motion: false,
            timers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &NavConfig) -> Self {
        Self::new(config.transition_duration).reduced_motion(config.reduced_motion)
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn reduced_motion(mut self, enabled: bool) -> Self {
        self.reduced_motion = enabled;
        self
    }

    /// Current opacity of a fading panel, or `None` when it is not fading.
    #[must_use]
    pub fn opacity(&self, panel: PanelId) -> Option<f32> {
        self.timers.get(&panel).map(TransitionTimer::opacity)
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.timers.len()
    }
}

impl TransitionDriver for FadeTransitions {
    fn begin(&mut self, panel: PanelId, direction: TransitionDirection) -> TransitionStep {
        if self.reduced_motion || self.duration.is_zero() {
            return TransitionStep::Instant;
        }
        let timer = TransitionTimer::new(direction, self.duration).easing(self.easing);
        self.timers.insert(panel, timer);
        TransitionStep::Pending
    }

    fn tick(&mut self, dt: Duration, completed: &mut Vec<PanelId>) {
        for timer in self.timers.values_mut() {
            timer.tick(dt);
        }
        self.timers.retain(|&panel, timer| {
            if timer.is_complete() {
                completed.push(panel);
                false
            } else {
                true
            }
        });
    }

    fn forget(&mut self, panel: PanelId) {
        self.timers.remove(&panel);
    }
}

#[derive(Debug, Default)]
struct HandleSlot {
    outcome: Option<PanelState>,
    waker: Option<Waker>,
}

/// Completion handle for one show or hide.
///
/// Resolves to the panel state the transition ended in. Handles are
/// single-threaded, matching the navigator's cooperative model.
#[derive(Debug, Clone)]
pub struct TransitionHandle {
    panel: PanelId,
    direction: TransitionDirection,
    slot: Rc<RefCell<HandleSlot>>,
}

impl TransitionHandle {
    pub(crate) fn new(panel: PanelId, direction: TransitionDirection) -> Self {
        Self {
            panel,
            direction,
            slot: Rc::new(RefCell::new(HandleSlot::default())),
        }
    }

    #[must_use]
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    #[must_use]
    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slot.borrow().outcome.is_some()
    }

    /// Final state, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<PanelState> {
        self.slot.borrow().outcome
    }

    pub(crate) fn resolve(&self, state: PanelState) {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            slot.outcome = Some(state);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl Future for TransitionHandle {
    type Output = PanelState;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<PanelState> {
        let mut slot = self.slot.borrow_mut();
        match slot.outcome {
            Some(state) => Poll::Ready(state),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
