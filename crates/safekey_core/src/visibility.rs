//! Overlay visibility scheduler
//!
//! Debounced state machine owning the overlay's show/hide lifecycle:
//!
//! ```text
//!            request_show                show action              animation done
//! Hidden ──────────────────► Showing ────────────────► Showing ─────────────────► Shown
//!   ▲      (200 ms debounce)  (pending)               (animating)                   │
//!   │                                                                  request_hide │
//!   │      animation done                hide action                (50 ms debounce)│
//!   └───────────────────── Hiding ◄──────────────── Hiding ◄─────────────────────────┘
//!                        (animating)                (pending)
//! ```
//!
//! A new request always cancels the pending action of either kind, so at
//! most one transition action is queued. Every animation also queues a
//! forced-completion guard that fires after the animation's duration in case
//! the host never reports completion.
//!
//! The scheduler does not touch collaborators. It returns [`Effect`]s that
//! the controller carries out.

use std::time::Duration;

use safekey_platform::FieldId;
use smallvec::SmallVec;

use crate::config::OverlayConfig;
use crate::render::AnimationToken;
use crate::timer::{DeferredQueue, TaskId};

/// Externally visible lifecycle state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayVisibility {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

/// Internal phase; `Showing` and `Hiding` split into debounce and animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Hidden,
    ShowPending,
    ShowAnimating,
    Shown,
    HidePending,
    HideAnimating,
}

impl Phase {
    fn visibility(self) -> OverlayVisibility {
        match self {
            Phase::Hidden => OverlayVisibility::Hidden,
            Phase::ShowPending | Phase::ShowAnimating => OverlayVisibility::Showing,
            Phase::Shown => OverlayVisibility::Shown,
            Phase::HidePending | Phase::HideAnimating => OverlayVisibility::Hiding,
        }
    }

    /// The overlay surface is attached
    fn on_screen(self) -> bool {
        matches!(
            self,
            Phase::ShowAnimating | Phase::Shown | Phase::HidePending | Phase::HideAnimating
        )
    }
}

/// Deferred work owned by the scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    ShowAction,
    HideAction,
    ShowGuard(AnimationToken),
    HideGuard(AnimationToken),
}

/// Side effect the controller must perform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Already visible: re-run scroll compensation and pick `field`'s face
    Reconcile(FieldId),
    /// Pick `field`'s face, attach the surface and play the show animation
    Present { field: FieldId, token: AnimationToken },
    /// Show animation finished
    ShowSettled(FieldId),
    /// Reverse scroll compensation and play the hide animation
    Dismiss { token: AnimationToken },
    /// Hide animation finished: detach the surface
    HideSettled,
}

pub type Effects = SmallVec<[Effect; 2]>;

struct Animation {
    token: AnimationToken,
    guard: TaskId,
}

/// Debounced Hidden/Showing/Shown/Hiding state machine
pub struct VisibilityScheduler {
    phase: Phase,
    active: Option<FieldId>,
    pending: Option<TaskId>,
    showing: Option<Animation>,
    hiding: Option<Animation>,
    /// The show animation finished behind a pending hide
    settle_owed: bool,
    queue: DeferredQueue<Task>,
    next_token: u64,
    show_delay: Duration,
    hide_delay: Duration,
    show_duration: Duration,
    hide_duration: Duration,
}

impl VisibilityScheduler {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            phase: Phase::Hidden,
            active: None,
            pending: None,
            showing: None,
            hiding: None,
            settle_owed: false,
            queue: DeferredQueue::new(),
            next_token: 0,
            show_delay: config.show_delay(),
            hide_delay: config.hide_delay(),
            show_duration: config.show_duration(),
            hide_duration: config.hide_duration(),
        }
    }

    pub fn visibility(&self) -> OverlayVisibility {
        self.phase.visibility()
    }

    /// Field owning the overlay; only set while showing or shown
    pub fn active_field(&self) -> Option<FieldId> {
        self.active
    }

    /// The overlay surface is attached (including while animating out)
    pub fn is_on_screen(&self) -> bool {
        self.phase.on_screen() || self.hiding.is_some()
    }

    pub fn now(&self) -> Duration {
        self.queue.now()
    }

    /// Number of queued tasks (transition actions and animation guards)
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    /// `hidingInProgress || (!visible && !showingInProgress)`
    fn still_needs_manual_show(&self) -> bool {
        self.hiding.is_some() || (!self.phase.on_screen() && self.showing.is_none())
    }

    /// `showingInProgress || (visible && !hidingInProgress)`
    fn still_needs_manual_hide(&self) -> bool {
        self.showing.is_some() || (self.phase.on_screen() && self.hiding.is_none())
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.queue.cancel(id);
        }
    }

    fn start_animation(
        &mut self,
        duration: Duration,
        guard: fn(AnimationToken) -> Task,
    ) -> Animation {
        let token = AnimationToken(self.next_token);
        self.next_token += 1;
        let guard = self.queue.schedule(duration, guard(token));
        Animation { token, guard }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::debug!("overlay {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// Ask for the overlay on `field`
    pub fn request_show(&mut self, field: FieldId) -> Effects {
        let mut effects = Effects::new();
        self.cancel_pending();

        // A cancelled hide leaves the overlay where it was
        let mut settle = false;
        if self.phase == Phase::HidePending {
            let phase = if self.showing.is_some() {
                Phase::ShowAnimating
            } else {
                settle = std::mem::take(&mut self.settle_owed);
                Phase::Shown
            };
            self.set_phase(phase);
        }

        self.active = Some(field);
        if self.still_needs_manual_show() {
            self.set_phase(Phase::ShowPending);
            self.pending = Some(self.queue.schedule(self.show_delay, Task::ShowAction));
        } else {
            effects.push(Effect::Reconcile(field));
            if settle {
                effects.push(Effect::ShowSettled(field));
            }
        }
        effects
    }

    /// Ask for the overlay to go away
    pub fn request_hide(&mut self) -> Effects {
        self.cancel_pending();

        // A cancelled show never reached the screen
        if self.phase == Phase::ShowPending {
            self.active = None;
            let phase = if self.hiding.is_some() {
                Phase::HideAnimating
            } else {
                Phase::Hidden
            };
            self.set_phase(phase);
        }

        if self.still_needs_manual_hide() {
            self.active = None;
            self.set_phase(Phase::HidePending);
            self.pending = Some(self.queue.schedule(self.hide_delay, Task::HideAction));
        }
        Effects::new()
    }

    /// Report a finished animation
    pub fn animation_finished(&mut self, token: AnimationToken) -> Effects {
        let mut effects = Effects::new();

        if self.showing.as_ref().is_some_and(|a| a.token == token) {
            if let Some(animation) = self.showing.take() {
                self.queue.cancel(animation.guard);
            }
            match self.phase {
                Phase::ShowAnimating => {
                    self.set_phase(Phase::Shown);
                    if let Some(field) = self.active {
                        effects.push(Effect::ShowSettled(field));
                    }
                }
                Phase::HidePending => self.settle_owed = true,
                _ => {}
            }
        } else if self.hiding.as_ref().is_some_and(|a| a.token == token) {
            if let Some(animation) = self.hiding.take() {
                self.queue.cancel(animation.guard);
            }
            if self.phase == Phase::HideAnimating {
                self.set_phase(Phase::Hidden);
            }
            effects.push(Effect::HideSettled);
        } else {
            tracing::debug!("ignoring stale animation completion {:?}", token);
        }
        effects
    }

    /// Fire the next task due at or before `until`
    ///
    /// Returns `None` once nothing else is due; call [`Self::settle`] then.
    pub fn poll(&mut self, until: Duration) -> Option<Effects> {
        let (id, task) = self.queue.pop_due(until)?;
        let effects = match task {
            Task::ShowAction => {
                if self.pending == Some(id) {
                    self.pending = None;
                }
                self.fire_show()
            }
            Task::HideAction => {
                if self.pending == Some(id) {
                    self.pending = None;
                }
                self.fire_hide()
            }
            Task::ShowGuard(token) | Task::HideGuard(token) => {
                tracing::debug!("forcing completion of animation {:?}", token);
                self.animation_finished(token)
            }
        };
        Some(effects)
    }

    /// Advance the clock after every due task was polled
    pub fn settle(&mut self, until: Duration) {
        self.queue.settle(until);
    }

    fn fire_show(&mut self) -> Effects {
        let mut effects = Effects::new();
        let Some(field) = self.active else {
            self.set_phase(Phase::Hidden);
            return effects;
        };

        self.settle_owed = false;

        // Finish an outgoing hide before the surface comes back
        if let Some(animation) = self.hiding.take() {
            self.queue.cancel(animation.guard);
            effects.push(Effect::HideSettled);
        }

        let animation = self.start_animation(self.show_duration, Task::ShowGuard);
        effects.push(Effect::Present {
            field,
            token: animation.token,
        });
        self.showing = Some(animation);
        self.set_phase(Phase::ShowAnimating);
        effects
    }

    fn fire_hide(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.settle_owed = false;

        // A show still animating in will never settle
        if let Some(animation) = self.showing.take() {
            self.queue.cancel(animation.guard);
        }

        let animation = self.start_animation(self.hide_duration, Task::HideGuard);
        effects.push(Effect::Dismiss {
            token: animation.token,
        });
        self.hiding = Some(animation);
        self.set_phase(Phase::HideAnimating);
        effects
    }

    /// Drop every timer and animation and return to `Hidden`
    pub fn reset(&mut self) {
        self.queue.clear();
        self.pending = None;
        self.showing = None;
        self.hiding = None;
        self.settle_owed = false;
        self.active = None;
        self.set_phase(Phase::Hidden);
    }
}
