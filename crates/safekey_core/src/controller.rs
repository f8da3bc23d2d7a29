//! Overlay controller
//!
//! Composes focus routing, the visibility scheduler, layout and case state,
//! text editing and scroll compensation into the single object the host
//! talks to.
//!
//! # Event loop
//!
//! Everything runs on one logical thread. The host feeds the controller:
//!
//! - focus transitions, delivered by the [`FocusSource`] listener and
//!   drained by [`OverlayController::pump`] (or passed directly to
//!   [`OverlayController::focus_changed`])
//! - elapsed time through [`OverlayController::advance`], which fires due
//!   debounce actions and animation guards
//! - animation completions through [`OverlayController::animation_finished`]
//! - key presses and field touches
//!
//! No public method returns an error. Failures are logged and absorbed so a
//! misbehaving collaborator degrades the overlay instead of the host screen.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use safekey_platform::{
    FieldId, FocusSource, HapticFeedback, NativeInputSuppressor, Point, ScrollContainer,
    TextField, TouchPhase,
};

use crate::case::{CaseState, CaseTransformer};
use crate::config::{OverlayConfig, OverlayOption};
use crate::editing::{EditResult, EditingEngine};
use crate::error::{OverlayError, Result};
use crate::focus::{FocusDecision, FocusRouter};
use crate::key::{codes, KeyAction, KeyLayout, LayoutKind};
use crate::randomizer::DigitRandomizer;
use crate::render::{AnimationKind, AnimationToken, Renderer};
use crate::scroll::ScrollCompensator;
use crate::visibility::{Effect, Effects, OverlayVisibility, VisibilityScheduler};

/// Largest per-axis movement for a down/up pair to count as a click
const CLICK_SLOP: f32 = 10.0;

/// Host-provided capabilities
pub struct Collaborators {
    pub renderer: Box<dyn Renderer>,
    pub focus: Box<dyn FocusSource>,
    pub container: Box<dyn ScrollContainer>,
    pub suppressor: Box<dyn NativeInputSuppressor>,
    pub haptics: Option<Box<dyn HapticFeedback>>,
}

type FocusInbox = Rc<RefCell<VecDeque<(Option<FieldId>, Option<FieldId>)>>>;

struct BoundField {
    field: Box<dyn TextField>,
    last_layout: LayoutKind,
}

struct Layouts {
    letters: KeyLayout,
    symbols: KeyLayout,
    numbers: KeyLayout,
}

impl Layouts {
    fn get(&self, kind: LayoutKind) -> &KeyLayout {
        match kind {
            LayoutKind::Letters => &self.letters,
            LayoutKind::Symbols => &self.symbols,
            LayoutKind::Numbers => &self.numbers,
        }
    }
}

/// The secure keyboard overlay
pub struct OverlayController {
    config: OverlayConfig,

    // Collaborators
    renderer: Box<dyn Renderer>,
    focus: Box<dyn FocusSource>,
    container: Box<dyn ScrollContainer>,
    suppressor: Box<dyn NativeInputSuppressor>,
    haptics: Option<Box<dyn HapticFeedback>>,

    fields: FxHashMap<FieldId, BoundField>,
    focus_inbox: FocusInbox,
    touch_down: Option<(FieldId, Point)>,

    layouts: Layouts,
    current: LayoutKind,
    case: CaseState,
    randomizer: DigitRandomizer,

    scheduler: VisibilityScheduler,
    scroll: ScrollCompensator,

    released: bool,
}

impl OverlayController {
    /// Create a controller and start listening for focus changes
    pub fn new(config: OverlayConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            renderer,
            mut focus,
            container,
            suppressor,
            haptics,
        } = collaborators;

        let focus_inbox = FocusInbox::default();
        let sink = Rc::clone(&focus_inbox);
        focus.set_listener(Box::new(move |previous, next| {
            sink.borrow_mut().push_back((previous, next));
        }));

        Self {
            scheduler: VisibilityScheduler::new(&config),
            scroll: ScrollCompensator::new(config.scroll_margin),
            config,
            renderer,
            focus,
            container,
            suppressor,
            haptics,
            fields: FxHashMap::default(),
            focus_inbox,
            touch_down: None,
            layouts: Layouts {
                letters: KeyLayout::letters(),
                symbols: KeyLayout::symbols(),
                numbers: KeyLayout::numbers(),
            },
            current: LayoutKind::Letters,
            case: CaseState::Lower,
            randomizer: DigitRandomizer::new(),
            released: false,
        }
    }

    /// Replace the built-in keyboard faces
    pub fn with_layouts(
        mut self,
        letters: KeyLayout,
        symbols: KeyLayout,
        numbers: KeyLayout,
    ) -> Self {
        self.layouts = Layouts {
            letters,
            symbols,
            numbers,
        };
        self.case = CaseState::Lower;
        self
    }

    /// Replace the digit randomizer (seeded generators for reproducible runs)
    pub fn with_randomizer(mut self, randomizer: DigitRandomizer) -> Self {
        self.randomizer = randomizer;
        self
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Route `field`'s input through the overlay
    ///
    /// Binding an id twice replaces the earlier field; its remembered layout
    /// is kept.
    pub fn bind(&mut self, field: impl TextField + 'static) {
        let result = self.try_bind(Box::new(field));
        absorb("bind", result);
    }

    fn try_bind(&mut self, field: Box<dyn TextField>) -> Result<()> {
        self.ensure_live()?;
        let id = field.id();

        let last_layout = match self.fields.remove(&id) {
            Some(previous) => {
                tracing::warn!("bind: {}", OverlayError::AlreadyBound(id));
                previous.last_layout
            }
            None => LayoutKind::default(),
        };
        self.fields.insert(id, BoundField { field, last_layout });
        tracing::debug!("bound {}", id);

        self.suppress(id)
    }

    /// Give `id` back to the native keyboard
    pub fn unbind(&mut self, id: FieldId) {
        let result = self.try_unbind(id);
        absorb("unbind", result);
    }

    fn try_unbind(&mut self, id: FieldId) -> Result<()> {
        self.ensure_live()?;
        self.fields
            .remove(&id)
            .ok_or(OverlayError::UnknownField(id))?;
        tracing::debug!("unbound {}", id);

        if self.scheduler.active_field() == Some(id) {
            let effects = self.scheduler.request_hide();
            self.apply_effects(effects);
        }
        self.suppressor
            .restore(id)
            .map_err(|source| OverlayError::Suppression { field: id, source })
    }

    pub fn is_bound(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    /// Face `id` reopens on
    pub fn last_layout(&self, id: FieldId) -> Option<LayoutKind> {
        self.fields.get(&id).map(|bound| bound.last_layout)
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn set_option(&mut self, option: OverlayOption, enabled: bool) {
        if self.released {
            return;
        }
        let previous = self.config.get(option);
        self.config.set(option, enabled);
        tracing::debug!("option {} = {}", option, enabled);

        // A visible numbers face picks up the new digit order immediately
        if option == OverlayOption::RandomizeDigits
            && previous != enabled
            && self.current == LayoutKind::Numbers
            && self.is_visible()
        {
            self.select_layout(LayoutKind::Numbers, true);
        }
    }

    /// Set an option by name (`randomizeDigits` or `randomize_digits`)
    pub fn set_option_by_name(&mut self, name: &str, enabled: bool) {
        match name.parse::<OverlayOption>() {
            Ok(option) => self.set_option(option, enabled),
            Err(err) => tracing::warn!("set_option: {}", err),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Ask for the overlay on `id`, subject to the show debounce
    pub fn show(&mut self, id: FieldId) {
        let result = self.try_show(id);
        absorb("show", result);
    }

    fn try_show(&mut self, id: FieldId) -> Result<()> {
        self.ensure_live()?;
        if !self.fields.contains_key(&id) {
            return Err(OverlayError::UnknownField(id));
        }
        let effects = self.scheduler.request_show(id);
        self.apply_effects(effects);
        Ok(())
    }

    /// Dismiss the overlay; does nothing when it is not up
    pub fn hide(&mut self) {
        if self.released {
            return;
        }
        let effects = self.scheduler.request_hide();
        self.apply_effects(effects);
    }

    /// The overlay surface is on screen (including while animating)
    pub fn is_visible(&self) -> bool {
        self.scheduler.is_on_screen()
    }

    pub fn visibility(&self) -> OverlayVisibility {
        self.scheduler.visibility()
    }

    /// Field currently owning the overlay
    pub fn active_field(&self) -> Option<FieldId> {
        self.scheduler.active_field()
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Handle one focus transition
    pub fn focus_changed(&mut self, previous: Option<FieldId>, next: Option<FieldId>) {
        if self.released {
            return;
        }
        let fields = &self.fields;
        let decision = FocusRouter::route(previous, next, |id| fields.contains_key(&id));

        let effects = match decision {
            FocusDecision::Show(id) => self.scheduler.request_show(id),
            FocusDecision::Hide => self.scheduler.request_hide(),
        };
        self.apply_effects(effects);
    }

    /// Drain focus transitions queued by the focus listener
    pub fn pump(&mut self) {
        loop {
            let next = self.focus_inbox.borrow_mut().pop_front();
            match next {
                Some((previous, next)) => self.focus_changed(previous, next),
                None => break,
            }
        }
    }

    /// Move the logical clock forward, firing every task that falls due
    pub fn advance(&mut self, elapsed: Duration) {
        if self.released {
            return;
        }
        self.pump();

        let until = self.scheduler.now() + elapsed;
        while let Some(effects) = self.scheduler.poll(until) {
            self.apply_effects(effects);
        }
        self.scheduler.settle(until);
    }

    /// Report that the animation tagged `token` completed
    pub fn animation_finished(&mut self, token: AnimationToken) {
        if self.released {
            tracing::debug!("animation {:?} finished after release", token);
            return;
        }
        let effects = self.scheduler.animation_finished(token);
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Effects) {
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Reconcile(id) => {
                let kind = self.layout_for(id);
                self.select_layout(kind, self.current != kind);
                absorb("reconcile", self.compensate(id));
            }
            Effect::Present { field, token } => {
                let kind = self.layout_for(field);
                self.select_layout(kind, true);
                self.renderer.set_visible(true);
                self.renderer
                    .play_animation(AnimationKind::Show, self.config.show_duration(), token);
            }
            Effect::ShowSettled(id) => {
                let focused = self
                    .fields
                    .get(&id)
                    .is_some_and(|bound| bound.field.has_focus());
                if focused {
                    absorb("show", self.compensate(id));
                } else {
                    tracing::debug!("{} lost focus while the overlay was showing", id);
                    let effects = self.scheduler.request_hide();
                    self.apply_effects(effects);
                }
            }
            Effect::Dismiss { token } => {
                self.scroll
                    .restore(self.container.as_mut(), self.config.hide_duration());
                self.renderer
                    .play_animation(AnimationKind::Hide, self.config.hide_duration(), token);
            }
            Effect::HideSettled => self.renderer.set_visible(false),
        }
    }

    fn compensate(&mut self, id: FieldId) -> Result<()> {
        let bound = self.fields.get(&id).ok_or(OverlayError::UnknownField(id))?;
        let overlay_top = self.renderer.overlay_top();
        self.scroll.compensate(
            bound.field.as_ref(),
            overlay_top,
            self.container.as_mut(),
            self.config.show_duration(),
        )?;
        Ok(())
    }

    /// Net container offset applied for the active field
    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Key pressed down: decide whether the preview bubble may appear
    pub fn key_down(&mut self, code: i32) {
        if self.released {
            return;
        }
        let enabled = match (self.current, code) {
            (LayoutKind::Numbers, _) => false,
            (
                _,
                codes::SHIFT
                | codes::DELETE
                | codes::ALT_DELETE
                | codes::SPACE
                | codes::MODE_CHANGE
                | codes::SYMBOL_TOGGLE
                | codes::RESERVED,
            ) => false,
            _ => !self.config.suppress_preview,
        };
        self.renderer.set_preview_enabled(enabled);
    }

    /// Key released: apply it to the active field or the overlay state
    pub fn key_pressed(&mut self, code: i32) {
        let result = self.try_key(code);
        absorb("key", result);
    }

    fn try_key(&mut self, code: i32) -> Result<()> {
        self.ensure_live()?;
        let action = KeyAction::from_code(code).ok_or(OverlayError::UnknownKey(code))?;
        let Some(id) = self.scheduler.active_field() else {
            tracing::debug!("key {} ignored: no active field", code);
            return Ok(());
        };

        match action {
            KeyAction::Cancel => self.hide(),
            KeyAction::Shift => {
                self.case = CaseTransformer::shift(self.case, &mut self.layouts.letters);
                tracing::debug!("case {:?}", self.case);
                self.select_layout(LayoutKind::Letters, false);
            }
            KeyAction::ModeChange => {
                let next = match self.current {
                    LayoutKind::Numbers => LayoutKind::Letters,
                    _ => LayoutKind::Numbers,
                };
                self.select_layout(next, true);
            }
            KeyAction::SymbolToggle => {
                let next = match self.current {
                    LayoutKind::Symbols => LayoutKind::Letters,
                    _ => LayoutKind::Symbols,
                };
                self.select_layout(next, true);
            }
            KeyAction::Reserved => {}
            KeyAction::Delete | KeyAction::Char(_) => {
                let bound = self
                    .fields
                    .get_mut(&id)
                    .ok_or(OverlayError::UnknownField(id))?;
                let result = EditingEngine::apply_to_field(bound.field.as_mut(), action);
                if let EditResult::Inserted(c) = result {
                    self.after_insert(c);
                }
            }
        }

        if self.config.vibrate_on_key {
            if let Some(haptics) = self.haptics.as_mut() {
                haptics.pulse(self.config.haptic_pulse());
            }
        }
        Ok(())
    }

    /// A single upper-case letter drops back to lower case
    fn after_insert(&mut self, c: char) {
        if self.current == LayoutKind::Letters
            && self.case == CaseState::Upper
            && c.is_alphabetic()
        {
            self.case = CaseState::Lower;
            CaseTransformer::to_lower(&mut self.layouts.letters);
            self.render();
        }
    }

    pub fn case_state(&self) -> CaseState {
        self.case
    }

    pub fn current_layout(&self) -> &KeyLayout {
        self.layouts.get(self.current)
    }

    fn layout_for(&self, id: FieldId) -> LayoutKind {
        if !self.config.remember_last_layout {
            return LayoutKind::Letters;
        }
        self.last_layout(id).unwrap_or_default()
    }

    /// Switch faces, recording the choice for the active field
    ///
    /// Entering the numbers face reshuffles its digits when `reshuffle` is
    /// set and randomization is on; with randomization off the fixed order
    /// is restored.
    fn select_layout(&mut self, kind: LayoutKind, reshuffle: bool) {
        if kind == LayoutKind::Numbers {
            if !self.config.randomize_digits {
                DigitRandomizer::reset(&mut self.layouts.numbers);
            } else if reshuffle {
                self.randomizer.shuffle(&mut self.layouts.numbers);
            }
        }

        if self.current != kind {
            tracing::debug!("layout {:?} -> {:?}", self.current, kind);
        }
        self.current = kind;
        if let Some(active) = self.scheduler.active_field() {
            if let Some(bound) = self.fields.get_mut(&active) {
                bound.last_layout = kind;
            }
        }
        self.render();
    }

    fn render(&mut self) {
        self.renderer.render(self.layouts.get(self.current), self.case);
    }

    // =========================================================================
    // Touch
    // =========================================================================

    /// Touch on a bound field
    ///
    /// Every touch keeps the native keyboard suppressed. A tap on the
    /// focused field brings the overlay back if it was dismissed.
    pub fn field_touched(&mut self, id: FieldId, phase: TouchPhase) {
        let result = self.try_touch(id, phase);
        absorb("touch", result);
    }

    fn try_touch(&mut self, id: FieldId, phase: TouchPhase) -> Result<()> {
        self.ensure_live()?;
        if !self.fields.contains_key(&id) {
            return Err(OverlayError::UnknownField(id));
        }
        absorb("touch", self.suppress(id));

        match phase {
            TouchPhase::Down(point) => self.touch_down = Some((id, point)),
            TouchPhase::Up(up) => {
                let Some((down_id, down)) = self.touch_down.take() else {
                    return Ok(());
                };
                if down_id == id && self.is_click(id, down, up) {
                    if self.active_field() == Some(id) && self.is_visible() {
                        return Ok(());
                    }
                    return self.try_show(id);
                }
            }
            TouchPhase::Other => {}
        }
        Ok(())
    }

    fn is_click(&self, id: FieldId, down: Point, up: Point) -> bool {
        let Some(bound) = self.fields.get(&id) else {
            return false;
        };
        if (down.x - up.x).abs() >= CLICK_SLOP || (down.y - up.y).abs() >= CLICK_SLOP {
            return false;
        }
        bound.field.has_focus() && bound.field.screen_rect().contains(down.midpoint(up))
    }

    fn suppress(&mut self, id: FieldId) -> Result<()> {
        self.suppressor
            .suppress(id)
            .map_err(|source| OverlayError::Suppression { field: id, source })
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Tear down: cancel timers, detach from focus, restore every field
    ///
    /// Every later call is a no-op. Also runs on drop.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.scheduler.reset();
        self.focus.clear_listener();
        self.focus_inbox.borrow_mut().clear();
        self.touch_down = None;

        self.scroll.restore(self.container.as_mut(), Duration::ZERO);
        self.renderer.set_visible(false);

        for (id, _) in self.fields.drain() {
            if let Err(source) = self.suppressor.restore(id) {
                absorb::<()>("release", Err(OverlayError::Suppression { field: id, source }));
            }
        }
        tracing::debug!("overlay released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            Err(OverlayError::Released)
        } else {
            Ok(())
        }
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        self.release();
    }
}

/// Log an error at the public boundary and carry on
fn absorb<T>(op: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(OverlayError::Released) => {
            tracing::debug!("{} ignored: controller has been released", op);
            None
        }
        Err(err) => {
            tracing::warn!("{}: {}", op, err);
            None
        }
    }
}
