//! Headless implementations of every capability
//!
//! These back the demo host and the test suites. All types are cheap `Clone`
//! handles over shared state, so a test can keep one handle while the
//! overlay owns another.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{PlatformError, Result};
use crate::field::{FieldId, Selection, TextField};
use crate::geometry::Rect;
use crate::input::{FocusListener, FocusSource, HapticFeedback, NativeInputSuppressor};
use crate::scroll::ScrollContainer;

// ============================================================================
// Text field
// ============================================================================

struct FieldState {
    text: String,
    selection: Selection,
    focused: bool,
    rect: Rect,
}

/// In-memory text field
#[derive(Clone)]
pub struct MemoryField {
    id: FieldId,
    state: Rc<RefCell<FieldState>>,
}

impl MemoryField {
    pub fn new(id: FieldId, rect: Rect) -> Self {
        Self {
            id,
            state: Rc::new(RefCell::new(FieldState {
                text: String::new(),
                selection: Selection::default(),
                focused: false,
                rect,
            })),
        }
    }

    /// Set the initial text with the caret at its end
    pub fn with_text(self, text: impl Into<String>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.text = text.into();
            state.selection = Selection::caret(state.text.chars().count());
        }
        self
    }

    pub fn set_focused(&self, focused: bool) {
        self.state.borrow_mut().focused = focused;
    }

    pub fn set_rect(&self, rect: Rect) {
        self.state.borrow_mut().rect = rect;
    }

    fn shift(&self, dy: f32) {
        let mut state = self.state.borrow_mut();
        state.rect = state.rect.offset(0.0, dy);
    }
}

impl TextField for MemoryField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.state.borrow_mut().text = text.to_string();
    }

    fn selection(&self) -> Selection {
        self.state.borrow().selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.state.borrow_mut().selection = selection;
    }

    fn has_focus(&self) -> bool {
        self.state.borrow().focused
    }

    fn screen_rect(&self) -> Rect {
        self.state.borrow().rect
    }
}

// ============================================================================
// Focus
// ============================================================================

#[derive(Default)]
struct FocusHubState {
    listener: Option<FocusListener>,
    fields: Vec<MemoryField>,
    focused: Option<FieldId>,
}

/// Focus owner for a set of [`MemoryField`]s
///
/// Moving focus updates every registered field's focus flag and fires the
/// registered listener once with `(previous, next)`.
#[derive(Clone, Default)]
pub struct FocusHub {
    inner: Rc<RefCell<FocusHubState>>,
}

impl FocusHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a field so its focus flag follows [`FocusHub::focus`]
    pub fn register(&self, field: &MemoryField) {
        self.inner.borrow_mut().fields.push(field.clone());
    }

    /// Move focus to `next` (`None` = a non-text view)
    pub fn focus(&self, next: Option<FieldId>) {
        let (previous, listener) = {
            let mut inner = self.inner.borrow_mut();
            let previous = inner.focused;
            if previous == next {
                return;
            }
            inner.focused = next;
            for field in &inner.fields {
                field.set_focused(Some(field.id) == next);
            }
            (previous, inner.listener.take())
        };

        // The listener runs without the hub borrowed so it may query focus
        if let Some(mut listener) = listener {
            listener(previous, next);
            let mut inner = self.inner.borrow_mut();
            if inner.listener.is_none() {
                inner.listener = Some(listener);
            }
        }
    }

    pub fn focused(&self) -> Option<FieldId> {
        self.inner.borrow().focused
    }

    pub fn has_listener(&self) -> bool {
        self.inner.borrow().listener.is_some()
    }
}

impl FocusSource for FocusHub {
    fn set_listener(&mut self, listener: FocusListener) {
        self.inner.borrow_mut().listener = Some(listener);
    }

    fn clear_listener(&mut self) {
        self.inner.borrow_mut().listener = None;
    }
}

// ============================================================================
// Native keyboard suppression
// ============================================================================

/// A call received by [`RecordingSuppressor`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuppressionCall {
    Suppress(FieldId),
    Restore(FieldId),
}

#[derive(Default)]
struct SuppressorState {
    calls: Vec<SuppressionCall>,
    failure: Option<String>,
}

/// Suppressor that records calls and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingSuppressor {
    inner: Rc<RefCell<SuppressorState>>,
}

impl RecordingSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `reason`
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.inner.borrow_mut().failure = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<SuppressionCall> {
        self.inner.borrow().calls.clone()
    }

    fn record(&self, call: SuppressionCall) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(call);
        match &inner.failure {
            Some(reason) => Err(PlatformError::SuppressionFailed(reason.clone())),
            None => Ok(()),
        }
    }
}

impl NativeInputSuppressor for RecordingSuppressor {
    fn suppress(&mut self, field: FieldId) -> Result<()> {
        self.record(SuppressionCall::Suppress(field))
    }

    fn restore(&mut self, field: FieldId) -> Result<()> {
        self.record(SuppressionCall::Restore(field))
    }
}

// ============================================================================
// Haptics
// ============================================================================

/// Records every pulse
#[derive(Clone, Default)]
pub struct RecordingHaptics {
    pulses: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> Vec<Duration> {
        self.pulses.borrow().clone()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn pulse(&mut self, duration: Duration) {
        self.pulses.borrow_mut().push(duration);
    }
}

// ============================================================================
// Scroll container
// ============================================================================

struct ContainerState {
    frame: Rect,
    offset: f32,
    children: Vec<MemoryField>,
    unfit: Vec<FieldId>,
}

/// Container whose translation moves its frame and every child field
#[derive(Clone)]
pub struct MemoryScrollContainer {
    inner: Rc<RefCell<ContainerState>>,
}

impl MemoryScrollContainer {
    pub fn new(frame: Rect) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContainerState {
                frame,
                offset: 0.0,
                children: Vec::new(),
                unfit: Vec::new(),
            })),
        }
    }

    /// Place a field inside the container
    pub fn add_child(&self, field: &MemoryField) {
        self.inner.borrow_mut().children.push(field.clone());
    }

    /// Net translation applied so far
    pub fn offset(&self) -> f32 {
        self.inner.borrow().offset
    }

    /// Fields reported through [`ScrollContainer::field_cannot_fit`]
    pub fn unfit_fields(&self) -> Vec<FieldId> {
        self.inner.borrow().unfit.clone()
    }
}

impl ScrollContainer for MemoryScrollContainer {
    fn frame(&self) -> Rect {
        self.inner.borrow().frame
    }

    fn translate_by(&mut self, dy: f32, _duration: Duration) {
        let mut inner = self.inner.borrow_mut();
        inner.offset += dy;
        inner.frame = inner.frame.offset(0.0, dy);
        for child in &inner.children {
            child.shift(dy);
        }
    }

    fn field_cannot_fit(&mut self, field: FieldId) {
        self.inner.borrow_mut().unfit.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_focus_hub_fires_once_per_transition() {
        let mut hub = FocusHub::new();
        let a = MemoryField::new(FieldId(1), Rect::ZERO);
        hub.register(&a);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        hub.set_listener(Box::new(move |prev, next| sink.borrow_mut().push((prev, next))));

        hub.focus(Some(FieldId(1)));
        hub.focus(Some(FieldId(1)));
        assert_eq!(hub.focused(), Some(FieldId(1)));
        hub.focus(None);
        assert_eq!(hub.focused(), None);

        assert_eq!(
            *seen.borrow(),
            vec![(None, Some(FieldId(1))), (Some(FieldId(1)), None)]
        );
        assert!(!a.has_focus());
    }

    #[test]
    fn test_focus_hub_listener_survives_callback() {
        let mut hub = FocusHub::new();
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        hub.set_listener(Box::new(move |_, _| counter.set(counter.get() + 1)));

        hub.focus(Some(FieldId(1)));
        hub.focus(Some(FieldId(2)));
        assert_eq!(count.get(), 2);
        assert!(hub.has_listener());

        hub.clear_listener();
        hub.focus(None);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_container_moves_children() {
        let field = MemoryField::new(FieldId(3), Rect::new(0.0, 500.0, 100.0, 40.0));
        let mut container = MemoryScrollContainer::new(Rect::new(0.0, 0.0, 400.0, 800.0));
        container.add_child(&field);

        container.translate_by(-120.0, Duration::ZERO);
        assert_eq!(field.screen_rect().top(), 380.0);
        assert_eq!(container.frame().top(), -120.0);

        container.translate_by(120.0, Duration::ZERO);
        assert_eq!(container.offset(), 0.0);
    }

    #[test]
    fn test_suppressor_failure_is_reported() {
        let mut suppressor = RecordingSuppressor::new();
        assert!(suppressor.suppress(FieldId(1)).is_ok());
        suppressor.fail_with("no input manager");
        assert_eq!(
            suppressor.restore(FieldId(1)),
            Err(PlatformError::SuppressionFailed("no input manager".into()))
        );
        assert_eq!(suppressor.calls().len(), 2);
    }

    #[test]
    fn test_memory_field_with_text_puts_caret_at_end() {
        let field = MemoryField::new(FieldId(1), Rect::ZERO).with_text("12");
        assert_eq!(field.selection(), Selection::caret(2));
    }
}
