//! Input-side capabilities: focus notifications, native keyboard
//! suppression and haptic feedback

use std::time::Duration;

use crate::error::Result;
use crate::field::FieldId;
use crate::geometry::Point;

/// Callback fired once per focus transition with `(previous, next)`
///
/// `None` stands for a view that is not a text field.
pub type FocusListener = Box<dyn FnMut(Option<FieldId>, Option<FieldId>)>;

/// Source of focus-change notifications
///
/// A platform adapts its native focus hook (a global focus listener, a
/// responder-chain observer, ...) to this contract. Only one listener is
/// registered at a time; setting a new one replaces the previous.
pub trait FocusSource {
    /// Register the listener
    fn set_listener(&mut self, listener: FocusListener);

    /// Remove the registered listener, if any
    fn clear_listener(&mut self);
}

/// Hides and disables the platform's own soft keyboard for a field
///
/// Best-effort: callers log failures and carry on.
pub trait NativeInputSuppressor {
    /// Keep the native keyboard away from `field`
    fn suppress(&mut self, field: FieldId) -> Result<()>;

    /// Give `field` its native keyboard back
    fn restore(&mut self, field: FieldId) -> Result<()>;
}

/// Vibration motor or equivalent
pub trait HapticFeedback {
    fn pulse(&mut self, duration: Duration);
}

/// Touch phase reported for a bound field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchPhase {
    /// Finger went down at a screen position
    Down(Point),
    /// Finger lifted at a screen position
    Up(Point),
    /// Any intermediate phase (move, cancel)
    Other,
}
