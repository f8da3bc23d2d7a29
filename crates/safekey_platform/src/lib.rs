//! SafeKey Platform Abstraction Layer
//!
//! Capability contracts between the SafeKey overlay controller and the host
//! UI toolkit. The controller never touches platform APIs directly; it talks
//! to bound text fields, the focus system, the native keyboard, the haptic
//! motor and the scrollable content through the traits defined here.
//!
//! # Capabilities
//!
//! - [`TextField`] - text, selection, focus and bounds of a bound field
//! - [`FocusSource`] - one callback per focus transition
//! - [`NativeInputSuppressor`] - hide the system keyboard for a field
//! - [`HapticFeedback`] - key-press vibration
//! - [`ScrollContainer`] - the content shifted out from under the overlay
//!
//! The [`headless`] module provides in-memory implementations of all of them.

mod error;
mod field;
mod geometry;
pub mod headless;
mod input;
mod scroll;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use field::{FieldId, Selection, TextField};
pub use geometry::{Point, Rect};
pub use input::{FocusListener, FocusSource, HapticFeedback, NativeInputSuppressor, TouchPhase};
pub use scroll::ScrollContainer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::field::{FieldId, Selection, TextField};
    pub use crate::geometry::{Point, Rect};
    pub use crate::input::{
        FocusListener, FocusSource, HapticFeedback, NativeInputSuppressor, TouchPhase,
    };
    pub use crate::scroll::ScrollContainer;
}
