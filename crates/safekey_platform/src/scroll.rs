//! Scrollable container capability

use std::time::Duration;

use crate::field::FieldId;
use crate::geometry::Rect;

/// The scrollable content that encloses the bound fields
///
/// The overlay shifts this container vertically so the active field is not
/// covered.
pub trait ScrollContainer {
    /// Current container bounds in screen coordinates
    fn frame(&self) -> Rect;

    /// Animate the content by `dy` pixels (positive moves content down)
    fn translate_by(&mut self, dy: f32, duration: Duration);

    /// The field is taller than the space left above the overlay
    ///
    /// Hosts may present an alternate long-text view here.
    fn field_cannot_fit(&mut self, _field: FieldId) {}
}
