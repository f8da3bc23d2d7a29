//! Scroll compensation
//!
//! Shifts the enclosing scroll container so the active field stays between
//! the container's visible top and the overlay's top edge. Offsets
//! accumulate across repeated adjustments and are reversed in one step on
//! hide, returning the container exactly to where it was before the first
//! adjustment.

use std::time::Duration;

use safekey_platform::{Rect, ScrollContainer, TextField};

use crate::error::{OverlayError, Result};

/// Outcome of [`ScrollCompensator::compute_offset`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollAdjustment {
    /// Translate the container by this many pixels (positive moves down)
    Offset(f32),
    NoAdjustmentNeeded,
    /// Field is taller than the space above the overlay
    CannotFit,
}

/// Accumulating container offset
#[derive(Debug)]
pub struct ScrollCompensator {
    margin: f32,
    accumulated: f32,
    /// Container frame before the first adjustment
    origin: Option<Rect>,
}

impl ScrollCompensator {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            accumulated: 0.0,
            origin: None,
        }
    }

    /// Net offset applied since the last restore
    pub fn offset(&self) -> f32 {
        self.accumulated
    }

    /// Offset needed to bring `field` into view
    ///
    /// `container` is the container's frame before any compensation, i.e.
    /// the visible viewport.
    pub fn compute_offset(
        field: Rect,
        overlay_top: f32,
        container: Rect,
        margin: f32,
    ) -> ScrollAdjustment {
        if field.height + margin > overlay_top - container.top() {
            return ScrollAdjustment::CannotFit;
        }

        if field.top() < container.top() {
            ScrollAdjustment::Offset(container.top() - field.top() + margin)
        } else if field.bottom() > overlay_top {
            ScrollAdjustment::Offset(overlay_top - field.bottom())
        } else {
            ScrollAdjustment::NoAdjustmentNeeded
        }
    }

    /// Adjust `container` so `field` clears the overlay
    ///
    /// Returns the offset applied by this call. A field that cannot fit is
    /// reported to the container and leaves the offset untouched.
    pub fn compensate(
        &mut self,
        field: &dyn TextField,
        overlay_top: f32,
        container: &mut dyn ScrollContainer,
        duration: Duration,
    ) -> Result<f32> {
        let origin = *self.origin.get_or_insert_with(|| container.frame());

        match Self::compute_offset(field.screen_rect(), overlay_top, origin, self.margin) {
            ScrollAdjustment::Offset(dy) => {
                tracing::debug!("scrolling content by {dy} for {}", field.id());
                container.translate_by(dy, duration);
                self.accumulated += dy;
                Ok(dy)
            }
            ScrollAdjustment::NoAdjustmentNeeded => Ok(0.0),
            ScrollAdjustment::CannotFit => {
                container.field_cannot_fit(field.id());
                Err(OverlayError::CannotFit(field.id()))
            }
        }
    }

    /// Reverse every adjustment since the last restore
    pub fn restore(&mut self, container: &mut dyn ScrollContainer, duration: Duration) {
        if self.accumulated != 0.0 {
            tracing::debug!("restoring content offset {}", self.accumulated);
            container.translate_by(-self.accumulated, duration);
        }
        self.accumulated = 0.0;
        self.origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safekey_platform::headless::{MemoryField, MemoryScrollContainer};
    use safekey_platform::FieldId;

    const MARGIN: f32 = 10.0;
    const OVERLAY_TOP: f32 = 500.0;

    fn container() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 800.0)
    }

    #[test]
    fn test_field_in_view() {
        let field = Rect::new(0.0, 100.0, 400.0, 40.0);
        assert_eq!(
            ScrollCompensator::compute_offset(field, OVERLAY_TOP, container(), MARGIN),
            ScrollAdjustment::NoAdjustmentNeeded
        );
    }

    #[test]
    fn test_field_below_overlay_pulls_up() {
        let field = Rect::new(0.0, 600.0, 400.0, 40.0);
        assert_eq!(
            ScrollCompensator::compute_offset(field, OVERLAY_TOP, container(), MARGIN),
            ScrollAdjustment::Offset(-140.0)
        );
    }

    #[test]
    fn test_field_above_container_pushes_down() {
        let field = Rect::new(0.0, -50.0, 400.0, 40.0);
        assert_eq!(
            ScrollCompensator::compute_offset(field, OVERLAY_TOP, container(), MARGIN),
            ScrollAdjustment::Offset(60.0)
        );
    }

    #[test]
    fn test_tall_field_cannot_fit() {
        let field = Rect::new(0.0, 0.0, 400.0, 495.0);
        assert_eq!(
            ScrollCompensator::compute_offset(field, OVERLAY_TOP, container(), MARGIN),
            ScrollAdjustment::CannotFit
        );
    }

    #[test]
    fn test_compensate_and_restore() {
        let field = MemoryField::new(FieldId(1), Rect::new(0.0, 700.0, 400.0, 40.0));
        let mut content = MemoryScrollContainer::new(container());
        content.add_child(&field);
        let mut compensator = ScrollCompensator::new(MARGIN);

        let dy = compensator
            .compensate(&field, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap();
        assert_eq!(dy, -240.0);
        assert_eq!(field.screen_rect().bottom(), OVERLAY_TOP);

        // Already in view: nothing more to do
        let dy = compensator
            .compensate(&field, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap();
        assert_eq!(dy, 0.0);

        compensator.restore(&mut content, Duration::ZERO);
        assert_eq!(content.offset(), 0.0);
        assert_eq!(compensator.offset(), 0.0);
        assert_eq!(field.screen_rect().top(), 700.0);
    }

    #[test]
    fn test_offsets_accumulate() {
        let top = MemoryField::new(FieldId(1), Rect::new(0.0, 100.0, 400.0, 40.0));
        let low = MemoryField::new(FieldId(2), Rect::new(0.0, 700.0, 400.0, 40.0));
        let lower = MemoryField::new(FieldId(3), Rect::new(0.0, 900.0, 400.0, 40.0));
        let mut content = MemoryScrollContainer::new(container());
        for field in [&top, &low, &lower] {
            content.add_child(field);
        }
        let mut compensator = ScrollCompensator::new(MARGIN);

        compensator
            .compensate(&low, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap();
        compensator
            .compensate(&lower, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap();
        assert_eq!(compensator.offset(), -440.0);
        assert_eq!(content.offset(), -440.0);

        // The top field has scrolled out above the original viewport
        let dy = compensator
            .compensate(&top, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap();
        assert_eq!(dy, 350.0);
        assert_eq!(top.screen_rect().top(), MARGIN);

        compensator.restore(&mut content, Duration::ZERO);
        assert_eq!(content.offset(), 0.0);
        assert_eq!(top.screen_rect().top(), 100.0);
    }

    #[test]
    fn test_cannot_fit_is_reported() {
        let field = MemoryField::new(FieldId(4), Rect::new(0.0, 100.0, 400.0, 600.0));
        let mut content = MemoryScrollContainer::new(container());
        let mut compensator = ScrollCompensator::new(MARGIN);

        let err = compensator
            .compensate(&field, OVERLAY_TOP, &mut content, Duration::ZERO)
            .unwrap_err();
        assert_eq!(err, OverlayError::CannotFit(FieldId(4)));
        assert_eq!(content.unfit_fields(), vec![FieldId(4)]);
        assert_eq!(content.offset(), 0.0);
    }
}
