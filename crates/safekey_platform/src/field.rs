//! Text field capability
//!
//! Bound fields are owned by the host UI toolkit. The overlay only reaches
//! them through this trait, so an adapter is typically a cheap handle
//! (a JNI global ref, an `Rc` to a widget, ...).

use crate::geometry::Rect;

/// Identifier of a text field, stable for the field's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// Selection range in character indices
///
/// `start == end` is a plain caret. `start > end` is allowed on input
/// (backwards selections) and normalized by [`Selection::ordered`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Caret at `pos` with nothing selected
    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Returns the selection with `start <= end`
    pub fn ordered(&self) -> Self {
        Self {
            start: self.start.min(self.end),
            end: self.start.max(self.end),
        }
    }
}

/// Text field capability implemented by the host
pub trait TextField {
    /// Stable identifier of this field
    fn id(&self) -> FieldId;

    /// Current text content
    fn text(&self) -> String;

    /// Replace the whole text content
    fn set_text(&mut self, text: &str);

    /// Current selection (character indices)
    fn selection(&self) -> Selection;

    /// Move the selection / caret
    fn set_selection(&mut self, selection: Selection);

    /// Whether the field currently holds input focus
    fn has_focus(&self) -> bool;

    /// Field bounds in screen coordinates
    fn screen_rect(&self) -> Rect;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_ordering() {
        let backwards = Selection::new(5, 2);
        assert_eq!(backwards.ordered(), Selection::new(2, 5));
        assert!(!backwards.is_caret());
        assert!(Selection::caret(3).is_caret());
    }

    #[test]
    fn test_field_id_display() {
        assert_eq!(FieldId(7).to_string(), "field#7");
    }
}
