//! Selection-aware text editing
//!
//! Indices are character indices, matching [`Selection`]. Out-of-range or
//! backwards selections are normalized before use, never rejected.

use safekey_platform::{Selection, TextField};

use crate::key::KeyAction;

/// Text plus selection of a bound field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub text: String,
    pub selection: Selection,
}

impl EditBuffer {
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }

    /// Snapshot a field's text and selection
    pub fn from_field(field: &dyn TextField) -> Self {
        Self::new(field.text(), field.selection())
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Ordered selection clamped to the text bounds
    fn clamped_selection(&self) -> Selection {
        let len = self.char_count();
        let ordered = self.selection.ordered();
        Selection::new(ordered.start.min(len), ordered.end.min(len))
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn replace_chars(&mut self, from: usize, to: usize, with: &str) {
        let start = self.byte_pos(from);
        let end = self.byte_pos(to);
        self.text.replace_range(start..end, with);
    }
}

/// Outcome of applying a key to a buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditResult {
    /// A character replaced the selection
    Inserted(char),
    /// Text was removed
    Deleted,
    /// Delete at the start of the text, or on an empty buffer
    Unchanged,
    /// Mode keys never reach the text
    Ignored,
}

impl EditResult {
    pub fn changed_text(&self) -> bool {
        matches!(self, EditResult::Inserted(_) | EditResult::Deleted)
    }
}

/// Applies key actions to text buffers
pub struct EditingEngine;

impl EditingEngine {
    pub fn apply(buffer: &mut EditBuffer, action: KeyAction) -> EditResult {
        match action {
            KeyAction::Delete => Self::delete(buffer),
            KeyAction::Char(c) => Self::insert(buffer, c),
            _ => EditResult::Ignored,
        }
    }

    /// Read the field, apply `action`, and write back only if text changed
    pub fn apply_to_field(field: &mut dyn TextField, action: KeyAction) -> EditResult {
        if action.is_mode_key() {
            return EditResult::Ignored;
        }

        let mut buffer = EditBuffer::from_field(field);
        let result = Self::apply(&mut buffer, action);
        if result.changed_text() {
            field.set_text(&buffer.text);
            field.set_selection(buffer.selection);
        }
        result
    }

    fn delete(buffer: &mut EditBuffer) -> EditResult {
        let selection = buffer.clamped_selection();

        if selection.is_caret() {
            if selection.start == 0 {
                buffer.selection = selection;
                return EditResult::Unchanged;
            }
            let caret = selection.start - 1;
            buffer.replace_chars(caret, selection.start, "");
            buffer.selection = Selection::caret(caret);
        } else {
            buffer.replace_chars(selection.start, selection.end, "");
            buffer.selection = Selection::caret(selection.start);
        }
        EditResult::Deleted
    }

    fn insert(buffer: &mut EditBuffer, c: char) -> EditResult {
        let selection = buffer.clamped_selection();
        let mut encoded = [0u8; 4];
        buffer.replace_chars(selection.start, selection.end, c.encode_utf8(&mut encoded));
        buffer.selection = Selection::caret(selection.start + 1);
        EditResult::Inserted(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safekey_platform::headless::MemoryField;
    use safekey_platform::{FieldId, Rect};

    #[test]
    fn test_insert_at_caret() {
        let mut buffer = EditBuffer::new("12", Selection::caret(2));
        assert_eq!(
            EditingEngine::apply(&mut buffer, KeyAction::Char('3')),
            EditResult::Inserted('3')
        );
        assert_eq!(buffer.text, "123");
        assert_eq!(buffer.selection, Selection::caret(3));
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut buffer = EditBuffer::new("hello", Selection::new(1, 4));
        EditingEngine::apply(&mut buffer, KeyAction::Char('X'));
        assert_eq!(buffer.text, "hXo");
        assert_eq!(buffer.selection, Selection::caret(2));
    }

    #[test]
    fn test_insert_with_backwards_selection() {
        let mut buffer = EditBuffer::new("abcd", Selection::new(3, 1));
        EditingEngine::apply(&mut buffer, KeyAction::Char('z'));
        assert_eq!(buffer.text, "azd");
    }

    #[test]
    fn test_delete_before_caret() {
        let mut buffer = EditBuffer::new("abc", Selection::caret(2));
        assert_eq!(
            EditingEngine::apply(&mut buffer, KeyAction::Delete),
            EditResult::Deleted
        );
        assert_eq!(buffer.text, "ac");
        assert_eq!(buffer.selection, Selection::caret(1));
    }

    #[test]
    fn test_delete_selection() {
        let mut buffer = EditBuffer::new("abcdef", Selection::new(1, 4));
        EditingEngine::apply(&mut buffer, KeyAction::Delete);
        assert_eq!(buffer.text, "aef");
        assert_eq!(buffer.selection, Selection::caret(1));
    }

    #[test]
    fn test_delete_at_start_is_noop() {
        let mut buffer = EditBuffer::new("abc", Selection::caret(0));
        assert_eq!(
            EditingEngine::apply(&mut buffer, KeyAction::Delete),
            EditResult::Unchanged
        );
        assert_eq!(buffer.text, "abc");
    }

    #[test]
    fn test_delete_on_empty_buffer_is_noop() {
        let mut buffer = EditBuffer::default();
        assert_eq!(
            EditingEngine::apply(&mut buffer, KeyAction::Delete),
            EditResult::Unchanged
        );
        assert_eq!(buffer.selection, Selection::caret(0));
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        let mut buffer = EditBuffer::new("ab", Selection::new(10, 40));
        EditingEngine::apply(&mut buffer, KeyAction::Char('c'));
        assert_eq!(buffer.text, "abc");
        assert_eq!(buffer.selection, Selection::caret(3));

        let mut buffer = EditBuffer::new("ab", Selection::caret(9));
        EditingEngine::apply(&mut buffer, KeyAction::Delete);
        assert_eq!(buffer.text, "a");
    }

    #[test]
    fn test_multibyte_text() {
        let mut buffer = EditBuffer::new("añb", Selection::caret(2));
        EditingEngine::apply(&mut buffer, KeyAction::Delete);
        assert_eq!(buffer.text, "ab");
        EditingEngine::apply(&mut buffer, KeyAction::Char('é'));
        assert_eq!(buffer.text, "aéb");
        assert_eq!(buffer.selection, Selection::caret(2));
    }

    #[test]
    fn test_mode_keys_are_ignored() {
        let mut buffer = EditBuffer::new("abc", Selection::caret(3));
        for action in [KeyAction::Shift, KeyAction::ModeChange, KeyAction::Cancel] {
            assert_eq!(EditingEngine::apply(&mut buffer, action), EditResult::Ignored);
        }
        assert_eq!(buffer.text, "abc");
    }

    #[test]
    fn test_apply_to_field_writes_back() {
        let mut field = MemoryField::new(FieldId(1), Rect::ZERO).with_text("12");
        EditingEngine::apply_to_field(&mut field, KeyAction::Char('3'));
        assert_eq!(field.text(), "123");
        assert_eq!(field.selection(), Selection::caret(3));

        assert_eq!(
            EditingEngine::apply_to_field(&mut field, KeyAction::SymbolToggle),
            EditResult::Ignored
        );
        assert_eq!(field.text(), "123");
    }
}
