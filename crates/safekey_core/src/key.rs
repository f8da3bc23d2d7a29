//! Keys and keyboard faces
//!
//! A [`KeyLayout`] is an ordered list of [`Key`]s. Each key keeps a fixed
//! `slot` (its on-screen position) for the lifetime of the layout, while
//! case transforms and digit shuffling rewrite its `code` and `label` in
//! place.

use smallvec::SmallVec;

/// Command key codes
///
/// Any code outside this set is a character key emitting the Unicode scalar
/// value of its code.
pub mod codes {
    /// Cycle lower / upper / caps-lock
    pub const SHIFT: i32 = -1;
    /// Toggle between the numbers and letters faces
    pub const MODE_CHANGE: i32 = -2;
    /// Dismiss the overlay
    pub const CANCEL: i32 = -3;
    /// Backspace
    pub const DELETE: i32 = -5;
    /// Second backspace key found on some faces
    pub const ALT_DELETE: i32 = -35;
    /// Space bar
    pub const SPACE: i32 = 32;
    /// Toggle between the symbols and letters faces
    pub const SYMBOL_TOGGLE: i32 = 100_860;
    /// Accepted but does nothing
    pub const RESERVED: i32 = 100_861;
}

/// What a key press means
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Shift,
    ModeChange,
    SymbolToggle,
    Cancel,
    Delete,
    Reserved,
    Char(char),
}

impl KeyAction {
    /// Decode a key code, `None` for codes that are neither commands nor
    /// valid characters
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            codes::SHIFT => Some(KeyAction::Shift),
            codes::MODE_CHANGE => Some(KeyAction::ModeChange),
            codes::SYMBOL_TOGGLE => Some(KeyAction::SymbolToggle),
            codes::CANCEL => Some(KeyAction::Cancel),
            codes::DELETE | codes::ALT_DELETE => Some(KeyAction::Delete),
            codes::RESERVED => Some(KeyAction::Reserved),
            _ => u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(KeyAction::Char),
        }
    }

    /// Mode keys change layout or case state and never touch text
    pub fn is_mode_key(&self) -> bool {
        matches!(
            self,
            KeyAction::Shift
                | KeyAction::ModeChange
                | KeyAction::SymbolToggle
                | KeyAction::Cancel
                | KeyAction::Reserved
        )
    }
}

/// A single key on a keyboard face
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    code: i32,
    label: Option<String>,
    slot: usize,
}

impl Key {
    /// Code emitted on press
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Text drawn on the key (`None` for icon keys)
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Fixed position of this key within its layout
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// What pressing this key does; `None` for reserved codes
    pub fn action(&self) -> Option<KeyAction> {
        KeyAction::from_code(self.code)
    }

    /// Rewrite what the key shows and emits; the slot never changes
    pub(crate) fn relabel(&mut self, code: i32, label: String) {
        self.code = code;
        self.label = Some(label);
    }
}

/// The three keyboard faces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    #[default]
    Letters,
    Symbols,
    Numbers,
}

/// Ordered sequence of keys tagged with its face
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    kind: LayoutKind,
    keys: Vec<Key>,
    /// Slots of the keys that emitted '0'..='9' at construction, indexed by
    /// that original digit
    digit_slots: SmallVec<[usize; 10]>,
}

impl KeyLayout {
    /// Build a layout from `(code, label)` pairs; slots follow the order given
    pub fn new<I, S>(kind: LayoutKind, keys: I) -> Self
    where
        I: IntoIterator<Item = (i32, Option<S>)>,
        S: Into<String>,
    {
        let keys: Vec<Key> = keys
            .into_iter()
            .enumerate()
            .map(|(slot, (code, label))| Key {
                code,
                label: label.map(Into::into),
                slot,
            })
            .collect();

        let mut digit_slots = SmallVec::new();
        for digit in '0'..='9' {
            if let Some(key) = keys.iter().find(|k| k.code == digit as i32) {
                digit_slots.push(key.slot);
            }
        }

        Self {
            kind,
            keys,
            digit_slots,
        }
    }

    /// Default QWERTY face (lower case)
    pub fn letters() -> Self {
        let mut keys = Vec::new();
        push_chars(&mut keys, "qwertyuiop");
        push_chars(&mut keys, "asdfghjkl");
        keys.push((codes::SHIFT, None));
        push_chars(&mut keys, "zxcvbnm");
        keys.push((codes::DELETE, None));
        keys.push((codes::MODE_CHANGE, Some("123".to_string())));
        keys.push((codes::SYMBOL_TOGGLE, Some("#+=".to_string())));
        keys.push((codes::SPACE, None));
        keys.push((codes::CANCEL, None));
        Self::new(LayoutKind::Letters, keys)
    }

    /// Default symbol face
    pub fn symbols() -> Self {
        let mut keys = Vec::new();
        push_chars(&mut keys, "!@#$%^&*()");
        push_chars(&mut keys, "-_=+[]{}\\|");
        push_chars(&mut keys, ";:'\",.<>/?");
        push_chars(&mut keys, "`~");
        keys.push((codes::DELETE, None));
        keys.push((codes::MODE_CHANGE, Some("123".to_string())));
        keys.push((codes::SYMBOL_TOGGLE, Some("ABC".to_string())));
        keys.push((codes::SPACE, None));
        keys.push((codes::CANCEL, None));
        Self::new(LayoutKind::Symbols, keys)
    }

    /// Default numeric pad
    pub fn numbers() -> Self {
        let mut keys = Vec::new();
        push_chars(&mut keys, "123456789");
        keys.push((codes::SYMBOL_TOGGLE, Some("#+=".to_string())));
        push_chars(&mut keys, "0");
        keys.push((codes::DELETE, None));
        keys.push((codes::MODE_CHANGE, Some("ABC".to_string())));
        keys.push((codes::CANCEL, None));
        Self::new(LayoutKind::Numbers, keys)
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut [Key] {
        &mut self.keys
    }

    /// Key at a given slot
    pub fn key_at(&self, slot: usize) -> Option<&Key> {
        self.keys.get(slot)
    }

    /// Slot of the first key currently emitting `code`
    pub fn position_of(&self, code: i32) -> Option<usize> {
        self.keys.iter().find(|k| k.code == code).map(|k| k.slot)
    }

    /// Slots holding the ten digit keys, ordered by their original digit
    pub fn digit_slots(&self) -> &[usize] {
        &self.digit_slots
    }

    /// Labels in slot order (icon keys are `None`)
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.keys.iter().map(Key::label).collect()
    }
}

fn push_chars(keys: &mut Vec<(i32, Option<String>)>, chars: &str) {
    keys.extend(chars.chars().map(|c| (c as i32, Some(c.to_string()))));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_action_decoding() {
        assert_eq!(KeyAction::from_code(codes::SHIFT), Some(KeyAction::Shift));
        assert_eq!(KeyAction::from_code(codes::ALT_DELETE), Some(KeyAction::Delete));
        assert_eq!(KeyAction::from_code('a' as i32), Some(KeyAction::Char('a')));
        assert_eq!(KeyAction::from_code(codes::SPACE), Some(KeyAction::Char(' ')));
        assert_eq!(KeyAction::from_code(-99), None);
        assert_eq!(KeyAction::from_code(0xD800), None);
    }

    #[test]
    fn test_mode_keys() {
        assert!(KeyAction::Shift.is_mode_key());
        assert!(KeyAction::Cancel.is_mode_key());
        assert!(!KeyAction::Delete.is_mode_key());
        assert!(!KeyAction::Char('x').is_mode_key());
    }

    #[test]
    fn test_slots_follow_construction_order() {
        let layout = KeyLayout::letters();
        for (index, key) in layout.keys().iter().enumerate() {
            assert_eq!(key.slot(), index);
        }
        assert_eq!(layout.key_at(0).and_then(Key::label), Some("q"));
        assert_eq!(layout.key_at(0).and_then(Key::action), Some(KeyAction::Char('q')));
        assert_eq!(layout.key_at(19).and_then(Key::action), Some(KeyAction::Shift));
        assert_eq!(layout.position_of(codes::SHIFT), Some(19));
    }

    #[test]
    fn test_numbers_caches_ten_digit_slots() {
        let layout = KeyLayout::numbers();
        assert_eq!(layout.digit_slots().len(), 10);
        // '0' sits after the symbol toggle on the bottom row
        assert_eq!(layout.digit_slots()[0], 10);
        assert_eq!(layout.digit_slots()[1], 0);
        assert_eq!(layout.kind(), LayoutKind::Numbers);
    }

    #[test]
    fn test_letters_has_no_digit_slots() {
        assert!(KeyLayout::letters().digit_slots().is_empty());
        assert!(KeyLayout::symbols().digit_slots().is_empty());
    }

    #[test]
    fn test_custom_layout() {
        let layout = KeyLayout::new(
            LayoutKind::Symbols,
            [('x' as i32, Some("x")), (codes::DELETE, None)],
        );
        assert_eq!(layout.labels(), vec![Some("x"), None]);
    }
}
