//! Shift / caps-lock handling for the letters face

use crate::key::KeyLayout;

/// Letter case state of the overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseState {
    #[default]
    Lower,
    /// Upper case for the next letter only
    Upper,
    /// Caps lock
    Locked,
}

impl CaseState {
    /// State after one shift press: Lower -> Upper -> Locked -> Lower
    pub fn next(self) -> Self {
        match self {
            CaseState::Lower => CaseState::Upper,
            CaseState::Upper => CaseState::Locked,
            CaseState::Locked => CaseState::Lower,
        }
    }

    pub fn is_upper(self) -> bool {
        !matches!(self, CaseState::Lower)
    }
}

/// Rewrites the letter keys of a layout between lower and upper case
///
/// Only keys whose label is a single ASCII letter are touched. The current
/// case is read from the labels themselves, so applying the same transform
/// twice changes nothing the second time.
pub struct CaseTransformer;

impl CaseTransformer {
    pub fn to_upper(layout: &mut KeyLayout) {
        for key in layout.keys_mut() {
            if let Some(c) = single_char(key.label()).filter(char::is_ascii_lowercase) {
                key.relabel(key.code() - 32, c.to_ascii_uppercase().to_string());
            }
        }
    }

    pub fn to_lower(layout: &mut KeyLayout) {
        for key in layout.keys_mut() {
            if let Some(c) = single_char(key.label()).filter(char::is_ascii_uppercase) {
                key.relabel(key.code() + 32, c.to_ascii_lowercase().to_string());
            }
        }
    }

    /// Apply one shift press to `state`, rewriting `layout` when the visible
    /// case flips, and return the new state
    pub fn shift(state: CaseState, layout: &mut KeyLayout) -> CaseState {
        let next = state.next();
        match (state, next) {
            (CaseState::Lower, CaseState::Upper) => Self::to_upper(layout),
            (CaseState::Locked, CaseState::Lower) => Self::to_lower(layout),
            _ => {}
        }
        next
    }
}

fn single_char(label: Option<&str>) -> Option<char> {
    let mut chars = label?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::codes;

    #[test]
    fn test_shift_cycle() {
        assert_eq!(CaseState::Lower.next(), CaseState::Upper);
        assert_eq!(CaseState::Upper.next(), CaseState::Locked);
        assert_eq!(CaseState::Locked.next(), CaseState::Lower);
        assert!(!CaseState::Lower.is_upper());
        assert!(CaseState::Upper.is_upper());
        assert!(CaseState::Locked.is_upper());
    }

    #[test]
    fn test_to_upper_rewrites_letters_only() {
        let mut layout = KeyLayout::letters();
        CaseTransformer::to_upper(&mut layout);

        let q = layout.key_at(0).unwrap();
        assert_eq!(q.label(), Some("Q"));
        assert_eq!(q.code(), 'Q' as i32);

        let mode = layout.key_at(layout.position_of(codes::MODE_CHANGE).unwrap()).unwrap();
        assert_eq!(mode.label(), Some("123"));
        assert!(layout.position_of(codes::SHIFT).is_some());
    }

    #[test]
    fn test_to_upper_is_idempotent() {
        let mut once = KeyLayout::letters();
        CaseTransformer::to_upper(&mut once);
        let mut twice = once.clone();
        CaseTransformer::to_upper(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_to_lower_restores_original() {
        let original = KeyLayout::letters();
        let mut layout = original.clone();
        CaseTransformer::to_upper(&mut layout);
        CaseTransformer::to_lower(&mut layout);
        assert_eq!(layout, original);
    }

    #[test]
    fn test_symbols_untouched() {
        let original = KeyLayout::symbols();
        let mut layout = original.clone();
        CaseTransformer::to_upper(&mut layout);
        assert_eq!(layout, original);
    }

    #[test]
    fn test_shift_rewrites_on_visible_flips() {
        let mut layout = KeyLayout::letters();

        let state = CaseTransformer::shift(CaseState::Lower, &mut layout);
        assert_eq!(state, CaseState::Upper);
        assert_eq!(layout.key_at(0).unwrap().label(), Some("Q"));

        let state = CaseTransformer::shift(state, &mut layout);
        assert_eq!(state, CaseState::Locked);
        assert_eq!(layout.key_at(0).unwrap().label(), Some("Q"));

        let state = CaseTransformer::shift(state, &mut layout);
        assert_eq!(state, CaseState::Lower);
        assert_eq!(layout, KeyLayout::letters());
    }
}
