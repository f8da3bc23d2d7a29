//! Focus routing
//!
//! Turns a platform focus transition into an advisory show/hide decision.
//! The visibility scheduler applies its own debounce and guards afterwards.

use safekey_platform::FieldId;

/// What the focus change asks the overlay to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusDecision {
    Show(FieldId),
    Hide,
}

/// Where focus was or went, as seen by the overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    /// A field bound to the overlay
    Bound(FieldId),
    /// A text field using the system keyboard
    Unbound(FieldId),
    /// Any view that is not a text field
    Other,
}

impl FocusTarget {
    fn classify(id: Option<FieldId>, is_bound: impl Fn(FieldId) -> bool) -> Self {
        match id {
            Some(id) if is_bound(id) => FocusTarget::Bound(id),
            Some(id) => FocusTarget::Unbound(id),
            None => FocusTarget::Other,
        }
    }
}

pub struct FocusRouter;

impl FocusRouter {
    /// Decide for a `previous -> next` focus transition
    ///
    /// Focus landing on a bound field always re-validates showing, including
    /// bound -> bound moves that may arrive while the overlay is hiding, and
    /// repeated notifications for the same field. Anything else hides.
    pub fn route(
        previous: Option<FieldId>,
        next: Option<FieldId>,
        is_bound: impl Fn(FieldId) -> bool + Copy,
    ) -> FocusDecision {
        let from = FocusTarget::classify(previous, is_bound);
        let to = FocusTarget::classify(next, is_bound);

        let decision = match to {
            FocusTarget::Bound(id) => FocusDecision::Show(id),
            FocusTarget::Unbound(_) | FocusTarget::Other => FocusDecision::Hide,
        };
        tracing::debug!("focus {:?} -> {:?}: {:?}", from, to, decision);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: FieldId = FieldId(1);
    const B: FieldId = FieldId(2);
    const PLAIN: FieldId = FieldId(9);

    fn bound(id: FieldId) -> bool {
        id == A || id == B
    }

    #[test]
    fn test_bound_to_bound_shows_next() {
        assert_eq!(FocusRouter::route(Some(A), Some(B), bound), FocusDecision::Show(B));
    }

    #[test]
    fn test_bound_to_unbound_hides() {
        assert_eq!(FocusRouter::route(Some(A), Some(PLAIN), bound), FocusDecision::Hide);
        assert_eq!(FocusRouter::route(Some(A), None, bound), FocusDecision::Hide);
    }

    #[test]
    fn test_unbound_to_bound_shows() {
        assert_eq!(FocusRouter::route(Some(PLAIN), Some(A), bound), FocusDecision::Show(A));
        assert_eq!(FocusRouter::route(None, Some(A), bound), FocusDecision::Show(A));
    }

    #[test]
    fn test_unbound_to_unbound_hides() {
        assert_eq!(FocusRouter::route(Some(PLAIN), None, bound), FocusDecision::Hide);
        assert_eq!(FocusRouter::route(None, None, bound), FocusDecision::Hide);
    }

    #[test]
    fn test_same_bound_field_revalidates_show() {
        assert_eq!(FocusRouter::route(Some(A), Some(A), bound), FocusDecision::Show(A));
    }

    #[test]
    fn test_same_unbound_field_hides() {
        assert_eq!(FocusRouter::route(Some(PLAIN), Some(PLAIN), bound), FocusDecision::Hide);
    }
}
