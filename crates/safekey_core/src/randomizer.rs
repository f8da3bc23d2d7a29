//! Randomized digit placement for the numbers face
//!
//! Shoulder-surfing resistance: the ten digit keys keep their screen
//! positions, but which digit each position shows and emits is redrawn on
//! every entry into the numbers face.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::key::KeyLayout;

/// Digits handed out to the digit slots, in slot order
pub type DigitPermutation = [u8; 10];

/// Shuffles the digit keys of a numbers layout
pub struct DigitRandomizer {
    rng: Box<dyn RngCore>,
}

impl Default for DigitRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitRandomizer {
    /// Randomizer backed by the thread-local CSPRNG
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }

    /// Randomizer with a caller-chosen generator (seeded ones for tests)
    pub fn with_rng(rng: impl RngCore + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Draw a fresh permutation and assign it to the layout's digit slots
    ///
    /// Returns `None` without touching the layout when it does not carry
    /// exactly ten digit keys.
    pub fn shuffle(&mut self, layout: &mut KeyLayout) -> Option<DigitPermutation> {
        if layout.digit_slots().len() != 10 {
            tracing::warn!(
                "digit shuffle skipped: {:?} layout has {} digit keys",
                layout.kind(),
                layout.digit_slots().len()
            );
            return None;
        }

        // Every digit is drawn from the pool exactly once
        let mut pool: DigitPermutation = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        pool.shuffle(&mut *self.rng);
        assign(layout, &pool);
        Some(pool)
    }

    /// Put every digit back on the slot it had at construction
    pub fn reset(layout: &mut KeyLayout) {
        if layout.digit_slots().len() == 10 {
            assign(layout, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        }
    }
}

fn assign(layout: &mut KeyLayout, digits: &DigitPermutation) {
    let slots: Vec<usize> = layout.digit_slots().to_vec();
    let keys = layout.keys_mut();
    for (slot, digit) in slots.into_iter().zip(digits.iter().copied()) {
        let ch = char::from(b'0' + digit);
        keys[slot].relabel(ch as i32, ch.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Key, LayoutKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn digits_in_slot_order(layout: &KeyLayout) -> Vec<i32> {
        layout
            .digit_slots()
            .iter()
            .map(|&slot| layout.key_at(slot).map(Key::code).unwrap_or_default() - '0' as i32)
            .collect()
    }

    #[test]
    fn test_shuffle_is_a_bijection() {
        let mut randomizer = DigitRandomizer::with_rng(Pcg64::seed_from_u64(7));
        let mut layout = KeyLayout::numbers();

        for _ in 0..200 {
            let permutation = randomizer.shuffle(&mut layout).unwrap();
            let mut seen = [false; 10];
            for digit in permutation {
                assert!(!seen[digit as usize], "digit {} drawn twice", digit);
                seen[digit as usize] = true;
            }
            assert!(seen.iter().all(|s| *s));

            let mut emitted = digits_in_slot_order(&layout);
            emitted.sort_unstable();
            assert_eq!(emitted, (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_shuffle_keeps_slots_and_labels_in_sync() {
        let mut randomizer = DigitRandomizer::with_rng(Pcg64::seed_from_u64(42));
        let mut layout = KeyLayout::numbers();
        let slots_before = layout.digit_slots().to_vec();

        randomizer.shuffle(&mut layout);

        assert_eq!(layout.digit_slots(), slots_before.as_slice());
        for &slot in layout.digit_slots() {
            let key = layout.key_at(slot).unwrap();
            assert_eq!(key.slot(), slot);
            let label = key.label().unwrap();
            assert_eq!(label.chars().next().map(|c| c as i32), Some(key.code()));
        }
    }

    #[test]
    fn test_reset_restores_fixed_order() {
        let mut randomizer = DigitRandomizer::with_rng(Pcg64::seed_from_u64(3));
        let mut layout = KeyLayout::numbers();
        randomizer.shuffle(&mut layout);

        DigitRandomizer::reset(&mut layout);
        assert_eq!(layout, KeyLayout::numbers());
    }

    #[test]
    fn test_shuffle_skips_layouts_without_ten_digits() {
        let mut randomizer = DigitRandomizer::with_rng(Pcg64::seed_from_u64(1));
        let mut layout = KeyLayout::new(LayoutKind::Numbers, [('1' as i32, Some("1"))]);
        assert_eq!(randomizer.shuffle(&mut layout), None);
        assert_eq!(layout.key_at(0).unwrap().code(), '1' as i32);
    }
}
