//! RNG module - seeded generator and 7-bag randomizer
//!
//! Implements the "7-bag" randomization algorithm: each bag holds one of each
//! piece (I, O, T, S, Z, J, L), shuffled. The bag is topped up with a fresh
//! shuffled set whenever it is down to one piece, so the piece after the next
//! one is always already decided.
//!
//! The underlying generator is the Park–Miller "minimal standard" generator.
//! Two randomizers built from the same seed and fed the same sequence of draws
//! and garbage-gap lookups produce identical output forever, which is what lets
//! two networked engines agree on their piece futures from a single shared seed.

use std::collections::VecDeque;

use crate::types::PieceKind;

/// Park–Miller modulus (2^31 - 1).
const MODULUS: i64 = 2_147_483_647;

/// Park–Miller multiplier.
const MULTIPLIER: i64 = 16_807;

/// Park–Miller minimal standard generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    /// Create a new generator from the given seed.
    ///
    /// The seed is reduced modulo 2^31 - 1; zero and negative remainders are
    /// shifted into the valid state range.
    pub fn new(seed: i64) -> Self {
        let mut state = seed % MODULUS;
        if state <= 0 {
            state += MODULUS - 1;
        }
        Self { state }
    }

    /// Advance and return a value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let v = (self.next_f64() * max as f64).floor() as u32;
        v.min(max - 1)
    }

    /// Shuffle a slice using Fisher-Yates, walking from the last index down.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Bag-fair piece source plus the garbage-gap lookups that share its generator.
#[derive(Debug, Clone)]
pub struct Randomizer {
    bag: VecDeque<PieceKind>,
    rng: SeededRng,
    seed: i64,
}

impl Randomizer {
    /// Deterministic randomizer for the given seed.
    pub fn seeded(seed: i64) -> Self {
        Self {
            bag: VecDeque::with_capacity(14),
            rng: SeededRng::new(seed),
            seed,
        }
    }

    /// Free-running randomizer seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random::<u32>() as i64)
    }

    /// Seed this randomizer was created with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    fn top_up(&mut self) {
        if self.bag.len() <= 1 {
            let mut fresh = PieceKind::ALL;
            self.rng.shuffle(&mut fresh);
            self.bag.extend(fresh);
        }
    }

    /// Draw the next piece kind.
    pub fn draw(&mut self) -> PieceKind {
        self.top_up();
        // top_up guarantees at least seven queued kinds
        self.bag.pop_front().unwrap_or(PieceKind::I)
    }

    /// Kind that [`Randomizer::draw`] would return next, without consuming it.
    ///
    /// Returns `None` only before the first draw.
    pub fn peek(&self) -> Option<PieceKind> {
        self.bag.front().copied()
    }

    /// Number of kinds already decided but not yet drawn.
    pub fn queued(&self) -> usize {
        self.bag.len()
    }

    /// Pick the gap column for a garbage drain on a board `width` cells wide.
    pub fn garbage_gap(&mut self, width: u8) -> u8 {
        self.rng.next_range(width as u32) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_normalisation() {
        assert_eq!(SeededRng::new(1).state, 1);
        assert_eq!(SeededRng::new(0).state, MODULUS - 1);
        assert_eq!(SeededRng::new(MODULUS).state, MODULUS - 1);
        assert_eq!(SeededRng::new(-5).state, MODULUS - 6);
    }

    #[test]
    fn test_minimal_standard_sequence() {
        // Canonical check value: seed 1 reaches 1043618065 after 10000 steps.
        let mut rng = SeededRng::new(1);
        for _ in 0..10_000 {
            rng.next_f64();
        }
        assert_eq!(rng.state, 1_043_618_065);
    }

    #[test]
    fn test_next_range_bounds() {
        let mut rng = SeededRng::new(42);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_first_values_for_seed_one() {
        let mut rng = SeededRng::new(1);
        // 16807 -> (16807 - 1) / 2147483646
        let v = rng.next_f64();
        assert!((v - 16806.0 / 2147483646.0).abs() < 1e-15);
        assert_eq!(rng.state, 16807);
    }

    #[test]
    fn test_bag_contains_each_kind_once() {
        let mut r = Randomizer::seeded(12345);
        let mut seen = [0u8; 7];
        for _ in 0..7 {
            let k = r.draw();
            let idx = PieceKind::ALL.iter().position(|&p| p == k).unwrap();
            seen[idx] += 1;
        }
        assert_eq!(seen, [1; 7]);
    }

    #[test]
    fn test_peek_matches_draw() {
        let mut r = Randomizer::seeded(7);
        assert_eq!(r.peek(), None);
        r.draw();
        for _ in 0..50 {
            let peeked = r.peek().unwrap();
            assert_eq!(r.draw(), peeked);
        }
    }

    #[test]
    fn test_buffer_ahead_of_one() {
        let mut r = Randomizer::seeded(99);
        for _ in 0..100 {
            r.draw();
            assert!(r.queued() >= 1);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Randomizer::seeded(2024);
        let mut b = Randomizer::seeded(2024);
        for i in 0..200 {
            assert_eq!(a.draw(), b.draw());
            if i % 5 == 0 {
                assert_eq!(a.garbage_gap(10), b.garbage_gap(10));
            }
        }
    }

    #[test]
    fn test_garbage_gap_in_range() {
        let mut r = Randomizer::seeded(3);
        for _ in 0..500 {
            assert!(r.garbage_gap(10) < 10);
        }
    }
}
