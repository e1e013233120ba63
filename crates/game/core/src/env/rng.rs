//! Injectable random source.
//!
//! The engine never creates randomness on its own: every die, coin flip and
//! shuffle is drawn from the [`RandomFn`] handed to
//! [`crate::engine::GameEngine::execute`]. Replays derive one [`PcgRandom`]
//! stream per command from the match seed and nonce, and tests queue exact
//! faces with [`QueuedRandom`].

use std::collections::VecDeque;

/// Sole source of non-determinism in the rules interpreter.
pub trait RandomFn {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn random(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Roll a die with N sides (1-N inclusive).
    fn d(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }

    /// Generate a random value in range [min, max] inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32() % range)
    }
}

/// Fisher-Yates shuffle driven by `rng`.
pub fn shuffle<T>(rng: &mut dyn RandomFn, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.range(0, i as u32) as usize;
        items.swap(i, j);
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRandom {
    state: u64,
}

impl PcgRandom {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Stream for the command executed at `nonce` in a match seeded with `seed`.
    pub fn for_command(seed: u64, nonce: u64) -> Self {
        Self::new(compute_seed(seed, nonce, 0))
    }

    /// Advance the PCG state by one step.
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomFn for PcgRandom {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Compute a deterministic seed from match components.
///
/// * `match_seed` - Seed fixed at match setup
/// * `nonce` - Command sequence number
/// * `context` - Distinguishes independent streams within one command
pub fn compute_seed(match_seed: u64, nonce: u64, context: u32) -> u64 {
    let mut hash = match_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Replays queued die faces, then falls back to a seeded PCG stream.
///
/// `d(sides)` pops the next face (clamped into `1..=sides`), which makes
/// scripted scenarios read like the dice on the table.
#[derive(Clone, Debug)]
pub struct QueuedRandom {
    faces: VecDeque<u32>,
    fallback: PcgRandom,
}

impl QueuedRandom {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: PcgRandom::new(0),
        }
    }

    pub fn push(&mut self, face: u32) {
        self.faces.push_back(face);
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomFn for QueuedRandom {
    fn next_u32(&mut self) -> u32 {
        match self.faces.pop_front() {
            Some(face) => face.saturating_sub(1),
            None => self.fallback.next_u32(),
        }
    }

    fn d(&mut self, sides: u32) -> u32 {
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, sides.max(1)),
            None => self.fallback.d(sides),
        }
    }
}
