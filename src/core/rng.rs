//! Seeded randomness owned by a match.
//!
//! Every random decision a match makes (deck shuffles, the opening Edge,
//! mulligan redraws) draws from the `GameRng` stored in `MatchState`, so
//! replaying the same actions against the same seed reproduces the match.
//! AI search takes branches off a root generator with [`GameRng::fork`].
//!
//! ```
//! use mission_ccg::core::GameRng;
//!
//! let mut dealer = GameRng::new(7);
//! let mut again = GameRng::new(7);
//!
//! let mut a = [1, 2, 3, 4, 5];
//! let mut b = a;
//! dealer.shuffle(&mut a);
//! again.shuffle(&mut b);
//! assert_eq!(a, b);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Seeded ChaCha8 stream with deterministic branching.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    branches: u64,
}

/// SplitMix64 finalizer; spreads consecutive branch numbers across the
/// seed space.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            branches: 0,
        }
    }

    /// Take the next branch off this generator.
    ///
    /// Branch `n` of a given seed is always the same stream, and taking a
    /// branch does not advance the parent's own sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.branches += 1;
        Self::new(mix(self.seed ^ mix(self.branches)))
    }

    /// Fair coin between the two seats.
    pub fn coin_flip(&mut self) -> PlayerId {
        if self.inner.gen::<bool>() {
            PlayerId::ONE
        } else {
            PlayerId::TWO
        }
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Shuffle a persistent vector such as a deck.
    pub fn shuffle_vector<T: Clone>(&mut self, vector: &mut im::Vector<T>) {
        let mut items: Vec<T> = vector.iter().cloned().collect();
        items.shuffle(&mut self.inner);
        *vector = items.into_iter().collect();
    }

    #[must_use]
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Position of this generator, enough to resume it elsewhere.
    #[must_use]
    pub fn checkpoint(&self) -> RngCheckpoint {
        RngCheckpoint {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            branches: self.branches,
        }
    }

    #[must_use]
    pub fn resume(checkpoint: &RngCheckpoint) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(checkpoint.seed);
        inner.set_word_pos(checkpoint.word_pos);
        Self {
            inner,
            seed: checkpoint.seed,
            branches: checkpoint.branches,
        }
    }
}

/// Serializable generator position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCheckpoint {
    pub seed: u64,
    /// ChaCha word counter.
    pub word_pos: u128,
    pub branches: u64,
}
