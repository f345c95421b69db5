//! Input generation for timed calls.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::domain::InputKind;

/// Build an input of length `n`.
///
/// Seeded kinds mix `n` into the seed so each size gets its own permutation,
/// while the whole series stays reproducible for a given `seed`.
pub fn generate_input(kind: InputKind, n: usize, seed: u64) -> Vec<u64> {
    let len = n as u64;
    match kind {
        InputKind::Ascending => (0..len).collect(),
        InputKind::Descending => (0..len).rev().collect(),
        InputKind::Shuffled => {
            let mut values: Vec<u64> = (0..len).collect();
            values.shuffle(&mut size_rng(seed, n));
            values
        }
        InputKind::Random => {
            let dist = Uniform::new(0, len.max(1));
            size_rng(seed, n).sample_iter(dist).take(n).collect()
        }
    }
}

fn size_rng(seed: u64, n: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (n as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
