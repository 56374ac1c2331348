//! Stochastic document generators
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sacsv_core::Generator;

/// Bytes fields are drawn from: plain text plus every structural byte.
const ALPHABET: &[u8] = b"abcXYZ019 ,\"\r\n";

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("SACSV_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random field content, structural bytes included.
    pub fn field(&mut self) -> Vec<u8> {
        let len = self.geometric(0.8);
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())])
            .collect()
    }

    /// Random table: at least one row, every row at least one field.
    pub fn table(&mut self) -> Vec<Vec<Vec<u8>>> {
        let rows = 1 + self.geometric(0.85);
        (0..rows)
            .map(|_| {
                let fields = 1 + self.geometric(0.6);
                (0..fields).map(|_| self.field()).collect()
            })
            .collect()
    }

    /// Sorted cut points splitting `len` bytes into random chunks.
    pub fn cuts(&mut self, len: usize) -> Vec<usize> {
        let count = self.geometric(0.7);
        let mut cuts: Vec<usize> = (0..count).map(|_| self.rng.gen_range(0..=len)).collect();
        cuts.sort_unstable();
        cuts
    }
}

/// Serialize `table` the way the parser reads it back.
pub fn document(table: &[Vec<Vec<u8>>]) -> Vec<u8> {
    let mut out = Generator::new();
    for row in table {
        out.write_row(row);
    }
    out.into_inner()
}

/// Split `input` at sorted `cuts`.
pub fn split<'a>(input: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        chunks.push(&input[start..cut]);
        start = cut;
    }
    chunks.push(&input[start..]);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.table(), g2.table());
            assert_eq!(g1.geometric(0.9), g2.geometric(0.9));
        }
    }

    #[test]
    fn test_split_covers_input() {
        let input = b"abcdef";
        let chunks = split(input, &[0, 2, 2, 6]);
        assert_eq!(chunks, vec![&b""[..], b"ab", b"", b"cdef", b""]);
        assert_eq!(chunks.concat(), input.to_vec());
    }
}
