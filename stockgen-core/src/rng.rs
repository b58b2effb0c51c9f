//! Seedable randomness for a generation run.
//!
//! All samplers draw from one `rand::Rng` passed in by the caller. `RunSeed`
//! is how callers build that source: a fixed seed for tests and replays, a
//! label hashed with BLAKE3 for human-friendly seeds, or fresh entropy when
//! the caller does not care (the seed is still recorded so the run can be
//! replayed).

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSeed(u64);

impl RunSeed {
    pub fn fixed(seed: u64) -> Self {
        Self(seed)
    }

    /// Draw a seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self(rand::random())
    }

    /// Derive a seed from an arbitrary label, e.g. `"tax-2023-fixture"`.
    pub fn from_label(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Parse a CLI seed: a decimal `u64` is used as-is, anything else is a label.
    pub fn parse(text: &str) -> Self {
        text.trim()
            .parse::<u64>()
            .map(Self::fixed)
            .unwrap_or_else(|_| Self::from_label(text))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The random source every sampler in the run draws from.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }
}
