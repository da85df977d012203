//! Deterministic RNG hierarchy.
//!
//! A master seed generates one sub-seed per `(state, category)` series. Sub-seeds
//! are derived via BLAKE3 hashing, so a series draws the same noise no matter
//! which other states or categories were requested alongside it.

use crate::domain::{Category, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Hierarchy with a master seed drawn from the thread-local OS-seeded RNG.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for one series.
    pub fn sub_seed(&self, state: &State, category: &Category) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(state.as_str().as_bytes());
        // separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update(&[0u8]);
        hasher.update(category.as_str().as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng for one series.
    pub fn rng_for(&self, state: &State, category: &Category) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(state, category))
    }
}
