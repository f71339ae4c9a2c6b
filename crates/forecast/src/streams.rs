use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hands out one independent random stream per simulated path.
///
/// A path's draws depend only on the source and the path index, never on
/// which thread runs it or in what order, so a seeded forecast is
/// reproducible under any degree of parallelism.
pub trait PathStreams: Sync {
    type Rng: RngCore;

    fn stream(&self, path: usize) -> Self::Rng;
}

/// ChaCha8 keyed by a base seed, with the path index as the stream number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaChaStreams {
    seed: u64,
}

impl ChaChaStreams {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// A source keyed by a fresh seed from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl PathStreams for ChaChaStreams {
    type Rng = ChaCha8Rng;

    fn stream(&self, path: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(path as u64);
        rng
    }
}
