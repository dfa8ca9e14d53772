//! Adaptive in-memory population thinning.

use crate::core::TraceSummary;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Thins an over-budget population by a fair coin flip per record.
///
/// Each sampler owns its RNG, seeded per analytics request, so concurrent
/// requests cannot interfere with each other's determinism.
///
/// Repeated halving is a biased approximation of down-sampling at the
/// final combined rate, not reservoir sampling. Aggregated percentages
/// are approximate when the matched population is very large.
pub(crate) struct AdaptiveSampler {
    rng: StdRng,
}

impl AdaptiveSampler {
    /// Creates a sampler seeded from `seed`, or from OS entropy when
    /// no seed is configured
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Retains each record independently with probability 0.5
    pub fn thin(&mut self, population: Vec<TraceSummary>) -> Vec<TraceSummary> {
        population
            .into_iter()
            .filter(|_| self.rng.gen_bool(0.5))
            .collect()
    }
}
