//! Evaluating generators.
//!
//! [`evaluate`] is the entry point the property layer uses: it draws an
//! effective size uniformly in `[0, max_size]` from the seed, then runs the
//! generator on the successor seed. [`Evaluator`] wraps a [`GenConfig`] and
//! draws whole batches, optionally in parallel with `rayon`.

use rayon::prelude::*;

use crate::config::GenConfig;
use crate::gen::{Gen, Size};
use crate::seed::Seed;

/// Runs `gen` at a size drawn uniformly from `[0, max_size]`.
///
/// Deterministic in `(max_size, seed)`.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::gen::Gen;
/// use quickgen_core::{evaluate, Seed};
///
/// let size_echo = Gen::new(|size, _| size);
/// let size = evaluate(&size_echo, 10, Seed::from_u64(4));
/// assert!(size <= 10);
/// assert_eq!(size, evaluate(&size_echo, 10, Seed::from_u64(4)));
/// ```
pub fn evaluate<T: 'static>(gen: &Gen<T>, max_size: Size, seed: Seed) -> T {
    let (size, seed) = seed.range(0, max_size);
    tracing::trace!(size, max_size, "Evaluating generator");
    gen.run(size, seed)
}

/// Batch evaluation driven by a [`GenConfig`].
///
/// # Examples
///
/// ```rust
/// use quickgen_core::gen::choose;
/// use quickgen_core::{Evaluator, GenConfig, Seed};
///
/// let config = GenConfig::builder().sample_count(20).seed(1).build().unwrap();
/// let evaluator = Evaluator::new(config);
///
/// let samples = evaluator.sample(&choose(0_u8, 9).unwrap());
/// assert_eq!(samples.len(), 20);
/// assert_eq!(samples, evaluator.sample_parallel(&choose(0_u8, 9).unwrap()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    config: GenConfig,
}

impl Evaluator {
    /// Creates an evaluator for the given configuration.
    pub fn new(config: GenConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Evaluates once from the configured (or an entropy) seed.
    pub fn evaluate<T: 'static>(&self, gen: &Gen<T>) -> T {
        evaluate(gen, self.config.max_size(), self.config.initial_seed())
    }

    /// Draws `sample_count` values from the configured (or an entropy) seed.
    pub fn sample<T: 'static>(&self, gen: &Gen<T>) -> Vec<T> {
        self.sample_from(gen, self.config.initial_seed())
    }

    /// Draws `sample_count` values, sample `i` using term `i` of
    /// `seed.splits()`.
    pub fn sample_from<T: 'static>(&self, gen: &Gen<T>, seed: Seed) -> Vec<T> {
        let max_size = self.config.max_size();
        seed.splits()
            .take(self.config.sample_count())
            .map(|s| evaluate(gen, max_size, s))
            .collect()
    }

    /// Parallel counterpart of [`Evaluator::sample`].
    ///
    /// Seeds are derived exactly as in [`Evaluator::sample_from`], so for a
    /// fixed seed the result equals the sequential one.
    pub fn sample_parallel<T: Send + 'static>(&self, gen: &Gen<T>) -> Vec<T> {
        let max_size = self.config.max_size();
        let seeds: Vec<Seed> = self
            .config
            .initial_seed()
            .splits()
            .take(self.config.sample_count())
            .collect();
        tracing::debug!(samples = seeds.len(), "Sampling generator in parallel");
        seeds
            .into_par_iter()
            .map(|s| evaluate(gen, max_size, s))
            .collect()
    }
}
