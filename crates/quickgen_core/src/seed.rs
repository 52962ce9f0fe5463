//! Splittable pseudo-random seed.
//!
//! This module provides [`Seed`], an immutable 64-bit random source state
//! with the two primitives every generator is built on:
//!
//! - [`Seed::split`]: derive two independent sub-seeds
//! - [`Seed::range`]: draw a uniform value and a successor seed
//!
//! Bits are produced by `rand::rngs::StdRng`; a seed is only ever used to
//! initialise a fresh `StdRng`, so evaluating a generator never mutates
//! shared state.

use rand::distributions::uniform::SampleUniform;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Immutable, splittable random source state.
///
/// `Seed` is `Copy`: drawing from it returns a *new* seed rather than
/// advancing the old one. The same seed always yields the same draws,
/// which is what makes every generator a pure function of its seed.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::Seed;
///
/// let seed = Seed::from_u64(42);
/// let (left, right) = seed.split();
/// assert_ne!(left, right);
///
/// // Same seed, same split
/// assert_eq!(seed.split(), (left, right));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed {
    /// Raw state used to initialise the underlying PRNG.
    state: u64,
}

impl Seed {
    /// Creates a seed from a raw 64-bit state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::Seed;
    ///
    /// let seed = Seed::from_u64(12345);
    /// assert_eq!(seed.state(), 12345);
    /// ```
    #[inline]
    pub fn from_u64(state: u64) -> Self {
        Self { state }
    }

    /// Creates a seed from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::from_u64(rand::random())
    }

    /// Returns the raw state (useful for logging a failing run's seed).
    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn rng(self) -> StdRng {
        StdRng::seed_from_u64(self.state)
    }

    /// Splits the seed into two independent sub-seeds.
    ///
    /// Split is deterministic: the same seed always produces the same pair.
    #[inline]
    pub fn split(self) -> (Seed, Seed) {
        let mut rng = self.rng();
        let left = Seed::from_u64(rng.gen());
        let right = Seed::from_u64(rng.gen());
        (left, right)
    }

    /// Draws a uniform value in the inclusive range `[lo, hi]`.
    ///
    /// Returns the value together with a successor seed that is independent
    /// of the draw.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`. Callers validate the range first; see
    /// [`choose`](crate::gen::choose) for the checked variant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::Seed;
    ///
    /// let (value, _next) = Seed::from_u64(7).range(-5_i32, 5);
    /// assert!((-5..=5).contains(&value));
    /// ```
    #[inline]
    pub fn range<T>(self, lo: T, hi: T) -> (T, Seed)
    where
        T: SampleUniform + PartialOrd,
    {
        let mut rng = self.rng();
        let value = rng.gen_range(lo..=hi);
        (value, Seed::from_u64(rng.gen()))
    }

    /// Draws one value from `distribution`, returning it with a successor seed.
    #[inline]
    pub fn sample<T, D>(self, distribution: &D) -> (T, Seed)
    where
        D: Distribution<T>,
    {
        let mut rng = self.rng();
        let value = distribution.sample(&mut rng);
        (value, Seed::from_u64(rng.gen()))
    }

    /// Returns the infinite sequence of seeds obtained by repeatedly
    /// splitting: `left(s), left(right(s)), left(right(right(s))), ...`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::Seed;
    ///
    /// let seed = Seed::from_u64(1);
    /// let first: Vec<Seed> = seed.splits().take(2).collect();
    /// assert_eq!(first[0], seed.split().0);
    /// assert_eq!(first[1], seed.split().1.split().0);
    /// ```
    #[inline]
    pub fn splits(self) -> Splits {
        Splits { rest: self }
    }

    /// Perturbs the seed by index `v`.
    ///
    /// Selects the term at index `v + 1` of [`Seed::splits`]. Distinct
    /// indices select distinct, independently derived seeds, which is the
    /// basis of every co-generator.
    ///
    /// # Performance
    ///
    /// Takes `v + 2` splits, each of which seeds a fresh PRNG, so `v` is
    /// meant to be a small tag: a case index, a sign, a 4-bit digit. The
    /// built-in co-generators never pass more than 16 plus the number of
    /// cases of a sum type. Encode wide values as a sequence of small
    /// indices (as `quickgen_arbitrary::coarbitrary::perturb_magnitude`
    /// does) rather than passing them here directly.
    #[inline]
    pub fn variant(self, v: u64) -> Seed {
        let mut rest = self;
        for _ in 0..=v {
            rest = rest.split().1;
        }
        rest.split().0
    }
}

/// Iterator over the split sequence of a seed. See [`Seed::splits`].
#[derive(Clone, Debug)]
pub struct Splits {
    rest: Seed,
}

impl Splits {
    /// Returns the next seed of the sequence; the sequence never ends.
    #[inline]
    pub fn next_seed(&mut self) -> Seed {
        let (here, rest) = self.rest.split();
        self.rest = rest;
        here
    }
}

impl Iterator for Splits {
    type Item = Seed;

    #[inline]
    fn next(&mut self) -> Option<Seed> {
        Some(self.next_seed())
    }
}
