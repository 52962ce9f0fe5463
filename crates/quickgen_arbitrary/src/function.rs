//! Random function generation.
//!
//! A generated function captures the size and seed it was generated at.
//! Calling it with an argument perturbs the captured seed by the argument
//! and runs the result generator there, so equal arguments always give
//! equal results and different arguments give independent ones.

use std::fmt;
use std::sync::Arc;

use quickgen_core::{Gen, Seed, Size};

use crate::arbitrary::Arbitrary;
use crate::coarbitrary::CoArbitrary;

type Family<A, R> = Arc<dyn Fn(&A) -> Gen<R> + Send + Sync>;

/// A deterministic function drawn from a generator.
pub struct GeneratedFn<A, R> {
    size: Size,
    seed: Seed,
    family: Family<A, R>,
}

impl<A, R> Clone for GeneratedFn<A, R> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            seed: self.seed,
            family: Arc::clone(&self.family),
        }
    }
}

impl<A, R> fmt::Debug for GeneratedFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedFn")
            .field("size", &self.size)
            .field("seed", &self.seed)
            .finish()
    }
}

impl<A, R: 'static> GeneratedFn<A, R> {
    /// Applies the function.
    pub fn call(&self, arg: &A) -> R {
        (self.family)(arg).run(self.size, self.seed)
    }

    /// Size captured at generation.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Seed captured at generation.
    pub fn seed(&self) -> Seed {
        self.seed
    }
}

/// Turns an argument-indexed family of generators into a generator of
/// functions.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::promote;
/// use quickgen_core::gen::Gen;
/// use quickgen_core::Seed;
///
/// let shift = promote(|n: &i32| {
///     let n = *n;
///     Gen::new(move |size, _| n + size as i32)
/// });
/// let f = shift.run(10, Seed::from_u64(0));
/// assert_eq!(f.call(&1), 11);
/// ```
pub fn promote<A, R, F>(family: F) -> Gen<GeneratedFn<A, R>>
where
    A: 'static,
    R: 'static,
    F: Fn(&A) -> Gen<R> + Send + Sync + 'static,
{
    let family: Family<A, R> = Arc::new(family);
    Gen::new(move |size, seed| GeneratedFn {
        size,
        seed,
        family: Arc::clone(&family),
    })
}

/// Generates functions whose results come from `result`, varied by the
/// argument's [`CoArbitrary`] instance.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{function, Arbitrary};
/// use quickgen_core::Seed;
///
/// let f = function::<u8, i64>(i64::arbitrary()).run(100, Seed::from_u64(5));
/// assert_eq!(f.call(&3), f.call(&3));
/// ```
pub fn function<A, R>(result: Gen<R>) -> Gen<GeneratedFn<A, R>>
where
    A: CoArbitrary + Clone + Send + Sync + 'static,
    R: 'static,
{
    promote(move |arg: &A| arg.coarbitrary(result.clone()))
}

impl<A, R> Arbitrary for GeneratedFn<A, R>
where
    A: CoArbitrary + Clone + Send + Sync + 'static,
    R: Arbitrary,
{
    fn arbitrary() -> Gen<Self> {
        function(R::arbitrary())
    }
}
