//! # Generator Algebra
//!
//! A [`Gen<T>`] is a pure function from `(Size, Seed)` to a `T`. Generators
//! are immutable once built; every operation here returns a *new* generator
//! that composes the old ones.
//!
//! ## Seed Discipline
//!
//! - [`Gen::map`] passes size and seed through untouched.
//! - [`Gen::bind`] splits the seed: the first generator runs on the left
//!   half, the continuation on the right half. Both sides see the same size.
//! - Multi-generator combinators ([`sequence`], [`vector`], `tupleN`) give
//!   each component its own term of [`Seed::splits`].
//!
//! No seed is ever used for two draws.
//!
//! ## Usage Example
//!
//! ```rust
//! use quickgen_core::gen::{choose, Gen};
//! use quickgen_core::Seed;
//!
//! // A pair whose second component is never below the first
//! let ordered = choose(0_i32, 10)
//!     .unwrap()
//!     .bind(|lo| choose(lo, 20).unwrap().map(move |hi| (lo, hi)));
//!
//! let (lo, hi) = ordered.run(10, Seed::from_u64(42));
//! assert!(lo <= hi);
//! ```

mod combinators;

pub use combinators::{
    choose, elements, frequency, list_of, non_empty_list_of, one_of, sequence, tuple2, tuple3,
    tuple4, tuple5, tuple6, vector,
};

use std::fmt;
use std::sync::Arc;

use crate::seed::Seed;

/// Ambient size bounding the magnitude and depth of generated values.
pub type Size = usize;

/// Minimum number of attempts made by [`Gen::such_that`], whatever the size.
pub const SUCH_THAT_MIN_TRIES: usize = 10;

/// A generator of random `T` values.
///
/// Cloning is cheap (the underlying function is reference counted), and a
/// `Gen<T>` is `Send + Sync`, so one generator may be evaluated from many
/// threads at once with different seeds.
pub struct Gen<T> {
    run: Arc<dyn Fn(Size, Seed) -> T + Send + Sync>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Gen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gen")
            .field("output", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Gen<T> {
    /// Wraps a function of `(size, seed)` as a generator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::gen::Gen;
    /// use quickgen_core::Seed;
    ///
    /// let size_echo = Gen::new(|size, _seed| size);
    /// assert_eq!(size_echo.run(7, Seed::from_u64(0)), 7);
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed) -> T + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Evaluates the generator at the given size and seed.
    #[inline]
    pub fn run(&self, size: Size, seed: Seed) -> T {
        (self.run)(size, seed)
    }

    /// A generator that ignores size and seed and always yields `value`.
    pub fn pure(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Gen::new(move |_, _| value.clone())
    }

    /// Transforms every generated value with `f`.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Gen::new(move |size, seed| f(self.run(size, seed)))
    }

    /// Sequences this generator with a continuation that depends on its value.
    ///
    /// The seed is split before delegating: `self` runs on the left half and
    /// the generator returned by `k` on the right half, both at the same size.
    pub fn bind<U, F>(self, k: F) -> Gen<U>
    where
        U: 'static,
        F: Fn(T) -> Gen<U> + Send + Sync + 'static,
    {
        Gen::new(move |size, seed| {
            let (left, right) = seed.split();
            let value = self.run(size, left);
            k(value).run(size, right)
        })
    }

    /// Runs this generator at a fixed size, ignoring the ambient one.
    pub fn resize(self, size: Size) -> Gen<T> {
        Gen::new(move |_, seed| self.run(size, seed))
    }

    /// Runs this generator at `f(ambient size)`.
    pub fn scale<F>(self, f: F) -> Gen<T>
    where
        F: Fn(Size) -> Size + Send + Sync + 'static,
    {
        Gen::new(move |size, seed| self.run(f(size), seed))
    }

    /// Perturbs the seed seen by this generator. See [`variant`].
    pub fn variant(self, v: u64) -> Gen<T> {
        variant(v, self)
    }

    /// Pairs this generator with another, each on an independent sub-stream.
    pub fn zip<U: 'static>(self, other: Gen<U>) -> Gen<(T, U)> {
        tuple2(self, other)
    }

    /// Keeps only values satisfying `predicate`.
    ///
    /// Attempt `i` runs at size `size + i`, so a predicate that is hard to
    /// satisfy at small sizes gets larger inputs. After
    /// `max(size, SUCH_THAT_MIN_TRIES)` failed attempts the result is `None`;
    /// evaluation therefore always terminates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_core::gen::choose;
    /// use quickgen_core::Seed;
    ///
    /// let even = choose(0_u32, 100).unwrap().such_that(|n| n % 2 == 0);
    /// if let Some(n) = even.run(50, Seed::from_u64(3)) {
    ///     assert_eq!(n % 2, 0);
    /// }
    /// ```
    pub fn such_that<P>(self, predicate: P) -> Gen<Option<T>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Gen::new(move |size, seed| {
            let tries = size.max(SUCH_THAT_MIN_TRIES);
            seed.splits()
                .take(tries)
                .enumerate()
                .map(|(attempt, s)| self.run(size.saturating_add(attempt), s))
                .find(|value| predicate(value))
        })
    }
}

/// Builds a generator from the ambient size.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::gen::{sized, vector, Gen};
/// use quickgen_core::Seed;
///
/// let as_long_as_size = sized(|size| vector(Gen::pure(true), size));
/// assert_eq!(as_long_as_size.run(4, Seed::from_u64(0)).len(), 4);
/// ```
pub fn sized<T, F>(f: F) -> Gen<T>
where
    T: 'static,
    F: Fn(Size) -> Gen<T> + Send + Sync + 'static,
{
    Gen::new(move |size, seed| f(size).run(size, seed))
}

/// Runs `g` at the seed perturbed by index `v` (see [`Seed::variant`]).
///
/// Different indices give, with overwhelming probability, unrelated output
/// streams. All co-generators are compositions of this primitive.
///
/// Cost grows linearly with `v` on every run; keep indices small (see the
/// performance note on [`Seed::variant`]).
pub fn variant<T: 'static>(v: u64, g: Gen<T>) -> Gen<T> {
    Gen::new(move |size, seed| g.run(size, seed.variant(v)))
}
