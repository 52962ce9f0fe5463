//! Co-generators: perturbing a seed by a value.
//!
//! A co-generator maps a value and a seed to a new seed, so that any result
//! generator run on the perturbed seed depends deterministically on the
//! value. Encodings are prefix-free compositions of [`Seed::variant`]:
//!
//! - unsigned magnitudes are written as base-16 digits, least significant
//!   first, each as `variant(digit + 1)`, then a `variant(0)` terminator;
//! - signed integers prefix the magnitude with `variant(0)` for
//!   non-negative and `variant(1)` for negative values;
//! - sequences write `variant(1)` before each element and `variant(0)` at
//!   the end;
//! - sums write the case index, then the fields of that case.
//!
//! Different values therefore perturb a seed along different paths, which
//! is what makes generated functions vary with their argument.

use quickgen_core::{Gen, Seed};

/// Bits consumed per magnitude digit.
const DIGIT_BITS: u32 = 4;
const DIGIT_MASK: u64 = (1 << DIGIT_BITS) - 1;

/// Types whose values can perturb a generator's seed.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{Arbitrary, CoArbitrary};
/// use quickgen_core::Seed;
///
/// let result = u64::arbitrary();
/// let seed = Seed::from_u64(9);
/// let a = 3_u8.coarbitrary(result.clone()).run(1_000, seed);
/// let b = 3_u8.coarbitrary(result).run(1_000, seed);
/// assert_eq!(a, b);
/// ```
pub trait CoArbitrary {
    /// Returns `seed` perturbed by this value.
    fn perturb(&self, seed: Seed) -> Seed;

    /// Runs `gen` on seeds perturbed by this value.
    fn coarbitrary<R: 'static>(&self, gen: Gen<R>) -> Gen<R>
    where
        Self: Clone + Send + Sync + 'static,
    {
        let value = self.clone();
        Gen::new(move |size, seed| gen.run(size, value.perturb(seed)))
    }
}

/// Perturbs `seed` by an unsigned magnitude.
pub fn perturb_magnitude(magnitude: u64, seed: Seed) -> Seed {
    let mut rest = magnitude;
    let mut seed = seed;
    loop {
        seed = seed.variant((rest & DIGIT_MASK) + 1);
        rest >>= DIGIT_BITS;
        if rest == 0 {
            break;
        }
    }
    seed.variant(0)
}

/// Perturbs `seed` by a signed integer.
pub fn perturb_signed(value: i64, seed: Seed) -> Seed {
    let sign = u64::from(value < 0);
    perturb_magnitude(value.unsigned_abs(), seed.variant(sign))
}

/// Perturbs `seed` by each element in turn, then closes the sequence.
pub fn perturb_sequence<'a, T, I>(items: I, seed: Seed) -> Seed
where
    T: CoArbitrary + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let seed = items
        .into_iter()
        .fold(seed, |seed, item| item.perturb(seed.variant(1)));
    seed.variant(0)
}

impl CoArbitrary for bool {
    fn perturb(&self, seed: Seed) -> Seed {
        seed.variant(u64::from(*self))
    }
}

macro_rules! coarbitrary_unsigned {
    ($($t:ty),* $(,)?) => {$(
        impl CoArbitrary for $t {
            fn perturb(&self, seed: Seed) -> Seed {
                perturb_magnitude(*self as u64, seed)
            }
        }
    )*};
}

macro_rules! coarbitrary_signed {
    ($($t:ty),* $(,)?) => {$(
        impl CoArbitrary for $t {
            fn perturb(&self, seed: Seed) -> Seed {
                perturb_signed(*self as i64, seed)
            }
        }
    )*};
}

coarbitrary_unsigned!(u8, u16, u32, u64, usize);
coarbitrary_signed!(i8, i16, i32, i64, isize);

impl CoArbitrary for char {
    fn perturb(&self, seed: Seed) -> Seed {
        perturb_magnitude(u64::from(*self), seed)
    }
}

impl CoArbitrary for f64 {
    fn perturb(&self, seed: Seed) -> Seed {
        perturb_magnitude(self.to_bits(), seed)
    }
}

impl CoArbitrary for f32 {
    fn perturb(&self, seed: Seed) -> Seed {
        perturb_magnitude(u64::from(self.to_bits()), seed)
    }
}

impl CoArbitrary for () {
    fn perturb(&self, seed: Seed) -> Seed {
        seed
    }
}

impl CoArbitrary for String {
    fn perturb(&self, seed: Seed) -> Seed {
        let chars: Vec<char> = self.chars().collect();
        perturb_sequence(&chars, seed)
    }
}

impl<T: CoArbitrary> CoArbitrary for Vec<T> {
    fn perturb(&self, seed: Seed) -> Seed {
        perturb_sequence(self, seed)
    }
}

impl<T: CoArbitrary> CoArbitrary for Box<T> {
    fn perturb(&self, seed: Seed) -> Seed {
        (**self).perturb(seed)
    }
}

impl<T: CoArbitrary> CoArbitrary for Option<T> {
    fn perturb(&self, seed: Seed) -> Seed {
        match self {
            None => seed.variant(0),
            Some(value) => value.perturb(seed.variant(1)),
        }
    }
}

impl<T: CoArbitrary, E: CoArbitrary> CoArbitrary for Result<T, E> {
    fn perturb(&self, seed: Seed) -> Seed {
        match self {
            Ok(value) => value.perturb(seed.variant(0)),
            Err(err) => err.perturb(seed.variant(1)),
        }
    }
}

macro_rules! coarbitrary_tuple {
    ($($t:ident $idx:tt),+) => {
        impl<$($t: CoArbitrary),+> CoArbitrary for ($($t,)+) {
            fn perturb(&self, seed: Seed) -> Seed {
                $(let seed = self.$idx.perturb(seed);)+
                seed
            }
        }
    };
}

coarbitrary_tuple!(A 0, B 1);
coarbitrary_tuple!(A 0, B 1, C 2);
coarbitrary_tuple!(A 0, B 1, C 2, D 3);
coarbitrary_tuple!(A 0, B 1, C 2, D 3, E 4);
coarbitrary_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
