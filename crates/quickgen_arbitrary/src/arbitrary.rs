//! Statically dispatched generators for standard types.
//!
//! [`Arbitrary`] is the compile-time counterpart of the registry: it
//! fixes one canonical generator per type. All integer generators draw
//! uniformly from `[-size, size]`, clamped to the type's range (unsigned
//! types use `[0, size]`). Floats are a standard normal scaled by size.

use quickgen_core::gen::{list_of, tuple2, tuple3, tuple4, tuple5, tuple6};
use quickgen_core::{Gen, Seed};
use rand::distributions::Standard;
use rand_distr::StandardNormal;

/// Types with a canonical generator.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::Arbitrary;
/// use quickgen_core::Seed;
///
/// let n = i32::arbitrary().run(10, Seed::from_u64(1));
/// assert!((-10..=10).contains(&n));
/// ```
pub trait Arbitrary: Sized + Send + 'static {
    /// Returns the canonical generator for `Self`.
    fn arbitrary() -> Gen<Self>;
}

/// Probability, out of four, that a generated `char` is printable ASCII.
const ASCII_CHAR_ODDS: u8 = 3;

impl Arbitrary for bool {
    fn arbitrary() -> Gen<Self> {
        Gen::new(|_, seed| seed.range(0_u8, 1).0 == 1)
    }
}

macro_rules! arbitrary_signed {
    ($($t:ty),* $(,)?) => {$(
        impl Arbitrary for $t {
            fn arbitrary() -> Gen<Self> {
                Gen::new(|size, seed| {
                    let bound = i128::try_from(size).unwrap_or(i128::MAX);
                    let lo = (-bound).max(<$t>::MIN as i128);
                    let hi = bound.min(<$t>::MAX as i128);
                    seed.range(lo, hi).0 as $t
                })
            }
        }
    )*};
}

macro_rules! arbitrary_unsigned {
    ($($t:ty),* $(,)?) => {$(
        impl Arbitrary for $t {
            fn arbitrary() -> Gen<Self> {
                Gen::new(|size, seed| {
                    let hi = (size as u128).min(<$t>::MAX as u128);
                    seed.range(0_u128, hi).0 as $t
                })
            }
        }
    )*};
}

arbitrary_signed!(i8, i16, i32, i64, i128, isize);
arbitrary_unsigned!(u8, u16, u32, u64, u128, usize);

impl Arbitrary for f64 {
    fn arbitrary() -> Gen<Self> {
        Gen::new(|size, seed| {
            let (z, _): (f64, Seed) = seed.sample(&StandardNormal);
            z * size as f64
        })
    }
}

impl Arbitrary for f32 {
    fn arbitrary() -> Gen<Self> {
        f64::arbitrary().map(|x| x as f32)
    }
}

impl Arbitrary for char {
    fn arbitrary() -> Gen<Self> {
        Gen::new(|_, seed| {
            let (left, right) = seed.split();
            if left.range(0_u8, 3).0 < ASCII_CHAR_ODDS {
                right.range(' ', '~').0
            } else {
                right.sample(&Standard).0
            }
        })
    }
}

impl Arbitrary for String {
    fn arbitrary() -> Gen<Self> {
        list_of(char::arbitrary()).map(|chars| chars.into_iter().collect())
    }
}

impl Arbitrary for () {
    fn arbitrary() -> Gen<Self> {
        Gen::pure(())
    }
}

impl<T: Arbitrary> Arbitrary for Option<T> {
    fn arbitrary() -> Gen<Self> {
        let inner = T::arbitrary();
        Gen::new(move |size, seed| {
            let (left, right) = seed.split();
            if left.range(0_u8, 3).0 == 0 {
                None
            } else {
                Some(inner.run(size, right))
            }
        })
    }
}

impl<T: Arbitrary, E: Arbitrary> Arbitrary for Result<T, E> {
    fn arbitrary() -> Gen<Self> {
        let ok = T::arbitrary();
        let err = E::arbitrary();
        Gen::new(move |size, seed| {
            let (left, right) = seed.split();
            if left.range(0_u8, 1).0 == 0 {
                Ok(ok.run(size, right))
            } else {
                Err(err.run(size, right))
            }
        })
    }
}

impl<T: Arbitrary> Arbitrary for Vec<T> {
    fn arbitrary() -> Gen<Self> {
        list_of(T::arbitrary())
    }
}

impl<T: Arbitrary> Arbitrary for Box<T> {
    fn arbitrary() -> Gen<Self> {
        T::arbitrary().map(Box::new)
    }
}

macro_rules! arbitrary_tuple {
    ($combine:ident: $($t:ident),+) => {
        impl<$($t: Arbitrary),+> Arbitrary for ($($t,)+) {
            fn arbitrary() -> Gen<Self> {
                $combine($($t::arbitrary()),+)
            }
        }
    };
}

arbitrary_tuple!(tuple2: A, B);
arbitrary_tuple!(tuple3: A, B, C);
arbitrary_tuple!(tuple4: A, B, C, D);
arbitrary_tuple!(tuple5: A, B, C, D, E);
arbitrary_tuple!(tuple6: A, B, C, D, E, F);
