//! Combinator library built on the generator algebra.
//!
//! Constructors that can be given an unusable description (empty choice
//! sets, zero total weight, inverted ranges) return `Result` and fail at
//! construction time, before any value is drawn.

use std::fmt::Debug;

use rand::distributions::uniform::SampleUniform;

use super::{Gen, Size};
use crate::error::GenError;
use crate::seed::Seed;

/// Uniform value in the inclusive range `[lo, hi]`.
///
/// # Errors
///
/// Returns [`GenError::InvalidRange`] if `lo > hi`.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::gen::choose;
/// use quickgen_core::Seed;
///
/// let dice = choose(1_u8, 6).unwrap();
/// let roll = dice.run(0, Seed::from_u64(9));
/// assert!((1..=6).contains(&roll));
///
/// assert!(choose(6_u8, 1).is_err());
/// ```
pub fn choose<T>(lo: T, hi: T) -> Result<Gen<T>, GenError>
where
    T: SampleUniform + PartialOrd + Copy + Debug + Send + Sync + 'static,
{
    if lo > hi {
        return Err(GenError::InvalidRange {
            lo: format!("{:?}", lo),
            hi: format!("{:?}", hi),
        });
    }
    Ok(Gen::new(move |_, seed| seed.range(lo, hi).0))
}

/// Uniform pick from a non-empty list of values.
///
/// # Errors
///
/// Returns [`GenError::EmptyChoices`] if `xs` is empty.
pub fn elements<T>(xs: Vec<T>) -> Result<Gen<T>, GenError>
where
    T: Clone + Send + Sync + 'static,
{
    let last = xs
        .len()
        .checked_sub(1)
        .ok_or(GenError::EmptyChoices {
            combinator: "elements",
        })?;
    Ok(Gen::new(move |_, seed| {
        let (index, _) = seed.range(0, last);
        xs[index].clone()
    }))
}

/// Uniform choice among generators.
///
/// The index is drawn from the left half of a split and the chosen
/// generator runs on the right half.
///
/// # Errors
///
/// Returns [`GenError::EmptyChoices`] if `gens` is empty.
pub fn one_of<T: 'static>(gens: Vec<Gen<T>>) -> Result<Gen<T>, GenError> {
    let last = gens
        .len()
        .checked_sub(1)
        .ok_or(GenError::EmptyChoices { combinator: "one_of" })?;
    Ok(Gen::new(move |size, seed| {
        let (left, right) = seed.split();
        let (index, _) = left.range(0, last);
        gens[index].run(size, right)
    }))
}

/// Weighted choice among generators.
///
/// Draws `n` uniformly in `[1, total]` and picks the first entry whose
/// running cumulative weight reaches `n`. Entries are scanned in the order
/// given, so that order is the tie-break order. Zero-weight entries are
/// never picked.
///
/// # Errors
///
/// - [`GenError::EmptyChoices`] if `weighted` is empty
/// - [`GenError::NonPositiveWeight`] if all weights are zero
///
/// # Examples
///
/// ```rust
/// use quickgen_core::gen::{frequency, Gen};
/// use quickgen_core::Seed;
///
/// let mostly_true = frequency(vec![(9, Gen::pure(true)), (1, Gen::pure(false))]).unwrap();
/// let _ = mostly_true.run(0, Seed::from_u64(1));
///
/// assert!(frequency(vec![(0, Gen::pure(true))]).is_err());
/// ```
pub fn frequency<T: 'static>(weighted: Vec<(u32, Gen<T>)>) -> Result<Gen<T>, GenError> {
    if weighted.is_empty() {
        return Err(GenError::EmptyChoices {
            combinator: "frequency",
        });
    }
    let total: u64 = weighted.iter().map(|(w, _)| u64::from(*w)).sum();
    if total == 0 {
        return Err(GenError::NonPositiveWeight { total });
    }
    Ok(Gen::new(move |size, seed| {
        let (left, right) = seed.split();
        let (n, _) = left.range(1, total);
        pick_weighted(&weighted, n).run(size, right)
    }))
}

fn pick_weighted<T>(weighted: &[(u32, Gen<T>)], n: u64) -> &Gen<T> {
    let mut cumulative = 0_u64;
    for (weight, gen) in weighted {
        cumulative += u64::from(*weight);
        if cumulative >= n {
            return gen;
        }
    }
    // n <= total, so the scan always stops above; the last entry is the
    // only one whose cumulative weight can equal total.
    &weighted[weighted.len() - 1].1
}

/// Runs every generator in order, each on its own sub-seed.
///
/// The output has the same length as `gens`, and position `i` holds the
/// value produced by `gens[i]`.
pub fn sequence<T: 'static>(gens: Vec<Gen<T>>) -> Gen<Vec<T>> {
    Gen::new(move |size, seed| {
        gens.iter()
            .zip(seed.splits())
            .map(|(gen, s)| gen.run(size, s))
            .collect()
    })
}

/// Exactly `n` independent values from `g`.
pub fn vector<T: 'static>(g: Gen<T>, n: usize) -> Gen<Vec<T>> {
    Gen::new(move |size, seed| run_vector(&g, n, size, seed))
}

fn run_vector<T: 'static>(g: &Gen<T>, n: usize, size: Size, seed: Seed) -> Vec<T> {
    seed.splits().take(n).map(|s| g.run(size, s)).collect()
}

/// A list whose length is drawn uniformly from `[0, size]`.
pub fn list_of<T: 'static>(g: Gen<T>) -> Gen<Vec<T>> {
    Gen::new(move |size, seed| {
        let (left, right) = seed.split();
        let (len, _) = left.range(0, size);
        run_vector(&g, len, size, right)
    })
}

/// A list whose length is drawn uniformly from `[1, max(size, 1)]`.
pub fn non_empty_list_of<T: 'static>(g: Gen<T>) -> Gen<Vec<T>> {
    Gen::new(move |size, seed| {
        let (left, right) = seed.split();
        let (len, _) = left.range(1, size.max(1));
        run_vector(&g, len, size, right)
    })
}

macro_rules! tuple_gen {
    ($(#[$meta:meta])* $name:ident; $($g:ident: $t:ident),+) => {
        $(#[$meta])*
        pub fn $name<$($t: 'static),+>($($g: Gen<$t>),+) -> Gen<($($t,)+)> {
            Gen::new(move |size, seed| {
                let mut seeds = seed.splits();
                ($($g.run(size, seeds.next_seed()),)+)
            })
        }
    };
}

tuple_gen!(
    /// Pair of independent values, drawn in declared order.
    tuple2; a: A, b: B
);
tuple_gen!(
    /// Triple of independent values, drawn in declared order.
    tuple3; a: A, b: B, c: C
);
tuple_gen!(
    /// 4-tuple of independent values, drawn in declared order.
    tuple4; a: A, b: B, c: C, d: D
);
tuple_gen!(
    /// 5-tuple of independent values, drawn in declared order.
    tuple5; a: A, b: B, c: C, d: D, e: E
);
tuple_gen!(
    /// 6-tuple of independent values, drawn in declared order.
    tuple6; a: A, b: B, c: C, d: D, e: E, f: F
);
