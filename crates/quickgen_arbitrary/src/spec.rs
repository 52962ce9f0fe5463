//! Generator and co-generator bundles.
//!
//! An [`ArbitrarySpec`] pairs a type's generator with an optional
//! co-generator. The registry stores specs in erased form
//! ([`ErasedSpec`]) and converts back with [`ErasedSpec::typed`].

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use quickgen_core::{Gen, Seed};

use crate::arbitrary::Arbitrary;
use crate::coarbitrary::CoArbitrary;
use crate::dynamic::{downcast_ref, unerase, DynValue};
use crate::error::ArbitraryError;
use crate::function::{promote, GeneratedFn};

/// A co-generator: perturbs a seed by a value.
pub type CoGen<T> = Arc<dyn Fn(&T, Seed) -> Seed + Send + Sync>;

/// A co-generator over erased values.
pub type ErasedCoGen = Arc<dyn Fn(&dyn Any, Seed) -> Seed + Send + Sync>;

/// Capability name reported when a co-generator is missing.
pub const CO_GENERATOR: &str = "co-generator";

/// A generator for `T`, with a co-generator when `T` supports one.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::ArbitrarySpec;
/// use quickgen_core::gen::Gen;
/// use quickgen_core::Seed;
///
/// let spec = ArbitrarySpec::<u8>::of();
/// assert!(spec.co_generator().is_some());
///
/// let constant = ArbitrarySpec::from_generator(Gen::pure(4_u8));
/// assert_eq!(constant.generator().run(10, Seed::from_u64(0)), 4);
/// assert!(constant.function(Gen::pure(true)).is_err());
/// ```
pub struct ArbitrarySpec<T> {
    type_name: &'static str,
    generator: Gen<T>,
    co_generator: Option<CoGen<T>>,
}

impl<T> Clone for ArbitrarySpec<T> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            generator: self.generator.clone(),
            co_generator: self.co_generator.clone(),
        }
    }
}

impl<T> fmt::Debug for ArbitrarySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbitrarySpec")
            .field("type_name", &self.type_name)
            .field("co_generator", &self.co_generator.is_some())
            .finish()
    }
}

impl<T: Send + 'static> ArbitrarySpec<T> {
    /// Bundles a generator with a co-generator.
    pub fn new<C>(generator: Gen<T>, co_generator: C) -> Self
    where
        C: Fn(&T, Seed) -> Seed + Send + Sync + 'static,
    {
        Self::from_generator(generator).with_co_generator(co_generator)
    }

    /// A spec with a generator and no co-generator.
    pub fn from_generator(generator: Gen<T>) -> Self {
        Self {
            type_name: type_name::<T>(),
            generator,
            co_generator: None,
        }
    }

    /// The canonical spec of a type with static instances.
    pub fn of() -> Self
    where
        T: Arbitrary + CoArbitrary,
    {
        Self::new(T::arbitrary(), |value: &T, seed: Seed| value.perturb(seed))
    }

    /// Replaces the co-generator.
    pub fn with_co_generator<C>(mut self, co_generator: C) -> Self
    where
        C: Fn(&T, Seed) -> Seed + Send + Sync + 'static,
    {
        let co_generator: CoGen<T> = Arc::new(co_generator);
        self.co_generator = Some(co_generator);
        self
    }

    /// Full name of `T`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The generator.
    pub fn generator(&self) -> &Gen<T> {
        &self.generator
    }

    /// The co-generator, if `T` has one.
    pub fn co_generator(&self) -> Option<&CoGen<T>> {
        self.co_generator.as_ref()
    }

    /// The co-generator, or `NotImplementedCapability` if there is none.
    pub fn require_co_generator(&self) -> Result<&CoGen<T>, ArbitraryError> {
        self.co_generator
            .as_ref()
            .ok_or(ArbitraryError::NotImplementedCapability {
                type_name: self.type_name,
                capability: CO_GENERATOR,
            })
    }

    /// Erases `T`, for storage in the registry.
    pub fn erase(self) -> ErasedSpec {
        let type_name = self.type_name;
        let generator = self.generator.map(|value| Box::new(value) as DynValue);
        let co_generator = self.co_generator.map(|co| {
            let erased: ErasedCoGen =
                Arc::new(move |value: &dyn Any, seed: Seed| co(downcast_ref::<T>(value), seed));
            erased
        });
        ErasedSpec {
            type_name,
            generator,
            co_generator,
        }
    }
}

impl<A: Clone + Send + Sync + 'static> ArbitrarySpec<A> {
    /// Generates functions from `A` to `R`.
    ///
    /// Each generated function is deterministic: it runs `result` on the
    /// captured seed perturbed by its argument, at the captured size.
    ///
    /// # Errors
    ///
    /// `NotImplementedCapability` if this spec has no co-generator.
    pub fn function<R: 'static>(
        &self,
        result: Gen<R>,
    ) -> Result<Gen<GeneratedFn<A, R>>, ArbitraryError> {
        let co = Arc::clone(self.require_co_generator()?);
        Ok(promote(move |arg: &A| perturb(&co, arg, result.clone())))
    }
}

/// Runs `gen` on seeds perturbed by `value` through `co`.
pub fn perturb<T, R>(co: &CoGen<T>, value: &T, gen: Gen<R>) -> Gen<R>
where
    T: Clone + Send + Sync + 'static,
    R: 'static,
{
    let co = Arc::clone(co);
    let value = value.clone();
    Gen::new(move |size, seed| gen.run(size, co(&value, seed)))
}

/// An [`ArbitrarySpec`] with its type erased.
#[derive(Clone)]
pub struct ErasedSpec {
    type_name: &'static str,
    generator: Gen<DynValue>,
    co_generator: Option<ErasedCoGen>,
}

impl fmt::Debug for ErasedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSpec")
            .field("type_name", &self.type_name)
            .field("co_generator", &self.co_generator.is_some())
            .finish()
    }
}

impl ErasedSpec {
    /// Assembles an erased spec from erased parts.
    ///
    /// `generator` must only produce values of the type named `type_name`.
    pub fn new(
        type_name: &'static str,
        generator: Gen<DynValue>,
        co_generator: Option<ErasedCoGen>,
    ) -> Self {
        Self {
            type_name,
            generator,
            co_generator,
        }
    }

    /// Full name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The erased generator.
    pub fn generator(&self) -> &Gen<DynValue> {
        &self.generator
    }

    /// The erased co-generator, if any.
    pub fn co_generator(&self) -> Option<&ErasedCoGen> {
        self.co_generator.as_ref()
    }

    /// Recovers the typed spec.
    ///
    /// # Panics
    ///
    /// The returned generator panics when run if this spec does not describe
    /// `T`.
    pub fn typed<T: Send + 'static>(&self) -> ArbitrarySpec<T> {
        let type_name = self.type_name;
        let generator = self
            .generator
            .clone()
            .map(move |value| unerase::<T>(value, type_name));
        let co_generator = self.co_generator.clone().map(|co| {
            let typed: CoGen<T> = Arc::new(move |value: &T, seed: Seed| co(value as &dyn Any, seed));
            typed
        });
        ArbitrarySpec {
            type_name,
            generator,
            co_generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickgen_core::gen::choose;

    #[test]
    fn test_of_uses_static_instances() {
        let spec = ArbitrarySpec::<i16>::of();
        let seed = Seed::from_u64(12);
        assert_eq!(spec.generator().run(30, seed), i16::arbitrary().run(30, seed));
        let co = spec.co_generator().unwrap();
        assert_eq!(co(&-4, seed), (-4_i16).perturb(seed));
        assert_eq!(spec.type_name(), "i16");
    }

    #[test]
    fn test_erase_round_trip() {
        let spec = ArbitrarySpec::<u32>::of();
        let typed = spec.clone().erase().typed::<u32>();
        for i in 0..20 {
            let seed = Seed::from_u64(i);
            assert_eq!(typed.generator().run(50, seed), spec.generator().run(50, seed));
            let co = typed.co_generator().unwrap();
            assert_eq!(co(&(i as u32), seed), (i as u32).perturb(seed));
        }
    }

    #[test]
    fn test_erased_co_generator_matches_typed() {
        let erased = ArbitrarySpec::<bool>::of().erase();
        let co = erased.co_generator().unwrap();
        let seed = Seed::from_u64(1);
        assert_eq!(co(&true, seed), true.perturb(seed));
    }

    #[test]
    fn test_missing_co_generator_reported() {
        let spec = ArbitrarySpec::from_generator(choose(0_u8, 9).unwrap());
        let err = spec.require_co_generator().err().unwrap();
        assert_eq!(
            err,
            ArbitraryError::NotImplementedCapability {
                type_name: "u8",
                capability: CO_GENERATOR,
            }
        );
        assert!(spec.erase().co_generator().is_none());
    }

    #[test]
    fn test_perturb_is_deterministic_per_value() {
        let spec = ArbitrarySpec::<u8>::of();
        let co = spec.co_generator().unwrap();
        let result = choose(0_u64, u64::MAX).unwrap();
        let seed = Seed::from_u64(99);
        let a = perturb(co, &1, result.clone()).run(1_000, seed);
        let b = perturb(co, &1, result.clone()).run(1_000, seed);
        let c = perturb(co, &2, result).run(1_000, seed);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic(expected = "type shape mismatch")]
    fn test_typed_with_wrong_type_panics_on_run() {
        let typed = ArbitrarySpec::<u8>::of().erase().typed::<i64>();
        let _ = typed.generator().run(1, Seed::from_u64(0));
    }
}
