//! Built-in specs and family factories.
//!
//! Scalars get their static instances. `Option` and `Box` are handled by
//! family factories that produce the same values, from the same seeds, as
//! the static `Option<T>` and `Box<T>` instances would for the resolved
//! argument spec.

use quickgen_core::Gen;

use super::{FamilyInstance, TypeInstanceRegistry};
use crate::error::ArbitraryError;
use crate::reflect::{TypeShape, BOX_FAMILY, OPTION_FAMILY};
use crate::spec::{ArbitrarySpec, ErasedSpec};
use crate::synth::{product_co_generator, sum_co_generator};

pub(super) fn install(registry: &TypeInstanceRegistry) {
    registry.register(ArbitrarySpec::<bool>::of());
    registry.register(ArbitrarySpec::<char>::of());
    registry.register(ArbitrarySpec::<String>::of());
    registry.register(ArbitrarySpec::<f32>::of());
    registry.register(ArbitrarySpec::<f64>::of());
    registry.register(ArbitrarySpec::<i8>::of());
    registry.register(ArbitrarySpec::<i16>::of());
    registry.register(ArbitrarySpec::<i32>::of());
    registry.register(ArbitrarySpec::<i64>::of());
    registry.register(ArbitrarySpec::<isize>::of());
    registry.register(ArbitrarySpec::<u8>::of());
    registry.register(ArbitrarySpec::<u16>::of());
    registry.register(ArbitrarySpec::<u32>::of());
    registry.register(ArbitrarySpec::<u64>::of());
    registry.register(ArbitrarySpec::<usize>::of());
    registry.register_family(OPTION_FAMILY, option_family);
    registry.register_family(BOX_FAMILY, box_family);
}

fn shape_mismatch(instance: &FamilyInstance<'_>) -> ArbitraryError {
    ArbitraryError::UnhandledType {
        type_name: instance.key().name(),
    }
}

/// `None` one time in four, otherwise `Some` at the ambient size.
fn option_family(instance: &FamilyInstance<'_>) -> Result<ErasedSpec, ArbitraryError> {
    let inner = instance.single_arg(OPTION_FAMILY)?;
    let TypeShape::Sum(sum) = instance.shape() else {
        return Err(shape_mismatch(instance));
    };
    let [none, some] = sum.cases() else {
        return Err(shape_mismatch(instance));
    };

    let make_none = none.constructor();
    let make_some = some.constructor();
    let inner_gen = inner.generator().clone();
    let generator = Gen::new(move |size, seed| {
        let (left, right) = seed.split();
        if left.range(0_u8, 3).0 == 0 {
            make_none(Vec::new())
        } else {
            make_some(vec![inner_gen.run(size, right)])
        }
    });
    let co_generator = sum_co_generator(sum.cases(), &[Vec::new(), vec![inner.clone()]]);
    Ok(ErasedSpec::new(instance.key().name(), generator, co_generator))
}

/// The argument's generator at the same size, boxed.
fn box_family(instance: &FamilyInstance<'_>) -> Result<ErasedSpec, ArbitraryError> {
    let inner = instance.single_arg(BOX_FAMILY)?;
    let TypeShape::Product(product) = instance.shape() else {
        return Err(shape_mismatch(instance));
    };

    let construct = product.constructor();
    let generator = inner
        .generator()
        .clone()
        .map(move |value| construct(vec![value]));
    let co_generator = product
        .visitor()
        .and_then(|visit| product_co_generator(visit, std::slice::from_ref(inner)));
    Ok(ErasedSpec::new(instance.key().name(), generator, co_generator))
}
