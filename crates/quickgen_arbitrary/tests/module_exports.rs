//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths.

/// Test that the registry module is accessible via absolute path.
#[test]
fn test_registry_module_exports() {
    use quickgen_arbitrary::registry::{
        register, resolve, FamilyFactory, FamilyInstance, TypeInstanceRegistry,
    };

    let registry = TypeInstanceRegistry::with_builtins();
    assert!(registry.resolve::<Option<u8>>().is_ok());
    let _: Option<FamilyFactory> = None;
    let _: Option<FamilyInstance<'_>> = None;
    let _ = (register::<u8>, resolve::<u8>);
}

/// Test that the reflection and synthesis modules are accessible via absolute path.
#[test]
fn test_reflect_and_synth_exports() {
    use quickgen_arbitrary::reflect::{
        CaseBuilder, ProductBuilder, Reflect, SumBuilder, TypeKey, TypeShape, BOX_FAMILY,
        OPTION_FAMILY,
    };
    use quickgen_arbitrary::synth::{field_budget, StructuralWeight, WeightPolicy};

    let key = TypeKey::of::<Option<bool>>();
    assert_eq!(key.family(), Some(OPTION_FAMILY));
    assert_eq!(<Box<u8> as Reflect>::family(), Some(BOX_FAMILY));
    assert!(matches!(key.shape(), TypeShape::Sum(_)));
    assert_eq!(field_budget(10, 2), 4);
    assert!(StructuralWeight::Nullary < StructuralWeight::Recursive);
    assert_eq!(WeightPolicy::default(), WeightPolicy::Transitive);
    let _: Option<(CaseBuilder<u8>, ProductBuilder<u8>, SumBuilder<u8>)> = None;
}

/// Test that root re-exports resolve to the module items.
#[test]
fn test_root_reexports() {
    use quickgen_arbitrary::{
        function, perturb, promote, Arbitrary, ArbitraryError, ArbitrarySpec, CoArbitrary, CoGen,
        DynValue, ErasedCoGen, ErasedSpec, Fields, GeneratedFn,
    };
    use quickgen_core::{ErrorKind, Gen, Seed};

    let spec = ArbitrarySpec::<u8>::of();
    let erased: ErasedSpec = spec.clone().erase();
    assert_eq!(erased.type_name(), spec.type_name());

    let co: &CoGen<u8> = spec.co_generator().unwrap_or_else(|| unreachable!());
    let seed = Seed::from_u64(1);
    assert_eq!(co(&3, seed), 3_u8.perturb(seed));
    let _ = perturb(co, &3, u8::arbitrary()).run(5, seed);

    let _: Gen<GeneratedFn<u8, bool>> = function(bool::arbitrary());
    let _: Gen<GeneratedFn<u8, u8>> = promote(|a: &u8| Gen::pure(*a));
    let _: Option<(DynValue, ErasedCoGen, Fields)> = None;

    let err = ArbitraryError::UnhandledType { type_name: "u128" };
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
