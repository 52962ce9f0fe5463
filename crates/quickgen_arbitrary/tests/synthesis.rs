//! Integration tests for structural synthesis.
//!
//! Every type here is described with the reflection macros only; its
//! generator and co-generator are derived by a local registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quickgen_arbitrary::{
    reflect_product, reflect_sum, ArbitraryError, ArbitrarySpec, Reflect, TypeInstanceRegistry,
    TypeShape, WeightPolicy,
};
use quickgen_core::gen::choose;
use quickgen_core::{ErrorKind, Gen, Seed};

#[derive(Debug, Clone, PartialEq)]
enum Tree {
    Leaf,
    Node(Box<Tree>, Box<Tree>),
}

reflect_sum!(Tree {
    Leaf,
    Node(left: Box<Tree>, right: Box<Tree>),
});

impl Tree {
    fn depth(&self) -> usize {
        match self {
            Tree::Leaf => 0,
            Tree::Node(left, right) => 1 + left.depth().max(right.depth()),
        }
    }
}

#[allow(dead_code)]
#[derive(Debug)]
enum Chain {
    End(i32),
    Link(Box<Chain>),
}

reflect_sum!(Chain {
    End(value: i32),
    Link(next: Box<Chain>),
});

#[derive(Debug)]
struct Rose {
    label: u8,
    children: Vec<Rose>,
}

reflect_product!(Rose { label: u8, children: Vec<Rose> });

impl Rose {
    fn count(&self) -> usize {
        1 + self.children.iter().map(Rose::count).sum::<usize>()
    }

    /// Largest possible node count at `size`: each field runs at
    /// `size / 2 - 1`, which bounds both the child count and their size.
    fn max_count(size: usize) -> usize {
        let budget = (size / 2).saturating_sub(1);
        if budget == 0 {
            1
        } else {
            1 + budget * Rose::max_count(budget)
        }
    }
}

#[derive(Debug)]
enum Even {
    Zero,
    Succ(Box<Odd>),
}

#[derive(Debug)]
enum Odd {
    Succ(Box<Even>),
}

reflect_sum!(Even {
    Zero,
    Succ(pred: Box<Odd>),
});

reflect_sum!(Odd {
    Succ(pred: Box<Even>),
});

fn even_value(even: &Even) -> usize {
    match even {
        Even::Zero => 0,
        Even::Succ(odd) => 1 + odd_value(odd),
    }
}

fn odd_value(odd: &Odd) -> usize {
    match odd {
        Odd::Succ(even) => 1 + even_value(even),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Reading {
    sensor: u16,
    value: i32,
}

reflect_product!(Reading { sensor: u16, value: i32 });

#[derive(Debug)]
struct Wide {
    id: u128,
}

reflect_product!(Wide { id: u128 });

/// Opaque label registered without a co-generator.
#[derive(Debug, Clone, PartialEq)]
struct Token(u8);

impl Reflect for Token {
    fn shape() -> TypeShape {
        TypeShape::Opaque
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
enum Knot {
    Tip(Token),
    Twist(Box<Knot>),
}

reflect_sum!(Knot {
    Tip(token: Token),
    Twist(inner: Box<Knot>),
});

/// Counts how many times the value it guards is dropped.
struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
#[derive(Debug)]
enum Bough {
    Bud(Token),
    Fork(Box<Bough>, Box<Bough>),
}

reflect_sum!(Bough {
    Bud(token: Token),
    Fork(left: Box<Bough>, right: Box<Bough>),
});

fn tokens() -> ArbitrarySpec<Token> {
    ArbitrarySpec::from_generator(choose(0_u8, 9).unwrap().map(Token))
}

#[test]
fn test_binary_tree_terminates_at_every_size() {
    let registry = TypeInstanceRegistry::with_builtins();
    let trees = registry.resolve::<Tree>().unwrap();
    for size in [0_usize, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 100, 1_000] {
        for i in 0..40 {
            let tree = trees.generator().run(size, Seed::from_u64(i));
            assert!(tree.depth() <= size.max(1), "depth {} at size {}", tree.depth(), size);
        }
    }
}

#[test]
fn test_binary_tree_is_leaf_at_size_zero() {
    let registry = TypeInstanceRegistry::with_builtins();
    let trees = registry.resolve::<Tree>().unwrap();
    for i in 0..100 {
        assert_eq!(trees.generator().run(0, Seed::from_u64(i)), Tree::Leaf);
    }
}

#[test]
fn test_binary_tree_grows_with_size() {
    let registry = TypeInstanceRegistry::with_builtins();
    let trees = registry.resolve::<Tree>().unwrap();
    let deepest = (0..200)
        .map(|i| trees.generator().run(100, Seed::from_u64(i)).depth())
        .max()
        .unwrap();
    assert!(deepest >= 2);
}

#[test]
fn test_transitive_policy_keeps_recursion_out_of_size_zero() {
    let registry = TypeInstanceRegistry::with_builtins();
    let chains = registry.resolve::<Chain>().unwrap();
    for i in 0..100 {
        let chain = chains.generator().run(0, Seed::from_u64(i));
        assert!(matches!(chain, Chain::End(_)), "{:?}", chain);
    }
}

#[test]
fn test_immediate_policy_treats_boxed_recursion_as_flat() {
    let registry =
        TypeInstanceRegistry::with_builtins().with_weight_policy(WeightPolicy::Immediate);
    let chains = registry.resolve::<Chain>().unwrap();
    let links = (0..100)
        .filter(|&i| matches!(chains.generator().run(0, Seed::from_u64(i)), Chain::Link(_)))
        .count();
    assert!(links > 0);
}

#[test]
fn test_recursion_through_array() {
    let registry = TypeInstanceRegistry::with_builtins();
    let roses = registry.resolve::<Rose>().unwrap();
    for size in [0_usize, 4, 16, 64] {
        for i in 0..20 {
            let rose = roses.generator().run(size, Seed::from_u64(i));
            assert!(rose.count() <= Rose::max_count(size));
            assert!(usize::from(rose.label) <= size);
        }
    }
    let at_zero = roses.generator().run(0, Seed::from_u64(3));
    assert!(at_zero.children.is_empty());
}

#[test]
fn test_mutual_recursion() {
    let registry = TypeInstanceRegistry::with_builtins();
    let evens = registry.resolve::<Even>().unwrap();
    let odds = registry.resolve::<Odd>().unwrap();
    for i in 0..50 {
        let seed = Seed::from_u64(i);
        assert_eq!(even_value(&evens.generator().run(20, seed)) % 2, 0);
        assert_eq!(odd_value(&odds.generator().run(20, seed)) % 2, 1);
    }
}

#[test]
fn test_product_fields_come_from_registered_specs() {
    let registry = TypeInstanceRegistry::with_builtins();
    registry.register(ArbitrarySpec::from_generator(
        choose(-1_000_i32, 1_000).unwrap().map(|n| n * 2),
    ));
    registry.register(ArbitrarySpec::from_generator(choose(7_u16, 9).unwrap()));

    let readings = registry.resolve::<Vec<Reading>>().unwrap();
    for i in 0..30 {
        for reading in readings.generator().run(40, Seed::from_u64(i)) {
            assert_eq!(reading.value % 2, 0);
            assert!((7..=9).contains(&reading.sensor));
        }
    }
}

#[test]
fn test_field_budget_shrinks_with_field_count() {
    let registry = TypeInstanceRegistry::with_builtins();
    let spec = registry.resolve::<(bool, i32, Vec<bool>)>().unwrap();
    for i in 0..50 {
        // Three fields at size 5 leave each field a budget of 0.
        let (_, n, flags) = spec.generator().run(5, Seed::from_u64(i));
        assert_eq!(n, 0);
        assert!(flags.is_empty());
    }
}

#[test]
fn test_opaque_field_is_unhandled() {
    let registry = TypeInstanceRegistry::with_builtins();
    let err = registry.resolve::<Wide>().unwrap_err();
    assert_eq!(err, ArbitraryError::UnhandledType { type_name: "u128" });
    assert_eq!(err.kind(), ErrorKind::Configuration);

    registry.register(ArbitrarySpec::from_generator(choose(0_u128, 10).unwrap()));
    let wide = registry.resolve::<Wide>().unwrap();
    assert!(wide.generator().run(10, Seed::from_u64(0)).id <= 10);
}

#[test]
fn test_synthesised_functions_over_recursive_type() {
    let registry = TypeInstanceRegistry::with_builtins();
    let trees = registry.resolve::<Tree>().unwrap();
    let f = trees
        .function(choose(0_u64, u64::MAX).unwrap())
        .unwrap()
        .run(20, Seed::from_u64(11));

    let leaf = Tree::Leaf;
    let small = Tree::Node(Box::new(Tree::Leaf), Box::new(Tree::Leaf));
    let skewed = Tree::Node(Box::new(small.clone()), Box::new(Tree::Leaf));
    let mirrored = Tree::Node(Box::new(Tree::Leaf), Box::new(small.clone()));

    assert_eq!(f.call(&small), f.call(&small.clone()));
    let outputs = [f.call(&leaf), f.call(&small), f.call(&skewed), f.call(&mirrored)];
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_function_needs_co_generator() {
    let registry = TypeInstanceRegistry::with_builtins();
    registry.register(ArbitrarySpec::from_generator(choose(0_u16, 3).unwrap()));
    let readings = registry.resolve::<Reading>().unwrap();
    assert!(readings.co_generator().is_none());

    let err = readings.function(choose(0_u8, 1).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplementedCapability);
    assert!(matches!(
        err,
        ArbitraryError::NotImplementedCapability { type_name, .. } if type_name.ends_with("Reading")
    ));
}

#[test]
fn test_wrappers_of_recursive_type_without_co_generator() {
    let registry = TypeInstanceRegistry::with_builtins();
    registry.register(tokens());

    let knots = registry.resolve::<Knot>().unwrap();
    assert!(knots.co_generator().is_none());
    let _ = knots.generator().run(10, Seed::from_u64(1));

    let boxed = registry.resolve::<Box<Knot>>().unwrap();
    assert!(boxed.co_generator().is_none());
    let err = boxed.function(choose(0_u8, 1).unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotImplementedCapability);

    let optional = registry.resolve::<Option<Knot>>().unwrap();
    assert!(optional.co_generator().is_none());
    let listed = registry.resolve::<Vec<Knot>>().unwrap();
    assert!(listed.co_generator().is_none());
}

#[test]
fn test_wrapper_resolved_before_recursive_type_has_no_co_generator() {
    let registry = TypeInstanceRegistry::with_builtins();
    registry.register(tokens());

    let boxed = registry.resolve::<Box<Knot>>().unwrap();
    assert!(boxed.co_generator().is_none());
    assert!(registry.resolve::<Knot>().unwrap().co_generator().is_none());
    let _ = boxed.generator().run(10, Seed::from_u64(2));
}

#[test]
fn test_wrapper_of_recursive_type_with_co_generator() {
    let registry = TypeInstanceRegistry::with_builtins();
    let boxed = registry.resolve::<Box<Tree>>().unwrap();
    let f = boxed
        .function(choose(0_u64, u64::MAX).unwrap())
        .unwrap()
        .run(20, Seed::from_u64(5));
    let small = Box::new(Tree::Node(Box::new(Tree::Leaf), Box::new(Tree::Leaf)));
    assert_eq!(f.call(&small), f.call(&small.clone()));
    assert_ne!(f.call(&small), f.call(&Box::new(Tree::Leaf)));
}

#[test]
fn test_recursive_specs_freed_with_their_owners() {
    let drops = Arc::new(AtomicUsize::new(0));
    let guard = DropCounter(Arc::clone(&drops));
    let registry = TypeInstanceRegistry::with_builtins();
    registry.register(ArbitrarySpec::from_generator(Gen::new(move |_, _| {
        let _guard = &guard;
        Token(7)
    })));

    let mut held = None;
    for round in 0..3_u64 {
        let boughs = registry.resolve::<Bough>().unwrap();
        let _ = boughs.generator().run(20, Seed::from_u64(round));
        let _ = registry.resolve::<Box<Bough>>().unwrap();
        registry.register(ArbitrarySpec::from_generator(choose(0_u16, 3).unwrap()));
        held = Some(boughs);
    }

    drop(registry);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    // A resolved spec stays usable after its registry is gone.
    let boughs = held.unwrap();
    let _ = boughs.generator().run(30, Seed::from_u64(9));

    drop(boughs);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}
