//! # quickgen_arbitrary: Type-Driven Generators
//!
//! ## Layer 2 Role
//!
//! quickgen_arbitrary builds on the generator algebra of `quickgen_core` to
//! answer "give me a generator for this type":
//! - Static instances through the [`Arbitrary`] and [`CoArbitrary`] traits
//! - Runtime resolution through the [`TypeInstanceRegistry`], which serves
//!   registered specs, instantiates generic families and synthesises specs
//!   for any type with a structural [`TypeShape`]
//! - Random function generation ([`promote`], [`function`],
//!   [`ArbitrarySpec::function`])
//!
//! ## Usage Example
//!
//! ```rust
//! use quickgen_arbitrary::{reflect_sum, TypeInstanceRegistry};
//! use quickgen_core::Seed;
//!
//! #[derive(Debug)]
//! enum Tree {
//!     Leaf,
//!     Node(Box<Tree>, Box<Tree>),
//! }
//!
//! reflect_sum!(Tree {
//!     Leaf,
//!     Node(left: Box<Tree>, right: Box<Tree>),
//! });
//!
//! fn depth(tree: &Tree) -> usize {
//!     match tree {
//!         Tree::Leaf => 0,
//!         Tree::Node(left, right) => 1 + depth(left).max(depth(right)),
//!     }
//! }
//!
//! let registry = TypeInstanceRegistry::with_builtins();
//! let trees = registry.resolve::<Tree>().unwrap();
//! let tree = trees.generator().run(30, Seed::from_u64(7));
//! assert!(depth(&tree) <= 30);
//! ```
//!
//! ## Error Handling
//!
//! Resolution failures are reported as [`ArbitraryError`] values. A type
//! shape that describes one type and builds another is a programming error
//! and panics when the generator runs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod arbitrary;
pub mod coarbitrary;
pub mod dynamic;
pub mod error;
pub mod function;
pub mod reflect;
pub mod registry;
pub mod spec;
pub mod synth;

pub use arbitrary::Arbitrary;
pub use coarbitrary::CoArbitrary;
pub use dynamic::{DynValue, Fields};
pub use error::ArbitraryError;
pub use function::{function, promote, GeneratedFn};
pub use reflect::{CaseBuilder, ProductBuilder, Reflect, SumBuilder, TypeKey, TypeShape};
pub use registry::{
    register, register_family, resolve, FamilyFactory, FamilyInstance, TypeInstanceRegistry,
};
pub use spec::{perturb, ArbitrarySpec, CoGen, ErasedCoGen, ErasedSpec};
pub use synth::{StructuralWeight, WeightPolicy};
