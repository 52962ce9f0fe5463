//! # quickgen_core: Random Generation Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! quickgen_core is the bottom layer of the quickgen workspace, providing:
//! - A splittable random source (`seed`)
//! - The generator algebra `Gen<T>` with map/bind/pure (`gen`)
//! - The combinator library: choose, elements, one_of, frequency, sized,
//!   resize, sequence, vector, tuple2..tuple6 (`gen`)
//! - The `variant` seed perturbation underlying co-generators
//! - Configuration and batch evaluation (`config`, `eval`)
//!
//! Type-driven resolution (`Arbitrary`, the registry and structural
//! synthesis) lives in Layer 2, `quickgen_arbitrary`.
//!
//! ## Usage Example
//!
//! ```rust
//! use quickgen_core::gen::{choose, list_of, tuple2, Gen};
//! use quickgen_core::{evaluate, Seed};
//!
//! let pair = tuple2(choose(-5_i32, 5).unwrap(), list_of(Gen::pure(true)));
//!
//! let seed = Seed::from_u64(42);
//! let (n, flags) = evaluate(&pair, 10, seed);
//! assert!((-5..=5).contains(&n));
//! assert!(flags.len() <= 10);
//!
//! // Same seed, same value
//! assert_eq!(evaluate(&pair, 10, seed), (n, flags));
//! ```
//!
//! ## Purity
//!
//! A generator is a pure function of `(size, seed)`. Nothing in this crate
//! holds mutable state during evaluation, so generators can be evaluated
//! concurrently from split seeds without synchronisation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod error;
pub mod eval;
pub mod gen;
pub mod seed;

pub use config::{ConfigError, GenConfig, GenConfigBuilder};
pub use error::{ErrorKind, GenError};
pub use eval::{evaluate, Evaluator};
pub use gen::{sized, variant, Gen, Size};
pub use seed::Seed;
