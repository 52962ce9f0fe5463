//! Type instance registry.
//!
//! Maps type keys to specs. Lookups read an immutable snapshot; writers
//! build a new snapshot and swap it in, so resolution never blocks on
//! registration and never observes a half-applied update.
//!
//! # Resolution
//!
//! [`TypeInstanceRegistry::resolve`] tries, in order: an exact spec
//! (registered, or derived by an earlier resolution), the factory of the
//! type's family, then structural synthesis (see [`crate::synth`]). Specs
//! derived along the way are published in one batch when the resolution
//! succeeds. Any registration discards derived specs, so later
//! resolutions observe the override.
//!
//! # Global registry
//!
//! [`TypeInstanceRegistry::global`] is initialised on first use with the
//! built-in specs. The free functions [`register`], [`register_family`]
//! and [`resolve`] operate on it.

mod builtins;

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, trace, warn};

use crate::error::ArbitraryError;
use crate::reflect::{Reflect, TypeKey, TypeShape};
use crate::spec::{ArbitrarySpec, ErasedSpec};
use crate::synth::{Resolution, SpecSource, WeightPolicy};

/// Builds the spec of one instance of a generic family.
pub type FamilyFactory =
    Arc<dyn Fn(&FamilyInstance<'_>) -> Result<ErasedSpec, ArbitraryError> + Send + Sync>;

/// What a family factory is given: the instance's key and shape, and the
/// resolved specs of its type arguments.
pub struct FamilyInstance<'a> {
    key: &'a TypeKey,
    args: &'a [ErasedSpec],
    shape: &'a TypeShape,
}

impl<'a> FamilyInstance<'a> {
    pub(crate) fn new(key: &'a TypeKey, args: &'a [ErasedSpec], shape: &'a TypeShape) -> Self {
        Self { key, args, shape }
    }

    /// Key of the instantiated type.
    pub fn key(&self) -> &TypeKey {
        self.key
    }

    /// Resolved specs of the type arguments, in declared order.
    pub fn args(&self) -> &[ErasedSpec] {
        self.args
    }

    /// Shape of the instantiated type.
    pub fn shape(&self) -> &TypeShape {
        self.shape
    }

    /// The only type argument.
    ///
    /// # Errors
    ///
    /// `FamilyArity` unless exactly one argument was supplied.
    pub fn single_arg(&self, family: &'static str) -> Result<&ErasedSpec, ArbitraryError> {
        match self.args {
            [arg] => Ok(arg),
            _ => Err(ArbitraryError::FamilyArity {
                family,
                expected: 1,
                actual: self.args.len(),
            }),
        }
    }
}

#[derive(Clone, Default)]
struct Snapshot {
    generation: u64,
    registered: HashMap<TypeId, ErasedSpec>,
    families: HashMap<&'static str, FamilyFactory>,
    derived: HashMap<TypeId, ErasedSpec>,
}

impl SpecSource for Snapshot {
    fn exact(&self, id: TypeId) -> Option<ErasedSpec> {
        self.registered
            .get(&id)
            .or_else(|| self.derived.get(&id))
            .cloned()
    }

    fn family(&self, name: &str) -> Option<FamilyFactory> {
        self.families.get(name).cloned()
    }
}

/// Registry of specs by type.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{ArbitrarySpec, TypeInstanceRegistry};
/// use quickgen_core::gen::choose;
/// use quickgen_core::Seed;
///
/// let registry = TypeInstanceRegistry::with_builtins();
/// let evens = choose(-50_i32, 50).unwrap().map(|n| n * 2);
/// registry.register(ArbitrarySpec::from_generator(evens));
///
/// let spec = registry.resolve::<Vec<i32>>().unwrap();
/// let values = spec.generator().run(20, Seed::from_u64(4));
/// assert!(values.iter().all(|n| n % 2 == 0));
/// ```
pub struct TypeInstanceRegistry {
    snapshot: RwLock<Arc<Snapshot>>,
    weight_policy: WeightPolicy,
}

impl Default for TypeInstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeInstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("TypeInstanceRegistry")
            .field("registered", &snapshot.registered.len())
            .field("families", &snapshot.families.len())
            .field("derived", &snapshot.derived.len())
            .field("weight_policy", &self.weight_policy)
            .finish()
    }
}

impl TypeInstanceRegistry {
    /// An empty registry: no specs, no families.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            weight_policy: WeightPolicy::default(),
        }
    }

    /// A registry holding the built-in specs and families.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtins::install(&registry);
        registry
    }

    /// The process-wide registry, initialised with the built-ins on first use.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<TypeInstanceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::with_builtins)
    }

    /// Sets the case classification used by synthesis.
    pub fn with_weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    /// Case classification used by synthesis.
    pub fn weight_policy(&self) -> WeightPolicy {
        self.weight_policy
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Applies `update` to a copy of the current snapshot and swaps it in.
    ///
    /// The upgradable lock admits one writer at a time while readers keep
    /// using the current snapshot.
    fn modify<F>(&self, update: F)
    where
        F: FnOnce(&mut Snapshot) -> bool,
    {
        let guard = self.snapshot.upgradable_read();
        let mut next = Snapshot::clone(&guard);
        if update(&mut next) {
            let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
            *guard = Arc::new(next);
        }
    }

    /// Registers `spec` as the spec of `T`, replacing any previous one.
    ///
    /// Derived specs are discarded.
    pub fn register<T: Send + 'static>(&self, spec: ArbitrarySpec<T>) {
        debug!(
            type_name = spec.type_name(),
            co_generator = spec.co_generator().is_some(),
            "Registering spec"
        );
        let erased = spec.erase();
        self.modify(|next| {
            next.registered.insert(TypeId::of::<T>(), erased);
            next.derived.clear();
            next.generation += 1;
            true
        });
    }

    /// Registers the factory for every instance of `family`.
    ///
    /// Derived specs are discarded.
    pub fn register_family<F>(&self, family: &'static str, factory: F)
    where
        F: Fn(&FamilyInstance<'_>) -> Result<ErasedSpec, ArbitraryError> + Send + Sync + 'static,
    {
        debug!(family, "Registering family factory");
        let factory: FamilyFactory = Arc::new(factory);
        self.modify(|next| {
            next.families.insert(family, factory);
            next.derived.clear();
            next.generation += 1;
            true
        });
    }

    /// The exact spec stored for `key`, registered or derived.
    pub fn lookup(&self, key: &TypeKey) -> Option<ErasedSpec> {
        self.snapshot().exact(key.id())
    }

    /// Whether a factory is registered under `family`.
    pub fn has_family(&self, family: &str) -> bool {
        self.snapshot().families.contains_key(family)
    }

    /// Resolves the spec of `T`.
    ///
    /// # Errors
    ///
    /// `UnhandledType` if `T`, or any type reachable from its shape, has no
    /// registered spec, no family factory and an opaque shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quickgen_arbitrary::{ArbitraryError, TypeInstanceRegistry};
    ///
    /// let registry = TypeInstanceRegistry::with_builtins();
    /// assert!(registry.resolve::<(bool, Option<u8>)>().is_ok());
    ///
    /// let empty = TypeInstanceRegistry::new();
    /// assert!(matches!(
    ///     empty.resolve::<u8>(),
    ///     Err(ArbitraryError::UnhandledType { .. })
    /// ));
    /// ```
    pub fn resolve<T: Reflect>(&self) -> Result<ArbitrarySpec<T>, ArbitraryError> {
        Ok(self.resolve_key(&TypeKey::of::<T>())?.typed::<T>())
    }

    /// Resolves the erased spec of `key`.
    ///
    /// # Errors
    ///
    /// As [`TypeInstanceRegistry::resolve`].
    pub fn resolve_key(&self, key: &TypeKey) -> Result<ErasedSpec, ArbitraryError> {
        let snapshot = self.snapshot();
        if let Some(spec) = snapshot.exact(key.id()) {
            trace!(type_name = key.name(), "Spec cache hit");
            return Ok(spec);
        }

        let mut resolution = Resolution::new(snapshot.as_ref(), self.weight_policy);
        match resolution.resolve(key) {
            Ok(spec) => {
                let derived = resolution.into_derived();
                let spec = derived.get(&key.id()).cloned().unwrap_or(spec);
                self.publish(snapshot.generation, derived);
                Ok(spec)
            }
            Err(err) => {
                warn!(type_name = key.name(), error = %err, "Spec resolution failed");
                Err(err)
            }
        }
    }

    /// Stores derived specs unless a registration happened since `generation`.
    fn publish(&self, generation: u64, derived: HashMap<TypeId, ErasedSpec>) {
        let count = derived.len();
        self.modify(|next| {
            if next.generation != generation {
                debug!(count, "Discarding specs derived from a stale snapshot");
                return false;
            }
            for (id, spec) in derived {
                next.derived.entry(id).or_insert(spec);
            }
            true
        });
        trace!(count, "Published derived specs");
    }
}

/// Registers `spec` in the global registry.
pub fn register<T: Send + 'static>(spec: ArbitrarySpec<T>) {
    TypeInstanceRegistry::global().register(spec);
}

/// Registers a family factory in the global registry.
pub fn register_family<F>(family: &'static str, factory: F)
where
    F: Fn(&FamilyInstance<'_>) -> Result<ErasedSpec, ArbitraryError> + Send + Sync + 'static,
{
    TypeInstanceRegistry::global().register_family(family, factory);
}

/// Resolves the spec of `T` in the global registry.
///
/// # Errors
///
/// As [`TypeInstanceRegistry::resolve`].
pub fn resolve<T: Reflect>() -> Result<ArbitrarySpec<T>, ArbitraryError> {
    TypeInstanceRegistry::global().resolve::<T>()
}
