//! Structural synthesis of specs from type shapes.
//!
//! A [`Resolution`] resolves one requested type key against a fixed view of
//! the registry. Each key is tried in order:
//!
//! 1. an exact spec (registered, or derived by an earlier resolution);
//! 2. a family factory, after resolving the key's type arguments;
//! 3. synthesis from the key's [`TypeShape`].
//!
//! Synthesised generators divide the size budget as they descend:
//!
//! - arrays draw a length in `[0, size]` and elements at the ambient size;
//! - products run each field at `(size / field_count) - 1` (saturating);
//! - sums pick uniformly among candidate cases and run the chosen case at
//!   `size / candidate_count`. At size zero the candidates are only the
//!   cases of minimal [`StructuralWeight`], so recursion bottoms out.
//!
//! Recursive types resolve through forward references: while a key is
//! being built, any nested request for the same key receives a spec that
//! defers to the finished one. A forward reference offers a co-generator
//! until the finished spec is known to lack one, in which case the key is
//! built again with references that offer none.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use quickgen_core::gen::{list_of, sequence};
use quickgen_core::{Gen, Seed, Size};
use tracing::{debug, warn};

use crate::dynamic::DynValue;
use crate::error::ArbitraryError;
use crate::reflect::{
    ArrayShape, CaseShape, Construct, ProductShape, SumShape, TypeKey, TypeShape, Visit,
};
use crate::registry::{FamilyFactory, FamilyInstance};
use crate::spec::{ErasedCoGen, ErasedSpec};

/// Classification of a sum case by how it refers back to its own type.
///
/// Only the ordering matters: at size zero a sum picks among its cases of
/// minimal weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructuralWeight {
    /// No fields.
    Nullary = 0,
    /// Fields, none of which reach the enclosing sum type.
    Flat = 1,
    /// At least one field reaches the enclosing sum type.
    Recursive = 2,
}

/// How far case classification looks for the enclosing sum type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WeightPolicy {
    /// Only a field whose type is the sum type itself counts as recursive.
    Immediate,
    /// A field counts as recursive if the sum type occurs anywhere in the
    /// closure of its shape, including through `Box`, `Option` or `Vec`.
    #[default]
    Transitive,
}

/// Weight of a case of `sum` with the given field types.
pub fn case_weight(sum: &TypeKey, fields: &[TypeKey], policy: WeightPolicy) -> StructuralWeight {
    if fields.is_empty() {
        StructuralWeight::Nullary
    } else if fields
        .iter()
        .any(|field| reaches(field, sum.id(), policy))
    {
        StructuralWeight::Recursive
    } else {
        StructuralWeight::Flat
    }
}

/// Whether `target` occurs in `field` under `policy`.
fn reaches(field: &TypeKey, target: TypeId, policy: WeightPolicy) -> bool {
    match policy {
        WeightPolicy::Immediate => field.id() == target,
        WeightPolicy::Transitive => {
            let mut visited = HashSet::new();
            let mut pending = vec![field.clone()];
            while let Some(key) = pending.pop() {
                if key.id() == target {
                    return true;
                }
                if visited.insert(key.id()) {
                    pending.extend(key.shape().children());
                }
            }
            false
        }
    }
}

/// Size budget of each field of a product with `field_count` fields.
pub fn field_budget(size: Size, field_count: usize) -> Size {
    if field_count == 0 {
        size
    } else {
        (size / field_count).saturating_sub(1)
    }
}

/// Read access to the specs a resolution may reuse.
pub(crate) trait SpecSource {
    /// Exact spec for a type, registered or previously derived.
    fn exact(&self, id: TypeId) -> Option<ErasedSpec>;

    /// Factory registered under a family name.
    fn family(&self, name: &str) -> Option<FamilyFactory>;
}

/// Cell holding the finished spec of a type while references to it exist.
type Slot = Arc<OnceLock<ErasedSpec>>;

/// Slots a spec reaches through forward references, by type.
type Anchors = HashMap<TypeId, Slot>;

struct Pending {
    slot: Slot,
    forwarded: bool,
}

struct Derived {
    spec: ErasedSpec,
    anchors: Anchors,
}

/// One top-level resolution.
///
/// Forward references only hold weak handles on their slot. The specs
/// handed out by [`Resolution::into_derived`] own every slot they reach, so
/// a recursive spec is freed once nothing outside refers to it.
pub(crate) struct Resolution<'a, S: SpecSource> {
    source: &'a S,
    policy: WeightPolicy,
    in_progress: HashMap<TypeId, Pending>,
    resolved: HashMap<TypeId, Derived>,
    order: Vec<TypeId>,
    without_co: HashSet<TypeId>,
    frames: Vec<Anchors>,
}

impl<'a, S: SpecSource> Resolution<'a, S> {
    pub(crate) fn new(source: &'a S, policy: WeightPolicy) -> Self {
        Self {
            source,
            policy,
            in_progress: HashMap::new(),
            resolved: HashMap::new(),
            order: Vec::new(),
            without_co: HashSet::new(),
            frames: Vec::new(),
        }
    }

    /// Specs derived during this resolution, for publication.
    pub(crate) fn into_derived(self) -> HashMap<TypeId, ErasedSpec> {
        self.resolved
            .into_iter()
            .map(|(id, derived)| (id, anchored(derived.spec, derived.anchors)))
            .collect()
    }

    /// Resolves `key`.
    ///
    /// The returned spec may contain forward references; callers outside
    /// this resolution take it from [`Resolution::into_derived`] instead.
    pub(crate) fn resolve(&mut self, key: &TypeKey) -> Result<ErasedSpec, ArbitraryError> {
        let id = key.id();
        if let Some(spec) = self.source.exact(id) {
            return Ok(spec);
        }
        if let Some(derived) = self.resolved.get(&id) {
            let spec = derived.spec.clone();
            let anchors = derived.anchors.clone();
            self.anchor(anchors);
            return Ok(spec);
        }
        if let Some(pending) = self.in_progress.get_mut(&id) {
            pending.forwarded = true;
            let slot = Arc::clone(&pending.slot);
            let with_co = !self.without_co.contains(&id);
            let reference = forward_reference(key.name(), &slot, with_co);
            self.anchor(HashMap::from([(id, slot)]));
            return Ok(reference);
        }

        loop {
            let slot: Slot = Arc::new(OnceLock::new());
            self.in_progress.insert(
                id,
                Pending {
                    slot: Arc::clone(&slot),
                    forwarded: false,
                },
            );
            let mark = self.order.len();
            self.frames.push(Anchors::new());
            let built = self.build(key);
            let anchors = self.frames.pop().unwrap_or_default();
            let forwarded = self
                .in_progress
                .remove(&id)
                .is_some_and(|pending| pending.forwarded);

            let spec = built?;
            // Specs built around a forward reference assumed a co-generator.
            if spec.co_generator().is_none() && forwarded && self.without_co.insert(id) {
                debug!(
                    type_name = key.name(),
                    "Rebuilding recursive spec without a co-generator"
                );
                for stale in self.order.drain(mark..) {
                    self.resolved.remove(&stale);
                }
                continue;
            }

            let _ = slot.set(spec.clone());
            self.anchor(anchors.clone());
            self.resolved.insert(
                id,
                Derived {
                    spec: spec.clone(),
                    anchors,
                },
            );
            self.order.push(id);
            return Ok(spec);
        }
    }

    /// Records that the spec under construction reaches `anchors`.
    fn anchor(&mut self, anchors: Anchors) {
        if let Some(frame) = self.frames.last_mut() {
            frame.extend(anchors);
        }
    }

    fn build(&mut self, key: &TypeKey) -> Result<ErasedSpec, ArbitraryError> {
        let shape = key.shape();

        if let Some(family) = key.family() {
            if let Some(factory) = self.source.family(family) {
                let args = key
                    .args()
                    .iter()
                    .map(|arg| self.resolve(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(
                    type_name = key.name(),
                    family,
                    arity = args.len(),
                    "Instantiating family factory"
                );
                return factory(&FamilyInstance::new(key, &args, &shape));
            }
        }

        debug!(
            type_name = key.name(),
            shape = shape.kind(),
            "Synthesising spec from shape"
        );
        match &shape {
            TypeShape::Array(array) => self.synthesise_array(key, array),
            TypeShape::Product(product) => self.synthesise_product(key, product),
            TypeShape::Sum(sum) => self.synthesise_sum(key, sum),
            TypeShape::Opaque => {
                warn!(type_name = key.name(), "No spec and no structure to synthesise from");
                Err(ArbitraryError::UnhandledType {
                    type_name: key.name(),
                })
            }
        }
    }

    fn resolve_all(&mut self, keys: &[TypeKey]) -> Result<Vec<ErasedSpec>, ArbitraryError> {
        keys.iter().map(|key| self.resolve(key)).collect()
    }

    fn synthesise_array(
        &mut self,
        key: &TypeKey,
        array: &ArrayShape,
    ) -> Result<ErasedSpec, ArbitraryError> {
        let element = self.resolve(array.element())?;
        let collect = array.collector();
        let generator = list_of(element.generator().clone()).map(move |items| collect(items));
        let co_generator = element
            .co_generator()
            .cloned()
            .map(|element_co| array_co_generator(array.visitor(), element_co));
        Ok(ErasedSpec::new(key.name(), generator, co_generator))
    }

    fn synthesise_product(
        &mut self,
        key: &TypeKey,
        product: &ProductShape,
    ) -> Result<ErasedSpec, ArbitraryError> {
        let fields = self.resolve_all(product.fields())?;
        let generator = product_generator(&fields, product.constructor());
        let co_generator = product.visitor().and_then(|visit| product_co_generator(visit, &fields));
        Ok(ErasedSpec::new(key.name(), generator, co_generator))
    }

    fn synthesise_sum(&mut self, key: &TypeKey, sum: &SumShape) -> Result<ErasedSpec, ArbitraryError> {
        let mut case_fields = Vec::with_capacity(sum.cases().len());
        let mut weights = Vec::with_capacity(sum.cases().len());
        for case in sum.cases() {
            case_fields.push(self.resolve_all(case.fields())?);
            weights.push(case_weight(key, case.fields(), self.policy));
        }

        let Some(minimum) = weights.iter().copied().min() else {
            warn!(type_name = key.name(), "Sum type has no cases");
            return Err(ArbitraryError::UnhandledType {
                type_name: key.name(),
            });
        };
        let base: Vec<usize> = (0..weights.len())
            .filter(|&index| weights[index] == minimum)
            .collect();
        debug!(
            type_name = key.name(),
            cases = weights.len(),
            base_cases = base.len(),
            "Classified sum cases"
        );

        let case_gens: Vec<Gen<DynValue>> = sum
            .cases()
            .iter()
            .zip(&case_fields)
            .map(|(case, fields)| product_generator(fields, case.constructor()))
            .collect();
        let generator = sum_generator(case_gens, base);
        let co_generator = sum_co_generator(sum.cases(), &case_fields);
        Ok(ErasedSpec::new(key.name(), generator, co_generator))
    }
}

/// Spec that defers to the one eventually stored in `slot`.
///
/// Only a weak handle is kept, so a finished spec stored in its own slot
/// does not keep itself alive.
fn forward_reference(type_name: &'static str, slot: &Slot, with_co: bool) -> ErasedSpec {
    let gen_slot = Arc::downgrade(slot);
    let generator = Gen::new(move |size, seed| {
        match gen_slot.upgrade().as_deref().and_then(OnceLock::get) {
            Some(spec) => spec.generator().run(size, seed),
            None => panic!("`{type_name}` was generated outside the resolution that defined it"),
        }
    });
    let co_generator = with_co.then(|| {
        let co_slot = Arc::downgrade(slot);
        let co: ErasedCoGen = Arc::new(move |value: &dyn Any, seed: Seed| {
            match co_slot
                .upgrade()
                .as_deref()
                .and_then(OnceLock::get)
                .and_then(|spec| spec.co_generator())
            {
                Some(co) => co(value, seed),
                None => panic!("`{type_name}` does not provide a co-generator"),
            }
        });
        co
    });
    ErasedSpec::new(type_name, generator, co_generator)
}

/// `spec`, owning the slots its forward references point at.
fn anchored(spec: ErasedSpec, anchors: Anchors) -> ErasedSpec {
    if anchors.is_empty() {
        return spec;
    }
    let anchors: Arc<Vec<Slot>> = Arc::new(anchors.into_values().collect());

    let inner = spec.generator().clone();
    let held = Arc::clone(&anchors);
    let generator = Gen::new(move |size, seed| {
        let _anchors = &held;
        inner.run(size, seed)
    });
    let co_generator = spec.co_generator().cloned().map(|inner_co| {
        let co: ErasedCoGen = Arc::new(move |value: &dyn Any, seed: Seed| {
            let _anchors = &anchors;
            inner_co(value, seed)
        });
        co
    });
    ErasedSpec::new(spec.type_name(), generator, co_generator)
}

/// Draws every field in declared order at the field budget, then constructs.
pub(crate) fn product_generator(fields: &[ErasedSpec], construct: Construct) -> Gen<DynValue> {
    let count = fields.len();
    let drawn = sequence(fields.iter().map(|field| field.generator().clone()).collect());
    Gen::new(move |size, seed| construct(drawn.run(field_budget(size, count), seed)))
}

/// Picks a case uniformly among the candidates for the current size.
fn sum_generator(cases: Vec<Gen<DynValue>>, base: Vec<usize>) -> Gen<DynValue> {
    let all: Vec<usize> = (0..cases.len()).collect();
    Gen::new(move |size, seed| {
        let candidates = if size == 0 { &base } else { &all };
        let (left, right) = seed.split();
        let (pick, _) = left.range(0, candidates.len() - 1);
        cases[candidates[pick]].run(size / candidates.len(), right)
    })
}

/// Co-generators of every field, or `None` if any is missing.
fn field_co_generators(fields: &[ErasedSpec]) -> Option<Vec<ErasedCoGen>> {
    fields
        .iter()
        .map(|field| field.co_generator().cloned())
        .collect()
}

/// Perturbs by each element, as sequences do.
fn array_co_generator(visit: Visit, element_co: ErasedCoGen) -> ErasedCoGen {
    Arc::new(move |value: &dyn Any, seed: Seed| {
        let mut seed = seed;
        visit(value, &mut |element: &dyn Any| {
            seed = element_co(element, seed.variant(1));
        });
        seed.variant(0)
    })
}

/// Perturbs by each field in declared order.
pub(crate) fn product_co_generator(visit: Visit, fields: &[ErasedSpec]) -> Option<ErasedCoGen> {
    let field_cos = field_co_generators(fields)?;
    Some(Arc::new(move |value: &dyn Any, seed: Seed| {
        let mut seed = seed;
        let mut index = 0;
        visit(value, &mut |field: &dyn Any| {
            if let Some(co) = field_cos.get(index) {
                seed = co(field, seed);
            }
            index += 1;
        });
        seed
    }))
}

/// Perturbs by the case index, then by the case's fields.
///
/// `None` unless every case has a matcher and every field a co-generator.
pub(crate) fn sum_co_generator(
    cases: &[CaseShape],
    case_fields: &[Vec<ErasedSpec>],
) -> Option<ErasedCoGen> {
    let matchers = cases
        .iter()
        .map(|case| case.matcher())
        .collect::<Option<Vec<_>>>()?;
    let field_cos = case_fields
        .iter()
        .map(|fields| field_co_generators(fields))
        .collect::<Option<Vec<_>>>()?;
    let unmatched = cases.len() as u64;

    Some(Arc::new(move |value: &dyn Any, seed: Seed| {
        let Some(index) = matchers
            .iter()
            .position(|matcher| matcher(value, &mut |_: &dyn Any| {}))
        else {
            return seed.variant(unmatched);
        };
        let mut seed = seed.variant(index as u64);
        let mut field = 0;
        matchers[index](value, &mut |part: &dyn Any| {
            if let Some(co) = field_cos[index].get(field) {
                seed = co(part, seed);
            }
            field += 1;
        });
        seed
    }))
}
