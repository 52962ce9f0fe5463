//! Runtime type descriptions.
//!
//! A type opts into runtime resolution by implementing [`Reflect`], which
//! gives it a [`TypeKey`] (identity, name, generic family and arguments) and
//! a [`TypeShape`] (how to build and take apart its values):
//!
//! - [`TypeShape::Array`]: a homogeneous sequence of one element type
//! - [`TypeShape::Product`]: fixed fields drawn in declared order
//! - [`TypeShape::Sum`]: named cases, each a product
//! - [`TypeShape::Opaque`]: no structure; only a registered spec can help
//!
//! Shapes are normally written with the [`reflect_product!`] and
//! [`reflect_sum!`] macros, or by hand with the typed builders
//! [`TypeShape::product`], [`TypeShape::sum`] and [`TypeShape::array`].
//!
//! [`reflect_product!`]: crate::reflect_product
//! [`reflect_sum!`]: crate::reflect_sum

mod builtin;
mod macros;

#[cfg(test)]
mod tests;

pub use builtin::{BOX_FAMILY, OPTION_FAMILY};

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::dynamic::{downcast_ref, unerase, DynValue, Fields};

/// Types that can describe their own structure at runtime.
pub trait Reflect: Send + 'static {
    /// The structural description of `Self`.
    fn shape() -> TypeShape;

    /// Name of the generic family `Self` instantiates, if any.
    ///
    /// The registry dispatches family instances (such as every `Option<T>`)
    /// to a single factory registered under this name.
    fn family() -> Option<&'static str> {
        None
    }

    /// Type arguments of the family instance, in declared order.
    fn type_args() -> Vec<TypeKey> {
        Vec::new()
    }
}

/// Runtime identity of a reflected type.
///
/// Equality and hashing use the [`TypeId`] only.
#[derive(Clone)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    family: Option<&'static str>,
    args: Vec<TypeKey>,
    describe: fn() -> TypeShape,
}

impl TypeKey {
    /// The key of `T`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            family: T::family(),
            args: T::type_args(),
            describe: T::shape,
        }
    }

    /// The type's [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generic family name, if any.
    pub fn family(&self) -> Option<&'static str> {
        self.family
    }

    /// Family type arguments.
    pub fn args(&self) -> &[TypeKey] {
        &self.args
    }

    /// Builds the type's shape.
    pub fn shape(&self) -> TypeShape {
        (self.describe)()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Builds a value from drawn field values.
pub type Construct = Arc<dyn Fn(Vec<DynValue>) -> DynValue + Send + Sync>;

/// Calls the visitor on each part of a value, in declared order.
pub type Visit = Arc<dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any)) + Send + Sync>;

/// Visits the fields of a value if it belongs to a case; reports membership.
pub type Matcher = Arc<dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any)) -> bool + Send + Sync>;

/// Structural description of a type.
#[derive(Clone)]
pub enum TypeShape {
    /// Homogeneous sequence.
    Array(ArrayShape),
    /// Fixed ordered fields.
    Product(ProductShape),
    /// Named cases.
    Sum(SumShape),
    /// No usable structure.
    Opaque,
}

impl TypeShape {
    /// Starts describing a product type `T`.
    pub fn product<T: Send + 'static>() -> ProductBuilder<T> {
        ProductBuilder {
            fields: Vec::new(),
            visit: None,
            marker: PhantomData,
        }
    }

    /// Starts describing a sum type `T`.
    pub fn sum<T: Send + 'static>() -> SumBuilder<T> {
        SumBuilder {
            cases: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Describes a sequence type `T` of `E` elements.
    ///
    /// `collect` builds a `T` from elements; `elements` lists them back.
    pub fn array<T, E, C, D>(collect: C, elements: D) -> TypeShape
    where
        T: Send + 'static,
        E: Reflect,
        C: Fn(Vec<E>) -> T + Send + Sync + 'static,
        D: for<'a> Fn(&'a T) -> Vec<&'a E> + Send + Sync + 'static,
    {
        let owner = type_name::<T>();
        let collect: Construct = Arc::new(move |values: Vec<DynValue>| {
            let items = values
                .into_iter()
                .map(|value| unerase::<E>(value, owner))
                .collect();
            Box::new(collect(items)) as DynValue
        });
        let visit: Visit = Arc::new(move |value: &dyn Any, visitor: &mut dyn FnMut(&dyn Any)| {
            for element in elements(downcast_ref::<T>(value)) {
                visitor(element as &dyn Any);
            }
        });
        TypeShape::Array(ArrayShape {
            element: TypeKey::of::<E>(),
            collect,
            visit,
        })
    }

    /// Name of the shape form, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeShape::Array(_) => "array",
            TypeShape::Product(_) => "product",
            TypeShape::Sum(_) => "sum",
            TypeShape::Opaque => "opaque",
        }
    }

    /// Every type directly mentioned by this shape.
    pub fn children(&self) -> Vec<TypeKey> {
        match self {
            TypeShape::Array(array) => vec![array.element.clone()],
            TypeShape::Product(product) => product.fields.clone(),
            TypeShape::Sum(sum) => sum
                .cases
                .iter()
                .flat_map(|case| case.fields.iter().cloned())
                .collect(),
            TypeShape::Opaque => Vec::new(),
        }
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Array(array) => f.debug_tuple("Array").field(&array.element).finish(),
            TypeShape::Product(product) => f.debug_tuple("Product").field(&product.fields).finish(),
            TypeShape::Sum(sum) => {
                let mut cases = f.debug_map();
                for case in &sum.cases {
                    cases.entry(&case.name, &case.fields);
                }
                cases.finish()
            }
            TypeShape::Opaque => f.write_str("Opaque"),
        }
    }
}

/// A sequence shape.
#[derive(Clone)]
pub struct ArrayShape {
    element: TypeKey,
    collect: Construct,
    visit: Visit,
}

impl ArrayShape {
    /// Element type.
    pub fn element(&self) -> &TypeKey {
        &self.element
    }

    /// Builds the sequence from elements.
    pub fn collect(&self, elements: Vec<DynValue>) -> DynValue {
        (self.collect)(elements)
    }

    /// The erased sequence constructor.
    pub fn collector(&self) -> Construct {
        Arc::clone(&self.collect)
    }

    /// Calls `visitor` on every element of `value`.
    pub fn visit(&self, value: &dyn Any, visitor: &mut dyn FnMut(&dyn Any)) {
        (self.visit)(value, visitor)
    }

    /// The erased element visitor.
    pub fn visitor(&self) -> Visit {
        Arc::clone(&self.visit)
    }
}

/// A fixed-field shape.
#[derive(Clone)]
pub struct ProductShape {
    fields: Vec<TypeKey>,
    construct: Construct,
    visit: Option<Visit>,
}

impl ProductShape {
    /// Field types in declared order.
    pub fn fields(&self) -> &[TypeKey] {
        &self.fields
    }

    /// Builds a value from field values in declared order.
    pub fn construct(&self, values: Vec<DynValue>) -> DynValue {
        (self.construct)(values)
    }

    /// The erased constructor.
    pub fn constructor(&self) -> Construct {
        Arc::clone(&self.construct)
    }

    /// The erased field visitor, if the shape can take values apart.
    pub fn visitor(&self) -> Option<Visit> {
        self.visit.clone()
    }
}

/// A shape with named cases.
#[derive(Clone)]
pub struct SumShape {
    cases: Vec<CaseShape>,
}

impl SumShape {
    /// Cases in declared order.
    pub fn cases(&self) -> &[CaseShape] {
        &self.cases
    }

    /// Index of the case `value` belongs to.
    ///
    /// `None` if the shape has no matchers or none of them accepts `value`.
    pub fn case_index_of(&self, value: &dyn Any) -> Option<usize> {
        self.cases.iter().position(|case| case.matches(value))
    }
}

/// One case of a sum shape.
#[derive(Clone)]
pub struct CaseShape {
    name: &'static str,
    fields: Vec<TypeKey>,
    construct: Construct,
    matcher: Option<Matcher>,
}

impl CaseShape {
    /// Case name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Field types in declared order.
    pub fn fields(&self) -> &[TypeKey] {
        &self.fields
    }

    /// Builds a value of this case from field values.
    pub fn construct(&self, values: Vec<DynValue>) -> DynValue {
        (self.construct)(values)
    }

    /// The erased constructor.
    pub fn constructor(&self) -> Construct {
        Arc::clone(&self.construct)
    }

    /// The erased matcher, if the case can recognise its values.
    pub fn matcher(&self) -> Option<Matcher> {
        self.matcher.clone()
    }

    /// Whether `value` belongs to this case.
    pub fn matches(&self, value: &dyn Any) -> bool {
        match &self.matcher {
            Some(matcher) => matcher(value, &mut |_: &dyn Any| {}),
            None => false,
        }
    }
}

/// Typed builder for [`TypeShape::Product`].
///
/// # Examples
///
/// ```rust
/// use std::any::Any;
/// use quickgen_arbitrary::TypeShape;
///
/// struct Span {
///     start: u32,
///     len: u16,
/// }
///
/// let shape = TypeShape::product::<Span>()
///     .field::<u32>()
///     .field::<u16>()
///     .destructure(|span: &Span| vec![&span.start as &dyn Any, &span.len as &dyn Any])
///     .construct(|fields| Span {
///         start: fields.take(),
///         len: fields.take(),
///     });
/// assert_eq!(shape.kind(), "product");
/// assert_eq!(shape.children().len(), 2);
/// ```
pub struct ProductBuilder<T> {
    fields: Vec<TypeKey>,
    visit: Option<Visit>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> ProductBuilder<T> {
    /// Appends a field of type `F`.
    pub fn field<F: Reflect>(mut self) -> Self {
        self.fields.push(TypeKey::of::<F>());
        self
    }

    /// Lists a value's fields, in declared order, for co-generation.
    pub fn destructure<D>(mut self, destructure: D) -> Self
    where
        D: for<'a> Fn(&'a T) -> Vec<&'a dyn Any> + Send + Sync + 'static,
    {
        let visit: Visit = Arc::new(move |value: &dyn Any, visitor: &mut dyn FnMut(&dyn Any)| {
            for field in destructure(downcast_ref::<T>(value)) {
                visitor(field);
            }
        });
        self.visit = Some(visit);
        self
    }

    /// Finishes the shape with a constructor taking fields in declared order.
    pub fn construct<C>(self, construct: C) -> TypeShape
    where
        C: Fn(&mut Fields) -> T + Send + Sync + 'static,
    {
        TypeShape::Product(ProductShape {
            fields: self.fields,
            construct: erase_constructor(construct),
            visit: self.visit,
        })
    }
}

/// Typed builder for one case of a sum shape. See [`SumBuilder`].
pub struct CaseBuilder<T> {
    name: &'static str,
    fields: Vec<TypeKey>,
    matcher: Option<Matcher>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> CaseBuilder<T> {
    /// Starts a case called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            matcher: None,
            marker: PhantomData,
        }
    }

    /// Appends a field of type `F`.
    pub fn field<F: Reflect>(mut self) -> Self {
        self.fields.push(TypeKey::of::<F>());
        self
    }

    /// Recognises values of this case, listing their fields in order.
    pub fn matches<M>(mut self, matcher: M) -> Self
    where
        M: for<'a> Fn(&'a T) -> Option<Vec<&'a dyn Any>> + Send + Sync + 'static,
    {
        let matcher: Matcher = Arc::new(move |value: &dyn Any, visitor: &mut dyn FnMut(&dyn Any)| {
            match matcher(downcast_ref::<T>(value)) {
                Some(fields) => {
                    for field in fields {
                        visitor(field);
                    }
                    true
                }
                None => false,
            }
        });
        self.matcher = Some(matcher);
        self
    }

    /// Finishes the case with a constructor taking fields in declared order.
    pub fn construct<C>(self, construct: C) -> Case<T>
    where
        C: Fn(&mut Fields) -> T + Send + Sync + 'static,
    {
        Case {
            shape: CaseShape {
                name: self.name,
                fields: self.fields,
                construct: erase_constructor(construct),
                matcher: self.matcher,
            },
            marker: PhantomData,
        }
    }
}

/// A finished case of sum type `T`.
pub struct Case<T> {
    shape: CaseShape,
    marker: PhantomData<fn() -> T>,
}

/// Typed builder for [`TypeShape::Sum`].
///
/// # Examples
///
/// ```rust
/// use std::any::Any;
/// use quickgen_arbitrary::{CaseBuilder, TypeShape};
///
/// enum Limit {
///     Unbounded,
///     AtMost(u32),
/// }
///
/// let shape = TypeShape::sum::<Limit>()
///     .case(
///         CaseBuilder::<Limit>::new("Unbounded")
///             .matches(|limit: &Limit| match limit {
///                 Limit::Unbounded => Some(Vec::new()),
///                 _ => None,
///             })
///             .construct(|_| Limit::Unbounded),
///     )
///     .case(
///         CaseBuilder::<Limit>::new("AtMost")
///             .field::<u32>()
///             .matches(|limit: &Limit| match limit {
///                 Limit::AtMost(n) => Some(vec![n as &dyn Any]),
///                 _ => None,
///             })
///             .construct(|fields| Limit::AtMost(fields.take())),
///     )
///     .build();
/// assert_eq!(shape.kind(), "sum");
/// ```
pub struct SumBuilder<T> {
    cases: Vec<CaseShape>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> SumBuilder<T> {
    /// Appends a case.
    pub fn case(mut self, case: Case<T>) -> Self {
        self.cases.push(case.shape);
        self
    }

    /// Finishes the shape.
    pub fn build(self) -> TypeShape {
        TypeShape::Sum(SumShape { cases: self.cases })
    }
}

fn erase_constructor<T, C>(construct: C) -> Construct
where
    T: Send + 'static,
    C: Fn(&mut Fields) -> T + Send + Sync + 'static,
{
    let owner = type_name::<T>();
    Arc::new(move |values: Vec<DynValue>| {
        let mut fields = Fields::new(owner, values);
        Box::new(construct(&mut fields)) as DynValue
    })
}
