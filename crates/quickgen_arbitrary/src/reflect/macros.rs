//! Declarative `Reflect` impls for user types.

/// Implements [`Reflect`](crate::Reflect) for a struct with named fields.
///
/// Fields are listed with their types, in declaration order. Generic
/// structs need a hand-written impl using [`TypeShape::product`](crate::TypeShape::product).
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{reflect_product, Reflect, TypeShape};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// reflect_product!(Point { x: i32, y: i32 });
///
/// assert_eq!(Point::shape().children().len(), 2);
/// ```
#[macro_export]
macro_rules! reflect_product {
    ($name:ident { $($field:ident : $fty:ty),* $(,)? }) => {
        impl $crate::Reflect for $name {
            #[allow(unused_variables)]
            fn shape() -> $crate::TypeShape {
                $crate::TypeShape::product::<$name>()
                    $(.field::<$fty>())*
                    .destructure(|value: &$name| {
                        ::std::vec![$(&value.$field as &dyn ::std::any::Any),*]
                    })
                    .construct(|fields| $name {
                        $($field: fields.take::<$fty>()),*
                    })
            }
        }
    };
}

/// Implements [`Reflect`](crate::Reflect) for an enum.
///
/// Unit variants are written bare. Tuple variants list a binder name and a
/// type for each field; the binder only names the field inside the
/// generated matcher.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{reflect_sum, Reflect, TypeShape};
///
/// enum Tree {
///     Leaf,
///     Node(Box<Tree>, u8, Box<Tree>),
/// }
///
/// reflect_sum!(Tree {
///     Leaf,
///     Node(left: Box<Tree>, label: u8, right: Box<Tree>),
/// });
///
/// match Tree::shape() {
///     TypeShape::Sum(sum) => {
///         assert_eq!(sum.cases().len(), 2);
///         assert_eq!(sum.case_index_of(&Tree::Leaf), Some(0));
///     }
///     other => panic!("expected a sum, got {:?}", other),
/// }
/// ```
#[macro_export]
macro_rules! reflect_sum {
    ($name:ident { $($case:ident $(( $($bind:ident : $fty:ty),* $(,)? ))?),+ $(,)? }) => {
        impl $crate::Reflect for $name {
            #[allow(irrefutable_let_patterns, unused_variables)]
            fn shape() -> $crate::TypeShape {
                $crate::TypeShape::sum::<$name>()
                    $(
                        .case(
                            $crate::CaseBuilder::<$name>::new(::std::stringify!($case))
                                $($(.field::<$fty>())*)?
                                .matches(|value: &$name| {
                                    if let $name::$case $(($($bind),*))? = value {
                                        ::std::option::Option::Some(::std::vec![
                                            $($($bind as &dyn ::std::any::Any),*)?
                                        ])
                                    } else {
                                        ::std::option::Option::None
                                    }
                                })
                                .construct(|fields| $name::$case $(($(fields.take::<$fty>()),*))?),
                        )
                    )+
                    .build()
            }
        }
    };
}
