//! Reflect impls for standard types.
//!
//! Scalars are opaque and rely on the registry's built-in specs. `Option`
//! and `Box` name their families so a single factory covers every
//! instantiation; the remaining containers are described structurally.

use std::any::Any;

use super::{CaseBuilder, Reflect, TypeKey, TypeShape};

/// Family name of `Option<T>`.
pub const OPTION_FAMILY: &str = "Option";

/// Family name of `Box<T>`.
pub const BOX_FAMILY: &str = "Box";

macro_rules! reflect_opaque {
    ($($t:ty),* $(,)?) => {$(
        impl Reflect for $t {
            fn shape() -> TypeShape {
                TypeShape::Opaque
            }
        }
    )*};
}

reflect_opaque!(
    bool, char, String, f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl Reflect for () {
    fn shape() -> TypeShape {
        TypeShape::product::<()>()
            .destructure(|_| Vec::new())
            .construct(|_| ())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::array::<Vec<T>, T, _, _>(|items| items, |items: &Vec<T>| items.iter().collect())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::sum::<Option<T>>()
            .case(
                CaseBuilder::<Option<T>>::new("None")
                    .matches(|value: &Option<T>| match value {
                        None => Some(Vec::new()),
                        Some(_) => None,
                    })
                    .construct(|_| None),
            )
            .case(
                CaseBuilder::<Option<T>>::new("Some")
                    .field::<T>()
                    .matches(|value: &Option<T>| {
                        value.as_ref().map(|inner| vec![inner as &dyn Any])
                    })
                    .construct(|fields| Some(fields.take::<T>())),
            )
            .build()
    }

    fn family() -> Option<&'static str> {
        Some(OPTION_FAMILY)
    }

    fn type_args() -> Vec<TypeKey> {
        vec![TypeKey::of::<T>()]
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> TypeShape {
        TypeShape::product::<Box<T>>()
            .field::<T>()
            .destructure(|value: &Box<T>| vec![&**value as &dyn Any])
            .construct(|fields| Box::new(fields.take::<T>()))
    }

    fn family() -> Option<&'static str> {
        Some(BOX_FAMILY)
    }

    fn type_args() -> Vec<TypeKey> {
        vec![TypeKey::of::<T>()]
    }
}

impl<T: Reflect, E: Reflect> Reflect for Result<T, E> {
    fn shape() -> TypeShape {
        TypeShape::sum::<Result<T, E>>()
            .case(
                CaseBuilder::<Result<T, E>>::new("Ok")
                    .field::<T>()
                    .matches(|value: &Result<T, E>| match value {
                        Ok(inner) => Some(vec![inner as &dyn Any]),
                        Err(_) => None,
                    })
                    .construct(|fields| Ok(fields.take::<T>())),
            )
            .case(
                CaseBuilder::<Result<T, E>>::new("Err")
                    .field::<E>()
                    .matches(|value: &Result<T, E>| match value {
                        Ok(_) => None,
                        Err(err) => Some(vec![err as &dyn Any]),
                    })
                    .construct(|fields| Err(fields.take::<E>())),
            )
            .build()
    }
}

macro_rules! reflect_tuple {
    ($($t:ident $idx:tt),+) => {
        impl<$($t: Reflect),+> Reflect for ($($t,)+) {
            fn shape() -> TypeShape {
                TypeShape::product::<($($t,)+)>()
                    $(.field::<$t>())+
                    .destructure(|value: &($($t,)+)| vec![$(&value.$idx as &dyn Any),+])
                    .construct(|fields| ($(fields.take::<$t>(),)+))
            }
        }
    };
}

reflect_tuple!(A 0, B 1);
reflect_tuple!(A 0, B 1, C 2);
reflect_tuple!(A 0, B 1, C 2, D 3);
reflect_tuple!(A 0, B 1, C 2, D 3, E 4);
reflect_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
