//! Type-erased values.
//!
//! The registry and the synthesis engine work on values whose concrete type
//! is only known through a [`TypeKey`](crate::TypeKey). They are carried as
//! [`DynValue`] and recovered with the helpers below.
//!
//! A failed downcast means a `TypeShape` or family factory described one
//! type and produced another. That is a programming error in the
//! description, not a data condition, so the helpers panic with a message
//! naming both sides.

use std::any::{type_name, Any};

/// A generated value of erased type.
pub type DynValue = Box<dyn Any + Send>;

/// Recovers a concrete value from a [`DynValue`].
///
/// # Panics
///
/// Panics if `value` does not hold a `T`.
pub fn unerase<T: 'static>(value: DynValue, context: &str) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => panic!(
            "type shape mismatch in `{}`: expected a `{}` value",
            context,
            type_name::<T>()
        ),
    }
}

/// Borrows a concrete value from an erased reference.
///
/// # Panics
///
/// Panics if `value` is not a `T`.
pub fn downcast_ref<T: 'static>(value: &dyn Any) -> &T {
    match value.downcast_ref::<T>() {
        Some(value) => value,
        None => panic!(
            "type shape mismatch: expected a reference to `{}`",
            type_name::<T>()
        ),
    }
}

/// Drawn field values handed to a `TypeShape` constructor, in declared order.
///
/// # Examples
///
/// ```rust
/// use quickgen_arbitrary::{DynValue, Fields};
///
/// let values: Vec<DynValue> = vec![Box::new(3_i32), Box::new(true)];
/// let mut fields = Fields::new("Example", values);
/// assert_eq!(fields.take::<i32>(), 3);
/// assert!(fields.take::<bool>());
/// ```
pub struct Fields {
    owner: &'static str,
    values: std::vec::IntoIter<DynValue>,
    index: usize,
}

impl Fields {
    /// Wraps the drawn values of `owner`'s fields.
    pub fn new(owner: &'static str, values: Vec<DynValue>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Takes the next field value.
    ///
    /// # Panics
    ///
    /// Panics if the fields are exhausted or the next value is not an `F`.
    pub fn take<F: 'static>(&mut self) -> F {
        let index = self.index;
        self.index += 1;
        match self.values.next() {
            Some(value) => unerase(value, self.owner),
            None => panic!(
                "type shape mismatch in `{}`: constructor asked for field {} but only {} were drawn",
                self.owner, index, index
            ),
        }
    }

    /// Number of values not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unerase_round_trip() {
        let value: DynValue = Box::new(String::from("abc"));
        assert_eq!(unerase::<String>(value, "test"), "abc");
    }

    #[test]
    #[should_panic(expected = "type shape mismatch in `Point`")]
    fn test_unerase_mismatch_panics() {
        let value: DynValue = Box::new(1_u8);
        let _ = unerase::<i64>(value, "Point");
    }

    #[test]
    fn test_fields_in_order() {
        let mut fields = Fields::new("Pair", vec![Box::new(1_u8), Box::new(2_u8)]);
        assert_eq!(fields.remaining(), 2);
        assert_eq!(fields.take::<u8>(), 1);
        assert_eq!(fields.take::<u8>(), 2);
        assert_eq!(fields.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "only 1 were drawn")]
    fn test_fields_exhausted_panics() {
        let mut fields = Fields::new("Single", vec![Box::new(1_u8)]);
        let _ = fields.take::<u8>();
        let _ = fields.take::<u8>();
    }
}
