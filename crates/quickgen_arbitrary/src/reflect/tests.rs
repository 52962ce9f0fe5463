use std::any::{Any, TypeId};
use std::collections::HashSet;

use super::*;
use crate::dynamic::unerase;
use crate::{reflect_product, reflect_sum};

#[derive(Debug, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

reflect_product!(Point { x: i32, y: i32 });

#[derive(Debug, PartialEq)]
struct Marker {}

reflect_product!(Marker {});

#[derive(Debug, PartialEq)]
enum Shape {
    Empty,
    Circle(u32),
    Rect(Point, Point),
}

reflect_sum!(Shape {
    Empty,
    Circle(radius: u32),
    Rect(top_left: Point, bottom_right: Point),
});

fn erased<T: Send + 'static>(value: T) -> DynValue {
    Box::new(value)
}

fn visited_i32s(visit: &Visit, value: &dyn Any) -> Vec<i32> {
    let mut seen = Vec::new();
    visit(value, &mut |field: &dyn Any| {
        seen.push(*field.downcast_ref::<i32>().unwrap());
    });
    seen
}

#[test]
fn test_type_key_identity() {
    let a = TypeKey::of::<Point>();
    let b = TypeKey::of::<Point>();
    assert_eq!(a, b);
    assert_eq!(a.id(), TypeId::of::<Point>());
    assert!(a.name().ends_with("Point"));
    assert_ne!(a, TypeKey::of::<Shape>());

    let set: HashSet<TypeKey> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_family_keys_carry_arguments() {
    let key = TypeKey::of::<Option<Box<Point>>>();
    assert_eq!(key.family(), Some(OPTION_FAMILY));
    assert_eq!(key.args().len(), 1);
    assert_eq!(key.args()[0].family(), Some(BOX_FAMILY));
    assert_eq!(key.args()[0].args()[0], TypeKey::of::<Point>());
    assert_eq!(TypeKey::of::<Point>().family(), None);
}

#[test]
fn test_product_macro_constructs_in_order() {
    let TypeShape::Product(product) = Point::shape() else {
        panic!("expected a product");
    };
    assert_eq!(product.fields(), &[TypeKey::of::<i32>(), TypeKey::of::<i32>()]);
    let built = product.construct(vec![erased(3_i32), erased(-4_i32)]);
    assert_eq!(unerase::<Point>(built, "test"), Point { x: 3, y: -4 });
}

#[test]
fn test_product_macro_visits_in_order() {
    let TypeShape::Product(product) = Point::shape() else {
        panic!("expected a product");
    };
    let visit = product.visitor().unwrap();
    assert_eq!(visited_i32s(&visit, &Point { x: 7, y: 8 }), vec![7, 8]);
}

#[test]
fn test_empty_product() {
    let TypeShape::Product(product) = Marker::shape() else {
        panic!("expected a product");
    };
    assert!(product.fields().is_empty());
    assert_eq!(unerase::<Marker>(product.construct(Vec::new()), "test"), Marker {});
}

#[test]
fn test_sum_macro_cases() {
    let TypeShape::Sum(sum) = Shape::shape() else {
        panic!("expected a sum");
    };
    let names: Vec<&str> = sum.cases().iter().map(|case| case.name()).collect();
    assert_eq!(names, vec!["Empty", "Circle", "Rect"]);
    assert!(sum.cases()[0].fields().is_empty());
    assert_eq!(sum.cases()[1].fields(), &[TypeKey::of::<u32>()]);
    assert_eq!(sum.cases()[2].fields().len(), 2);

    let circle = sum.cases()[1].construct(vec![erased(5_u32)]);
    assert_eq!(unerase::<Shape>(circle, "test"), Shape::Circle(5));
}

#[test]
fn test_sum_case_index_of() {
    let TypeShape::Sum(sum) = Shape::shape() else {
        panic!("expected a sum");
    };
    assert_eq!(sum.case_index_of(&Shape::Empty), Some(0));
    assert_eq!(sum.case_index_of(&Shape::Circle(1)), Some(1));
    let rect = Shape::Rect(Point { x: 0, y: 0 }, Point { x: 1, y: 1 });
    assert_eq!(sum.case_index_of(&rect), Some(2));
}

#[test]
fn test_sum_matcher_visits_only_matching_case() {
    let TypeShape::Sum(sum) = Shape::shape() else {
        panic!("expected a sum");
    };
    let circle = Shape::Circle(9);
    let mut seen = Vec::new();
    for case in sum.cases() {
        let matcher = case.matcher().unwrap();
        let matched = matcher(&circle, &mut |field: &dyn Any| {
            seen.push(*field.downcast_ref::<u32>().unwrap());
        });
        assert_eq!(matched, case.name() == "Circle");
    }
    assert_eq!(seen, vec![9]);
}

#[test]
fn test_option_shape() {
    let TypeShape::Sum(sum) = Option::<u8>::shape() else {
        panic!("expected a sum");
    };
    assert_eq!(sum.case_index_of(&None::<u8>), Some(0));
    assert_eq!(sum.case_index_of(&Some(1_u8)), Some(1));
    let some = sum.cases()[1].construct(vec![erased(4_u8)]);
    assert_eq!(unerase::<Option<u8>>(some, "test"), Some(4));
}

#[test]
fn test_vec_shape() {
    let TypeShape::Array(array) = Vec::<i32>::shape() else {
        panic!("expected an array");
    };
    assert_eq!(array.element(), &TypeKey::of::<i32>());
    let built = array.collect(vec![erased(1_i32), erased(2_i32)]);
    let values = unerase::<Vec<i32>>(built, "test");
    assert_eq!(values, vec![1, 2]);
    assert_eq!(visited_i32s(&array.visitor(), &values), vec![1, 2]);
}

#[test]
fn test_tuple_and_box_shapes() {
    let TypeShape::Product(pair) = <(i32, i32)>::shape() else {
        panic!("expected a product");
    };
    let visit = pair.visitor().unwrap();
    assert_eq!(visited_i32s(&visit, &(5, 6)), vec![5, 6]);

    let TypeShape::Product(boxed) = Box::<i32>::shape() else {
        panic!("expected a product");
    };
    let built = boxed.construct(vec![erased(11_i32)]);
    assert_eq!(*unerase::<Box<i32>>(built, "test"), 11);
}

#[test]
fn test_children_of_sum() {
    let children = Shape::shape().children();
    assert_eq!(
        children,
        vec![TypeKey::of::<u32>(), TypeKey::of::<Point>(), TypeKey::of::<Point>()]
    );
    assert!(TypeShape::Opaque.children().is_empty());
    assert_eq!(i64::shape().kind(), "opaque");
}

#[test]
#[should_panic(expected = "type shape mismatch")]
fn test_constructor_rejects_wrong_field_type() {
    let TypeShape::Product(product) = Point::shape() else {
        panic!("expected a product");
    };
    let _ = product.construct(vec![erased(1_u8), erased(2_u8)]);
}
