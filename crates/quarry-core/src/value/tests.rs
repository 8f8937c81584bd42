use super::*;
use crate::error::{ErrorClass, QueryError};
use serde_json::json;

fn list(items: &[i64]) -> Value {
    Value::from_list(items.to_vec())
}

//
// Document
//

#[test]
fn document_replace_keeps_position() {
    let mut document = doc! { "a" => 1, "b" => 2, "c" => 3 };
    let replaced = document.insert("b", 20);

    assert_eq!(replaced, Some(Value::Int(2)));
    assert_eq!(document.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(document.get("b"), Some(&Value::Int(20)));
}

#[test]
fn document_equality_ignores_key_order() {
    let left = doc! { "a" => 1, "b" => "x" };
    let right = doc! { "b" => "x", "a" => 1 };

    assert_eq!(left, right);
    assert_ne!(left, doc! { "a" => 1 });
    assert_ne!(left, doc! { "a" => 1, "b" => "y" });
}

#[test]
fn document_serializes_in_insertion_order() {
    let document = doc! { "z" => 1, "a" => doc! { "$gt" => 2 } };
    let encoded = serde_json::to_string(&document).expect("document serializes");

    assert_eq!(encoded, r#"{"z":1,"a":{"$gt":2}}"#);
}

#[test]
fn operator_map_detection() {
    assert!(doc! { "$gt" => 1, "$lt" => 5 }.is_operator_map());
    assert!(!doc! { "$gt" => 1, "name" => 5 }.is_operator_map());
    assert!(!Document::new().is_operator_map());
    assert!(doc! { "$text" => 1 }.is_only("$text"));
}

#[test]
fn document_remove_and_merge() {
    let mut document = doc! { "a" => 1, "b" => 2 };
    assert_eq!(document.remove("a"), Some(Value::Int(1)));
    assert_eq!(document.remove("a"), None);

    document.merge(doc! { "b" => 3, "c" => 4 });
    assert_eq!(document, doc! { "b" => 3, "c" => 4 });
}

//
// Value
//

#[test]
fn array_form_wraps_non_lists() {
    assert_eq!(Value::Int(1).into_array_form(), vec![Value::Int(1)]);
    assert_eq!(Value::Null.into_array_form(), vec![Value::Null]);
    assert_eq!(list(&[1, 2]).into_array_form(), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn regex_serializes_as_operator_pair() {
    let value = Value::from(Regex::with_options("^Bo", "i"));
    let encoded = serde_json::to_value(&value).expect("regex serializes");

    assert_eq!(encoded, json!({ "$regex": "^Bo", "$options": "i" }));
    assert!(value.is_regex());
    assert!(value.is_scalar());
}

#[test]
fn option_and_vec_conversions() {
    assert_eq!(Value::from(None::<i32>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    assert_eq!(Value::from(vec![1_u8, 2]), list(&[1, 2]));
}

//
// Algebra
//

#[test]
fn missing_existing_yields_incoming() {
    assert_eq!(union(None, Value::Int(1)).unwrap(), Value::Int(1));
    assert_eq!(intersect(None, list(&[1])).unwrap(), list(&[1]));
    assert_eq!(add(None, Value::Null).unwrap(), Value::Null);
}

#[test]
fn union_dedups_existing_first() {
    let merged = union(Some(list(&[1, 2])), list(&[2, 3])).unwrap();

    assert_eq!(merged, list(&[1, 2, 3]));
}

#[test]
fn intersect_preserves_existing_order() {
    let merged = intersect(Some(list(&[3, 2, 1])), list(&[1, 2, 4])).unwrap();

    assert_eq!(merged, list(&[2, 1]));
}

#[test]
fn add_keeps_existing_duplicates() {
    let merged = add(Some(list(&[1, 1])), list(&[1, 2])).unwrap();

    assert_eq!(merged, list(&[1, 1, 2]));
}

#[test]
fn add_of_equal_scalars_is_identity() {
    assert_eq!(add(Some(Value::Int(5)), Value::Int(5)).unwrap(), Value::Int(5));
    assert_eq!(add(Some(Value::Int(5)), Value::Int(6)).unwrap(), list(&[5, 6]));
}

#[test]
fn scalars_are_lifted_to_lists() {
    assert_eq!(union(Some(Value::Int(1)), Value::Int(2)).unwrap(), list(&[1, 2]));
    assert_eq!(intersect(Some(Value::Int(1)), list(&[1, 2])).unwrap(), list(&[1]));
}

#[test]
fn operator_documents_combine_under_same_key() {
    let existing = Value::from(doc! { "$in" => list(&[1, 2, 3]) });
    let incoming = Value::from(doc! { "$in" => list(&[2, 3, 4]) });

    let merged = intersect(Some(existing), incoming).unwrap();

    assert_eq!(merged, Value::from(doc! { "$in" => list(&[2, 3]) }));
}

#[test]
fn operator_documents_keep_unrelated_operators() {
    let existing = Value::from(doc! { "$gt" => 1 });
    let incoming = Value::from(doc! { "$nin" => list(&[7]) });

    let merged = union(Some(existing), incoming).unwrap();

    assert_eq!(
        merged,
        Value::from(doc! { "$gt" => 1, "$nin" => list(&[7]) })
    );
}

#[test]
fn scalar_is_combined_inside_single_key_document() {
    let merged = union(Some(Value::Int(1)), Value::from(doc! { "$in" => list(&[2]) })).unwrap();
    assert_eq!(merged, Value::from(doc! { "$in" => list(&[1, 2]) }));

    let merged = intersect(Some(Value::from(doc! { "$in" => list(&[1, 2]) })), Value::Int(2)).unwrap();
    assert_eq!(merged, Value::from(doc! { "$in" => list(&[2]) }));
}

#[test]
fn nested_single_key_documents_rewrap_every_level() {
    let incoming = Value::from(doc! { "$not" => doc! { "$in" => list(&[2, 3]) } });

    let merged = add(Some(list(&[1, 2])), incoming).unwrap();

    assert_eq!(
        merged,
        Value::from(doc! { "$not" => doc! { "$in" => list(&[1, 2, 3]) } })
    );
}

#[test]
fn multi_key_document_against_scalar_is_unsupported() {
    let err = intersect(
        Some(Value::Int(5)),
        Value::from(doc! { "$gt" => 1, "$in" => list(&[5]) }),
    )
    .expect_err("mixed shapes");

    assert!(matches!(err, QueryError::UnsupportedCombination { .. }));
    assert_eq!(err.class(), ErrorClass::InvariantViolation);
}

#[test]
fn intersect_keeps_each_common_element_once() {
    let merged = intersect(Some(list(&[2, 1, 2, 1])), list(&[1, 2])).unwrap();

    assert_eq!(merged, list(&[2, 1]));
}
