use super::ints;
use crate::{
    error::QueryError,
    obs::{event_counters, reset_event_counters},
    query::{Query, contradiction::is_contradicted},
    value::{Document, Value},
};

fn empty_in(field: &str) -> Document {
    doc! { field => doc! { "$in" => Value::List(Vec::new()) } }
}

#[test]
fn empty_in_is_a_contradiction() {
    assert!(is_contradicted(&empty_in("a")));
    assert!(!is_contradicted(&doc! { "a" => doc! { "$in" => ints(&[1]) } }));
    assert!(!is_contradicted(&Document::new()));
}

#[test]
fn negated_empty_in_is_satisfiable() {
    let selector = doc! { "a" => doc! { "$not" => doc! { "$in" => Value::List(Vec::new()) } } };

    assert!(!is_contradicted(&selector));
}

#[test]
fn and_needs_one_contradicted_operand() {
    let selector = doc! { "$and" => vec![doc! { "b" => 1 }, empty_in("a")] };

    assert!(is_contradicted(&selector));
}

#[test]
fn or_needs_every_operand_contradicted() {
    let some = doc! { "$or" => vec![doc! { "b" => 1 }, empty_in("a")] };
    let all = doc! { "$or" => vec![empty_in("b"), empty_in("a")] };

    assert!(!is_contradicted(&some));
    assert!(is_contradicted(&all));
}

#[test]
fn nor_flips_negation() {
    let plain = doc! { "$nor" => vec![empty_in("a")] };
    let double = doc! {
        "$nor" => vec![doc! { "a" => doc! { "$not" => doc! { "$in" => Value::List(Vec::new()) } } }]
    };

    assert!(!is_contradicted(&plain));
    assert!(is_contradicted(&double));
}

#[test]
fn top_level_operators_other_than_logical_are_ignored() {
    let selector = doc! { "$where" => "false", "$text" => doc! { "$search" => "x" } };

    assert!(!is_contradicted(&selector));
}

#[test]
fn disjoint_in_calls_produce_a_contradiction() -> Result<(), QueryError> {
    reset_event_counters();
    let query = Query::new().in_(("a", vec![1]))?.in_(("a", vec![2]))?;

    assert!(query.is_contradicted());
    assert_eq!(event_counters().contradictions, 1);
    Ok(())
}

#[test]
fn conflicting_equalities_are_not_detected() -> Result<(), QueryError> {
    reset_event_counters();
    let query = Query::new().and(("name", "Bob"))?.and(("name", "Joe"))?;

    assert!(!query.is_contradicted());
    assert_eq!(event_counters().contradictions, 0);
    Ok(())
}
