use super::catalog_query;
use crate::{
    error::QueryError,
    query::{FieldCatalog, Query},
    value::Value,
};

fn stages(query: &Query) -> Vec<Value> {
    query.pipeline().stages().to_vec()
}

#[test]
fn first_stage_seeds_match_and_options() -> Result<(), QueryError> {
    let query = Query::new()
        .where_(("a", 1))?
        .skip(2)
        .group(doc! { "_id" => "$a", "count" => doc! { "$sum" => 1 } })?;

    assert!(query.is_aggregating());
    assert_eq!(
        stages(&query),
        vec![
            Value::from(doc! { "$match" => doc! { "a" => 1 } }),
            Value::from(doc! { "$skip" => 2 }),
            Value::from(doc! {
                "$group" => doc! { "_id" => "$a", "count" => doc! { "$sum" => 1 } }
            }),
        ]
    );
    Ok(())
}

#[test]
fn empty_selector_adds_no_match() -> Result<(), QueryError> {
    let query = Query::new().project(doc! { "name" => 1 })?.unwind("tags")?;

    assert_eq!(
        stages(&query),
        vec![
            Value::from(doc! { "$project" => doc! { "name" => 1 } }),
            Value::from(doc! { "$unwind" => "$tags" }),
        ]
    );
    Ok(())
}

#[test]
fn pipeline_is_seeded_only_once() -> Result<(), QueryError> {
    let query = Query::new()
        .where_(("a", 1))?
        .project(doc! { "a" => 1 })?
        .where_(("b", 2))?
        .project(doc! { "b" => 1 })?;

    assert_eq!(stages(&query).len(), 3);
    Ok(())
}

#[test]
fn sorting_while_aggregating_pushes_sort_stage() -> Result<(), QueryError> {
    let query = Query::new().project(doc! { "a" => 1 })?.descending(&["a"]);

    assert_eq!(
        stages(&query),
        vec![
            Value::from(doc! { "$project" => doc! { "a" => 1 } }),
            Value::from(doc! { "$sort" => doc! { "a" => -1 } }),
        ]
    );
    Ok(())
}

#[test]
fn unwind_resolves_aliases_and_passes_documents() -> Result<(), QueryError> {
    let query = catalog_query(FieldCatalog::new().alias("t", "tags"))
        .unwind("t")?
        .unwind(doc! { "path" => "$items", "preserveNullAndEmptyArrays" => true })?;

    assert_eq!(
        stages(&query),
        vec![
            Value::from(doc! { "$unwind" => "$tags" }),
            Value::from(doc! {
                "$unwind" => doc! { "path" => "$items", "preserveNullAndEmptyArrays" => true }
            }),
        ]
    );
    Ok(())
}

#[test]
fn unwind_keeps_paths_that_already_start_with_dollar() -> Result<(), QueryError> {
    let query = catalog_query(FieldCatalog::new().alias("t", "tags"))
        .unwind("$tags")?
        .unwind("t")?;

    assert_eq!(
        stages(&query),
        vec![
            Value::from(doc! { "$unwind" => "$tags" }),
            Value::from(doc! { "$unwind" => "$tags" }),
        ]
    );
    Ok(())
}

#[test]
fn project_resolves_aliases() -> Result<(), QueryError> {
    let query = catalog_query(FieldCatalog::new().alias("n", "name")).project(doc! { "n" => 1 })?;

    assert_eq!(
        stages(&query),
        vec![Value::from(doc! { "$project" => doc! { "name" => 1 } })]
    );
    Ok(())
}

#[test]
fn unwind_rejects_other_shapes() {
    let err = Query::new().unwind(5).expect_err("int is not a field");
    assert!(matches!(err, QueryError::InvalidExpression { .. }));

    let err = Query::new().unwind(None::<&str>).expect_err("nil field");
    assert_eq!(err, QueryError::MissingArgument { method: "unwind" });
}

#[test]
fn pipeline_serializes_as_a_list() -> Result<(), QueryError> {
    let query = Query::new().where_(("a", 1))?.project(doc! { "a" => 1 })?;
    let encoded = serde_json::to_string(query.pipeline()).expect("pipeline serializes");

    assert_eq!(encoded, r#"[{"$match":{"a":1}},{"$project":{"a":1}}]"#);
    Ok(())
}
