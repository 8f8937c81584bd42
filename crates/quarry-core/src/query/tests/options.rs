use super::catalog_query;
use crate::{
    error::QueryError,
    query::{FieldCatalog, FieldRef, Query, SortSpec},
    value::Value,
};

#[test]
fn window_options_are_stored() {
    let query = Query::new()
        .limit(10)
        .skip(5)
        .batch_size(100)
        .max_time_ms(250);
    let options = query.options();

    assert_eq!(options.limit(), Some(10));
    assert_eq!(options.skip(), Some(5));
    assert_eq!(options.get("batch_size"), Some(&Value::Int(100)));
    assert_eq!(options.get("max_time_ms"), Some(&Value::Int(250)));
}

#[test]
fn offset_is_skip() {
    assert_eq!(Query::new().offset(3), Query::new().skip(3));
}

#[test]
fn option_builders_never_touch_the_receiver() {
    let base = Query::new().limit(1);
    let _ = base.limit(2).skip(3);

    assert_eq!(base.options().limit(), Some(1));
    assert_eq!(base.options().skip(), None);
}

#[test]
fn diagnostics_options_are_stored() {
    let query = Query::new()
        .comment("slow report")
        .hint(doc! { "age" => 1 })
        .collation(doc! { "locale" => "fr", "strength" => 1 });
    let options = query.options();

    assert_eq!(options.get("comment"), Some(&Value::from("slow report")));
    assert_eq!(options.get("hint"), Some(&Value::from(doc! { "age" => 1 })));
    assert_eq!(
        options.get("collation"),
        Some(&Value::from(doc! { "locale" => "fr", "strength" => 1 }))
    );
}

#[test]
fn projection_builders_accumulate() {
    let query = Query::new().only(&["name", "age"]).without(&["secret"]);

    assert_eq!(
        query.options().projection(),
        Some(&doc! { "name" => 1, "age" => 1, "secret" => 0 })
    );
}

#[test]
fn empty_projection_is_a_no_op() {
    let query = Query::new().only(&[]);

    assert_eq!(query.options().projection(), None);
}

#[test]
fn ascending_and_descending_build_sort() {
    let query = Query::new().ascending(&["name"]).descending(&["age", "score"]);

    assert_eq!(
        query.options().sort(),
        Some(&doc! { "name" => 1, "age" => -1, "score" => -1 })
    );
}

#[test]
fn order_by_accepts_every_spec_shape() -> Result<(), QueryError> {
    let query = Query::new().order_by(vec![
        SortSpec::from("name desc, rank"),
        SortSpec::from(("age", 1)),
        SortSpec::from(("city", "descending")),
        SortSpec::from(FieldRef::new("score").desc()),
        SortSpec::from(doc! { "zip" => -1 }),
    ])?;

    assert_eq!(
        query.options().sort(),
        Some(&doc! {
            "name" => -1,
            "rank" => 1,
            "age" => 1,
            "city" => -1,
            "score" => -1,
            "zip" => -1,
        })
    );
    Ok(())
}

#[test]
fn later_sort_for_same_field_wins() -> Result<(), QueryError> {
    let query = Query::new().ascending(&["a"]).order_by(["a desc"])?;

    assert_eq!(query.options().sort(), Some(&doc! { "a" => -1 }));
    Ok(())
}

#[test]
fn order_by_rejects_bad_directions() {
    let err = Query::new()
        .order_by(["name sideways"])
        .expect_err("unknown direction");
    assert!(matches!(err, QueryError::InvalidExpression { .. }));

    let err = Query::new()
        .order_by([FieldRef::new("age").gt()])
        .expect_err("filter key");
    assert!(matches!(err, QueryError::InvalidExpression { .. }));
}

#[test]
fn reorder_replaces_existing_sort() -> Result<(), QueryError> {
    let query = Query::new().ascending(&["a"]).reorder(["b desc"])?;

    assert_eq!(query.options().sort(), Some(&doc! { "b" => -1 }));
    Ok(())
}

#[test]
fn sort_and_projection_keys_are_resolved() {
    let query = catalog_query(FieldCatalog::new().alias("n", "name"))
        .ascending(&["n"])
        .only(&["n"]);

    assert_eq!(query.options().sort(), Some(&doc! { "name" => 1 }));
    assert_eq!(query.options().projection(), Some(&doc! { "name" => 1 }));
}

#[test]
fn options_pipeline_orders_skip_limit_sort() {
    let query = Query::new().ascending(&["name"]).limit(10).skip(5);

    assert_eq!(
        query.options().to_pipeline(),
        vec![
            Value::from(doc! { "$skip" => 5 }),
            Value::from(doc! { "$limit" => 10 }),
            Value::from(doc! { "$sort" => doc! { "name" => 1 } }),
        ]
    );
    assert!(Query::new().options().to_pipeline().is_empty());
}
