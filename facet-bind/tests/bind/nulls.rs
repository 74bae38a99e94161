use facet::Facet;
use facet_bind::{BindErrorKind, BoxError, MapBinder};
use facet_testhelpers::test;
use facet_value::Value;

use crate::record;

#[derive(Facet, Debug, PartialEq)]
struct Address {
    street: String,
    city: String,
    postcode: u32,
}

fn address(street: Value, city: Value, postcode: Value) -> indexmap::IndexMap<String, Value> {
    record([("street", street), ("city", city), ("postcode", postcode)])
}

#[test]
fn plain_fields_reject_null() {
    let err = MapBinder::new()
        .bind::<Address>(&address(Value::NULL, Value::from("Lodz"), Value::NULL))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::NullValue);
    insta::assert_snapshot!(err, @"Null values require fields to be Option. Null values for fields: 'street', 'postcode'.");
}

#[test]
fn converters_decide_about_null() {
    let binder = MapBinder::new();
    binder
        .register(|value: &Value| -> Result<Option<u32>, BoxError> {
            match value.as_number() {
                Some(number) => Ok(number.to_u64().and_then(|n| u32::try_from(n).ok())),
                None => Ok(Some(0)),
            }
        })
        .unwrap();

    let address: Address = binder
        .bind(&address(
            Value::from("Piotrkowska"),
            Value::from("Lodz"),
            Value::NULL,
        ))
        .unwrap();
    assert_eq!(address.postcode, 0);
}

#[test]
fn converters_cannot_produce_null_for_plain_fields() {
    let binder = MapBinder::new();
    binder
        .register(|_: &Value| Ok::<Option<u32>, BoxError>(None))
        .unwrap();

    let err = binder
        .bind::<Address>(&address(
            Value::from("Piotrkowska"),
            Value::from("Lodz"),
            Value::NULL,
        ))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::RegisteredConverter);
    insta::assert_snapshot!(err, @"Null values require fields to be Option. Registered converter for type 'u32' returned null.");
}

#[test]
fn null_check_runs_after_correspondence() {
    let err = MapBinder::new()
        .bind::<Address>(&record([("street", Value::NULL)]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::MissingValues);
}
