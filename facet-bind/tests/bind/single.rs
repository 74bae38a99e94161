use facet::Facet;
use facet_bind::{BindErrorKind, BoxError, MapBinder};
use facet_testhelpers::test;
use facet_value::Value;

use crate::record;

#[derive(Facet, Debug, PartialEq)]
#[repr(u8)]
#[allow(clippy::upper_case_acronyms)]
enum Switch {
    ON,
    OFF,
}

#[test]
fn binds_scalars_options_and_enums() {
    let binder = MapBinder::new();
    assert_eq!(binder.bind_single::<u32>(&record([("n", Value::from(5))])).unwrap(), 5);
    assert_eq!(
        binder
            .bind_single::<String>(&record([("s", Value::from("text"))]))
            .unwrap(),
        "text"
    );
    assert_eq!(
        binder
            .bind_single::<Option<u32>>(&record([("n", Value::NULL)]))
            .unwrap(),
        None
    );
    assert_eq!(
        binder
            .bind_single::<Option<u32>>(&record([("n", Value::from(9))]))
            .unwrap(),
        Some(9)
    );
    assert_eq!(
        binder
            .bind_single::<Switch>(&record([("state", Value::from("OFF"))]))
            .unwrap(),
        Switch::OFF
    );
}

#[test]
fn needs_exactly_one_entry() {
    let err = MapBinder::new()
        .bind_single::<u32>(&record([("a", Value::from(1)), ("b", Value::from(2))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::IllegalArgument);
    insta::assert_snapshot!(err, @"Cannot bind non-singleton map to single value of type 'u32'. Keys found: 'a', 'b'.");
}

#[test]
fn null_and_mismatches() {
    let binder = MapBinder::new();
    let err = binder
        .bind_single::<u32>(&record([("n", Value::NULL)]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::NullValue);
    insta::assert_snapshot!(err, @"Null values require fields to be Option. Null values for fields: 'n'.");

    let err = binder
        .bind_single::<u32>(&record([("n", Value::from("5"))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::TypeMismatch);
    insta::assert_snapshot!(err, @"Cannot convert value of type 'String' to single value of type 'u32'.");
}

#[test]
fn uses_registered_converters() {
    let binder = MapBinder::new();
    binder
        .register(|v: &Value| -> Result<Option<u32>, BoxError> {
            match v.as_string() {
                Some(s) => Ok(Some(s.as_str().parse()?)),
                None => Ok(None),
            }
        })
        .unwrap();
    assert_eq!(
        binder
            .bind_single::<u32>(&record([("n", Value::from("41"))]))
            .unwrap(),
        41
    );

    let err = binder
        .bind_single::<u32>(&record([("n", Value::NULL)]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::RegisteredConverter);
}

#[test]
fn optional_targets_are_named_in_full() {
    let binder = MapBinder::new();
    let err = binder
        .bind_single::<Option<u8>>(&record([("a", Value::from(1)), ("b", Value::from(2))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"Cannot bind non-singleton map to single value of type 'Option<u8>'. Keys found: 'a', 'b'.");

    let err = binder
        .bind_single::<Option<u8>>(&record([("n", Value::from("5"))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::TypeMismatch);
    insta::assert_snapshot!(err, @"Cannot assign value of type 'Option<String>' to field 'n' of type 'Option<u8>'.");
}
