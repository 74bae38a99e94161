use facet::Facet;
use facet_bind::{BindErrorKind, MapBinder};
use facet_testhelpers::test;
use facet_value::Value;

use crate::record;

#[derive(Facet, Debug, PartialEq)]
struct Contact {
    name: String,
    phone: Option<String>,
    floor: Option<u8>,
}

#[test]
fn null_is_none_and_values_are_some() {
    let binder = MapBinder::new();

    let contact: Contact = binder
        .bind(&record([
            ("name", Value::from("Ada")),
            ("phone", Value::NULL),
            ("floor", Value::from(3)),
        ]))
        .unwrap();
    assert_eq!(
        contact,
        Contact {
            name: "Ada".to_string(),
            phone: None,
            floor: Some(3),
        }
    );

    let contact: Contact = binder
        .bind(&record([
            ("name", Value::from("Ada")),
            ("phone", Value::from("555-0100")),
            ("floor", Value::NULL),
        ]))
        .unwrap();
    assert_eq!(contact.phone.as_deref(), Some("555-0100"));
    assert_eq!(contact.floor, None);
}

#[test]
fn inner_type_must_match_exactly() {
    let err = MapBinder::new()
        .bind::<Contact>(&record([
            ("name", Value::from("Ada")),
            ("phone", Value::NULL),
            ("floor", Value::from("3")),
        ]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::TypeMismatch);
    insta::assert_snapshot!(err, @"Cannot assign value of type 'Option<String>' to field 'floor' of type 'Option<u8>'.");
}

#[test]
fn nested_optionals_are_rejected() {
    #[derive(Facet, Debug)]
    struct Layered {
        maybe: Option<Option<u32>>,
    }

    let err = MapBinder::new()
        .bind::<Layered>(&record([("maybe", Value::from(1))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::IllegalArgument);
    insta::assert_snapshot!(err, @"Nested optionals are not supported. Field 'maybe' is 'Option<Option<u32>>'.");
}

#[test]
fn optional_dynamic_values() {
    #[derive(Facet, Debug, PartialEq)]
    struct Extra {
        payload: Option<Value>,
    }

    let binder = MapBinder::new();
    let extra: Extra = binder
        .bind(&record([("payload", Value::from_iter([true, false]))]))
        .unwrap();
    assert_eq!(extra.payload, Some(Value::from_iter([true, false])));

    let extra: Extra = binder.bind(&record([("payload", Value::NULL)])).unwrap();
    assert_eq!(extra.payload, None);
}
