use facet::Facet;
use facet_bind::{BindErrorKind, MapBinder, Schema};
use facet_testhelpers::test;
use facet_value::Value;

use crate::record;

#[derive(Facet, Debug, PartialEq)]
struct Entity {
    id: u64,
    name: String,
}

#[derive(Facet, Debug, PartialEq)]
struct Named {
    #[facet(flatten)]
    entity: Entity,
    name: String,
    active: bool,
}

#[derive(Facet, Debug, PartialEq)]
struct Renumbered {
    #[facet(flatten)]
    entity: Entity,
    name: u32,
}

#[derive(Facet, Debug, PartialEq)]
struct Audited {
    #[facet(flatten)]
    named: Named,
    auditor: Option<String>,
}

#[test]
fn ancestor_fields_are_bound() {
    let named: Named = MapBinder::new()
        .bind(&record([
            ("id", Value::from(7)),
            ("name", Value::from("widget")),
            ("active", Value::from(true)),
        ]))
        .unwrap();
    assert_eq!(
        named,
        Named {
            entity: Entity {
                id: 7,
                name: "widget".to_string(),
            },
            name: "widget".to_string(),
            active: true,
        }
    );
}

#[test]
fn redeclared_fields_with_other_types_mismatch() {
    let err = MapBinder::new()
        .bind::<Renumbered>(&record([("id", Value::from(7)), ("name", Value::from("widget"))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::TypeMismatch);
    insta::assert_snapshot!(err, @"Cannot assign value of type 'String' to field 'name' of type 'u32'.");

    let err = MapBinder::new()
        .bind::<Renumbered>(&record([("id", Value::from(7)), ("name", Value::from(3))]))
        .unwrap_err();
    insta::assert_snapshot!(err, @"Cannot assign value of type 'i64' to field 'name' of type 'String'.");
}

#[test]
fn ancestors_nest() {
    let audited: Audited = MapBinder::new()
        .bind(&record([
            ("auditor", Value::NULL),
            ("active", Value::from(false)),
            ("name", Value::from("gear")),
            ("id", Value::from(1)),
        ]))
        .unwrap();
    assert_eq!(audited.named.entity.id, 1);
    assert_eq!(audited.named.entity.name, "gear");
    assert_eq!(audited.named.name, "gear");
    assert!(!audited.named.active);
    assert_eq!(audited.auditor, None);

    let schema = Schema::for_type::<Audited>().unwrap();
    let declaring: Vec<String> = schema
        .slots()
        .iter()
        .map(|slot| format!("{}.{}", slot.declaring(), slot.name()))
        .collect();
    assert_eq!(
        declaring,
        ["Entity.id", "Entity.name", "Named.name", "Named.active", "Audited.auditor"]
    );
}

#[test]
fn redeclared_names_are_listed_once() {
    let err = MapBinder::new()
        .bind::<Named>(&record([("id", Value::from(1))]))
        .unwrap_err();
    assert_eq!(err.kind(), BindErrorKind::MissingValues);
    insta::assert_snapshot!(err, @"No values for fields: 'name', 'active'.");
}
