//! Structural checks run before any value is converted.
//!
//! The order is fixed: target shape, then field duplicates, key duplicates,
//! missing fields, missing values and finally nulls. The first failing check
//! wins.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use facet_core::{Def, Shape, StructKind, Type, UserType};
use indexmap::IndexSet;

use crate::converters::Converters;
use crate::error::{BindError, BindErrorKind, Result};
use crate::record::{KeyCase, Source};
use crate::schema::Schema;

/// Reject target shapes that a record cannot be bound onto.
pub(crate) fn target(shape: &Shape) -> Result<()> {
    let reason = match &shape.def {
        Def::Option(_) => Some("optional type"),
        Def::List(_) | Def::Array(_) | Def::Slice(_) | Def::Set(_) | Def::Map(_) => {
            Some("collection type")
        }
        Def::NdArray(_) => Some("collection type"),
        Def::Pointer(_) => Some("pointer type"),
        Def::DynamicValue(_) => Some("dynamic value type"),
        Def::Result(_) => Some("enum"),
        _ => None,
    };

    let reason = reason.or_else(|| {
        if shape.scalar_type().is_some() {
            return Some("primitive type");
        }
        match &shape.ty {
            Type::Primitive(_) => Some("primitive type"),
            Type::Sequence(_) => Some("collection type"),
            Type::Pointer(_) => Some("pointer type"),
            Type::User(UserType::Enum(_)) => Some("enum"),
            Type::User(UserType::Union(_)) => Some("union"),
            Type::User(UserType::Opaque) => Some("opaque type"),
            Type::User(UserType::Struct(struct_type)) => match struct_type.kind {
                StructKind::Struct | StructKind::Unit => None,
                StructKind::TupleStruct | StructKind::Tuple => Some("tuple"),
            },
            Type::Undefined => Some("opaque type"),
        }
    });

    match reason {
        Some(reason) => Err(BindError::illegal_argument(format!(
            "Cannot bind map to {reason}."
        ))),
        None => Ok(()),
    }
}

/// In case-insensitive mode, reject schemas with names that only differ by
/// case. Does not look at the record.
pub(crate) fn field_duplicates(schema: &Schema, key_case: KeyCase) -> Result<()> {
    if key_case == KeyCase::Sensitive {
        return Ok(());
    }
    let duplicates = case_duplicates(schema.names());
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(BindError::new(
        BindErrorKind::FieldDuplicate,
        format!(
            "Fields {} are duplicates (binder is key case insensitive).",
            quoted(duplicates)
        ),
    ))
}

/// In case-insensitive mode, reject records with keys that only differ by
/// case: lookups would be ambiguous.
pub(crate) fn key_duplicates(source: &Source<'_>) -> Result<()> {
    if source.key_case() == KeyCase::Sensitive {
        return Ok(());
    }
    let duplicates = case_duplicates(source.keys());
    if duplicates.is_empty() {
        return Ok(());
    }
    Err(BindError::illegal_argument(format!(
        "Keys {} are duplicates (binder is key case insensitive).",
        quoted(duplicates)
    )))
}

/// Every key must name a field, and every field must have a key.
pub(crate) fn correspondence(schema: &Schema, source: &Source<'_>) -> Result<()> {
    let key_case = source.key_case();
    let names: IndexSet<&str> = schema.names().collect();

    let missing_fields: Vec<&str> = source
        .keys()
        .filter(|key| !names.iter().any(|name| key_case.matches(key, name)))
        .collect();
    if !missing_fields.is_empty() {
        return Err(BindError::new(
            BindErrorKind::MissingFields,
            format!("No fields for keys: {}.", quoted(missing_fields)),
        ));
    }

    let missing_values: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !source.contains(name))
        .collect();
    if !missing_values.is_empty() {
        return Err(BindError::new(
            BindErrorKind::MissingValues,
            format!("No values for fields: {}.", quoted(missing_values)),
        ));
    }

    Ok(())
}

/// Null is only accepted by `Option` fields and by fields whose type has a
/// registered converter.
pub(crate) fn nulls(schema: &Schema, source: &Source<'_>, converters: &Converters) -> Result<()> {
    let offending: IndexSet<&str> = schema
        .slots()
        .iter()
        .filter(|slot| source.get(slot.name()).is_some_and(|value| value.is_null()))
        .filter(|slot| !slot.is_optional() && !converters.contains(slot.shape()))
        .map(|slot| slot.name())
        .collect();
    if offending.is_empty() {
        return Ok(());
    }
    Err(null_values(offending))
}

pub(crate) fn null_values<'a>(names: impl IntoIterator<Item = &'a str>) -> BindError {
    BindError::new(
        BindErrorKind::NullValue,
        format!(
            "Null values require fields to be Option. Null values for fields: {}.",
            quoted(names)
        ),
    )
}

/// Names that equal another name ignoring case without equalling it
/// exactly, each listed once, in input order.
fn case_duplicates<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let names: IndexSet<&str> = names.collect();
    names
        .iter()
        .copied()
        .filter(|name| {
            names
                .iter()
                .any(|other| other != name && KeyCase::Insensitive.matches(other, name))
        })
        .collect()
}

/// `'a', 'b', 'c'`
pub(crate) fn quoted<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
