//! Exact-type identity between dynamic values and declared shapes.
//!
//! A value taken as-is from a record (no converter involved) is only
//! assignable to a field when it already *is* a value of the field's type:
//! integers go to integer fields that can hold them, floats to float fields,
//! strings to `String`, and so on. No parsing and no int/float crossover
//! happens here; that is what registered converters are for.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use facet_core::{Facet, ScalarType, Shape};
use facet_reflect::{Partial, ReflectError};
use facet_value::{VNumber, Value, ValueType};

/// A value coerced to the exact Rust type of a field, ready to be placed.
#[derive(Debug)]
pub(crate) enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    ISize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    USize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    CowStr(Cow<'static, str>),
    Bytes(Vec<u8>),
    Dynamic(Value),
}

/// The name of a dynamic value's runtime type, as used in error messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value.value_type() {
        ValueType::Null => "null",
        ValueType::Bool => "bool",
        ValueType::Number => match value.as_number() {
            Some(n) if n.is_float() => "f64",
            Some(n) if n.to_i64().is_some() => "i64",
            _ => "u64",
        },
        ValueType::String => "String",
        ValueType::Bytes => "Vec<u8>",
        ValueType::Array => "array",
        ValueType::Object => "object",
        ValueType::DateTime => "datetime",
        ValueType::QName => "qname",
        ValueType::Uuid => "uuid",
    }
}

/// Coerce `value` to the exact type described by `shape`.
///
/// Returns `None` when the value is not of that type. Null is never
/// coerced; the caller handles it before getting here.
pub(crate) fn coerce(shape: &'static Shape, value: &Value) -> Option<Scalar> {
    if shape == Value::SHAPE {
        return Some(Scalar::Dynamic(value.clone()));
    }
    if shape == <Vec<u8>>::SHAPE {
        return value
            .as_bytes()
            .map(|bytes| Scalar::Bytes(bytes.as_slice().to_vec()));
    }

    let scalar_type = shape.scalar_type()?;
    if let Some(b) = value.as_bool() {
        return matches!(scalar_type, ScalarType::Bool).then_some(Scalar::Bool(b));
    }
    if let Some(number) = value.as_number() {
        return coerce_number(scalar_type, number);
    }
    if let Some(s) = value.as_string() {
        return coerce_str(scalar_type, s.as_str());
    }
    None
}

macro_rules! integer {
    ($number:expr, $variant:ident, $ty:ty) => {{
        let number = $number;
        if !number.is_integer() {
            None
        } else if let Some(v) = number.to_i64() {
            <$ty>::try_from(v).ok().map(Scalar::$variant)
        } else {
            number
                .to_u64()
                .and_then(|v| <$ty>::try_from(v).ok())
                .map(Scalar::$variant)
        }
    }};
}

fn coerce_number(scalar_type: ScalarType, number: &VNumber) -> Option<Scalar> {
    match scalar_type {
        ScalarType::I8 => integer!(number, I8, i8),
        ScalarType::I16 => integer!(number, I16, i16),
        ScalarType::I32 => integer!(number, I32, i32),
        ScalarType::I64 => integer!(number, I64, i64),
        ScalarType::I128 => integer!(number, I128, i128),
        ScalarType::ISize => integer!(number, ISize, isize),
        ScalarType::U8 => integer!(number, U8, u8),
        ScalarType::U16 => integer!(number, U16, u16),
        ScalarType::U32 => integer!(number, U32, u32),
        ScalarType::U64 => integer!(number, U64, u64),
        ScalarType::U128 => integer!(number, U128, u128),
        ScalarType::USize => integer!(number, USize, usize),
        ScalarType::F64 if number.is_float() => number.to_f64().map(Scalar::F64),
        ScalarType::F32 if number.is_float() => {
            let v = number.to_f64()?;
            let narrowed = v as f32;
            (f64::from(narrowed) == v).then_some(Scalar::F32(narrowed))
        }
        _ => None,
    }
}

fn coerce_str(scalar_type: ScalarType, s: &str) -> Option<Scalar> {
    match scalar_type {
        ScalarType::String => Some(Scalar::String(s.into())),
        ScalarType::CowStr => Some(Scalar::CowStr(Cow::Owned(s.into()))),
        ScalarType::Char => {
            let mut chars = s.chars();
            let c = chars.next()?;
            chars.next().is_none().then_some(Scalar::Char(c))
        }
        _ => None,
    }
}

/// Move a coerced value into the current frame of `partial`.
pub(crate) fn place(
    partial: Partial<'static>,
    scalar: Scalar,
) -> Result<Partial<'static>, ReflectError> {
    match scalar {
        Scalar::Bool(v) => partial.set(v),
        Scalar::I8(v) => partial.set(v),
        Scalar::I16(v) => partial.set(v),
        Scalar::I32(v) => partial.set(v),
        Scalar::I64(v) => partial.set(v),
        Scalar::I128(v) => partial.set(v),
        Scalar::ISize(v) => partial.set(v),
        Scalar::U8(v) => partial.set(v),
        Scalar::U16(v) => partial.set(v),
        Scalar::U32(v) => partial.set(v),
        Scalar::U64(v) => partial.set(v),
        Scalar::U128(v) => partial.set(v),
        Scalar::USize(v) => partial.set(v),
        Scalar::F32(v) => partial.set(v),
        Scalar::F64(v) => partial.set(v),
        Scalar::Char(v) => partial.set(v),
        Scalar::String(v) => partial.set(v),
        Scalar::CowStr(v) => partial.set(v),
        Scalar::Bytes(v) => partial.set(v),
        Scalar::Dynamic(v) => partial.set(v),
    }
}
