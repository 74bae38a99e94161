//! Allocation and population of the target value.
//!
//! The target is allocated as a [`Partial`], so no constructor, `Default`
//! impl or other user code runs. Fields are filled in schema order, and the
//! value is only built once every field holds a value; on any failure the
//! partial value is dropped.

use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;

use facet_core::{Facet, Shape};
use facet_reflect::Partial;
use facet_value::Value;

use crate::check;
use crate::converters::{Conversion, Converters};
use crate::descriptor::{TypeDescriptor, TypeName};
use crate::error::{BindError, BindErrorKind, Result};
use crate::record::Source;
use crate::scalar;
use crate::schema::{Schema, Slot};

/// Where a converted value ends up, for error messages.
#[derive(Clone, Copy)]
enum Destination<'a> {
    Field(&'a str),
    Single,
}

impl Destination<'_> {
    fn mismatch(self, runtime: &dyn fmt::Display, shape: &Shape) -> BindError {
        match self {
            Destination::Field(name) => BindError::type_mismatch(&runtime.to_string(), name, shape),
            Destination::Single => BindError::new(
                BindErrorKind::TypeMismatch,
                format!(
                    "Cannot convert value of type '{runtime}' to single value of type '{}'.",
                    TypeName(shape)
                ),
            ),
        }
    }
}

/// One field to fill: either bound from the record or defaulted.
struct Step<'s> {
    parent: &'s [usize],
    index: usize,
    slot: Option<&'s Slot>,
}

impl Step<'_> {
    fn path(&self) -> impl Iterator<Item = usize> + '_ {
        self.parent.iter().copied().chain([self.index])
    }
}

/// Bind every slot of `schema` from `source` into a fresh `T`.
pub(crate) fn bind<T: Facet<'static>>(
    schema: &Schema,
    source: &Source<'_>,
    converters: &Converters,
) -> Result<T> {
    let mut steps: Vec<Step<'_>> = schema
        .slots()
        .iter()
        .map(|slot| Step {
            parent: slot.parent(),
            index: slot.index(),
            slot: Some(slot),
        })
        .chain(schema.excluded().iter().map(|excluded| Step {
            parent: &excluded.parent,
            index: excluded.index,
            slot: None,
        }))
        .collect();
    steps.sort_by(|a, b| a.path().cmp(b.path()));

    let mut partial = Partial::alloc::<T>()?;
    let mut open: Vec<usize> = Vec::new();

    for step in &steps {
        while !step.parent.starts_with(&open) {
            partial = partial.end()?;
            open.pop();
        }
        for &index in &step.parent[open.len()..] {
            partial = partial.begin_nth_field(index)?;
            open.push(index);
        }

        partial = partial.begin_nth_field(step.index)?;
        partial = match step.slot {
            Some(slot) => {
                static NULL: Value = Value::NULL;
                let value = source.get(slot.name()).unwrap_or(&NULL);
                let descriptor = slot.descriptor()?;
                tracing::trace!("binding {} ({}) from {:?}", slot.name(), slot.shape(), value);
                let conversion = converters.resolve(&descriptor).apply(slot.name(), value)?;
                assign(partial, Destination::Field(slot.name()), &descriptor, conversion)?
            }
            None => partial.set_default()?,
        };
        partial = partial.end()?;
    }

    while open.pop().is_some() {
        partial = partial.end()?;
    }

    Ok(partial.build()?.materialize::<T>()?)
}

/// Bind the only value of a singleton record to a fresh `T`.
pub(crate) fn bind_single<T: Facet<'static>>(
    source: &Source<'_>,
    converters: &Converters,
) -> Result<T> {
    let shape = T::SHAPE;
    let [(key, value)] = source.entries() else {
        return Err(BindError::illegal_argument(format!(
            "Cannot bind non-singleton map to single value of type '{}'. Keys found: {}.",
            TypeName(shape),
            check::quoted(source.keys())
        )));
    };

    let descriptor = TypeDescriptor::of(shape, key)?;
    if value.is_null() && !descriptor.is_optional() && !converters.contains(shape) {
        return Err(check::null_values([*key]));
    }

    let conversion = converters.resolve(&descriptor).apply(key, value)?;
    let partial = Partial::alloc::<T>()?;
    let partial = assign(partial, Destination::Single, &descriptor, conversion)?;
    Ok(partial.build()?.materialize::<T>()?)
}

/// Write a conversion output into the current frame, which has the declared
/// type of `descriptor`.
fn assign(
    partial: Partial<'static>,
    destination: Destination<'_>,
    descriptor: &TypeDescriptor,
    conversion: Conversion,
) -> Result<Partial<'static>> {
    let shape = descriptor.shape();
    let partial = match conversion {
        Conversion::Null => return Err(BindError::converter_returned_null(shape)),
        Conversion::Raw(value) => match scalar::coerce(shape, &value) {
            Some(coerced) => scalar::place(partial, coerced)?,
            None => {
                return Err(destination.mismatch(&scalar::value_type_name(&value), shape));
            }
        },
        Conversion::Scalar(coerced) => scalar::place(partial, coerced)?,
        Conversion::Typed(typed) => {
            if typed.shape() != shape {
                return Err(destination.mismatch(&TypeName(typed.shape()), shape));
            }
            typed.place(partial)?
        }
        Conversion::Variant(name) => partial.select_variant_named(name)?,
        Conversion::Present(inner) => {
            let TypeDescriptor::Optional { inner: inner_shape, .. } = *descriptor else {
                return Err(destination.mismatch(&"Option", shape));
            };
            let partial = partial.begin_some()?;
            let partial = assign(
                partial,
                destination,
                &TypeDescriptor::Plain(inner_shape),
                *inner,
            )?;
            partial.end()?
        }
        Conversion::Absent => partial.set_default()?,
    };
    Ok(partial)
}
