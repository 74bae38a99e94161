//! Registered conversion functions and conversion resolution.
//!
//! A field's value goes through exactly one conversion function before it is
//! assigned: the converter registered for the field's exact shape, the
//! built-in variant-name lookup for enums, or the identity. `Option<I>`
//! fields resolve the function for `I` and wrap its output.

use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use core::fmt;
use std::collections::HashMap;

use facet_core::{EnumType, Facet, Shape, StructKind, Type, UserType};
use facet_reflect::{Partial, ReflectError};
use facet_value::Value;
use parking_lot::RwLock;

use crate::descriptor::{self, TypeDescriptor, TypeName};
use crate::error::{BindError, BindErrorKind, BoxError, Result};
use crate::scalar::{self, Scalar};

/// A value produced by a registered converter, with its type erased.
pub struct Converted {
    inner: Box<dyn Place>,
}

impl Converted {
    /// Wrap a value of any facet type.
    pub fn new<T: Facet<'static> + 'static>(value: T) -> Self {
        Self {
            inner: Box::new(Owned(value)),
        }
    }

    /// The shape of the wrapped value.
    pub fn shape(&self) -> &'static Shape {
        self.inner.shape()
    }

    pub(crate) fn place(
        self,
        partial: Partial<'static>,
    ) -> core::result::Result<Partial<'static>, ReflectError> {
        self.inner.place(partial)
    }
}

impl fmt::Debug for Converted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converted")
            .field("shape", &format_args!("{}", TypeName(self.shape())))
            .finish_non_exhaustive()
    }
}

trait Place {
    fn shape(&self) -> &'static Shape;
    fn place(
        self: Box<Self>,
        partial: Partial<'static>,
    ) -> core::result::Result<Partial<'static>, ReflectError>;
}

struct Owned<T>(T);

impl<T: Facet<'static>> Place for Owned<T> {
    fn shape(&self) -> &'static Shape {
        T::SHAPE
    }

    fn place(
        self: Box<Self>,
        partial: Partial<'static>,
    ) -> core::result::Result<Partial<'static>, ReflectError> {
        partial.set(self.0)
    }
}

type ConvertFn = dyn Fn(&Value) -> core::result::Result<Option<Converted>, BoxError> + Send + Sync;

/// A user conversion function, stored with the shape it was registered for.
pub(crate) struct Registered {
    shape: &'static Shape,
    convert: Box<ConvertFn>,
}

impl Registered {
    fn call(&self, value: &Value) -> Result<Conversion> {
        match (self.convert)(value) {
            Ok(Some(converted)) => Ok(Conversion::Typed(converted)),
            Ok(None) => Ok(Conversion::Null),
            Err(cause) => Err(BindError::converter_failed(self.shape, cause)),
        }
    }
}

/// Shape-keyed converter registry.
#[derive(Default)]
pub(crate) struct Converters {
    map: RwLock<HashMap<&'static Shape, Arc<Registered>>>,
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.map.read();
        f.debug_set()
            .entries(map.keys().map(|shape| format!("{shape}")))
            .finish()
    }
}

impl Converters {
    /// Register a typed converter for `T`.
    pub(crate) fn register<T, F, E>(&self, convert: F) -> Result<()>
    where
        T: Facet<'static> + 'static,
        F: Fn(&Value) -> core::result::Result<Option<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.insert(
            T::SHAPE,
            Box::new(move |value| {
                convert(value)
                    .map(|out| out.map(Converted::new))
                    .map_err(Into::into)
            }),
        )
    }

    /// Register a type-erased converter for `shape`.
    pub(crate) fn register_dynamic<F, E>(&self, shape: &'static Shape, convert: F) -> Result<()>
    where
        F: Fn(&Value) -> core::result::Result<Option<Converted>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.insert(shape, Box::new(move |value| convert(value).map_err(Into::into)))
    }

    fn insert(&self, shape: &'static Shape, convert: Box<ConvertFn>) -> Result<()> {
        if descriptor::is_optional(shape) {
            return Err(BindError::illegal_argument(format!(
                "Cannot register converter for '{}'. Register converter for the type parameter instead.",
                TypeName(shape)
            )));
        }
        tracing::debug!("registering converter for {}", shape);
        self.map
            .write()
            .insert(shape, Arc::new(Registered { shape, convert }));
        Ok(())
    }

    /// Whether a converter is registered for exactly `shape`.
    pub(crate) fn contains(&self, shape: &Shape) -> bool {
        self.map.read().contains_key(shape)
    }

    fn get(&self, shape: &Shape) -> Option<Arc<Registered>> {
        self.map.read().get(shape).cloned()
    }

    /// Resolve the conversion function for a field of the given declared type.
    pub(crate) fn resolve(&self, descriptor: &TypeDescriptor) -> Resolved {
        match *descriptor {
            TypeDescriptor::Plain(shape) => self.resolve_plain(shape),
            TypeDescriptor::Optional { wrapper, inner } => Resolved::Optional {
                wrapper,
                inner,
                function: Box::new(self.resolve_plain(inner)),
            },
        }
    }

    fn resolve_plain(&self, shape: &'static Shape) -> Resolved {
        if let Some(registered) = self.get(shape) {
            return Resolved::Registered(registered);
        }
        if let Type::User(UserType::Enum(enum_type)) = &shape.ty {
            return Resolved::Enum { shape, enum_type };
        }
        Resolved::Identity
    }
}

/// The output of a conversion function.
#[derive(Debug)]
pub(crate) enum Conversion {
    /// The function produced null.
    Null,
    /// The raw record value, unchanged.
    Raw(Value),
    /// A raw value already checked against the field's inner type.
    Scalar(Scalar),
    /// A registered converter's output.
    Typed(Converted),
    /// A unit variant of an enum, by name.
    Variant(&'static str),
    /// `Some` of the inner conversion.
    Present(Box<Conversion>),
    /// `None`.
    Absent,
}

/// A conversion function resolved for one declared type.
pub(crate) enum Resolved {
    Registered(Arc<Registered>),
    Enum {
        shape: &'static Shape,
        enum_type: &'static EnumType,
    },
    Identity,
    Optional {
        wrapper: &'static Shape,
        inner: &'static Shape,
        function: Box<Resolved>,
    },
}

impl Resolved {
    /// Whether this function is a user registration.
    pub(crate) fn is_registered(&self) -> bool {
        matches!(self, Resolved::Registered(_))
    }

    /// Apply the function to the raw value looked up for `slot`.
    pub(crate) fn apply(&self, slot: &str, value: &Value) -> Result<Conversion> {
        match self {
            Resolved::Registered(registered) => registered.call(value),
            Resolved::Enum { shape, enum_type } => variant_named(shape, enum_type, value),
            Resolved::Identity if value.is_null() => Ok(Conversion::Null),
            Resolved::Identity => Ok(Conversion::Raw(value.clone())),
            Resolved::Optional {
                wrapper,
                inner,
                function,
            } => {
                let converted = function.apply(slot, value)?;
                let mismatch = |runtime: &dyn fmt::Display| {
                    if function.is_registered() {
                        BindError::new(
                            BindErrorKind::RegisteredConverter,
                            format!(
                                "Cannot assign value of type 'Option<{runtime}>' returned by registered converter to field '{slot}' of type '{}'.",
                                TypeName(wrapper)
                            ),
                        )
                    } else {
                        BindError::new(
                            BindErrorKind::TypeMismatch,
                            format!(
                                "Cannot assign value of type 'Option<{runtime}>' to field '{slot}' of type '{}'.",
                                TypeName(wrapper)
                            ),
                        )
                    }
                };

                let present = match converted {
                    Conversion::Null => return Ok(Conversion::Absent),
                    Conversion::Raw(raw) => match scalar::coerce(inner, &raw) {
                        Some(scalar) => Conversion::Scalar(scalar),
                        None => return Err(mismatch(&scalar::value_type_name(&raw))),
                    },
                    Conversion::Typed(typed) if typed.shape() != *inner => {
                        return Err(mismatch(&TypeName(typed.shape())));
                    }
                    other => other,
                };
                Ok(Conversion::Present(Box::new(present)))
            }
        }
    }
}

fn variant_named(shape: &Shape, enum_type: &EnumType, value: &Value) -> Result<Conversion> {
    if value.is_null() {
        return Ok(Conversion::Null);
    }
    let Some(name) = value.as_string() else {
        return Err(BindError::new(
            BindErrorKind::EnumCreation,
            format!(
                "Cannot convert value of type '{}' to enum '{}'.",
                scalar::value_type_name(value),
                TypeName(shape)
            ),
        ));
    };
    let name = name.as_str();
    enum_type
        .variants
        .iter()
        .find(|variant| variant.name == name && matches!(variant.data.kind, StructKind::Unit))
        .map(|variant| Conversion::Variant(variant.name))
        .ok_or_else(|| {
            BindError::new(
                BindErrorKind::EnumCreation,
                format!(
                    "'{}' does not have a variant named '{name}'.",
                    TypeName(shape)
                ),
            )
        })
}
