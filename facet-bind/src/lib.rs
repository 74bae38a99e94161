#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod check;
mod converters;
mod descriptor;
mod error;
mod instance;
mod record;
mod scalar;
mod schema;

pub use converters::Converted;
pub use descriptor::TypeDescriptor;
pub use error::{BindError, BindErrorKind, BoxError, Result};
pub use record::{KeyCase, Record};
pub use schema::{Schema, Slot};

use facet_core::{Facet, Shape};
use facet_value::Value;

use crate::converters::Converters;
use crate::record::Source;

/// Binds flat records onto facet structs.
///
/// A binder holds a key-case mode and a converter registry. Register
/// converters first, then bind; binding only reads the registry, so a
/// configured binder can be shared between threads.
///
/// ```
/// use facet::Facet;
/// use facet_bind::MapBinder;
/// use facet_value::Value;
/// use std::collections::HashMap;
///
/// #[derive(Facet, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: Option<i32>,
/// }
///
/// let record: HashMap<String, Value> = [
///     ("x".to_string(), Value::from(10)),
///     ("y".to_string(), Value::NULL),
/// ]
/// .into_iter()
/// .collect();
///
/// let point: Point = MapBinder::new().bind(&record).unwrap();
/// assert_eq!(point, Point { x: 10, y: None });
/// ```
#[derive(Debug, Default)]
pub struct MapBinder {
    key_case: KeyCase,
    converters: Converters,
}

impl MapBinder {
    /// A binder that matches keys to field names exactly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A binder that matches keys to field names ignoring case.
    pub fn case_insensitive() -> Self {
        Self::with_key_case(KeyCase::Insensitive)
    }

    /// A binder with the given key-case mode.
    pub fn with_key_case(key_case: KeyCase) -> Self {
        Self {
            key_case,
            converters: Converters::default(),
        }
    }

    /// The key-case mode of this binder.
    pub fn key_case(&self) -> KeyCase {
        self.key_case
    }

    /// Register a converter for fields of type `T` (and `Option<T>`).
    ///
    /// The converter sees the raw record value, null included. `Ok(None)`
    /// is its null output, which only `Option<T>` fields accept. An `Err`
    /// becomes a [`BindErrorKind::RegisteredConverter`] failure with the
    /// error as its source. A later registration for the same type replaces
    /// an earlier one.
    ///
    /// Converters report failure by returning `Err`. A panic inside a
    /// converter is not caught and unwinds out of [`MapBinder::bind`].
    ///
    /// Registering for `Option<_>` fails: register for the parameter.
    pub fn register<T, F, E>(&self, convert: F) -> Result<&Self>
    where
        T: Facet<'static> + 'static,
        F: Fn(&Value) -> core::result::Result<Option<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.converters.register(convert)?;
        Ok(self)
    }

    /// Register a converter for a shape chosen at runtime.
    ///
    /// The converter's output is checked against `shape` when it is
    /// assigned. As with [`MapBinder::register`], failures must be returned
    /// as `Err` rather than raised as panics.
    pub fn register_dynamic<F, E>(&self, shape: &'static Shape, convert: F) -> Result<&Self>
    where
        F: Fn(&Value) -> core::result::Result<Option<Converted>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.converters.register_dynamic(shape, convert)?;
        Ok(self)
    }

    /// Whether a converter is registered for exactly `shape`.
    pub fn has_converter(&self, shape: &Shape) -> bool {
        self.converters.contains(shape)
    }

    /// Bind `record` onto a new `T`.
    ///
    /// Every key must name a field of `T` and every field must have a key.
    /// `T` is allocated without running any of its code; fields marked
    /// `#[facet(skip)]` get their default.
    pub fn bind<T: Facet<'static>>(&self, record: &impl Record) -> Result<T> {
        let shape = T::SHAPE;
        tracing::debug!("binding record to {} ({:?})", shape, self.key_case);

        let entries = record
            .entries()
            .ok_or_else(|| BindError::illegal_argument("Map cannot be null."))?;
        check::target(shape)?;

        let schema = Schema::of(shape)?;
        let source = Source::new(entries, self.key_case);
        check::field_duplicates(&schema, self.key_case)?;
        check::key_duplicates(&source)?;
        check::correspondence(&schema, &source)?;
        check::nulls(&schema, &source, &self.converters)?;

        let value = instance::bind(&schema, &source, &self.converters)?;
        tracing::debug!("bound {} fields of {}", schema.slots().len(), shape);
        Ok(value)
    }

    /// Bind the only value of a singleton `record` onto a new `T`.
    ///
    /// `T` can be any type the converters understand: primitives, strings,
    /// `Option<_>`, enums and registered types. The key is only used in
    /// error messages.
    pub fn bind_single<T: Facet<'static>>(&self, record: &impl Record) -> Result<T> {
        tracing::debug!("binding single value to {}", T::SHAPE);
        let entries = record
            .entries()
            .ok_or_else(|| BindError::illegal_argument("Map cannot be null."))?;
        let source = Source::new(entries, self.key_case);
        instance::bind_single(&source, &self.converters)
    }
}
