//! Errors raised while binding a record onto a shape.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use facet_core::Shape;
use facet_reflect::ReflectError;

use crate::descriptor::TypeName;

/// A boxed error returned by a registered converter.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// The closed set of failure kinds.
///
/// Every [`BindError`] carries exactly one of these, so callers can match
/// narrowly on the kind or treat all bind failures alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindErrorKind {
    /// The record, the target type, a converter registration or a field's
    /// declared type is not acceptable.
    IllegalArgument,
    /// The binder ignores key case, and the target has fields whose names
    /// only differ by case.
    FieldDuplicate,
    /// The record has keys with no corresponding field.
    MissingFields,
    /// The target has fields with no corresponding key.
    MissingValues,
    /// A non-optional field received null and no converter can handle it.
    NullValue,
    /// The built-in enum conversion found no variant for the value.
    EnumCreation,
    /// A value cannot be assigned to the field it was meant for.
    TypeMismatch,
    /// A registered converter failed, returned null for a non-optional field,
    /// or returned a value of the wrong type for an optional field.
    RegisteredConverter,
    /// Anything else, typically a reflection failure.
    Unknown,
}

impl fmt::Display for BindErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindErrorKind::IllegalArgument => "illegal argument",
            BindErrorKind::FieldDuplicate => "field duplicate",
            BindErrorKind::MissingFields => "missing fields",
            BindErrorKind::MissingValues => "missing values",
            BindErrorKind::NullValue => "null value",
            BindErrorKind::EnumCreation => "enum creation",
            BindErrorKind::TypeMismatch => "type mismatch",
            BindErrorKind::RegisteredConverter => "registered converter",
            BindErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Error type for record binding.
#[derive(Debug)]
pub struct BindError {
    kind: BindErrorKind,
    message: String,
    source: Option<BoxError>,
}

/// Result type for record binding.
pub type Result<T> = core::result::Result<T, BindError>;

impl BindError {
    /// Create an error of the given kind with a formatted message.
    pub fn new(kind: BindErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> BindErrorKind {
        self.kind
    }

    /// The human-readable message, without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(BindErrorKind::IllegalArgument, message)
    }

    pub(crate) fn type_mismatch(value_type: &str, field: &str, field_type: &Shape) -> Self {
        Self::new(
            BindErrorKind::TypeMismatch,
            alloc::format!(
                "Cannot assign value of type '{value_type}' to field '{field}' of type '{}'.",
                TypeName(field_type)
            ),
        )
    }

    pub(crate) fn converter_returned_null(shape: &Shape) -> Self {
        Self::new(
            BindErrorKind::RegisteredConverter,
            alloc::format!(
                "Null values require fields to be Option. Registered converter for type '{}' returned null.",
                TypeName(shape)
            ),
        )
    }

    pub(crate) fn converter_failed(shape: &Shape, cause: BoxError) -> Self {
        Self::new(
            BindErrorKind::RegisteredConverter,
            alloc::format!(
                "Registered converter for type '{}' failed: {cause}",
                TypeName(shape)
            ),
        )
        .with_source(cause)
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for BindError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn core::error::Error + 'static))
    }
}

impl From<ReflectError> for BindError {
    fn from(err: ReflectError) -> Self {
        BindError::new(
            BindErrorKind::Unknown,
            alloc::format!("Unexpected failure: {err}"),
        )
        .with_source(err)
    }
}
