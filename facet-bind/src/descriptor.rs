//! Classification of a field's declared shape.

use alloc::format;
use core::fmt;

use facet_core::{Def, Shape};

use crate::error::{BindError, Result};

/// The declared type of a field, as seen by converter resolution.
///
/// `Option<I>` is the optional wrapper: a field of that type may receive
/// null, and converters are looked up for `I` rather than for the wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Any shape other than `Option<_>`.
    Plain(&'static Shape),
    /// `Option<I>`, with `I` in `inner`.
    Optional {
        /// The `Option<I>` shape itself.
        wrapper: &'static Shape,
        /// The wrapped shape `I`.
        inner: &'static Shape,
    },
}

impl TypeDescriptor {
    /// Classify the declared shape of the field called `field`.
    ///
    /// Nested optionals (`Option<Option<T>>`) are rejected: an absent value
    /// could mean either layer.
    pub fn of(shape: &'static Shape, field: &str) -> Result<Self> {
        let Def::Option(option_def) = &shape.def else {
            return Ok(TypeDescriptor::Plain(shape));
        };

        let inner = option_def.t();
        if is_optional(inner) {
            return Err(BindError::illegal_argument(format!(
                "Nested optionals are not supported. Field '{field}' is '{}'.",
                TypeName(shape)
            )));
        }

        Ok(TypeDescriptor::Optional {
            wrapper: shape,
            inner,
        })
    }

    /// The declared shape, wrapper included.
    pub fn shape(&self) -> &'static Shape {
        match self {
            TypeDescriptor::Plain(shape) => shape,
            TypeDescriptor::Optional { wrapper, .. } => wrapper,
        }
    }

    /// Whether this is the optional wrapper.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeDescriptor::Optional { .. })
    }
}

/// Whether `shape` is `Option<_>`.
pub(crate) fn is_optional(shape: &Shape) -> bool {
    matches!(shape.def, Def::Option(_))
}

/// A shape's type name as written in messages, with `Option` parameters
/// spelled out (`Option<u32>`, `Option<Option<u32>>`).
pub(crate) struct TypeName<'a>(pub(crate) &'a Shape);

impl fmt::Display for TypeName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.def {
            Def::Option(option_def) => write!(f, "Option<{}>", TypeName(option_def.t())),
            _ => fmt::Display::fmt(self.0, f),
        }
    }
}
