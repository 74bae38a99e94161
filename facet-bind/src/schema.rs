//! The bindable fields of a target shape.

use alloc::format;
use alloc::vec::Vec;

use facet_core::{Facet, Field, Shape, StructKind, StructType, Type, UserType};

use crate::descriptor::{self, TypeDescriptor, TypeName};
use crate::error::{BindError, Result};

/// A named, typed binding point on a target shape.
#[derive(Clone, Debug)]
pub struct Slot {
    name: &'static str,
    shape: &'static Shape,
    declaring: &'static Shape,
    parent: Vec<usize>,
    index: usize,
}

impl Slot {
    /// The field name, which is also the record key it binds from.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared shape of the field.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// The struct that declares the field: the target itself, or one of
    /// its flattened ancestors.
    pub fn declaring(&self) -> &'static Shape {
        self.declaring
    }

    /// Whether the field is `Option<_>`, and may therefore receive null.
    pub fn is_optional(&self) -> bool {
        descriptor::is_optional(self.shape)
    }

    /// Classify the field's declared shape.
    pub fn descriptor(&self) -> Result<TypeDescriptor> {
        TypeDescriptor::of(self.shape, self.name)
    }

    /// Field indices leading from the target to the declaring struct.
    pub(crate) fn parent(&self) -> &[usize] {
        &self.parent
    }

    /// Index of the field inside the declaring struct.
    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// A field that is not bound from the record and gets its type's default.
#[derive(Clone, Debug)]
pub(crate) struct Excluded {
    pub(crate) parent: Vec<usize>,
    pub(crate) index: usize,
}

/// The slots of a target struct, flattened ancestors included.
///
/// Slots are in depth-first declaration order. A name redeclared by a
/// struct that also flattens an ancestor declaring it appears twice, and
/// both slots are bound from the same record value.
#[derive(Clone, Debug)]
pub struct Schema {
    shape: &'static Shape,
    slots: Vec<Slot>,
    excluded: Vec<Excluded>,
}

impl Schema {
    /// Introspect the target type `T`.
    pub fn for_type<T: Facet<'static>>() -> Result<Self> {
        Self::of(T::SHAPE)
    }

    /// Introspect a struct shape.
    ///
    /// Fields marked `#[facet(skip)]` or `#[facet(skip_deserializing)]` and
    /// `PhantomData` markers are excluded. Fields marked
    /// `#[facet(flatten)]` are walked as ancestors.
    pub fn of(shape: &'static Shape) -> Result<Self> {
        let struct_type = named_struct(shape).ok_or_else(|| {
            BindError::illegal_argument(format!(
                "Cannot introspect '{}': not a struct with named fields.",
                TypeName(shape)
            ))
        })?;

        let mut schema = Schema {
            shape,
            slots: Vec::new(),
            excluded: Vec::new(),
        };
        let mut parent = Vec::new();
        schema.walk(shape, struct_type, &mut parent)?;
        tracing::trace!(
            "schema for {}: {} slots, {} excluded",
            shape,
            schema.slots.len(),
            schema.excluded.len()
        );
        Ok(schema)
    }

    fn walk(
        &mut self,
        declaring: &'static Shape,
        struct_type: &'static StructType,
        parent: &mut Vec<usize>,
    ) -> Result<()> {
        for (index, field) in struct_type.fields.iter().enumerate() {
            if is_excluded(field) {
                self.excluded.push(Excluded {
                    parent: parent.clone(),
                    index,
                });
                continue;
            }

            let shape = field.shape();
            if field.is_flattened() {
                let ancestor = named_struct(shape).ok_or_else(|| {
                    BindError::illegal_argument(format!(
                        "Flattened field '{}' of '{}' must be a struct with named fields.",
                        field.name, declaring
                    ))
                })?;
                parent.push(index);
                self.walk(shape, ancestor, parent)?;
                parent.pop();
                continue;
            }

            self.slots.push(Slot {
                name: field.name,
                shape,
                declaring,
                parent: parent.clone(),
                index,
            });
        }
        Ok(())
    }

    /// The introspected shape.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// All slots, in depth-first declaration order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Iterate over slot names in schema order. Redeclared names repeat.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|slot| slot.name)
    }

    pub(crate) fn excluded(&self) -> &[Excluded] {
        &self.excluded
    }
}

/// The struct type of `shape`, if it is a struct with named fields or a
/// unit struct.
pub(crate) fn named_struct(shape: &'static Shape) -> Option<&'static StructType> {
    match &shape.ty {
        Type::User(UserType::Struct(struct_type))
            if matches!(struct_type.kind, StructKind::Struct | StructKind::Unit) =>
        {
            Some(struct_type)
        }
        _ => None,
    }
}

fn is_excluded(field: &Field) -> bool {
    field.should_skip_deserializing() || field.shape().type_identifier == "PhantomData"
}
