use std::{any::type_name, cell::RefCell, rc::Rc};

use serde::Serialize;

use super::{Reflect, Scalar, Shape};
use crate::{
    RecliError, Result,
    defaults::{self, ParseDefault},
};

/// A `(name, value)` metadata pair attached to a record field.
///
/// A value may list several comma-separated entries, so `recli = "id,readonly"`
/// carries both the `id` and `readonly` roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Tag name, e.g. `recli` or `default`
    pub name: &'static str,
    /// Tag value
    pub value: &'static str,
}

impl Tag {
    /// Creates a tag.
    pub const fn new(name: &'static str, value: &'static str) -> Self {
        Self { name, value }
    }
}

/// Static description of one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: &'static str,
    /// Tags in declaration order
    pub tags: &'static [Tag],
    /// Whether the field is an embedded (flattened) part of the record
    pub embedded: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor for a regular field.
    pub const fn new(name: &'static str, tags: &'static [Tag]) -> Self {
        Self {
            name,
            tags,
            embedded: false,
        }
    }

    /// Marks the field as embedded; embedded fields get no command node.
    pub const fn embedded(self) -> Self {
        Self {
            embedded: true,
            ..self
        }
    }

    /// Value of the first tag called `name`.
    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        self.tags.iter().find(|tag| tag.name == name).map(|tag| tag.value)
    }

    /// Whether any tag called `role.name` lists `role.value` among its entries.
    pub fn has_tag(&self, role: &Tag) -> bool {
        self.tags
            .iter()
            .filter(|tag| tag.name == role.name)
            .any(|tag| tag.value.split(',').any(|entry| entry == role.value))
    }
}

/// Identity of a record instance: where it lives and what it is.
///
/// The type name keeps a record distinct from a child record stored at
/// offset zero of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    address: usize,
    type_name: &'static str,
}

impl RecordId {
    /// Identity of the record at `record`.
    pub fn of<T: ?Sized>(record: &T) -> Self {
        Self {
            address: record as *const T as *const () as usize,
            type_name: type_name::<T>(),
        }
    }
}

/// A structured value with named fields.
///
/// Usually implemented with [`record!`](crate::record).
pub trait Record {
    /// Descriptors of every field, in declaration order.
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Mutable access to the field called `name`.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;

    /// Encodes the whole record as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `RecliError::Serialization` if the record cannot be encoded.
    fn encode(&self) -> Result<String>;

    /// Identity used for cycle detection.
    fn identity(&self) -> RecordId {
        RecordId::of(self)
    }
}

/// A record behind shared ownership.
///
/// Shared records can be reached from several paths, including from their
/// own descendants, so their identity is available without borrowing them.
pub trait SharedRecord {
    /// Identity of the shared record, obtained without borrowing it.
    fn identity(&self) -> RecordId;

    /// Borrows the record mutably for the duration of `visit`.
    ///
    /// # Errors
    /// Returns `RecliError::Borrowed` if the record is already borrowed.
    fn with_record(&self, visit: &mut dyn FnMut(&mut dyn Record) -> Result<()>) -> Result<()>;
}

impl<T: Record + 'static> SharedRecord for Rc<RefCell<T>> {
    fn identity(&self) -> RecordId {
        RecordId {
            address: self.as_ptr() as *const () as usize,
            type_name: type_name::<T>(),
        }
    }

    fn with_record(&self, visit: &mut dyn FnMut(&mut dyn Record) -> Result<()>) -> Result<()> {
        let mut record = self.try_borrow_mut().map_err(|_| RecliError::Borrowed)?;
        visit(&mut *record)
    }
}

impl<T: Record + 'static> Reflect for Rc<RefCell<T>> {
    fn shape(&mut self) -> Shape<'_> {
        Shape::Shared(self)
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn shape(&mut self) -> Shape<'_> {
        (**self).shape()
    }

    fn as_scalar(&self) -> Option<&dyn Scalar> {
        (**self).as_scalar()
    }

    fn as_parse_default(&mut self) -> Option<&mut dyn ParseDefault> {
        (**self).as_parse_default()
    }

    fn materialize(&mut self) -> Option<&mut dyn Reflect> {
        (**self).materialize()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    fn shape(&mut self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Absent,
        }
    }

    fn as_scalar(&self) -> Option<&dyn Scalar> {
        self.as_ref().and_then(|value| value.as_scalar())
    }

    fn as_parse_default(&mut self) -> Option<&mut dyn ParseDefault> {
        if self.is_none() {
            return Some(self);
        }
        self.as_mut().and_then(|value| value.as_parse_default())
    }

    fn materialize(&mut self) -> Option<&mut dyn Reflect> {
        let value: &mut dyn Reflect = self.get_or_insert_with(T::default);
        Some(value)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => type_name::<Self>(),
        }
    }
}

impl<T: Reflect + Default> ParseDefault for Option<T> {
    fn parse_default(&mut self, text: &str) -> Result<()> {
        let mut value = T::default();
        defaults::apply_text_default(&mut value, text)?;
        *self = Some(value);
        Ok(())
    }
}

/// Encodes a record for the whole-record dump.
///
/// # Errors
/// Returns `RecliError::Serialization` if the record cannot be encoded.
pub fn encode<T: Serialize + ?Sized>(record: &T) -> Result<String> {
    serde_json::to_string_pretty(record).map_err(|e| RecliError::serialization("record", e))
}

/// Implements [`Record`] and [`Reflect`] for a struct.
///
/// List the fields to expose, each with optional tags. A field may be preceded
/// by `#[embedded]` to keep it out of the command tree. The struct must
/// implement `serde::Serialize`.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Default, Serialize)]
/// struct Backend {
///     hostname: String,
///     port: u16,
/// }
///
/// recli::record!(Backend {
///     hostname [recli = "id", usage = "Backend host name"],
///     port [default = "2019"],
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($(#[$marker:ident])? $field:ident $([$($tag:ident = $value:literal),* $(,)?])?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields(&self) -> &'static [$crate::FieldDescriptor] {
                const FIELDS: &[$crate::FieldDescriptor] = &[
                    $(
                        $crate::FieldDescriptor::new(
                            stringify!($field),
                            &[$($($crate::Tag::new(stringify!($tag), $value)),*)?],
                        )$(.$marker())?
                    ),*
                ];
                FIELDS
            }

            fn field_mut(&mut self, name: &str) -> Option<&mut dyn $crate::Reflect> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field as &mut dyn $crate::Reflect),)*
                    _ => None,
                }
            }

            fn encode(&self) -> $crate::Result<::std::string::String> {
                $crate::reflect::encode(self)
            }
        }

        impl $crate::Reflect for $ty {
            fn shape(&mut self) -> $crate::Shape<'_> {
                $crate::Shape::Record(self)
            }
        }
    };
}
