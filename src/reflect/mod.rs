//! Typed introspection of records, scalars and collections.
//!
//! Every editable value implements [`Reflect`], which exposes its storage
//! shape as a closed [`Shape`] enum. The command builder and the defaults
//! engine dispatch on that shape instead of inspecting types at run time.

mod binding;
mod collections;
mod record;
mod scalar;


pub use binding::Binding;
pub use collections::{List, Map};
pub use record::{FieldDescriptor, Record, RecordId, SharedRecord, Tag, encode};
pub use scalar::{Scalar, ScalarKind};

use crate::{RecliError, Result, defaults::ParseDefault};

/// A value the command builder can inspect and edit.
///
/// Implementations exist for the scalar types, `Vec`, `HashMap`, `BTreeMap`,
/// `Option`, `Box` and `Rc<RefCell<_>>`. Records get theirs from [`record!`],
/// enum-like types from [`text_scalar!`].
///
/// [`record!`]: crate::record
/// [`text_scalar!`]: crate::text_scalar
pub trait Reflect {
    /// Exposes the storage shape of the value for mutation.
    fn shape(&mut self) -> Shape<'_>;

    /// Read-only access to the value as a scalar, if it is one.
    fn as_scalar(&self) -> Option<&dyn Scalar> {
        None
    }

    /// Custom default parsing that replaces the scalar codec.
    fn as_parse_default(&mut self) -> Option<&mut dyn ParseDefault> {
        None
    }

    /// The value inside an optional wrapper, filled with its default first if
    /// it was empty. `None` for values that are not optional.
    fn materialize(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Name of the concrete type, used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Storage shape of a value, borrowed for mutation.
pub enum Shape<'a> {
    /// A bool, integer, float, string or text-codec value.
    Scalar(&'a mut dyn Scalar),
    /// A record owned in place.
    Record(&'a mut dyn Record),
    /// A record behind shared ownership that may be reachable from several paths.
    Shared(&'a dyn SharedRecord),
    /// An ordered collection.
    List(&'a mut dyn List),
    /// An associative collection.
    Map(&'a mut dyn Map),
    /// An empty optional value.
    Absent,
    /// A value with no defined handling, carrying its type name.
    Unsupported(&'static str),
}

/// The category a value is reduced to for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A raw scalar of the given kind. Never [`ScalarKind::Text`].
    Scalar(ScalarKind),
    /// A scalar with a symbolic text encoding.
    TextScalar,
    /// A record, owned or shared.
    Record,
    /// An ordered collection.
    List,
    /// An associative collection.
    Map,
    /// An empty optional value.
    Absent,
}

impl Category {
    /// Whether values of this category are edited through the scalar codec.
    pub fn is_scalar(self) -> bool {
        matches!(self, Category::Scalar(_) | Category::TextScalar)
    }
}

/// Reduces a value to its [`Category`].
///
/// # Errors
/// Returns `RecliError::UnsupportedKind` for values with no defined handling.
pub fn classify(value: &mut dyn Reflect) -> Result<Category> {
    match value.shape() {
        Shape::Scalar(scalar) => match scalar.kind() {
            ScalarKind::Text => Ok(Category::TextScalar),
            kind => Ok(Category::Scalar(kind)),
        },
        Shape::Record(_) | Shape::Shared(_) => Ok(Category::Record),
        Shape::List(_) => Ok(Category::List),
        Shape::Map(_) => Ok(Category::Map),
        Shape::Absent => Ok(Category::Absent),
        Shape::Unsupported(kind) => Err(RecliError::unsupported(kind)),
    }
}

pub(crate) fn scalar_mut(value: &mut dyn Reflect) -> Result<&mut dyn Scalar> {
    let type_name = value.type_name();
    match value.shape() {
        Shape::Scalar(scalar) => Ok(scalar),
        _ => Err(RecliError::unsupported(type_name)),
    }
}

pub(crate) fn list_mut(value: &mut dyn Reflect) -> Result<&mut dyn List> {
    let type_name = value.type_name();
    match value.shape() {
        Shape::List(list) => Ok(list),
        _ => Err(RecliError::unsupported(type_name)),
    }
}

pub(crate) fn map_mut(value: &mut dyn Reflect) -> Result<&mut dyn Map> {
    let type_name = value.type_name();
    match value.shape() {
        Shape::Map(map) => Ok(map),
        _ => Err(RecliError::unsupported(type_name)),
    }
}

/// Reads a scalar through its codec.
pub(crate) fn read_scalar(value: &dyn Reflect) -> Result<String> {
    value
        .as_scalar()
        .ok_or_else(|| RecliError::unsupported(value.type_name()))?
        .read()
}

/// Builds a fresh scalar of type `T` from text.
pub(crate) fn parse_scalar<T: Reflect + Default>(text: &str) -> Result<T> {
    let mut value = T::default();
    scalar_mut(&mut value)?.write(text)?;
    Ok(value)
}

/// Identity of a record value without borrowing a shared record.
pub(crate) fn record_identity(value: &mut dyn Reflect) -> Result<RecordId> {
    let type_name = value.type_name();
    match value.shape() {
        Shape::Record(record) => Ok(record.identity()),
        Shape::Shared(shared) => Ok(shared.identity()),
        _ => Err(RecliError::unsupported(type_name)),
    }
}

/// Runs `f` against the record behind `value`, borrowing shared records for the call.
pub(crate) fn with_record<R>(
    value: &mut dyn Reflect,
    f: impl FnOnce(&mut dyn Record) -> Result<R>,
) -> Result<R> {
    let type_name = value.type_name();
    match value.shape() {
        Shape::Record(record) => f(record),
        Shape::Shared(shared) => {
            let mut f = Some(f);
            let mut output = None;
            shared.with_record(&mut |record: &mut dyn Record| {
                if let Some(f) = f.take() {
                    output = Some(f(record)?);
                }
                Ok(())
            })?;
            output.ok_or_else(|| RecliError::StaleBinding(type_name.to_string()))
        }
        _ => Err(RecliError::unsupported(type_name)),
    }
}
