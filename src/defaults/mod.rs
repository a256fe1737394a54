//! Tag-declared default values.
//!
//! Walks a record graph depth-first and writes the value of each field's
//! default tag into it. Nested records are recursed into before any tag is
//! looked at, and every record identity is visited at most once, so shared
//! and self-referencing records terminate.

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::trace;

use crate::{
    RecliError, Result,
    reflect::{Category, FieldDescriptor, Record, RecordId, Reflect, Shape, classify, list_mut, scalar_mut},
};

/// Custom parsing of a default tag value.
///
/// Types exposing this through [`Reflect::as_parse_default`] receive the raw
/// tag text instead of going through the scalar codec.
pub trait ParseDefault {
    /// Applies the default described by `text`.
    ///
    /// # Errors
    /// Returns an error if `text` is not a valid default for the value.
    fn parse_default(&mut self, text: &str) -> Result<()>;
}

/// Applies default tags to every field reachable from `record`.
///
/// `visited` holds the identities of records already processed; pass an
/// empty set for a fresh walk. An empty default tag counts as no default.
/// Errors are wrapped with the name of the field that raised them.
///
/// # Errors
/// Returns `RecliError::UnsupportedKind` for a default tag on a field that
/// cannot take one, or `RecliError::Conversion` for an unparsable default.
pub fn apply_defaults(
    record: &mut dyn Record,
    default_tag: &str,
    visited: &mut HashSet<RecordId>,
) -> Result<()> {
    if !visited.insert(record.identity()) {
        return Ok(());
    }

    for field in record.fields() {
        let value = record
            .field_mut(field.name)
            .ok_or_else(|| RecliError::StaleBinding(field.name.to_string()))?;
        apply_field(value, field, default_tag, visited).map_err(|e| e.in_field(field.name))?;
    }

    Ok(())
}

/// Applies defaults to a single record with a fresh visited set.
///
/// # Errors
/// See [`apply_defaults`].
pub fn apply<R: Record>(record: &mut R, default_tag: &str) -> Result<()> {
    apply_defaults(record, default_tag, &mut HashSet::new())
}

fn apply_field(
    value: &mut dyn Reflect,
    field: &FieldDescriptor,
    default_tag: &str,
    visited: &mut HashSet<RecordId>,
) -> Result<()> {
    match value.shape() {
        Shape::Record(record) => return apply_defaults(record, default_tag, visited),
        Shape::Shared(shared) => {
            if visited.contains(&shared.identity()) {
                trace!(field = field.name, "Shared record already visited");
                return Ok(());
            }
            return shared
                .with_record(&mut |record: &mut dyn Record| apply_defaults(record, default_tag, visited));
        }
        _ => {}
    }

    match field.lookup(default_tag) {
        Some(text) if !text.is_empty() => apply_text_default(value, text),
        _ => Ok(()),
    }
}

/// Writes the default described by `text` into a non-record value.
pub(crate) fn apply_text_default(value: &mut dyn Reflect, text: &str) -> Result<()> {
    if let Some(parser) = value.as_parse_default() {
        return parser.parse_default(text);
    }

    match classify(value)? {
        Category::Scalar(_) | Category::TextScalar => scalar_mut(value)?.write(text),
        Category::List => {
            let items: Vec<String> = text.split(',').map(str::to_string).collect();
            list_mut(value)?.replace_parsed(&items)
        }
        _ => Err(RecliError::unsupported(value.type_name())),
    }
}
