//! Builder policy: which tags mean what, how fields are named, where output goes.
//!
//! A [`Config`] is cloned into every leaf action of the tree it builds and is
//! never mutated afterwards. [`Config::standard`] is the conventional policy.

mod naming;

#[cfg(test)]
mod tests;

use std::{fmt, rc::Rc};

pub use naming::to_lower_dash_case;

use crate::reflect::Tag;

/// Maps a declared field name to a command or flag name.
pub type FieldNameConverter = Rc<dyn Fn(&str) -> String>;

/// Receives a single value printed by a leaf.
pub type ValuePrinter = Rc<dyn Fn(&str)>;

/// Receives a key/value pair printed by a leaf.
pub type KeyValuePrinter = Rc<dyn Fn(&str, &str)>;

/// Text printed by a map `get` when the key is absent.
pub const NOT_FOUND: &str = "<not found>";

/// Policy for building a command tree.
#[derive(Clone)]
pub struct Config {
    /// Fields carrying this tag are left out of the tree.
    pub skip_tag: Tag,

    /// Within a list of records, the field carrying this tag names each item.
    pub id_tag: Tag,

    /// Scalar fields carrying this tag get no `set` leaf.
    pub read_only_tag: Tag,

    /// Tag holding a field's usage text.
    pub usage_tag_name: &'static str,

    /// Tag holding a field's default value.
    pub default_tag_name: &'static str,

    /// Converts field names to command and flag names.
    pub field_name_converter: FieldNameConverter,

    /// Prints single values.
    pub value_printer: ValuePrinter,

    /// Prints key/value pairs.
    pub key_value_printer: KeyValuePrinter,
}

impl Config {
    /// The conventional policy.
    ///
    /// Uses `recli = "-"` to skip, `recli = "id"` for item ids,
    /// `recli = "readonly"` for read-only fields, `usage` and `default` tags,
    /// lower-dash-case names, and prints to stdout.
    pub fn standard() -> Self {
        Self {
            skip_tag: Tag::new("recli", "-"),
            id_tag: Tag::new("recli", "id"),
            read_only_tag: Tag::new("recli", "readonly"),
            usage_tag_name: "usage",
            default_tag_name: "default",
            field_name_converter: Rc::new(to_lower_dash_case),
            value_printer: Rc::new(|value| println!("{value}")),
            key_value_printer: Rc::new(|key, value| println!("{key} = {value}")),
        }
    }

    /// Replaces the field name converter.
    pub fn with_field_name_converter(mut self, converter: impl Fn(&str) -> String + 'static) -> Self {
        self.field_name_converter = Rc::new(converter);
        self
    }

    /// Replaces the value printer.
    pub fn with_value_printer(mut self, printer: impl Fn(&str) + 'static) -> Self {
        self.value_printer = Rc::new(printer);
        self
    }

    /// Replaces the key/value printer.
    pub fn with_key_value_printer(mut self, printer: impl Fn(&str, &str) + 'static) -> Self {
        self.key_value_printer = Rc::new(printer);
        self
    }

    /// Command name for the field called `field_name`.
    pub fn command_name(&self, field_name: &str) -> String {
        (self.field_name_converter)(field_name)
    }

    pub(crate) fn print_value(&self, value: &str) {
        (self.value_printer)(value);
    }

    pub(crate) fn print_pair(&self, key: &str, value: &str) {
        (self.key_value_printer)(key, value);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("skip_tag", &self.skip_tag)
            .field("id_tag", &self.id_tag)
            .field("read_only_tag", &self.read_only_tag)
            .field("usage_tag_name", &self.usage_tag_name)
            .field("default_tag_name", &self.default_tag_name)
            .finish_non_exhaustive()
    }
}
