use std::collections::HashSet;

use tracing::debug;

use super::{Constructor, action};
use crate::{
    RecliError, Result,
    cli::types::{CommandCategory, CommandNode, FlagKind, FlagSpec, FlagValue, Invocation},
    config::Config,
    defaults::apply_defaults,
    reflect::{
        Binding, Category, List, Record, RecordId, Reflect, ScalarKind, classify, list_mut, read_scalar, scalar_mut,
        with_record,
    },
};

/// Names the element at a position of the collection.
#[derive(Debug, Clone, Copy)]
enum Keyer {
    /// The position itself.
    Index,
    /// The text of the element's id field.
    Field(&'static str),
}

impl Keyer {
    fn key(self, list: &mut dyn List, index: usize) -> Result<String> {
        let Keyer::Field(name) = self else {
            return Ok(index.to_string());
        };

        let element = list
            .element_mut(index)
            .ok_or_else(|| RecliError::StaleBinding(format!("item {index}")))?;
        with_record(element, |record| {
            let field = record
                .field_mut(name)
                .ok_or_else(|| RecliError::StaleBinding(name.to_string()))?;
            read_scalar(field)
        })
    }
}

/// What the builder needs to know about the element type.
struct Prototype {
    type_name: &'static str,
    category: Category,
    keyer: Keyer,
    flags: Vec<FlagSpec>,
}

/// Commands for the ordered collection behind `binding`.
pub(super) fn commands(
    constructor: &Constructor,
    binding: &Binding,
    ancestors: &mut Vec<RecordId>,
) -> Result<Vec<CommandNode>> {
    let config = constructor.config();
    let (prototype, keys) = binding.with(|value| {
        let list = list_mut(value)?;
        let prototype = inspect(list, config)?;
        let keys = (0..list.len())
            .map(|index| prototype.keyer.key(list, index))
            .collect::<Result<Vec<_>>>()?;
        Ok((prototype, keys))
    })?;

    if !matches!(
        prototype.category,
        Category::Scalar(_) | Category::TextScalar | Category::Record
    ) {
        return Err(RecliError::unsupported(prototype.type_name));
    }

    let mut commands = Vec::with_capacity(keys.len() + 3);
    for (index, key) in keys.into_iter().enumerate() {
        let element = binding.element(index);
        let mut children = constructor
            .value_commands(&element, ancestors)
            .map_err(|e| e.in_field(&key))?
            .unwrap_or_default();
        if binding.is_mutable() {
            children.push(delete_command(binding, index, &key));
        }
        commands.push(CommandNode::group(key, children).with_category(CommandCategory::Items));
    }

    commands.push(list_command(binding, config, prototype.keyer));
    if !binding.is_mutable() {
        return Ok(commands);
    }
    if prototype.category == Category::Record {
        commands.push(add_from_flags(binding, config, prototype.flags));
        commands.push(add_from_json(binding));
    } else {
        commands.push(add_scalar(binding));
    }

    Ok(commands)
}

fn inspect(list: &dyn List, config: &Config) -> Result<Prototype> {
    let mut inspected = None;
    list.with_prototype(&mut |element: &mut dyn Reflect| {
        let category = classify(element)?;
        let (keyer, flags) = if category == Category::Record {
            with_record(element, |record| Ok((id_keyer(record, config), item_flags(record, config))))?
        } else {
            (Keyer::Index, Vec::new())
        };
        inspected = Some(Prototype {
            type_name: element.type_name(),
            category,
            keyer,
            flags,
        });
        Ok(())
    })?;
    inspected.ok_or_else(|| RecliError::StaleBinding("prototype".to_string()))
}

/// Keyer using the first field carrying the id role, if any.
fn id_keyer(record: &dyn Record, config: &Config) -> Keyer {
    record
        .fields()
        .iter()
        .find(|field| field.has_tag(&config.id_tag))
        .map_or(Keyer::Index, |field| Keyer::Field(field.name))
}

fn item_flags(record: &mut dyn Record, config: &Config) -> Vec<FlagSpec> {
    let mut flags = Vec::new();
    for field in record.fields() {
        if field.embedded || field.has_tag(&config.skip_tag) {
            continue;
        }
        let Some(kind) = record.field_mut(field.name).and_then(flag_kind) else {
            continue;
        };
        flags.push(FlagSpec {
            name: config.command_name(field.name),
            usage: field
                .lookup(config.default_tag_name)
                .filter(|default| !default.is_empty())
                .map(|default| format!("default value: {default}")),
            kind,
        });
    }
    flags
}

/// Flag type for a field of a scratch element. Empty optionals are filled so
/// their inner type decides.
fn flag_kind(value: &mut dyn Reflect) -> Option<FlagKind> {
    if let Some(inner) = value.materialize() {
        return flag_kind(inner);
    }

    match classify(value).ok()? {
        Category::Scalar(ScalarKind::Bool) => Some(FlagKind::Bool),
        Category::Scalar(ScalarKind::Int) => Some(FlagKind::Int),
        Category::Scalar(ScalarKind::Float) => Some(FlagKind::Float),
        Category::Scalar(_) | Category::TextScalar => Some(FlagKind::String),
        Category::List => {
            let mut kind = None;
            list_mut(value)
                .ok()?
                .with_prototype(&mut |element: &mut dyn Reflect| {
                    kind = match classify(element) {
                        Ok(Category::Scalar(ScalarKind::Int)) => Some(FlagKind::IntList),
                        Ok(Category::Scalar(ScalarKind::Float)) => Some(FlagKind::FloatList),
                        Ok(Category::Scalar(ScalarKind::String) | Category::TextScalar) => Some(FlagKind::StringList),
                        _ => None,
                    };
                    Ok(())
                })
                .ok()?;
            kind
        }
        Category::Record | Category::Map | Category::Absent => None,
    }
}

fn delete_command(binding: &Binding, index: usize, key: &str) -> CommandNode {
    let target = binding.clone();
    action(
        "delete",
        format!("Delete item represented by key \"{key}\" from the collection"),
        move |invocation| {
            invocation.expect_args(0)?;
            target.with(|value| list_mut(value)?.remove_at(index))?;
            debug!(path = target.path(), index, "Deleted item");
            Ok(())
        },
    )
}

fn list_command(binding: &Binding, config: &Config, keyer: Keyer) -> CommandNode {
    let target = binding.clone();
    let config = config.clone();
    action("list", "List item keys in the collection", move |invocation| {
        invocation.expect_args(0)?;
        let keys = target.with(|value| {
            let list = list_mut(value)?;
            (0..list.len())
                .map(|index| keyer.key(list, index))
                .collect::<Result<Vec<_>>>()
        })?;
        for key in &keys {
            config.print_value(key);
        }
        Ok(())
    })
}

fn add_scalar(binding: &Binding) -> CommandNode {
    let target = binding.clone();
    action("add", "Add a new item to collection", move |invocation| {
        let args = invocation.expect_args(1)?;
        target.with(|value| {
            list_mut(value)?.push_with(&mut |element: &mut dyn Reflect| scalar_mut(element)?.write(&args[0]))
        })
    })
    .with_args_usage("[value]")
}

fn add_from_flags(binding: &Binding, config: &Config, flags: Vec<FlagSpec>) -> CommandNode {
    let target = binding.clone();
    let config = config.clone();
    action("add", "Add a new item to collection", move |invocation| {
        invocation.expect_args(0)?;
        if invocation.flags.is_empty() {
            return Err(RecliError::NoPropertiesSpecified);
        }
        target.with(|value| {
            list_mut(value)?.push_with(&mut |element: &mut dyn Reflect| {
                with_record(element, |record| build_item(record, &config, invocation))
            })
        })?;
        debug!(path = target.path(), flags = invocation.flags.len(), "Added item");
        Ok(())
    })
    .with_args_usage("-attribute=value")
    .with_flags(flags)
}

/// Fills a fresh item: defaults first, then every flag set on the command line.
fn build_item(record: &mut dyn Record, config: &Config, invocation: &Invocation) -> Result<()> {
    apply_defaults(record, config.default_tag_name, &mut HashSet::new())?;

    for field in record.fields() {
        let Some(flag) = invocation.flags.get(&config.command_name(field.name)) else {
            continue;
        };
        let value = record
            .field_mut(field.name)
            .ok_or_else(|| RecliError::StaleBinding(field.name.to_string()))?;
        overlay(value, flag).map_err(|e| e.in_field(field.name))?;
    }

    Ok(())
}

/// Writes a flag value through the scalar codec, replacing any default.
fn overlay(value: &mut dyn Reflect, flag: &FlagValue) -> Result<()> {
    if let Some(inner) = value.materialize() {
        return overlay(inner, flag);
    }

    match classify(value)? {
        Category::List => list_mut(value)?.replace_parsed(&flag.to_texts()),
        _ => scalar_mut(value)?.write(&flag.to_text()),
    }
}

fn add_from_json(binding: &Binding) -> CommandNode {
    let target = binding.clone();
    action(
        "add-json",
        "Add a new item to collection deserialised from JSON",
        move |invocation| {
            let args = invocation.expect_args(1)?;
            target.with(|value| list_mut(value)?.push_encoded(&args[0]))
        },
    )
    .with_args_usage("[value]")
}
