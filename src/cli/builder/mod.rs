//! Derives a command tree from a record.
//!
//! Every visible field becomes a `PROPERTIES` group named by the configured
//! converter. Scalars get `get`/`set` leaves, nested records recurse, and
//! collections are handed to the [`list`] and [`map`] sub-builders. Leaves are
//! bound to the live field through a [`Binding`] and never hold a copy of the
//! data.

mod list;
mod map;

use std::{any::type_name, cell::RefCell, rc::Rc};

use tracing::{debug, instrument, trace};

use super::{
    registry::CommandTree,
    types::{CommandCategory, CommandNode, Invocation},
};
use crate::{
    RecliError, Result,
    config::Config,
    reflect::{Binding, Category, RecordId, Reflect, classify, read_scalar, record_identity, scalar_mut, with_record},
};

/// Builds command trees under one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Constructor {
    config: Config,
}

impl Constructor {
    /// Creates a constructor using `config` for every tree it builds.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The policy this constructor builds with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the command tree for `record`.
    ///
    /// The tree keeps a clone of the handle; its leaves read and write the
    /// caller's value in place.
    ///
    /// # Errors
    /// Returns `RecliError::InvalidInput` if `record` does not hold a record,
    /// or the first field error raised while building, wrapped with the
    /// path of field names that led to it.
    #[instrument(skip_all, fields(record = type_name::<T>()))]
    pub fn construct<T: Reflect + 'static>(&self, record: &Rc<RefCell<T>>) -> Result<CommandTree> {
        let binding = Binding::root(Rc::clone(record));

        match binding.with(|value| classify(value)) {
            Ok(Category::Record) => {}
            Ok(_) | Err(RecliError::UnsupportedKind { .. }) => {
                return Err(RecliError::InvalidInput(format!(
                    "expected a record, got {}",
                    type_name::<T>()
                )));
            }
            Err(e) => return Err(e),
        }

        let commands = self.record_commands(&binding, &mut Vec::new())?;
        debug!(commands = commands.len(), "Built command tree");

        Ok(CommandTree::new(commands))
    }

    fn record_commands(&self, binding: &Binding, ancestors: &mut Vec<RecordId>) -> Result<Vec<CommandNode>> {
        let (identity, fields) = binding.with(|value| {
            let identity = record_identity(value)?;
            let fields = with_record(value, |record| Ok(record.fields()))?;
            Ok((identity, fields))
        })?;

        ancestors.push(identity);
        let mut commands = Vec::with_capacity(fields.len() + 1);
        let built: Result<()> = fields.iter().try_for_each(|field| {
            if field.embedded || field.has_tag(&self.config.skip_tag) {
                trace!(field = field.name, "Skipping field");
                return Ok(());
            }

            let mut child = binding.field(field.name);
            if field.has_tag(&self.config.read_only_tag) {
                child = child.read_only();
            }

            let Some(children) = self
                .value_commands(&child, ancestors)
                .map_err(|e| e.in_field(field.name))?
            else {
                trace!(field = field.name, "No commands for field");
                return Ok(());
            };

            commands.push(
                CommandNode::group(self.config.command_name(field.name), children)
                    .with_usage(field.lookup(self.config.usage_tag_name))
                    .with_category(CommandCategory::Properties),
            );
            Ok(())
        });
        ancestors.pop();
        built?;

        commands.push(self.json_dumper(binding));
        Ok(commands)
    }

    /// Commands for the value behind `binding`, or `None` if it gets no node.
    pub(super) fn value_commands(
        &self,
        binding: &Binding,
        ancestors: &mut Vec<RecordId>,
    ) -> Result<Option<Vec<CommandNode>>> {
        match binding.with(|value| classify(value))? {
            Category::Absent => Ok(None),
            Category::Scalar(_) | Category::TextScalar => Ok(Some(self.scalar_commands(binding))),
            Category::Record => {
                let identity = binding.with(|value| record_identity(value))?;
                if ancestors.contains(&identity) {
                    trace!(path = binding.path(), "Record is its own ancestor");
                    return Ok(None);
                }
                self.record_commands(binding, ancestors).map(Some)
            }
            Category::List => list::commands(self, binding, ancestors).map(Some),
            Category::Map => map::commands(&self.config, binding).map(Some),
        }
    }

    fn scalar_commands(&self, binding: &Binding) -> Vec<CommandNode> {
        let target = binding.clone();
        let config = self.config.clone();
        let mut commands = vec![action("get", "Get the value", move |invocation| {
            invocation.expect_args(0)?;
            let text = target.with(|value| read_scalar(value))?;
            config.print_value(&text);
            Ok(())
        })];

        if binding.is_mutable() {
            let target = binding.clone();
            commands.push(
                action("set", "Set the value", move |invocation| {
                    let args = invocation.expect_args(1)?;
                    target.with(|value| scalar_mut(value)?.write(&args[0]))
                })
                .with_args_usage("[value]"),
            );
        }

        commands
    }

    fn json_dumper(&self, binding: &Binding) -> CommandNode {
        let target = binding.clone();
        let config = self.config.clone();
        action("dump-json", "Dump item as json", move |invocation| {
            invocation.expect_args(0)?;
            let text = target.with(|value| with_record(value, |record| record.encode()))?;
            config.print_value(&text);
            Ok(())
        })
    }
}

/// A leaf in the `ACTIONS` category.
fn action(
    name: &str,
    usage: impl Into<String>,
    run: impl Fn(&Invocation) -> Result<()> + 'static,
) -> CommandNode {
    CommandNode::leaf(name, usage, run).with_category(CommandCategory::Actions)
}
