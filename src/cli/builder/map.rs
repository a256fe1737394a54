use super::action;
use crate::{
    Result,
    cli::types::CommandNode,
    config::{Config, NOT_FOUND},
    reflect::{Binding, map_mut},
};

/// Commands for the associative collection behind `binding`. Read-only
/// bindings get no `set` or `unset`.
///
/// # Errors
/// Returns `RecliError::UnsupportedKind` if keys or values are not scalars.
pub(super) fn commands(config: &Config, binding: &Binding) -> Result<Vec<CommandNode>> {
    binding.with(|value| map_mut(value)?.check())?;

    let mut commands = vec![dump_command(binding, config), get_command(binding, config)];
    if binding.is_mutable() {
        commands.push(set_command(binding));
        commands.push(unset_command(binding));
    }
    Ok(commands)
}

fn dump_command(binding: &Binding, config: &Config) -> CommandNode {
    let target = binding.clone();
    let config = config.clone();
    action("dump", "Dump all keys and their values", move |invocation| {
        invocation.expect_args(0)?;
        let entries = target.with(|value| map_mut(value)?.entries())?;
        for (key, value) in &entries {
            config.print_pair(key, value);
        }
        Ok(())
    })
}

fn get_command(binding: &Binding, config: &Config) -> CommandNode {
    let target = binding.clone();
    let config = config.clone();
    action("get", "Get the value of a given key", move |invocation| {
        let args = invocation.expect_args(1)?;
        let found = target.with(|value| map_mut(value)?.lookup(&args[0]))?;
        config.print_value(found.as_deref().unwrap_or(NOT_FOUND));
        Ok(())
    })
    .with_args_usage("[key]")
}

fn set_command(binding: &Binding) -> CommandNode {
    let target = binding.clone();
    action("set", "Set the key to the given value", move |invocation| {
        let args = invocation.expect_args(2)?;
        target.with(|value| map_mut(value)?.store(&args[0], &args[1]))
    })
    .with_args_usage("[key] [value]")
}

fn unset_command(binding: &Binding) -> CommandNode {
    let target = binding.clone();
    action("unset", "Remove the key from the map", move |invocation| {
        let args = invocation.expect_args(1)?;
        target.with(|value| map_mut(value)?.discard(&args[0]))
    })
    .with_args_usage("[key]")
}
