use std::{collections::HashMap, ffi::OsString};

use clap::{Arg, ArgAction, ArgMatches, Command, parser::ValueSource, value_parser};
use tracing::{debug, trace};

use super::{
    registry::CommandTree,
    types::{CommandCategory, CommandNode, FlagKind, FlagSpec, FlagValue, Invocation},
};
use crate::{RecliError, Result};

/// Id of the positional arguments of a leaf.
const ARGS: &str = "ARGS";

/// Runs a [`CommandTree`] as a command line program.
///
/// The tree is rendered as a `clap::Command`: groups become subcommands,
/// leaves take their positional arguments verbatim and their declared flags
/// as typed `--name` options. Parsing, help and usage errors are clap's.
#[derive(Debug)]
pub struct CliService {
    name: String,
    tree: CommandTree,
}

impl CliService {
    /// Creates a service running `tree` under the program name `name`.
    pub fn new(name: impl Into<String>, tree: CommandTree) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    /// The tree being run.
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    /// Renders the tree as a clap command.
    pub fn command(&self) -> Command {
        unique(self.tree.commands())
            .into_iter()
            .enumerate()
            .fold(
                Command::new(self.name.clone())
                    .subcommand_required(true)
                    .arg_required_else_help(true)
                    .disable_help_subcommand(true),
                |command, (index, node)| command.subcommand(node_command(node, index)),
            )
    }

    /// Parses `argv` and runs the selected leaf.
    ///
    /// `argv` includes the program name, as `std::env::args_os` yields it.
    ///
    /// # Errors
    /// Returns `RecliError::Usage` for parse failures and help requests,
    /// or any error from the leaf.
    pub fn execute<I, T>(&self, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(argv)?;

        let mut path = Vec::new();
        let mut current = &matches;
        while let Some((name, sub_matches)) = current.subcommand() {
            path.push(name);
            current = sub_matches;
        }

        let node = self
            .tree
            .find(&path)
            .filter(|node| node.is_leaf())
            .ok_or_else(|| RecliError::CommandNotFound(path.join(" ")))?;

        debug!(command = %path.join(" "), "Executing command");
        node.run(&invocation(node, current))
    }
}

/// Named siblings with distinct names, keeping the last of each name.
fn unique(nodes: &[CommandNode]) -> Vec<&CommandNode> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.name.is_empty())
        .filter(|(index, node)| {
            let shadowed = nodes[index + 1..].iter().any(|later| later.name == node.name);
            if shadowed {
                trace!(name = %node.name, "Shadowed by a later sibling");
            }
            !shadowed
        })
        .map(|(_, node)| node)
        .collect()
}

fn display_order(category: Option<CommandCategory>, index: usize) -> usize {
    let rank = match category {
        Some(CommandCategory::Properties) | None => 0,
        Some(CommandCategory::Items) => 1,
        Some(CommandCategory::Actions) => 2,
    };
    rank * 10_000 + index
}

fn node_command(node: &CommandNode, index: usize) -> Command {
    let mut command = Command::new(node.name.clone()).display_order(display_order(node.category, index));
    if let Some(usage) = &node.usage {
        command = command.about(usage.clone());
    }

    if node.is_leaf() {
        let mut args = Arg::new(ARGS)
            .num_args(0..)
            .action(ArgAction::Append)
            .allow_negative_numbers(true);
        if let Some(args_usage) = &node.args_usage {
            args = args.help(args_usage.clone());
        }
        command = command.arg(args);

        for flag in node.flags.iter().filter(|flag| flag.name != "help") {
            command = command.arg(flag_arg(flag));
        }
        return command;
    }

    unique(&node.children)
        .into_iter()
        .enumerate()
        .fold(
            command.subcommand_required(true).arg_required_else_help(true),
            |command, (index, child)| command.subcommand(node_command(child, index)),
        )
}

fn flag_arg(flag: &FlagSpec) -> Arg {
    let mut arg = Arg::new(flag.name.clone()).long(flag.name.clone());
    if let Some(usage) = &flag.usage {
        arg = arg.help(usage.clone());
    }

    match flag.kind {
        FlagKind::Bool => arg.action(ArgAction::SetTrue),
        FlagKind::String => arg.action(ArgAction::Set).value_parser(value_parser!(String)),
        FlagKind::Int => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true),
        FlagKind::Float => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true),
        FlagKind::StringList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_parser(value_parser!(String)),
        FlagKind::IntList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_parser(value_parser!(i64))
            .allow_negative_numbers(true),
        FlagKind::FloatList => arg
            .action(ArgAction::Append)
            .value_delimiter(',')
            .value_parser(value_parser!(f64))
            .allow_negative_numbers(true),
    }
}

/// Positional arguments and the flags explicitly set on the command line.
fn invocation(node: &CommandNode, matches: &ArgMatches) -> Invocation {
    let args = matches
        .get_many::<String>(ARGS)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let flags: HashMap<String, FlagValue> = node
        .flags
        .iter()
        .filter(|flag| flag.name != "help")
        .filter(|flag| matches.value_source(&flag.name) == Some(ValueSource::CommandLine))
        .filter_map(|flag| flag_value(flag, matches).map(|value| (flag.name.clone(), value)))
        .collect();

    Invocation { args, flags }
}

fn flag_value(flag: &FlagSpec, matches: &ArgMatches) -> Option<FlagValue> {
    let name = flag.name.as_str();
    match flag.kind {
        FlagKind::Bool => Some(FlagValue::Bool(matches.get_flag(name))),
        FlagKind::String => matches.get_one::<String>(name).cloned().map(FlagValue::String),
        FlagKind::Int => matches.get_one::<i64>(name).copied().map(FlagValue::Int),
        FlagKind::Float => matches.get_one::<f64>(name).copied().map(FlagValue::Float),
        FlagKind::StringList => matches
            .get_many::<String>(name)
            .map(|values| FlagValue::StringList(values.cloned().collect())),
        FlagKind::IntList => matches
            .get_many::<i64>(name)
            .map(|values| FlagValue::IntList(values.copied().collect())),
        FlagKind::FloatList => matches
            .get_many::<f64>(name)
            .map(|values| FlagValue::FloatList(values.copied().collect())),
    }
}
