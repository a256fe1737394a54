//! Command tree construction and execution.
//!
//! [`Constructor`] derives a [`CommandTree`] from a live record, and
//! [`CliService`] runs that tree as a command line program through clap.
//! Leaves can also be invoked directly with [`CommandTree::invoke`].

mod builder;
pub mod formatting;
mod registry;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use builder::Constructor;
pub use registry::CommandTree;
pub use service::CliService;
pub use types::{Action, CommandCategory, CommandNode, FlagKind, FlagSpec, FlagValue, Invocation};
