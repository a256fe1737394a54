use super::types::{CommandNode, Invocation};
use crate::{RecliError, Result};

/// The command tree built for one record.
///
/// ```text
/// tree
/// ├── address        get, set
/// ├── backends
/// │   ├── b1.com     hostname, port, delete
/// │   ├── list
/// │   ├── add
/// │   └── add-json
/// └── dump-json
/// ```
///
/// Leaves stay bound to the record the tree was built from and read or write
/// it on every invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandTree {
    commands: Vec<CommandNode>,
}

impl CommandTree {
    /// Creates a tree from its top-level commands.
    pub fn new(commands: Vec<CommandNode>) -> Self {
        Self { commands }
    }

    /// Top-level commands in order.
    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    /// Node at `path`, resolving duplicate sibling names to the last one.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.commands.iter().rev().find(|node| node.name == *first)?;
        for name in rest {
            node = node.child(name)?;
        }
        Some(node)
    }

    /// Runs the leaf at `path`.
    ///
    /// # Errors
    /// Returns `RecliError::CommandNotFound` if no leaf exists at `path`, or
    /// any error from the leaf action.
    pub fn invoke(&self, path: &[&str], invocation: &Invocation) -> Result<()> {
        let node = self
            .find(path)
            .filter(|node| node.is_leaf())
            .ok_or_else(|| RecliError::CommandNotFound(path.join(" ")))?;
        node.run(invocation)
    }

    /// Paths of every leaf, depth-first in tree order.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        for node in &self.commands {
            collect_leaves(node, &mut prefix, &mut paths);
        }
        paths
    }
}

fn collect_leaves(node: &CommandNode, prefix: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
    prefix.push(node.name.clone());
    if node.is_leaf() {
        paths.push(prefix.clone());
    }
    for child in &node.children {
        collect_leaves(child, prefix, paths);
    }
    prefix.pop();
}
