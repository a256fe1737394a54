use std::{collections::HashMap, fmt, rc::Rc};

use crate::{RecliError, Result};

/// Action bound to a leaf node.
///
/// Actions capture their binding and configuration and are only valid while
/// the record they were built from is alive.
pub type Action = Rc<dyn Fn(&Invocation) -> Result<()>>;

/// Help grouping of a command node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    /// Fields of a record
    Properties,
    /// Elements of a collection
    Items,
    /// Operations on a collection element
    Actions,
}

impl CommandCategory {
    /// Label shown as the help heading.
    pub fn label(self) -> &'static str {
        match self {
            CommandCategory::Properties => "PROPERTIES",
            CommandCategory::Items => "ITEMS",
            CommandCategory::Actions => "ACTIONS",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value type accepted by a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Presence switch
    Bool,
    /// Free text
    String,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// Repeatable free text
    StringList,
    /// Repeatable signed integer
    IntList,
    /// Repeatable floating point number
    FloatList,
}

/// A flag declared on a leaf node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Flag name without leading dashes
    pub name: String,
    /// Help text
    pub usage: Option<String>,
    /// Accepted value type
    pub kind: FlagKind,
}

/// A flag value as parsed from the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// Presence switch
    Bool(bool),
    /// Free text
    String(String),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Repeatable free text
    StringList(Vec<String>),
    /// Repeatable signed integer
    IntList(Vec<i64>),
    /// Repeatable floating point number
    FloatList(Vec<f64>),
}

impl FlagValue {
    /// The value as scalar text.
    pub fn to_text(&self) -> String {
        self.to_texts().join(",")
    }

    /// The value as one text per element; single values yield one entry.
    pub fn to_texts(&self) -> Vec<String> {
        match self {
            FlagValue::Bool(value) => vec![value.to_string()],
            FlagValue::String(value) => vec![value.clone()],
            FlagValue::Int(value) => vec![value.to_string()],
            FlagValue::Float(value) => vec![value.to_string()],
            FlagValue::StringList(values) => values.clone(),
            FlagValue::IntList(values) => values.iter().map(ToString::to_string).collect(),
            FlagValue::FloatList(values) => values.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Positional arguments and explicitly set flags handed to a leaf.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Positional arguments in order
    pub args: Vec<String>,
    /// Flags set on the command line, by name
    pub flags: HashMap<String, FlagValue>,
}

impl Invocation {
    /// Creates an invocation with positional arguments only.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            flags: HashMap::new(),
        }
    }

    /// Adds a flag value.
    pub fn with_flag(mut self, name: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    /// Checks that exactly `expected` positional arguments were given.
    ///
    /// # Errors
    /// Returns `RecliError::WrongArity` on a count mismatch.
    pub fn expect_args(&self, expected: usize) -> Result<&[String]> {
        if self.args.len() != expected {
            return Err(RecliError::WrongArity {
                expected,
                actual: self.args.len(),
            });
        }
        Ok(&self.args)
    }
}

/// A named unit of the command tree: either a group of children or a leaf
/// with an action.
#[derive(Clone)]
pub struct CommandNode {
    /// Name used on the command line
    pub name: String,
    /// One-line help text
    pub usage: Option<String>,
    /// Help text for the positional arguments
    pub args_usage: Option<String>,
    /// Help grouping
    pub category: Option<CommandCategory>,
    /// Flags accepted by a leaf
    pub flags: Vec<FlagSpec>,
    /// Children of a group, in order
    pub children: Vec<CommandNode>,
    /// Action of a leaf
    pub action: Option<Action>,
}

impl CommandNode {
    /// Creates a group node.
    pub fn group(name: impl Into<String>, children: Vec<CommandNode>) -> Self {
        Self {
            name: name.into(),
            usage: None,
            args_usage: None,
            category: None,
            flags: Vec::new(),
            children,
            action: None,
        }
    }

    /// Creates a leaf node.
    pub fn leaf(
        name: impl Into<String>,
        usage: impl Into<String>,
        action: impl Fn(&Invocation) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            usage: Some(usage.into()),
            args_usage: None,
            category: None,
            flags: Vec::new(),
            children: Vec::new(),
            action: Some(Rc::new(action)),
        }
    }

    /// Sets the usage text.
    pub fn with_usage(mut self, usage: Option<&str>) -> Self {
        self.usage = usage.map(str::to_string);
        self
    }

    /// Sets the positional arguments help text.
    pub fn with_args_usage(mut self, args_usage: impl Into<String>) -> Self {
        self.args_usage = Some(args_usage.into());
        self
    }

    /// Sets the help grouping.
    pub fn with_category(mut self, category: CommandCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the accepted flags.
    pub fn with_flags(mut self, flags: Vec<FlagSpec>) -> Self {
        self.flags = flags;
        self
    }

    /// Whether this node carries an action.
    pub fn is_leaf(&self) -> bool {
        self.action.is_some()
    }

    /// Last child called `name`.
    pub fn child(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().rev().find(|child| child.name == name)
    }

    /// Runs the leaf action.
    ///
    /// # Errors
    /// Returns `RecliError::CommandNotFound` if this node is a group, or any
    /// error from the action.
    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        let action = self
            .action
            .as_ref()
            .ok_or_else(|| RecliError::CommandNotFound(self.name.clone()))?;
        action(invocation)
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("args_usage", &self.args_usage)
            .field("category", &self.category)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("leaf", &self.is_leaf())
            .finish()
    }
}
