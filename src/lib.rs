//! recli - command trees derived from live records.
//!
//! Describe a struct with [`record!`] and recli turns every reachable field
//! into command line operations that read and write the value in place:
//!
//! - `get` / `set` for scalars, including enum-like types via [`text_scalar!`]
//! - `list` / `add` / `add-json` / `delete` for ordered collections
//! - `dump` / `get` / `set` / `unset` for associative collections
//! - `dump-json` for every record
//!
//! Tag-declared defaults are applied by [`defaults::apply_defaults`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::{cell::RefCell, rc::Rc};
//!
//! use recli::{CliService, Config, Constructor};
//! use serde::Serialize;
//!
//! #[derive(Default, Serialize)]
//! struct Server {
//!     address: String,
//!     port: u16,
//! }
//!
//! recli::record!(Server {
//!     address [usage = "Listen address"],
//!     port [default = "8080"],
//! });
//!
//! let server = Rc::new(RefCell::new(Server::default()));
//! let tree = Constructor::new(Config::standard()).construct(&server)?;
//! CliService::new("server", tree).execute(std::env::args_os())?;
//! # Ok::<(), recli::RecliError>(())
//! ```

/// Error types and result alias.
pub mod error;

/// Typed introspection of records, scalars and collections.
pub mod reflect;

/// Tag-declared default values.
pub mod defaults;

/// Builder policy and field naming.
pub mod config;

/// Command tree construction and execution.
pub mod cli;

/// Logging setup for command line programs.
pub mod tracing_config;

pub use cli::{CliService, CommandNode, CommandTree, Constructor, Invocation};
pub use config::Config;
pub use error::{RecliError, Result};
pub use reflect::{FieldDescriptor, Record, Reflect, Scalar, ScalarKind, Shape, Tag};
