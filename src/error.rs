use thiserror::Error;

/// Error types for command tree construction and leaf execution.
///
/// Construction errors abort the whole tree and carry the path of the field
/// that caused them. Leaf errors are local to one invocation and leave the
/// bound record unchanged.
#[derive(Error, Debug)]
pub enum RecliError {
    /// The top-level value handed to the builder is not a record.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A value's shape has no defined handling.
    #[error("unsupported kind: {kind}")]
    UnsupportedKind {
        /// Type name of the offending value
        kind: String,
    },

    /// A textual argument could not be parsed into the target scalar.
    #[error("cannot convert '{value}' to {target}: {reason}")]
    Conversion {
        /// The text that failed to parse
        value: String,
        /// Name of the target type
        target: &'static str,
        /// Parser or codec error details
        reason: String,
    },

    /// A leaf received a different number of positional arguments than it declares.
    #[error("expected {expected} argument{}, got {actual}", plural(.expected))]
    WrongArity {
        /// Declared argument count
        expected: usize,
        /// Received argument count
        actual: usize,
    },

    /// A flag-based item add was invoked without any flags.
    #[error("no properties specified")]
    NoPropertiesSpecified,

    /// An error raised while handling a named field.
    #[error("{field}: {source}")]
    Field {
        /// Declared name of the field
        field: String,
        /// The underlying error
        #[source]
        source: Box<RecliError>,
    },

    /// A binding points at a field or element that no longer exists.
    #[error("'{0}' no longer refers to a live value")]
    StaleBinding(String),

    /// The bound record is already borrowed by the caller.
    #[error("record is already borrowed")]
    Borrowed,

    /// No command exists at the given path.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// A record could not be encoded.
    #[error("failed to serialize {content_type}: {details}")]
    Serialization {
        /// What was being serialized
        content_type: &'static str,
        /// Serializer error details
        details: String,
    },

    /// A collection item could not be decoded.
    #[error("failed to deserialize {content_type}: {details}")]
    Deserialization {
        /// What was being deserialized
        content_type: &'static str,
        /// Deserializer error details
        details: String,
    },

    /// Command line parsing failed or help was requested.
    #[error(transparent)]
    Usage(#[from] clap::Error),
}

/// A specialized `Result` type for recli operations.
pub type Result<T> = std::result::Result<T, RecliError>;

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

impl RecliError {
    /// Creates a conversion error for `value` targeting `target`.
    pub fn conversion(value: &str, target: &'static str, reason: impl std::fmt::Display) -> Self {
        RecliError::Conversion {
            value: value.to_string(),
            target,
            reason: reason.to_string(),
        }
    }

    /// Creates an unsupported-kind error naming the offending type.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        RecliError::UnsupportedKind { kind: kind.into() }
    }

    /// Wraps the error with the name of the field it occurred in.
    pub fn in_field(self, field: &str) -> Self {
        RecliError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the error underneath any field context.
    pub fn innermost(&self) -> &RecliError {
        match self {
            RecliError::Field { source, .. } => source.innermost(),
            other => other,
        }
    }

    pub(crate) fn serialization(content_type: &'static str, error: impl std::fmt::Display) -> Self {
        RecliError::Serialization {
            content_type,
            details: error.to_string(),
        }
    }

    pub(crate) fn deserialization(content_type: &'static str, error: impl std::fmt::Display) -> Self {
        RecliError::Deserialization {
            content_type,
            details: error.to_string(),
        }
    }
}
