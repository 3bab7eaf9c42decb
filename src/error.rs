//! Contains the `Error` and `Result` types that `mongodb-command` uses.

use std::{collections::HashSet, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retryable write error label. This label will be added to an error when the error is
/// write-retryable.
pub const RETRYABLE_WRITE_ERROR: &str = "RetryableWriteError";

/// The result type for all methods that can return an error in the `mongodb-command` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `mongodb-command` crate. The inner
/// [`ErrorKind`](enum.ErrorKind.html) is wrapped in a `Box` to allow the errors to be
/// cloned.
#[derive(Clone, Debug, Error)]
#[error("Kind: {kind}, labels: {labels:?}")]
#[non_exhaustive]
pub struct Error {
    /// The type of error that occurred.
    pub kind: Box<ErrorKind>,

    labels: HashSet<String>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, labels: Option<impl IntoIterator<Item = String>>) -> Self {
        Self {
            kind: Box::new(kind),
            labels: labels
                .map(|labels| labels.into_iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Creates an `IncompatibleServer` error for a feature the given server cannot accept.
    pub(crate) fn unsupported_by_server(
        address: &str,
        wire_version: i32,
        feature: &str,
    ) -> Self {
        ErrorKind::IncompatibleServer {
            message: format!(
                "Server {address}, which reports wire version {wire_version}, does not support \
                 {feature}"
            ),
        }
        .into()
    }

    /// Whether an error originated from the server rejecting the operation outright because it
    /// does not support a requested feature.
    pub fn is_incompatible_server(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::IncompatibleServer { .. })
    }

    /// Whether this error was caused by an invalid argument provided at operation construction.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::InvalidArgument { .. })
    }

    /// Returns the labels for this error.
    pub fn labels(&self) -> &HashSet<String> {
        &self.labels
    }

    /// Whether this error contains the specified label.
    pub fn contains_label<T: AsRef<str>>(&self, label: T) -> bool {
        self.labels.contains(label.as_ref())
    }

    /// Adds the given label to this error. Intended for outer retry layers marking errors
    /// (e.g. with [`RETRYABLE_WRITE_ERROR`]) based on an operation's retry eligibility.
    pub fn add_label<T: AsRef<str>>(&mut self, label: T) {
        self.labels.insert(label.as_ref().to_string());
    }

    /// Returns a copy of this Error with the specified label added.
    pub fn with_label<T: AsRef<str>>(mut self, label: T) -> Self {
        self.add_label(label);
        self
    }

    /// The server-reported error code, if this error came from a failed command.
    pub fn code(&self) -> Option<i32> {
        match self.kind.as_ref() {
            ErrorKind::Command(err) => Some(err.code),
            _ => None,
        }
    }
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self::new(err.into(), None::<Option<String>>)
    }
}

/// The types of errors that can occur.
#[allow(missing_docs)]
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid argument was provided.
    #[error("An invalid argument was provided: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// Wrapper around `bson::de::Error`.
    #[error("{0}")]
    BsonDeserialization(crate::bson::de::Error),

    /// Wrapper around `bson::ser::Error`.
    #[error("{0}")]
    BsonSerialization(crate::bson::ser::Error),

    /// The server returned an error to an attempted operation.
    #[error("Command failed: {0}")]
    Command(CommandError),

    /// The server returned an invalid reply to a database operation.
    #[error("The server returned an invalid reply to a database operation: {message}")]
    #[non_exhaustive]
    InvalidResponse { message: String },

    /// Wrapper around [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html).
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// The server does not support the operation.
    #[error("The server does not support a database operation: {message}")]
    #[non_exhaustive]
    IncompatibleServer { message: String },
}

impl From<crate::bson::de::Error> for ErrorKind {
    fn from(err: crate::bson::de::Error) -> Self {
        Self::BsonDeserialization(err)
    }
}

impl From<crate::bson::ser::Error> for ErrorKind {
    fn from(err: crate::bson::ser::Error) -> Self {
        Self::BsonSerialization(err)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// An error that occurred due to a database command failing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CommandError {
    /// Identifies the type of error.
    pub code: i32,

    /// The name associated with the error code.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg", default = "String::new")]
    pub message: String,
}

impl fmt::Display for CommandError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Error code {} ({}): {}",
            self.code, self.code_name, self.message
        )
    }
}
