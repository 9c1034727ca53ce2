//! Error types produced by command handlers.

use std::io;
use std::path::Path;

use crate::lexer::LexingError;

/// Everything that can go wrong while running one command.
///
/// Handlers return these; the interpreter turns them into text prefixed with
/// the failing command's name, so none of them reaches the caller as an
/// `Err`.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    MalformedInput(#[from] LexingError),

    #[error("missing operand")]
    MissingOperand,

    #[error("cannot access '{0}': No such file or directory")]
    NotFound(String),

    #[error("{0}: Permission denied")]
    PermissionDenied(String),

    #[error("failed to remove '{0}': Directory not empty")]
    NotEmpty(String),

    #[error("Destination path '{0}' already exists")]
    AlreadyExists(String),

    #[error("cannot copy '{src}' into itself, '{dest}'")]
    IntoItself { src: String, dest: String },

    #[error("invalid mode: '{0}'")]
    InvalidMode(String),

    #[error("cannot decode payload: {0}")]
    DecodeError(String),

    #[error("command not found")]
    CommandNotFound,

    #[error("{0}")]
    ExternalProcessFailure(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Classifies an OS error raised while operating on `path`.
    pub fn from_io(source: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().display().to_string();
        match source.kind() {
            io::ErrorKind::NotFound => CommandError::NotFound(path),
            io::ErrorKind::PermissionDenied => CommandError::PermissionDenied(path),
            io::ErrorKind::DirectoryNotEmpty => CommandError::NotEmpty(path),
            _ => CommandError::Io { path, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;
