use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;

/// Stable classification of svn failures, independent of the message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotInstalled,
    NotWorkingCopy,
    AuthFailed,
    NetworkError,
    FileNotFound,
    InvalidRevision,
    CommandFailed,
    Timeout,
}

impl ErrorKind {
    /// Wire code reported to callers
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotInstalled => "SVN_NOT_INSTALLED",
            ErrorKind::NotWorkingCopy => "NOT_WORKING_COPY",
            ErrorKind::AuthFailed => "AUTH_FAILED",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::FileNotFound => "FILE_NOT_FOUND",
            ErrorKind::InvalidRevision => "INVALID_REVISION",
            ErrorKind::CommandFailed => "COMMAND_FAILED",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised while invoking svn
///
/// Every variant maps to exactly one [`ErrorKind`]. `details` carries the raw
/// subprocess output (or the invoked command line for timeouts) when there is any.
#[derive(Debug, Error)]
pub enum SvnError {
    #[error("SVN command not found. Please ensure SVN is installed and in your PATH.")]
    NotInstalled,

    #[error("{message}")]
    NotWorkingCopy {
        message: String,
        details: Option<String>,
    },

    #[error("SVN authentication failed. Check your credentials.")]
    AuthFailed { details: String },

    #[error("Unable to connect to SVN server")]
    Network { details: String },

    #[error("{message}")]
    FileNotFound {
        message: String,
        details: Option<String>,
    },

    #[error("Invalid revision specified")]
    InvalidRevision { details: String },

    #[error("{message}")]
    CommandFailed {
        message: String,
        exit_code: i32,
        details: Option<String>,
    },

    #[error("SVN command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64, command: String },
}

impl SvnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SvnError::NotInstalled => ErrorKind::NotInstalled,
            SvnError::NotWorkingCopy { .. } => ErrorKind::NotWorkingCopy,
            SvnError::AuthFailed { .. } => ErrorKind::AuthFailed,
            SvnError::Network { .. } => ErrorKind::NetworkError,
            SvnError::FileNotFound { .. } => ErrorKind::FileNotFound,
            SvnError::InvalidRevision { .. } => ErrorKind::InvalidRevision,
            SvnError::CommandFailed { .. } => ErrorKind::CommandFailed,
            SvnError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Raw diagnostic text attached to the error, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            SvnError::NotInstalled => None,
            SvnError::NotWorkingCopy { details, .. }
            | SvnError::FileNotFound { details, .. }
            | SvnError::CommandFailed { details, .. } => details.as_deref(),
            SvnError::AuthFailed { details }
            | SvnError::Network { details }
            | SvnError::InvalidRevision { details } => Some(details),
            SvnError::Timeout { command, .. } => Some(command),
        }
    }

    /// Working-copy error with no subprocess output behind it
    pub fn not_working_copy(message: impl Into<String>) -> Self {
        SvnError::NotWorkingCopy {
            message: message.into(),
            details: None,
        }
    }

    /// Missing-file error with no subprocess output behind it
    pub fn file_not_found(message: impl Into<String>) -> Self {
        SvnError::FileNotFound {
            message: message.into(),
            details: None,
        }
    }
}

/// Raised when svn output cannot be turned into records
#[derive(Debug, Error)]
#[error("Failed to parse svn output: {0}")]
pub struct ParseError(pub String);

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError(err.to_string())
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Module errors convert via `From`, so request handlers can use `?` throughout
/// and decide at the boundary how each kind is rendered.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("SVN error: {0}")]
    Svn(#[from] SvnError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Result type for svn invocations
pub type SvnResult<T> = std::result::Result<T, SvnError>;

/// Result type for output parsers
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
