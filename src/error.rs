use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a failed call against the cluster API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroveErrorKind {
    /// DNS, connect, TLS or body streaming failure. Always carries status `-1`.
    Transport,
    /// The server answered with a status other than the expected one.
    HttpStatusMismatch,
    /// The body was not valid JSON or not shaped like an envelope.
    MalformedBody,
    /// A well-formed envelope whose status is not `SUCCESS`.
    LogicalFailure,
}

impl fmt::Display for DroveErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "TransportFailure",
            Self::HttpStatusMismatch => "HttpStatusMismatch",
            Self::MalformedBody => "MalformedBody",
            Self::LogicalFailure => "LogicalFailure",
        };
        f.write_str(name)
    }
}

/// The single error shape every API client operation fails with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DroveError {
    pub kind: DroveErrorKind,
    /// HTTP status of the response, or `-1` when no response was received.
    pub status_code: i32,
    pub message: String,
    /// Original response body, kept for callers that need to inspect it.
    pub raw: Option<String>,
}

impl DroveError {
    pub const TRANSPORT_STATUS: i32 = -1;

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: DroveErrorKind::Transport,
            status_code: Self::TRANSPORT_STATUS,
            message: message.into(),
            raw: None,
        }
    }

    #[must_use]
    pub fn status_mismatch(status: u16, raw: Option<String>) -> Self {
        Self {
            kind: DroveErrorKind::HttpStatusMismatch,
            status_code: i32::from(status),
            message: format!("Drove call failed with status: {status}"),
            raw,
        }
    }

    pub fn malformed(status: u16, message: impl Into<String>, raw: String) -> Self {
        Self {
            kind: DroveErrorKind::MalformedBody,
            status_code: i32::from(status),
            message: message.into(),
            raw: Some(raw),
        }
    }

    pub fn logical(status: u16, message: impl Into<String>, raw: String) -> Self {
        Self {
            kind: DroveErrorKind::LogicalFailure,
            status_code: i32::from(status),
            message: message.into(),
            raw: Some(raw),
        }
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, DroveErrorKind::Transport)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Drove(#[from] DroveError),
    #[error("{message}")]
    ConfigResolution { message: String },
    #[error("Error parsing config file {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("Command group '{name}' is registered by more than one plugin")]
    DuplicateCommandGroup { name: String },
    #[error("Subcommand '{group} {name}' is registered more than once")]
    DuplicateSubcommand { group: String, name: String },
    #[error("No handler bound for '{group} {name}'")]
    UnknownCommand { group: String, name: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config_resolution(message: impl Into<String>) -> Self {
        Self::ConfigResolution {
            message: message.into(),
        }
    }

    pub fn config_parse(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::ConfigParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors that end the process without any output: a closed stdout
    /// (e.g. piping into `head`) or an interrupted write.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        match self {
            Self::Io(io_err) => matches!(
                io_err.kind(),
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// The underlying API error, when there is one.
    #[must_use]
    pub const fn as_drove(&self) -> Option<&DroveError> {
        match self {
            Self::Drove(e) => Some(e),
            _ => None,
        }
    }
}
