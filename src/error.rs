//! Error type shared by the session, the protocol engine and the actions.

use thiserror::Error;

/// Broad failure classes a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call sequence was wrong: starting twice, or calling before start.
    Usage,
    /// The companion answered with an `error` terminator.
    Protocol,
    /// The companion's output ended before a terminator arrived.
    ProcessDied,
    /// Spawning the companion or writing to it failed.
    Transport,
}

/// Error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    /// A companion is already running for this session.
    #[error("already started")]
    AlreadyStarted,
    /// No companion is running for this session.
    #[error("not started")]
    NotStarted,
    /// The companion rejected a command; carries its diagnostic text.
    #[error("{0}")]
    Protocol(String),
    /// End of stream before any terminator was seen.
    #[error("process died")]
    ProcessDied,
    /// The companion program could not be launched.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The status line did not carry the requested field.
    #[error("malformed status line: {0:?}")]
    MalformedStatus(String),
    /// Error writing to the companion.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyStarted | Error::NotStarted => ErrorKind::Usage,
            Error::Protocol(_) | Error::MalformedStatus(_) => ErrorKind::Protocol,
            Error::ProcessDied => ErrorKind::ProcessDied,
            Error::Spawn { .. } | Error::Io(_) => ErrorKind::Transport,
        }
    }

    /// Whether the error leaves the session unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::ProcessDied | ErrorKind::Transport)
    }
}
