use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status. `detail` is the
    /// server's own explanation when it sent one.
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("session token is not a valid header value")]
    InvalidToken,
}

impl ApiError {
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::InvalidToken => None,
        }
    }
}

/// Failure of a sign-in flow. The display text is meant for the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,

    /// Password login or registration refused by the server.
    #[error("{0}")]
    Rejected(String),

    #[error("Google Client ID is missing. Set TODOMAN_GOOGLE_CLIENT_ID")]
    ClientIdMissing,

    #[error("Google Sign-In is not ready yet. Try again in a moment.")]
    ProviderNotReady,

    /// The server did not accept the federated credential.
    #[error("{0}")]
    CredentialRejected(String),

    #[error("not signed in, run `todoman login` first")]
    NotSignedIn,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read session file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to write session file: {0}")]
    Encode(#[from] ron::Error),
}

/// Failure of a task operation on the board.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("nothing to update")]
    EmptyPatch,

    #[error("no task with id `{0}`")]
    UnknownTask(String),

    #[error("no {0} is awaiting confirmation")]
    NothingPending(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}
