// Error types for the account store.
// Every `ConfigStore` operation returns `ConfigError`; the binary turns it
// into an `anyhow::Error` and prints the chain.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;

/// Input rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Host must not be empty.")]
    EmptyHost,

    #[error("Host must start with ('http://', 'https://'), got {0}.")]
    UnsupportedScheme(String),

    #[error("Host {url} is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Alias must start with a letter, got {0:?}.")]
    AliasMustStartWithLetter(String),

    #[error("Alias {0:?} is reserved.")]
    ReservedAlias(String),

    #[error("A password login needs a user.")]
    PasswordWithoutUser,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file parsed as TOML but has no usable `accounts` section.
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidConfigFile { path: PathBuf, reason: String },

    #[error("Cannot parse configuration file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("Given alias ({0}) does not match existing accounts.")]
    UnknownAlias(String),

    #[error("An account with alias ({0}) already exists.")]
    AliasTaken(String),

    #[error("Server {host} requires authentication.")]
    AuthenticationRequired { host: String },

    #[error("Server {host} requires authentication for user {user}.")]
    RemoteUserRejected { host: String, user: String },

    #[error("Invalid credentials for {user}@{host}.")]
    InvalidCredentials { user: String, host: String },

    #[error("Invalid token for {host}.")]
    InvalidToken { host: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidConfigFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
