//! Error types.
//!
//! One enum per concern, wrapped by [`Error`]. Per-secret and per-target
//! failures are collected into plans as typed values rather than only logged.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// One or more plans delete a secret that workflows still reference.
    #[error("{count} secret(s) used in workflows are set for deletion")]
    UnsafeDeletion { count: usize },

    /// A delete that could not be checked against every workflow it may affect.
    #[error("deletion withheld: workflows of {} could not be read", repositories.join(", "))]
    UnverifiedDeletion { repositories: Vec<String> },

    /// Some targets or operations did not complete.
    #[error("{failed} operation(s) or target(s) failed")]
    Incomplete { failed: usize },

    /// Offline validation found problems.
    #[error("{count} secret declaration(s) are invalid")]
    Invalid { count: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and declaration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("secret '{secret}' sets both `value` and `fromEnv`")]
    AmbiguousValue { secret: String },

    #[error("secret '{secret}' sets neither `value` nor `fromEnv`")]
    MissingValue { secret: String },

    #[error("secret '{secret}' reads environment variable '{var}', which is not set")]
    EnvNotSet { secret: String, var: String },

    #[error("invalid secret name '{name}': {reason}")]
    InvalidSecretName { name: String, reason: String },

    #[error(
        "secret '{secret}' selects repositories not found in organization '{org}': {}",
        names.join(", ")
    )]
    UnknownRepositories {
        secret: String,
        org: String,
        names: Vec<String>,
    },

    #[error("no API token: set GITHUB_API_TOKEN or pass --token")]
    MissingToken,
}

/// Sealing errors.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("public key is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("invalid public key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("sealed-box encryption failed")]
    EncryptionFailed,
}

/// Remote API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
