//! Constants used throughout secretsync.
//!
//! Centralizes magic strings and configuration values.

/// Default configuration file name, used when no `--file` is given.
pub const DEFAULT_CONFIG_FILE: &str = "secrets.yml";

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_API_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Environment variable controlling log filtering.
pub const LOG_ENV: &str = "SECRETSYNC_LOG";

/// Directory holding workflow definitions inside a repository.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// File suffixes treated as workflow definitions.
pub const WORKFLOW_SUFFIXES: &[&str] = &[".yml", ".yaml"];

/// Page size for paginated listings (the API maximum).
pub const PAGE_SIZE: usize = 100;

/// Per-request timeout, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Secret-name prefix reserved by the platform.
pub const RESERVED_PREFIX: &str = "GITHUB_";

/// Length in bytes of a recipient public key.
pub const PUBLIC_KEY_LEN: usize = 32;
