//! Secret value realization.
//!
//! Produces the plaintext of a declared secret from its single source.

use tracing::trace;
use zeroize::Zeroizing;

use crate::core::config::{SecretValueSpec, ValueSource};
use crate::core::env::EnvLookup;
use crate::core::validation;
use crate::error::{ConfigError, Result};

/// Realize the plaintext of `secret`.
///
/// # Arguments
///
/// * `secret` - Secret name, for error messages
/// * `spec` - The declaration
/// * `env` - Lookup used for `fromEnv` sources
///
/// # Errors
///
/// Returns `ConfigError::AmbiguousValue` or `ConfigError::MissingValue`
/// if the declaration does not have exactly one source, and
/// `ConfigError::EnvNotSet` if the referenced variable is not set.
pub fn realize(
    secret: &str,
    spec: &SecretValueSpec,
    env: &(impl EnvLookup + ?Sized),
) -> Result<Zeroizing<String>> {
    match spec.source(secret)? {
        ValueSource::Literal(value) => Ok(Zeroizing::new(value.to_string())),
        ValueSource::Env(var) => {
            trace!(secret, var, "reading value from environment");
            env.get(var).map(Zeroizing::new).ok_or_else(|| {
                ConfigError::EnvNotSet {
                    secret: secret.to_string(),
                    var: var.to_string(),
                }
                .into()
            })
        }
    }
}

/// Check a declared secret without sealing it: name rules plus realization.
///
/// # Errors
///
/// Returns the first problem found.
pub fn check(secret: &str, spec: &SecretValueSpec, env: &(impl EnvLookup + ?Sized)) -> Result<()> {
    validation::validate_name(secret)?;
    realize(secret, spec, env).map(drop)
}
