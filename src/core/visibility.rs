//! Organization secret visibility.
//!
//! Turns a `selected` repository list into repository ids.

use crate::core::config::Visibility;
use crate::core::types::{RepositoryId, RepositoryIds};
use crate::error::{ConfigError, Result};

/// Resolved access scope of an organization secret, as sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgScope {
    pub visibility: Visibility,
    /// Present only for `selected` visibility.
    pub repository_ids: Option<Vec<RepositoryId>>,
}

/// Resolve declared repository names to ids, preserving declaration order.
///
/// Returns `None` for `public` and `private`, where no repository list
/// applies. Duplicated names resolve to duplicated ids.
///
/// # Errors
///
/// Returns `ConfigError::UnknownRepositories`, naming every missing
/// repository, when a declared name is absent from `repository_ids`.
pub fn resolve(
    org: &str,
    secret: &str,
    visibility: Visibility,
    repositories: &[String],
    repository_ids: &RepositoryIds,
) -> Result<Option<Vec<RepositoryId>>> {
    if visibility != Visibility::Selected {
        return Ok(None);
    }

    let mut ids = Vec::with_capacity(repositories.len());
    let mut missing = Vec::new();
    for name in repositories {
        match repository_ids.get(name) {
            Some(id) => ids.push(*id),
            None => missing.push(name.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(ConfigError::UnknownRepositories {
            secret: secret.to_string(),
            org: org.to_string(),
            names: missing,
        }
        .into());
    }

    Ok(Some(ids))
}

/// Resolve a full [`OrgScope`].
///
/// # Errors
///
/// See [`resolve`].
pub fn scope(
    org: &str,
    secret: &str,
    visibility: Visibility,
    repositories: &[String],
    repository_ids: &RepositoryIds,
) -> Result<OrgScope> {
    Ok(OrgScope {
        visibility,
        repository_ids: resolve(org, secret, visibility, repositories, repository_ids)?,
    })
}
