//! Remote secrets API.
//!
//! Abstracts the platform calls the planner and apply step need, with
//! implementations for the live REST API and an in-memory fake.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Remote` trait
//! 2. Add the implementation in a new file (e.g., `enterprise.rs`)
//! 3. Re-export from this module

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::core::target::SyncTarget;
use crate::core::types::{KeyId, RepositoryIds, SealedValue, SecretName, WorkflowFile};
use crate::core::visibility::OrgScope;
use crate::error::Result;

mod github;
mod memory;

pub use github::GitHub;
pub use memory::{Call, InMemory};

/// The public key values must be sealed for, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemotePublicKey {
    pub key_id: KeyId,
    /// Base64 of the 32-byte key.
    pub key: String,
}

/// A create-or-update request.
#[derive(Debug, Clone, Copy)]
pub struct PutSecret<'a> {
    pub name: &'a str,
    pub key_id: &'a str,
    pub encrypted_value: &'a SealedValue,
    /// Organization targets only.
    pub scope: Option<&'a OrgScope>,
}

/// Platform operations used by reconciliation.
///
/// Every call is a single bounded request sequence with no retry.
pub trait Remote {
    /// Names of the secrets registered at `target`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing cannot be fetched.
    fn secret_names(&self, target: &SyncTarget) -> Result<Vec<SecretName>>;

    /// The public key values for `target` are sealed under.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the key cannot be fetched.
    fn public_key(&self, target: &SyncTarget) -> Result<RemotePublicKey>;

    /// Create or update a secret.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the platform rejects the request.
    fn put_secret(&self, target: &SyncTarget, secret: PutSecret<'_>) -> Result<()>;

    /// Delete a secret.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the platform rejects the request.
    fn delete_secret(&self, target: &SyncTarget, name: &str) -> Result<()>;

    /// Repository ids of an organization, keyed by repository name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing cannot be fetched.
    fn repository_ids(&self, org: &str) -> Result<RepositoryIds>;

    /// Workflow definitions of a repository, keyed by file name.
    ///
    /// A repository without workflows yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the files cannot be fetched.
    fn workflow_files(&self, owner: &str, repo: &str) -> Result<BTreeMap<WorkflowFile, Vec<u8>>>;
}
