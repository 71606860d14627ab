//! In-memory backend.
//!
//! Holds secrets, keys, repositories and workflow files in process and
//! records every mutation. Used for offline runs of the full pipeline.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::{PutSecret, Remote, RemotePublicKey};
use crate::core::target::SyncTarget;
use crate::core::types::{KeyId, RepositoryIds, SealedValue, SecretName, WorkflowFile};
use crate::core::visibility::OrgScope;
use crate::error::{ApiError, Result};

/// A mutation received by [`InMemory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Put {
        target: SyncTarget,
        name: SecretName,
        key_id: KeyId,
        scope: Option<OrgScope>,
    },
    Delete {
        target: SyncTarget,
        name: SecretName,
    },
}

impl Call {
    pub fn target(&self) -> &SyncTarget {
        match self {
            Self::Put { target, .. } | Self::Delete { target, .. } => target,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Put { name, .. } | Self::Delete { name, .. } => name,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    secrets: BTreeMap<SyncTarget, BTreeMap<SecretName, Option<SealedValue>>>,
    keys: BTreeMap<SyncTarget, RemotePublicKey>,
    default_key: Option<RemotePublicKey>,
    repositories: BTreeMap<String, RepositoryIds>,
    workflows: BTreeMap<(String, String), BTreeMap<WorkflowFile, Vec<u8>>>,
    unreachable: BTreeSet<SyncTarget>,
    rejected: BTreeSet<SecretName>,
    calls: Vec<Call>,
    repository_fetches: usize,
}

/// In-process [`Remote`].
#[derive(Debug, Default)]
pub struct InMemory {
    state: RefCell<State>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing secret (with no known value) at `target`.
    pub fn with_secret(self, target: &SyncTarget, name: &str) -> Self {
        self.state
            .borrow_mut()
            .secrets
            .entry(target.clone())
            .or_default()
            .insert(name.to_string(), None);
        self
    }

    /// Public key returned for `target`.
    pub fn with_public_key(self, target: &SyncTarget, key: RemotePublicKey) -> Self {
        self.state.borrow_mut().keys.insert(target.clone(), key);
        self
    }

    /// Public key returned for targets without their own key.
    pub fn with_default_key(self, key: RemotePublicKey) -> Self {
        self.state.borrow_mut().default_key = Some(key);
        self
    }

    /// Repository ids of `org`.
    pub fn with_repositories(self, org: &str, ids: RepositoryIds) -> Self {
        self.state
            .borrow_mut()
            .repositories
            .insert(org.to_string(), ids);
        self
    }

    /// A workflow file of `owner/repo`.
    pub fn with_workflow(self, owner: &str, repo: &str, file: &str, text: &str) -> Self {
        self.state
            .borrow_mut()
            .workflows
            .entry((owner.to_string(), repo.to_string()))
            .or_default()
            .insert(file.to_string(), text.as_bytes().to_vec());
        self
    }

    /// Make every fetch for `target` fail.
    pub fn with_unreachable(self, target: &SyncTarget) -> Self {
        self.state.borrow_mut().unreachable.insert(target.clone());
        self
    }

    /// Make every put or delete of `name` fail.
    pub fn with_rejected(self, name: &str) -> Self {
        self.state.borrow_mut().rejected.insert(name.to_string());
        self
    }

    /// Secret names currently registered at `target`.
    pub fn names(&self, target: &SyncTarget) -> Vec<SecretName> {
        self.state
            .borrow()
            .secrets
            .get(target)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Last sealed value put for `name` at `target`.
    pub fn sealed_value(&self, target: &SyncTarget, name: &str) -> Option<SealedValue> {
        self.state
            .borrow()
            .secrets
            .get(target)
            .and_then(|s| s.get(name).cloned().flatten())
    }

    /// Mutations received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// How many times repository ids were listed.
    pub fn repository_fetches(&self) -> usize {
        self.state.borrow().repository_fetches
    }

    fn reachable(&self, target: &SyncTarget) -> Result<()> {
        if self.state.borrow().unreachable.contains(target) {
            return Err(ApiError::Other(format!("{} is unreachable", target)).into());
        }
        Ok(())
    }

    fn accepted(&self, name: &str) -> Result<()> {
        if self.state.borrow().rejected.contains(name) {
            return Err(ApiError::Other(format!("secret {} was rejected", name)).into());
        }
        Ok(())
    }
}

fn not_found(method: &str, what: String) -> crate::error::Error {
    ApiError::Status {
        method: method.to_string(),
        url: what,
        status: 404,
        message: "Not Found".to_string(),
    }
    .into()
}

impl Remote for InMemory {
    fn secret_names(&self, target: &SyncTarget) -> Result<Vec<SecretName>> {
        self.reachable(target)?;
        Ok(self.names(target))
    }

    fn public_key(&self, target: &SyncTarget) -> Result<RemotePublicKey> {
        self.reachable(target)?;
        let state = self.state.borrow();
        state
            .keys
            .get(target)
            .or(state.default_key.as_ref())
            .cloned()
            .ok_or_else(|| not_found("GET", format!("{} public key", target)))
    }

    fn put_secret(&self, target: &SyncTarget, secret: PutSecret<'_>) -> Result<()> {
        self.accepted(secret.name)?;
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Put {
            target: target.clone(),
            name: secret.name.to_string(),
            key_id: secret.key_id.to_string(),
            scope: secret.scope.cloned(),
        });
        state
            .secrets
            .entry(target.clone())
            .or_default()
            .insert(secret.name.to_string(), Some(secret.encrypted_value.clone()));
        Ok(())
    }

    fn delete_secret(&self, target: &SyncTarget, name: &str) -> Result<()> {
        self.accepted(name)?;
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Delete {
            target: target.clone(),
            name: name.to_string(),
        });
        let removed = state
            .secrets
            .get_mut(target)
            .and_then(|s| s.remove(name))
            .is_some();
        if removed {
            Ok(())
        } else {
            Err(not_found("DELETE", format!("{} secret {}", target, name)))
        }
    }

    fn repository_ids(&self, org: &str) -> Result<RepositoryIds> {
        self.reachable(&SyncTarget::organization(org))?;
        let mut state = self.state.borrow_mut();
        state.repository_fetches += 1;
        Ok(state.repositories.get(org).cloned().unwrap_or_default())
    }

    fn workflow_files(&self, owner: &str, repo: &str) -> Result<BTreeMap<WorkflowFile, Vec<u8>>> {
        self.reachable(&SyncTarget::repository(owner, repo))?;
        Ok(self
            .state
            .borrow()
            .workflows
            .get(&(owner.to_string(), repo.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
