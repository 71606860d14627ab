//! Reconciliation plans.
//!
//! [`assemble`] turns the declared secrets of one target, plus what was
//! observed remotely, into a [`ReconciliationPlan`]: the diff with every
//! create and update carrying its sealed value. Problems with individual
//! secrets are collected on the plan instead of failing it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::core::config::{OrgSecretSpec, SecretValueSpec};
use crate::core::diff::{Change, Diff};
use crate::core::env::EnvLookup;
use crate::core::remote::RemotePublicKey;
use crate::core::scan::UsedSecrets;
use crate::core::seal::{self, RecipientKey};
use crate::core::secrets;
use crate::core::target::SyncTarget;
use crate::core::types::{KeyId, RepositoryIds, SealedValue, SecretName, WorkflowFile};
use crate::core::validation;
use crate::core::visibility::{self, OrgScope};
use crate::error::{Error, Result};

/// A value sealed for its target, ready to be put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub name: SecretName,
    pub value: SealedValue,
    /// Organization targets only.
    pub scope: Option<OrgScope>,
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretOperation {
    Create(SealedSecret),
    Update(SealedSecret),
    Delete(SecretName),
}

impl SecretOperation {
    pub fn name(&self) -> &str {
        match self {
            Self::Create(s) | Self::Update(s) => &s.name,
            Self::Delete(name) => name,
        }
    }

    pub fn change(&self) -> Change {
        match self {
            Self::Create(_) => Change::Create,
            Self::Update(_) => Change::Update,
            Self::Delete(_) => Change::Delete,
        }
    }

    /// The sealed value, for creates and updates.
    pub fn sealed(&self) -> Option<&SealedSecret> {
        match self {
            Self::Create(s) | Self::Update(s) => Some(s),
            Self::Delete(_) => None,
        }
    }
}

/// A declared secret that was left out of its plan.
#[derive(Debug)]
pub struct SecretIssue {
    pub secret: SecretName,
    pub error: Error,
}

/// A target that could not be planned at all.
#[derive(Debug)]
pub struct TargetFailure {
    pub target: SyncTarget,
    pub error: Error,
}

/// A delete of a secret that workflows still reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InUseDeletion<'a> {
    pub secret: &'a str,
    pub files: &'a BTreeSet<WorkflowFile>,
}

/// The declared secrets of a target.
#[derive(Debug, Clone, Copy)]
pub enum Desired<'a> {
    /// A repository or repository environment.
    Secrets(&'a BTreeMap<SecretName, SecretValueSpec>),
    /// An organization. `repository_ids` is only consulted for `selected`
    /// visibility.
    Organization {
        secrets: &'a BTreeMap<SecretName, OrgSecretSpec>,
        repository_ids: &'a RepositoryIds,
    },
}

impl<'a> Desired<'a> {
    fn names(&self) -> Vec<&'a str> {
        match self {
            Self::Secrets(secrets) => secrets.keys().map(String::as_str).collect(),
            Self::Organization { secrets, .. } => secrets.keys().map(String::as_str).collect(),
        }
    }
}

/// Operations for one target.
#[derive(Debug)]
pub struct ReconciliationPlan {
    pub target: SyncTarget,
    /// Id of the key every sealed value in this plan was sealed under.
    pub key_id: KeyId,
    /// Creates and updates first, deletes last.
    pub operations: Vec<SecretOperation>,
    /// Names registered remotely when the plan was built.
    pub observed: BTreeSet<SecretName>,
    /// Workflow references this plan is checked against.
    pub used: UsedSecrets,
    /// Repository plans only, keyed by environment name.
    pub environments: BTreeMap<String, ReconciliationPlan>,
    /// Declared secrets that were skipped.
    pub issues: Vec<SecretIssue>,
}

impl ReconciliationPlan {
    /// Deletes of secrets referenced by workflows. Environments excluded.
    pub fn in_use_deletions(&self) -> Vec<InUseDeletion<'_>> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                SecretOperation::Delete(name) => self.used.files(name).map(|files| InUseDeletion {
                    secret: name,
                    files,
                }),
                _ => None,
            })
            .collect()
    }

    /// In-use deletions of this plan and its environments.
    pub fn in_use_deletion_count(&self) -> usize {
        self.in_use_deletions().len()
            + self
                .environments
                .values()
                .map(ReconciliationPlan::in_use_deletion_count)
                .sum::<usize>()
    }

    /// Operations with the given change. Environments excluded.
    pub fn with_change(&self, change: Change) -> Vec<&SecretOperation> {
        self.operations
            .iter()
            .filter(|op| op.change() == change)
            .collect()
    }

    /// Number of operations including environments.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
            + self
                .environments
                .values()
                .map(ReconciliationPlan::operation_count)
                .sum::<usize>()
    }

    /// Number of skipped secrets including environments.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
            + self
                .environments
                .values()
                .map(ReconciliationPlan::issue_count)
                .sum::<usize>()
    }

    /// Names that will exist at this target once the plan is applied, or
    /// that are declared but were skipped.
    pub fn provided(&self) -> BTreeSet<&str> {
        let deleted: BTreeSet<&str> = self
            .with_change(Change::Delete)
            .into_iter()
            .map(SecretOperation::name)
            .collect();

        let mut provided: BTreeSet<&str> = self
            .observed
            .iter()
            .map(String::as_str)
            .filter(|name| !deleted.contains(name))
            .collect();
        provided.extend(
            self.operations
                .iter()
                .filter_map(|op| op.sealed())
                .map(|s| s.name.as_str()),
        );
        provided.extend(self.issues.iter().map(|i| i.secret.as_str()));
        provided
    }

    /// Turn every delete into an issue, keeping creates and updates.
    ///
    /// Used when some of the workflows a delete must be checked against
    /// could not be read. `repositories` names them.
    pub fn withhold_deletes(&mut self, repositories: &[String]) {
        let (deletes, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.operations)
            .into_iter()
            .partition(|op| op.change().is_delete());
        self.operations = kept;

        for op in deletes {
            warn!(
                target = %self.target,
                secret = op.name(),
                "withholding deletion, workflow references are incomplete"
            );
            self.issues.push(SecretIssue {
                secret: op.name().to_string(),
                error: Error::UnverifiedDeletion {
                    repositories: repositories.to_vec(),
                },
            });
        }
    }

    /// Referenced secrets provided neither by this plan nor by any of its
    /// environments.
    pub fn missing_secrets(&self) -> Vec<&str> {
        let mut provided = self.provided();
        for env in self.environments.values() {
            provided.extend(env.provided());
        }
        self.used
            .names()
            .filter(|name| !provided.contains(name))
            .collect()
    }

    /// This plan and its environments, in apply order.
    pub fn flatten(&self) -> Vec<&ReconciliationPlan> {
        let mut plans = vec![self];
        for env in self.environments.values() {
            plans.extend(env.flatten());
        }
        plans
    }
}

/// Plans for every target of a run.
#[derive(Debug, Default)]
pub struct RunPlan {
    pub organizations: Vec<ReconciliationPlan>,
    pub repositories: Vec<ReconciliationPlan>,
    pub failures: Vec<TargetFailure>,
}

impl RunPlan {
    /// Every plan in apply order: organizations, then each repository
    /// followed by its environments.
    pub fn plans(&self) -> Vec<&ReconciliationPlan> {
        self.organizations
            .iter()
            .chain(&self.repositories)
            .flat_map(ReconciliationPlan::flatten)
            .collect()
    }

    /// In-use deletions across the whole run.
    pub fn in_use_deletion_count(&self) -> usize {
        self.organizations
            .iter()
            .chain(&self.repositories)
            .map(ReconciliationPlan::in_use_deletion_count)
            .sum()
    }

    /// Gate that must pass before anything is applied.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsafeDeletion` if any plan deletes a referenced secret.
    pub fn check_safe(&self) -> Result<()> {
        match self.in_use_deletion_count() {
            0 => Ok(()),
            count => Err(Error::UnsafeDeletion { count }),
        }
    }

    pub fn operation_count(&self) -> usize {
        self.plans().iter().map(|p| p.operations.len()).sum()
    }

    pub fn issue_count(&self) -> usize {
        self.plans().iter().map(|p| p.issues.len()).sum()
    }

    /// Missing secrets of a repository plan, also discounting names that an
    /// organization plan of this run provides.
    pub fn missing_secrets<'p>(&'p self, plan: &'p ReconciliationPlan) -> Vec<&'p str> {
        let shared: BTreeSet<&str> = self
            .organizations
            .iter()
            .flat_map(ReconciliationPlan::provided)
            .collect();
        plan.missing_secrets()
            .into_iter()
            .filter(|name| !shared.contains(name))
            .collect()
    }
}

/// Build the plan for one target.
///
/// # Arguments
///
/// * `target` - The target being planned
/// * `desired` - Its declared secrets
/// * `observed` - Names currently registered at the target
/// * `public_key` - The target's public key
/// * `used` - Workflow references to check deletes against
/// * `delete_unspecified` - Whether undeclared remote names are deleted
/// * `env` - Lookup for `fromEnv` values
///
/// # Errors
///
/// Returns `SealError` if the public key is unusable. Problems with single
/// secrets are recorded in [`ReconciliationPlan::issues`] instead.
pub fn assemble(
    target: SyncTarget,
    desired: Desired<'_>,
    observed: &BTreeSet<SecretName>,
    public_key: &RemotePublicKey,
    used: UsedSecrets,
    delete_unspecified: bool,
    env: &(impl EnvLookup + ?Sized),
) -> Result<ReconciliationPlan> {
    let key = RecipientKey::from_base64(&public_key.key)?;
    let diff = Diff::compute(desired.names(), observed, delete_unspecified);

    let mut operations = Vec::with_capacity(diff.len());
    let mut issues = Vec::new();

    for entry in diff.entries() {
        let name = entry.name();
        let sealed = match entry.change() {
            Change::Delete => {
                operations.push(SecretOperation::Delete(name.to_string()));
                continue;
            }
            _ => seal_secret(&target, name, desired, &key, env),
        };

        match sealed {
            Ok(sealed) if entry.change() == Change::Create => {
                operations.push(SecretOperation::Create(sealed))
            }
            Ok(sealed) => operations.push(SecretOperation::Update(sealed)),
            Err(error) => {
                warn!(target = %target, secret = name, error = %error, "skipping secret");
                issues.push(SecretIssue {
                    secret: name.to_string(),
                    error,
                });
            }
        }
    }

    debug!(
        target = %target,
        operations = operations.len(),
        issues = issues.len(),
        "plan assembled"
    );

    Ok(ReconciliationPlan {
        target,
        key_id: public_key.key_id.clone(),
        operations,
        observed: observed.clone(),
        used,
        environments: BTreeMap::new(),
        issues,
    })
}

fn seal_secret(
    target: &SyncTarget,
    name: &str,
    desired: Desired<'_>,
    key: &RecipientKey,
    env: &(impl EnvLookup + ?Sized),
) -> Result<SealedSecret> {
    validation::validate_name(name)?;

    let (value, scope) = match desired {
        Desired::Secrets(secrets) => (declared(secrets.get(name), name)?, None),
        Desired::Organization {
            secrets,
            repository_ids,
        } => {
            let spec = declared(secrets.get(name), name)?;
            let scope = visibility::scope(
                target.account(),
                name,
                spec.visibility,
                &spec.repositories,
                repository_ids,
            )?;
            (&spec.value, Some(scope))
        }
    };

    let plaintext = secrets::realize(name, value, env)?;
    let value = seal::seal(key, plaintext.as_bytes())?;

    Ok(SealedSecret {
        name: name.to_string(),
        value,
        scope,
    })
}

fn declared<'a, T>(spec: Option<&'a T>, name: &str) -> Result<&'a T> {
    spec.ok_or_else(|| {
        crate::error::ConfigError::MissingValue {
            secret: name.to_string(),
        }
        .into()
    })
}
