//! Run planning.
//!
//! Drives a [`Remote`] through every declared target, one at a time, and
//! collects the resulting plans. A target whose data cannot be fetched is
//! recorded as a [`TargetFailure`] and the run moves on.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::core::config::{OrgSpec, RepoSpec, SyncSpec, Visibility};
use crate::core::env::EnvLookup;
use crate::core::plan::{self, Desired, ReconciliationPlan, RunPlan, TargetFailure};
use crate::core::remote::{Remote, RemotePublicKey};
use crate::core::scan::{self, UsedSecrets};
use crate::core::target::SyncTarget;
use crate::core::types::{RepositoryIds, SecretName};
use crate::core::validation;
use crate::error::Result;

/// Builds a [`RunPlan`] against a remote.
pub struct Planner<'a, R: Remote + ?Sized, E: EnvLookup + ?Sized> {
    remote: &'a R,
    env: &'a E,
}

impl<'a, R: Remote + ?Sized, E: EnvLookup + ?Sized> Planner<'a, R, E> {
    /// # Arguments
    ///
    /// * `remote` - Where inventories, keys and workflows are read from
    /// * `env` - Lookup for `fromEnv` values
    pub fn new(remote: &'a R, env: &'a E) -> Self {
        Self { remote, env }
    }

    /// Plan every target in `spec`.
    ///
    /// Repository workflows are indexed first, since organization plans are
    /// checked against the references of every repository in the run.
    /// Organizations are then planned in declaration order, followed by each
    /// repository with its environments.
    pub fn plan(&self, spec: &SyncSpec) -> RunPlan {
        let mut run = RunPlan::default();

        let indexes: Vec<Result<UsedSecrets>> =
            spec.repos.iter().map(|repo| self.workflow_index(repo)).collect();

        let mut shared = UsedSecrets::default();
        let mut unindexed = Vec::new();
        for (repo, index) in spec.repos.iter().zip(&indexes) {
            let qualifier = format!("{}/{}", repo.owner, repo.name);
            match index {
                Ok(used) => shared.merge_qualified(&qualifier, used),
                Err(_) => unindexed.push(qualifier),
            }
        }

        for org in &spec.orgs {
            let target = org.target();
            match self.plan_organization(org, &shared) {
                Ok(mut plan) => {
                    // Deletes cannot be cleared by the gate without every index.
                    if !unindexed.is_empty() {
                        plan.withhold_deletes(&unindexed);
                    }
                    run.organizations.push(plan);
                }
                Err(error) => fail(&mut run, target, error),
            }
        }

        for (repo, index) in spec.repos.iter().zip(indexes) {
            let target = repo.target();
            match index.and_then(|used| self.plan_repository(repo, used, &mut run)) {
                Ok(plan) => run.repositories.push(plan),
                Err(error) => {
                    if !repo.environments.is_empty() {
                        warn!(
                            target = %target,
                            environments = repo.environments.len(),
                            "skipping environments of failed repository"
                        );
                    }
                    fail(&mut run, target, error);
                }
            }
        }

        info!(
            plans = run.plans().len(),
            failures = run.failures.len(),
            "run planned"
        );
        run
    }

    fn workflow_index(&self, repo: &RepoSpec) -> Result<UsedSecrets> {
        let files = self.remote.workflow_files(&repo.owner, &repo.name)?;
        let used = scan::scan_references(&files);
        debug!(
            owner = %repo.owner,
            repo = %repo.name,
            files = files.len(),
            referenced = used.len(),
            "indexed workflows"
        );
        Ok(used)
    }

    fn observe(&self, target: &SyncTarget) -> Result<(BTreeSet<SecretName>, RemotePublicKey)> {
        let observed: BTreeSet<SecretName> = self
            .remote
            .secret_names(target)?
            .iter()
            .map(|name| validation::normalize_name(name))
            .collect();
        let key = self.remote.public_key(target)?;
        debug!(target = %target, observed = observed.len(), key_id = %key.key_id, "observed");
        Ok((observed, key))
    }

    fn plan_organization(&self, org: &OrgSpec, used: &UsedSecrets) -> Result<ReconciliationPlan> {
        let target = org.target();
        let (observed, key) = self.observe(&target)?;

        // Fetched once per organization, and only when some secret needs it.
        let needs_ids = org
            .secrets
            .values()
            .any(|s| s.visibility == Visibility::Selected);
        let repository_ids = if needs_ids {
            self.remote.repository_ids(&org.name)?
        } else {
            RepositoryIds::new()
        };

        plan::assemble(
            target,
            Desired::Organization {
                secrets: &org.secrets,
                repository_ids: &repository_ids,
            },
            &observed,
            &key,
            used.clone(),
            org.delete_unspecified,
            self.env,
        )
    }

    fn plan_repository(
        &self,
        repo: &RepoSpec,
        used: UsedSecrets,
        run: &mut RunPlan,
    ) -> Result<ReconciliationPlan> {
        let target = repo.target();
        let (observed, key) = self.observe(&target)?;

        let mut environments = BTreeMap::new();
        for (name, env_spec) in &repo.environments {
            let env_target = SyncTarget::environment(&repo.owner, &repo.name, name);
            let planned = self.observe(&env_target).and_then(|(observed, key)| {
                plan::assemble(
                    env_target.clone(),
                    Desired::Secrets(&env_spec.secrets),
                    &observed,
                    &key,
                    used.clone(),
                    env_spec.delete_unspecified,
                    self.env,
                )
            });
            match planned {
                Ok(plan) => {
                    environments.insert(name.clone(), plan);
                }
                Err(error) => fail(run, env_target, error),
            }
        }

        let mut plan = plan::assemble(
            target,
            Desired::Secrets(&repo.secrets),
            &observed,
            &key,
            used,
            repo.delete_unspecified,
            self.env,
        )?;
        plan.environments = environments;
        Ok(plan)
    }
}

fn fail(run: &mut RunPlan, target: SyncTarget, error: crate::error::Error) {
    warn!(target = %target, error = %error, "target failed");
    run.failures.push(TargetFailure { target, error });
}
