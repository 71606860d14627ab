//! Validate command - check the configuration without touching the network.

use std::path::PathBuf;

use tracing::info;

use crate::cli::output;
use crate::core::config::{SyncSpec, Visibility};
use crate::core::env::{EnvLookup, ProcessEnv};
use crate::core::secrets;
use crate::core::target::SyncTarget;
use crate::core::types::SecretName;
use crate::error::{Error, Result};

/// A declared secret that would be skipped by a sync.
#[derive(Debug)]
pub struct Problem {
    pub target: SyncTarget,
    pub secret: SecretName,
    pub error: Error,
}

/// Check every declared secret of `spec`.
///
/// Returns the problems found plus advisory warnings.
pub fn check(spec: &SyncSpec, env: &(impl EnvLookup + ?Sized)) -> (Vec<Problem>, Vec<String>) {
    let mut problems = Vec::new();
    let mut warnings = Vec::new();

    let mut record = |target: &SyncTarget, secret: &str, result: Result<()>| {
        if let Err(error) = result {
            problems.push(Problem {
                target: target.clone(),
                secret: secret.to_string(),
                error,
            });
        }
    };

    for org in &spec.orgs {
        let target = org.target();
        for (name, secret) in &org.secrets {
            record(&target, name, secrets::check(name, &secret.value, env));
            if secret.visibility != Visibility::Selected && !secret.repositories.is_empty() {
                warnings.push(format!(
                    "{}: {} lists repositories but has {} visibility; the list is ignored",
                    target, name, secret.visibility
                ));
            }
        }
    }

    for repo in &spec.repos {
        let target = repo.target();
        for (name, value) in &repo.secrets {
            record(&target, name, secrets::check(name, value, env));
        }
        for (env_name, env_spec) in &repo.environments {
            let env_target = SyncTarget::environment(&repo.owner, &repo.name, env_name);
            for (name, value) in &env_spec.secrets {
                record(&env_target, name, secrets::check(name, value, env));
            }
        }
    }

    (problems, warnings)
}

/// Validate the configuration files.
pub fn execute(files: &[PathBuf]) -> Result<()> {
    info!(files = files.len(), "validating");

    let spec = SyncSpec::load_all(files)?;
    let (problems, warnings) = check(&spec, &ProcessEnv);

    for warning in &warnings {
        output::warn(warning);
    }
    for problem in &problems {
        output::error(&format!("{}: {}", problem.target, problem.error));
    }

    if problems.is_empty() {
        let targets = spec.targets().len();
        output::success(&format!("configuration is valid ({} target(s))", targets));
        Ok(())
    } else {
        Err(Error::Invalid {
            count: problems.len(),
        })
    }
}
