//! Sync command - reconcile remote secrets with the configuration.

use std::path::PathBuf;

use tracing::info;

use crate::cli::{output, report};
use crate::core::apply;
use crate::core::config::SyncSpec;
use crate::core::env::{EnvLookup, ProcessEnv};
use crate::core::planner::Planner;
use crate::core::remote::{GitHub, Remote};
use crate::error::{ConfigError, Error, Result};

/// Load the configuration and reconcile it against the live API.
pub fn execute(
    files: &[PathBuf],
    dry_run: bool,
    token: Option<String>,
    api_url: &str,
) -> Result<()> {
    info!(files = files.len(), dry_run, "running sync");

    let spec = SyncSpec::load_all(files)?;
    if spec.is_empty() {
        output::dimmed("no targets declared");
        return Ok(());
    }

    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::MissingToken)?;
    let remote = GitHub::new(api_url, token)?;

    run(&spec, &remote, &ProcessEnv, dry_run)
}

/// Plan, report, gate and (unless `dry_run`) apply.
///
/// # Errors
///
/// Returns `Error::UnsafeDeletion` if the safety gate fails, in which case
/// nothing is applied, and `Error::Incomplete` if any target, secret or
/// operation failed.
pub fn run<R, E>(spec: &SyncSpec, remote: &R, env: &E, dry_run: bool) -> Result<()>
where
    R: Remote + ?Sized,
    E: EnvLookup + ?Sized,
{
    if dry_run {
        output::warn("Dry run");
        println!();
    }

    let plan = Planner::new(remote, env).plan(spec);
    report::plan(&plan);
    plan.check_safe()?;

    let planning_failures = plan.failures.len() + plan.issue_count();

    if dry_run {
        report::dry_run();
        return finish(planning_failures);
    }

    if plan.operation_count() == 0 {
        output::dimmed("nothing to apply");
        return finish(planning_failures);
    }

    let applied = apply::apply(&plan, remote)?;
    report::apply(&applied);

    let failed = planning_failures + applied.failed().len();
    if failed == 0 {
        output::success(&format!("{} operation(s) applied", applied.succeeded().len()));
    }
    finish(failed)
}

fn finish(failed: usize) -> Result<()> {
    if failed == 0 {
        Ok(())
    } else {
        Err(Error::Incomplete { failed })
    }
}
