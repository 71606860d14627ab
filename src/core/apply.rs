//! Applying a run plan.
//!
//! Nothing is sent unless the whole run passes [`RunPlan::check_safe`].
//! Organization plans go first, then each repository followed by its
//! environments. Within a plan every put is issued before any delete.
//! Failures are recorded per operation and the remaining operations are
//! still attempted.

use tracing::{debug, info, warn};

use crate::core::diff::Change;
use crate::core::plan::{ReconciliationPlan, RunPlan, SecretOperation};
use crate::core::remote::{PutSecret, Remote};
use crate::core::target::SyncTarget;
use crate::core::types::SecretName;
use crate::error::{Error, Result};

/// Result of one attempted operation.
#[derive(Debug)]
pub struct OperationOutcome {
    pub target: SyncTarget,
    pub secret: SecretName,
    pub change: Change,
    /// `None` on success.
    pub error: Option<Error>,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of an apply, in the order operations were issued.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<OperationOutcome>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> Vec<&OperationOutcome> {
        self.outcomes.iter().filter(|o| o.is_success()).collect()
    }

    pub fn failed(&self) -> Vec<&OperationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    /// Whether every operation succeeded.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(OperationOutcome::is_success)
    }
}

/// Apply every plan of `run` through `remote`.
///
/// # Errors
///
/// Returns `Error::UnsafeDeletion` before issuing anything if any plan
/// deletes a secret that workflows reference. Individual operation failures
/// are reported in the [`ApplyReport`], not as an error.
pub fn apply<R: Remote + ?Sized>(run: &RunPlan, remote: &R) -> Result<ApplyReport> {
    run.check_safe()?;

    let mut report = ApplyReport::default();
    for plan in run.plans() {
        apply_plan(plan, remote, &mut report);
    }

    info!(
        succeeded = report.succeeded().len(),
        failed = report.failed().len(),
        "apply finished"
    );
    Ok(report)
}

fn apply_plan<R: Remote + ?Sized>(plan: &ReconciliationPlan, remote: &R, report: &mut ApplyReport) {
    let (puts, deletes): (Vec<_>, Vec<_>) = plan
        .operations
        .iter()
        .partition(|op| !op.change().is_delete());

    for op in puts.into_iter().chain(deletes) {
        let result = match op {
            SecretOperation::Create(sealed) | SecretOperation::Update(sealed) => remote.put_secret(
                &plan.target,
                PutSecret {
                    name: &sealed.name,
                    key_id: &plan.key_id,
                    encrypted_value: &sealed.value,
                    scope: sealed.scope.as_ref(),
                },
            ),
            SecretOperation::Delete(name) => remote.delete_secret(&plan.target, name),
        };

        match &result {
            Ok(()) => debug!(
                target = %plan.target,
                secret = op.name(),
                change = %op.change(),
                "applied"
            ),
            Err(error) => warn!(
                target = %plan.target,
                secret = op.name(),
                change = %op.change(),
                error = %error,
                "operation failed"
            ),
        }

        report.outcomes.push(OperationOutcome {
            target: plan.target.clone(),
            secret: op.name().to_string(),
            change: op.change(),
            error: result.err(),
        });
    }
}
