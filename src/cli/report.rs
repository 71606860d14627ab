//! Plan and apply rendering.

use std::fmt::Display;

use crate::cli::output::{self, paint};
use crate::core::apply::ApplyReport;
use crate::core::diff::Change;
use crate::core::plan::{ReconciliationPlan, RunPlan, SecretOperation};

const INDENT: &str = "    ";

fn line(out: &mut String, indent: &str, text: impl Display) {
    out.push_str(indent);
    out.push_str(&text.to_string());
    out.push('\n');
}

/// Render every plan of a run, organizations first.
pub fn render_plan(run: &RunPlan) -> String {
    let mut out = String::new();

    for plan in run.organizations.iter().chain(&run.repositories) {
        render_target(&mut out, run, plan, "");
    }

    for failure in &run.failures {
        let text = format!(
            "{} {}: {}",
            paint("✗", |s| s.red()),
            paint(&failure.target, |s| s.bold()),
            failure.error
        );
        line(&mut out, "", text);
    }

    out
}

fn render_target(out: &mut String, run: &RunPlan, plan: &ReconciliationPlan, indent: &str) {
    line(out, indent, paint(&plan.target, |s| s.bold()));
    let inner = format!("{}{}", indent, INDENT);

    if plan.operations.is_empty() && plan.issues.is_empty() {
        line(out, &inner, paint("no changes", |s| s.dim()));
    }

    for op in &plan.operations {
        let text = match op.change() {
            Change::Create => paint(format!("created  {}", op.name()), |s| s.green()),
            Change::Update => paint(format!("updated  {}", op.name()), |s| s.blue()),
            Change::Delete => deleted(plan, op),
        };
        line(out, &inner, text);
    }

    for issue in &plan.issues {
        let text = format!("skipped  {}: {}", issue.secret, issue.error);
        line(out, &inner, paint(text, |s| s.yellow()));
    }

    if !plan.target.is_organization() && indent.is_empty() {
        for name in run.missing_secrets(plan) {
            line(out, &inner, paint(format!("missing  {}", name), |s| s.magenta()));
        }
    }

    for env in plan.environments.values() {
        render_target(out, run, env, &inner);
    }

    if indent.is_empty() {
        out.push('\n');
    }
}

fn deleted(plan: &ReconciliationPlan, op: &SecretOperation) -> String {
    let mut text = paint(format!("deleted  {}", op.name()), |s| s.red());
    if let Some(files) = plan.used.files(op.name()) {
        let files: Vec<String> = files.iter().map(|f| format!("'{}'", f)).collect();
        let note = format!("(used in {})", files.join(", "));
        text.push(' ');
        text.push_str(&paint(note, |s| s.red().bold().reverse()));
    }
    text
}

/// Print the plan of a run.
pub fn plan(run: &RunPlan) {
    print!("{}", render_plan(run));
}

/// Print the dry-run notice.
pub fn dry_run() {
    output::warn("Not applying anything, since this is a dry run.");
}

/// Render the outcome of an apply.
pub fn render_apply(report: &ApplyReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let verb = match outcome.change {
            Change::Create => "created",
            Change::Update => "updated",
            Change::Delete => "deleted",
        };
        let text = match &outcome.error {
            None => format!(
                "{} {} {} {}",
                paint("✓", |s| s.green()),
                outcome.target,
                verb,
                outcome.secret
            ),
            Some(error) => format!(
                "{} {} {} {}: {}",
                paint("✗", |s| s.red()),
                outcome.target,
                verb,
                outcome.secret,
                error
            ),
        };
        line(&mut out, "", text);
    }
    out
}

/// Print the outcome of an apply.
pub fn apply(report: &ApplyReport) {
    print!("{}", render_apply(report));
}
