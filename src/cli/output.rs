//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, created secrets
//! - Blue: updated secrets
//! - Red: errors, deleted secrets
//! - Yellow: warnings, skipped secrets
//! - Magenta: missing secrets
//! - Cyan: hints
//! - Bold: target headers

use console::{style, StyledObject};

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Style `text`, or leave it plain when colors are disabled.
pub fn paint<D>(text: D, apply: impl FnOnce(StyledObject<D>) -> StyledObject<D>) -> String
where
    D: std::fmt::Display,
{
    if colors_enabled() {
        apply(style(text)).to_string()
    } else {
        text.to_string()
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ 3 operations applied`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", |s| s.green()), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ failed to read secrets.yml`
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", |s| s.red()), msg);
}

/// Print a warning message (yellow).
///
/// Example: `⚠ this is a dry run`
pub fn warn(msg: &str) {
    println!("{} {}", paint("⚠", |s| s.yellow()), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ set GITHUB_API_TOKEN`
pub fn hint(msg: &str) {
    println!("{} {}", paint("→", |s| s.cyan()), paint(msg, |s| s.cyan()));
}

/// Print a bold section header.
pub fn header(title: &str) {
    println!("{}", paint(title, |s| s.bold()));
}

/// Print a dimmed/secondary message.
///
/// Example: `nothing to do`
pub fn dimmed(msg: &str) {
    println!("{}", paint(msg, |s| s.dim()));
}
