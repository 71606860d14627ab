//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a secretsync command running in the project directory.
    ///
    /// Token and API URL variables from the outer environment are removed
    /// so no test can reach the real API by accident.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("secretsync").expect("failed to find secretsync binary");
        cmd.env_remove("GITHUB_API_TOKEN");
        cmd.env_remove("GITHUB_API_URL");
        cmd.env_remove("SECRETSYNC_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `secretsync validate`.
    pub fn validate(&self) -> Output {
        self.cmd()
            .arg("validate")
            .output()
            .expect("failed to run secretsync validate")
    }

    /// Shortcut for `secretsync sync` against `api_url` with a token.
    pub fn sync(&self, api_url: &str, extra: &[&str]) -> Output {
        self.cmd()
            .arg("sync")
            .args(["--api-url", api_url, "--token", "test-token"])
            .args(extra)
            .output()
            .expect("failed to run secretsync sync")
    }
}
