//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables from the developer's shell that would leak into tests.
const SCRUBBED_VARS: &[&str] = &[
    "AUTOEVS_ENV",
    "AUTOEVS_SETTINGS",
    "AUTOEVS_CONFIG_DIR",
    "AUTOEVS_SEED_DIR",
    "AUTOEVS_LOG",
    "AUTOEVS_CRYPTO_SEED",
    "AUTOEVS_CRYPTO_SEED_PROD",
    "AUTOEVS_CRYPTO_SEED_DEV",
    "AUTOEVS_CRYPTO_SEED_TEST",
];

impl Test {
    /// Create an autoevs command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - HOME set to the temporary home directory
    /// - Current directory set to the test working directory
    /// - NO_COLOR set and AUTOEVS_* variables removed
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("autoevs").expect("failed to find autoevs binary");
        cmd.env("HOME", self.home.path());
        // Windows uses USERPROFILE instead of HOME for home directory
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("NO_COLOR", "1");
        for var in SCRUBBED_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `autoevs --env <env> seed generate`.
    pub fn seed_generate(&self, environment: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "seed", "generate"])
            .output()
            .expect("failed to run autoevs seed generate")
    }

    /// Shortcut for `autoevs --env <env> seed status`.
    pub fn seed_status(&self, environment: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "seed", "status"])
            .output()
            .expect("failed to run autoevs seed status")
    }

    /// Shortcut for `autoevs --env <env> encrypt [args]`.
    pub fn encrypt(&self, environment: &str, args: &[&str]) -> Output {
        self.cmd()
            .args(["--env", environment, "encrypt"])
            .args(args)
            .output()
            .expect("failed to run autoevs encrypt")
    }

    /// Shortcut for `autoevs --env <env> encrypt --interactive` with piped answers.
    pub fn encrypt_interactive(&self, environment: &str, answers: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "encrypt", "--interactive"])
            .write_stdin(answers.to_string())
            .output()
            .expect("failed to run autoevs encrypt --interactive")
    }

    /// Shortcut for `autoevs --env <env> show <component> [args]`.
    pub fn show(&self, environment: &str, component: &str, args: &[&str]) -> Output {
        self.cmd()
            .args(["--env", environment, "show", component])
            .args(args)
            .output()
            .expect("failed to run autoevs show")
    }

    /// Shortcut for `autoevs --env <env> instances <component>`.
    pub fn instances(&self, environment: &str, component: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "instances", component])
            .output()
            .expect("failed to run autoevs instances")
    }

    /// Shortcut for `autoevs --env <env> check`.
    pub fn check(&self, environment: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "check"])
            .output()
            .expect("failed to run autoevs check")
    }

    /// Shortcut for `autoevs --env <env> encrypt-value` with piped input.
    pub fn encrypt_value(&self, environment: &str, value: &str) -> Output {
        self.cmd()
            .args(["--env", environment, "encrypt-value"])
            .write_stdin(value.to_string())
            .output()
            .expect("failed to run autoevs encrypt-value")
    }
}
