//! Test support utilities for autoevs integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working directory (holding `config/`) and home
/// directory (holding `~/.autoevs/seeds`). Child processes use
/// `.current_dir()` so tests can run in parallel.
pub struct Test {
    /// Working directory of the command under test
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// Create a test environment with a seed generated for `environment`.
    pub fn with_seed(environment: &str) -> Self {
        let t = Self::new();
        let output = t.seed_generate(environment);
        assert!(
            output.status.success(),
            "Failed to generate seed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Write `<dir>/config/<env>/<component>.yaml`.
    pub fn write_config(&self, environment: &str, component: &str, contents: &str) -> PathBuf {
        let dir = self.dir.path().join("config").join(environment);
        std::fs::create_dir_all(&dir).expect("failed to create config dir");
        let path = dir.join(format!("{}.yaml", component));
        std::fs::write(&path, contents).expect("failed to write config");
        path
    }

    /// Read a component file back.
    pub fn read_config(&self, environment: &str, component: &str) -> String {
        let path = self
            .dir
            .path()
            .join("config")
            .join(environment)
            .join(format!("{}.yaml", component));
        std::fs::read_to_string(path).expect("failed to read config")
    }

    /// Path of the seed file for `environment` under the temp home.
    pub fn seed_path(&self, environment: &str) -> PathBuf {
        self.home
            .path()
            .join(".autoevs")
            .join("seeds")
            .join(format!("{}.seed", environment))
    }
}
