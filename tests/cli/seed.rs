//! Tests for the seed commands.

use crate::support::*;

#[test]
fn test_seed_generate_writes_file() {
    let t = Test::new();

    let output = t.seed_generate("prod");
    assert_success(&output);
    assert_stdout_contains(&output, "generated seed for environment 'prod'");
    assert_stdout_contains(&output, "fingerprint");

    let contents = std::fs::read_to_string(t.seed_path("prod")).unwrap();
    assert!(contents.starts_with("# autoevs seed for environment 'prod'"));
    assert!(contents.contains("never commit"));
}

#[cfg(unix)]
#[test]
fn test_seed_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::with_seed("prod");
    let mode = std::fs::metadata(t.seed_path("prod"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_seed_generate_refuses_overwrite() {
    let t = Test::with_seed("prod");
    let before = std::fs::read_to_string(t.seed_path("prod")).unwrap();

    let output = t.seed_generate("prod");
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
    assert_stderr_contains(&output, "--force");

    let after = std::fs::read_to_string(t.seed_path("prod")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_seed_generate_force_replaces() {
    let t = Test::with_seed("prod");
    let before = std::fs::read_to_string(t.seed_path("prod")).unwrap();

    let output = t
        .cmd()
        .args(["--env", "prod", "seed", "generate", "--force"])
        .output()
        .unwrap();
    assert_success(&output);

    let after = std::fs::read_to_string(t.seed_path("prod")).unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_seeds_are_per_environment() {
    let t = Test::with_seed("prod");
    assert_success(&t.seed_generate("dev"));

    let prod = std::fs::read_to_string(t.seed_path("prod")).unwrap();
    let dev = std::fs::read_to_string(t.seed_path("dev")).unwrap();
    assert_ne!(prod.lines().last(), dev.lines().last());
}

#[test]
fn test_seed_generate_print() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["--env", "test", "seed", "generate", "--print"])
        .output()
        .unwrap();
    assert_success(&output);

    let contents = std::fs::read_to_string(t.seed_path("test")).unwrap();
    let encoded = contents.lines().last().unwrap();
    assert_stdout_contains(&output, encoded);
}

#[test]
fn test_seed_status_reports_file() {
    let t = Test::with_seed("prod");

    let output = t.seed_status("prod");
    assert_success(&output);
    assert_stdout_contains(&output, "prod.seed");
    assert_stdout_contains(&output, "32 bytes");
}

#[test]
fn test_seed_status_prefers_env_var() {
    let t = Test::with_seed("prod");

    let output = t
        .cmd()
        .env("AUTOEVS_CRYPTO_SEED_PROD", "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=")
        .args(["--env", "prod", "seed", "status"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "$AUTOEVS_CRYPTO_SEED_PROD");
}

#[test]
fn test_seed_file_wins_over_legacy_env_var() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);
    assert_success(&t.encrypt("prod", &[]));

    let output = t
        .cmd()
        .env("AUTOEVS_CRYPTO_SEED", "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=")
        .args(["--env", "prod", "seed", "status"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "prod.seed");

    let output = t
        .cmd()
        .env("AUTOEVS_CRYPTO_SEED", "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=")
        .args(["--env", "prod", "show", "hive", "--reveal"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "common-pass");
}

#[test]
fn test_seed_status_missing() {
    let t = Test::new();

    let output = t.seed_status("prod");
    assert_failure(&output);
    assert_stderr_contains(&output, "no seed found for environment 'prod'");
    assert_stderr_contains(&output, "autoevs seed generate");
}
