//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_no_command_shows_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("autoevs") || out.contains("Usage"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "autoevs");
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("_autoevs") || out.contains("complete"));
}

#[test]
fn test_completions_ignore_broken_settings() {
    let t = Test::new();
    std::fs::write(t.dir.path().join("autoevs.toml"), "not toml [").unwrap();

    let output = t.cmd().args(["completions", "zsh"]).output().unwrap();
    assert_success(&output);
}

#[test]
fn test_missing_component() {
    let t = Test::new();

    let output = t.show("prod", "hive", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no configuration for component 'hive'");
    assert_stderr_contains(&output, "config_dir");
}

#[test]
fn test_invalid_environment_name() {
    let t = Test::new();

    let output = t.show("../etc", "hive", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid environment name");
}

#[test]
fn test_env_var_selects_environment() {
    let t = Test::new();
    t.write_config("dev", "hdfs", HDFS_FLAT_YAML);

    let output = t
        .cmd()
        .env("AUTOEVS_ENV", "dev")
        .args(["show", "hdfs"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "dev/hdfs/common");
}

#[test]
fn test_settings_file_config_dir() {
    let t = Test::new();
    let conf = t.dir.path().join("elsewhere").join("prod");
    std::fs::create_dir_all(&conf).unwrap();
    std::fs::write(conf.join("hdfs.yaml"), HDFS_FLAT_YAML).unwrap();
    std::fs::write(
        t.dir.path().join("autoevs.toml"),
        "[autoevs]\nconfig_dir = \"elsewhere\"\n",
    )
    .unwrap();

    let output = t.cmd().args(["show", "hdfs"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "prod/hdfs/common");
}

#[test]
fn test_invalid_settings_file() {
    let t = Test::new();
    std::fs::write(t.dir.path().join("autoevs.toml"), "[autoevs]\nbogus = 1\n").unwrap();

    let output = t.cmd().args(["show", "hdfs"]).output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid settings file");
}

#[test]
fn test_malformed_yaml() {
    let t = Test::new();
    t.write_config("prod", "hive", "common: [unclosed\n");

    let output = t.show("prod", "hive", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse");
}
