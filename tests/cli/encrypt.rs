//! Tests for the encrypt and encrypt-value commands.

use crate::support::*;

#[test]
fn test_encrypt_environment_directory() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);
    t.write_config("prod", "ambari", AMBARI_PLAIN_YAML);

    let output = t.encrypt("prod", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "common.password");
    assert_stdout_contains(&output, "instances.backup.metastore.mysql_password");

    let hive = t.read_config("prod", "hive");
    assert_sealed(&hive, "password");
    assert_sealed(&hive, "mysql_password");
    assert!(hive.starts_with("# Hive collector configuration\n"));
    assert!(hive.contains("# shared service account"));
    assert!(hive.contains("  password_policy: strict\n"));

    assert_eq!(t.read_config("prod", "ambari"), AMBARI_PLAIN_YAML);
}

#[test]
fn test_encrypt_keeps_quotes() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    assert_success(&t.encrypt("prod", &[]));
    let hive = t.read_config("prod", "hive");
    assert!(hive.contains("mysql_password: \"ENCRYPTED:"));
}

#[test]
fn test_encrypt_is_idempotent() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    assert_success(&t.encrypt("prod", &[]));
    let first = t.read_config("prod", "hive");

    let output = t.encrypt("prod", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "already encrypted");
    assert_eq!(t.read_config("prod", "hive"), first);
}

#[test]
fn test_encrypt_dry_run() {
    let t = Test::with_seed("prod");
    let path = t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt("prod", &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "would encrypt");
    assert_eq!(t.read_config("prod", "hive"), HIVE_YAML);

    let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1, "dry run must not write backups");
}

#[test]
fn test_encrypt_writes_backup() {
    let t = Test::with_seed("prod");
    let path = t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt("prod", &[path.to_str().unwrap()]);
    assert_success(&output);

    let backups: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("hive.yaml.") && n.ends_with(".bak"))
        .collect();
    assert_eq!(backups.len(), 1);

    let backup = path.parent().unwrap().join(&backups[0]);
    assert_eq!(std::fs::read_to_string(backup).unwrap(), HIVE_YAML);
}

#[test]
fn test_encrypt_explicit_fields() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hdfs", "common:\n  password: p\n  jdbc_url: jdbc:mysql://u:pw@db/hive\n");

    let output = t.encrypt("prod", &["--fields", "jdbc_url"]);
    assert_success(&output);

    let hdfs = t.read_config("prod", "hdfs");
    assert_sealed(&hdfs, "jdbc_url");
    assert!(hdfs.contains("  password: p\n"));
}

#[test]
fn test_encrypt_without_seed_fails() {
    let t = Test::new();
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt("prod", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no seed found");
    assert_eq!(t.read_config("prod", "hive"), HIVE_YAML);
}

#[test]
fn test_encrypt_block_scalar_fails_file() {
    let t = Test::with_seed("prod");
    let text = "common:\n  secret: |\n    multi\n    line\n";
    t.write_config("prod", "hive", text);
    t.write_config("prod", "yarn", YARN_YAML);

    let output = t.encrypt("prod", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "common.secret");
    assert_stderr_contains(&output, "1 of 2 files failed");

    assert_eq!(t.read_config("prod", "hive"), text);
    assert_sealed(&t.read_config("prod", "yarn"), "api_token");
}

#[test]
fn test_encrypt_missing_path() {
    let t = Test::with_seed("prod");

    let output = t.encrypt("prod", &["nope.yaml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
}

#[test]
fn test_encrypt_value_from_stdin() {
    let t = Test::with_seed("prod");

    let output = t.encrypt_value("prod", "hunter2\n");
    assert_success(&output);
    let envelope = stdout(&output).trim().to_string();
    assert!(envelope.starts_with("ENCRYPTED:"));

    t.write_config("prod", "hive", &format!("common:\n  password: {}\n", envelope));
    let output = t.show("prod", "hive", &["--reveal"]);
    assert_success(&output);
    assert_stdout_contains(&output, "password: hunter2");
}

#[test]
fn test_encrypt_interactive_skip_and_encrypt() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt_interactive("prod", "n\ny\n");
    assert_success(&output);
    assert_stderr_contains(&output, "encrypt common.password (********)? [y/n/q]");
    assert_stdout_contains(&output, "skipped");
    assert_stdout_contains(&output, "1 field(s) encrypted");

    let hive = t.read_config("prod", "hive");
    assert!(hive.contains("  password: common-pass   # shared service account\n"));
    assert_sealed(&hive, "mysql_password");
}

#[test]
fn test_encrypt_interactive_quit_leaves_file() {
    let t = Test::with_seed("prod");
    let path = t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt_interactive("prod", "y\nq\n");
    assert_failure(&output);
    assert_stderr_contains(&output, "cancelled");
    assert_eq!(t.read_config("prod", "hive"), HIVE_YAML);

    let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1, "no backup or temp file may be left behind");
}

#[test]
fn test_encrypt_interactive_end_of_input_quits() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt_interactive("prod", "y\n");
    assert_failure(&output);
    assert_eq!(t.read_config("prod", "hive"), HIVE_YAML);
}

#[test]
fn test_encrypt_interactive_conflicts_with_dry_run() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.encrypt("prod", &["--interactive", "--dry-run"]);
    assert_failure(&output);
    assert_eq!(t.read_config("prod", "hive"), HIVE_YAML);
}
