//! Tests for the show and instances commands.

use crate::support::*;

#[test]
fn test_show_masks_secrets() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);
    assert_success(&t.encrypt("prod", &[]));

    let output = t.show("prod", "hive", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "********");
    assert_stdout_contains(&output, "host: hive-1.example.com");
    assert_stdout_excludes(&output, "common-pass");
    assert_stdout_excludes(&output, "ENCRYPTED:");
}

#[test]
fn test_show_reveal_decrypts() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);
    assert_success(&t.encrypt("prod", &[]));

    let output = t.show("prod", "hive", &["backup", "--reveal"]);
    assert_success(&output);
    assert_stdout_contains(&output, "password: common-pass");
    assert_stdout_contains(&output, "mysql_password: metastore-pass");
    assert_stdout_contains(&output, "port: 10000");
}

#[test]
fn test_show_json() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.show("prod", "hive", &["primary", "--json", "--reveal"]);
    assert_success(&output);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["instance"], "primary");
    assert_eq!(value["values"]["port"], 10001);
    assert_eq!(value["values"]["timeout"], 30);
    assert_eq!(value["values"]["password"], "common-pass");
}

#[test]
fn test_show_no_default_instance() {
    let t = Test::new();
    t.write_config("prod", "yarn", YARN_YAML);

    let output = t.show("prod", "yarn", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "multiple instances (rm1, rm2)");
    assert_stderr_contains(&output, "default_instance");
}

#[test]
fn test_show_flat_document() {
    let t = Test::new();
    t.write_config("prod", "hdfs", HDFS_FLAT_YAML);

    let output = t.show("prod", "hdfs", &["--reveal"]);
    assert_success(&output);
    assert_stdout_contains(&output, "namenode: nn-1.example.com");
    assert_stdout_contains(&output, "secret: hdfs-secret");
}

#[test]
fn test_show_tolerant_keeps_broken_envelope() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", "common:\n  password: ENCRYPTED:AAAA\n");

    let output = t.show("prod", "hive", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot decrypt 'password' in hive/common");

    let output = t.show("prod", "hive", &["--tolerant", "--reveal"]);
    assert_success(&output);
    assert_stdout_contains(&output, "ENCRYPTED:AAAA");
}

#[test]
fn test_show_wrong_environment_seed() {
    let t = Test::with_seed("prod");
    assert_success(&t.seed_generate("dev"));
    t.write_config("prod", "hive", HIVE_YAML);
    assert_success(&t.encrypt("prod", &[]));

    // Copy the encrypted file into dev, whose seed differs.
    let prod = t.read_config("prod", "hive");
    t.write_config("dev", "hive", &prod);

    let output = t.show("dev", "hive", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "authentication tag mismatch");
}

#[test]
fn test_instances_marks_default() {
    let t = Test::new();
    t.write_config("prod", "hive", HIVE_YAML);

    let output = t.instances("prod", "hive");
    assert_success(&output);
    assert_stdout_contains(&output, "primary (default)");
    assert_stdout_contains(&output, "backup");
}

#[test]
fn test_instances_common_only() {
    let t = Test::new();
    t.write_config("prod", "hdfs", HDFS_FLAT_YAML);

    let output = t.instances("prod", "hdfs");
    assert_success(&output);
    assert_stdout_contains(&output, "common block only");
}
