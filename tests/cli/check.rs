//! Tests for the check command.

use crate::support::*;

#[test]
fn test_check_resolves_everything() {
    let t = Test::with_seed("prod");
    t.write_config("prod", "hive", HIVE_YAML);
    t.write_config("prod", "hdfs", HDFS_FLAT_YAML);
    assert_success(&t.encrypt("prod", &[]));

    let output = t.check("prod");
    assert_success(&output);
    assert_stdout_contains(&output, "hive/primary");
    assert_stdout_contains(&output, "hive/backup");
    assert_stdout_contains(&output, "hdfs/common");
    assert_stdout_contains(&output, "3 configuration(s) resolved");
}

#[test]
fn test_check_reports_failures() {
    let t = Test::new();
    t.write_config("prod", "ambari", AMBARI_PLAIN_YAML);
    t.write_config("prod", "hive", "common:\n  password: ENCRYPTED:AAAA\n");

    let output = t.check("prod");
    assert_failure(&output);
    assert_stdout_contains(&output, "ambari/common");
    assert_stderr_contains(&output, "hive/default");
    assert_stderr_contains(&output, "1 of 2 configurations failed to resolve");
}

#[test]
fn test_check_empty_environment() {
    let t = Test::new();

    let output = t.check("staging");
    assert_success(&output);
    assert_stderr_contains(&output, "no component files");
}
