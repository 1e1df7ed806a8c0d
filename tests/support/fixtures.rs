//! Test fixtures and constants.

/// Hive component with a common block and two instances.
pub const HIVE_YAML: &str = r#"# Hive collector configuration
default_instance: primary
common:
  port: 10000
  timeout: 30
  user: hive
  password: common-pass   # shared service account
  password_policy: strict
instances:
  primary:
    host: hive-1.example.com
    port: 10001
  backup:
    host: hive-2.example.com
    metastore:
      mysql_password: "metastore-pass"
"#;

/// YARN component with instances and no default.
pub const YARN_YAML: &str = r#"common:
  api_token: yarn-token
instances:
  rm1:
    host: rm-1
  rm2:
    host: rm-2
"#;

/// Legacy flat HDFS configuration without common/instances.
pub const HDFS_FLAT_YAML: &str = r#"namenode: nn-1.example.com
port: 8020
kerberos:
  keytab_path: /etc/security/hdfs.keytab
  secret: hdfs-secret
"#;

/// Ambari configuration with no sensitive fields.
pub const AMBARI_PLAIN_YAML: &str = r#"common:
  host: ambari.example.com
  port: 8080
  password_length: 16
"#;

/// Fixed seed for library tests, 32 bytes.
pub const TEST_SEED: [u8; 32] = [7u8; 32];
