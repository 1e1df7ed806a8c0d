//! Constants used throughout autoevs.
//!
//! Centralizes magic strings and configuration values.

/// Prefix tag marking an encrypted configuration value.
///
/// Matched case-sensitively against the start of the string.
pub const ENVELOPE_PREFIX: &str = "ENCRYPTED:";

/// Envelope payload format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Minimum accepted seed length in bytes.
pub const MIN_SEED_LEN: usize = 16;

/// Length of freshly generated seeds in bytes.
pub const SEED_LEN: usize = 32;

/// Environment used when none is given on the command line, in settings, or via `AUTOEVS_ENV`.
pub const DEFAULT_ENVIRONMENT: &str = "prod";

/// Directory holding `<env>/<component>.yaml` files, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Seed directory relative to HOME (~/.autoevs/seeds).
pub const SEED_DIR: &str = ".autoevs/seeds";

/// Seed file extension.
pub const SEED_EXTENSION: &str = "seed";

/// Tool settings file name.
pub const SETTINGS_FILE: &str = "autoevs.toml";

/// Legacy single-environment seed variable.
pub const SEED_ENV_VAR: &str = "AUTOEVS_CRYPTO_SEED";

/// Environment selection variable.
pub const ENV_VAR: &str = "AUTOEVS_ENV";

/// Config directory override variable.
pub const CONFIG_DIR_VAR: &str = "AUTOEVS_CONFIG_DIR";

/// Seed directory override variable.
pub const SEED_DIR_VAR: &str = "AUTOEVS_SEED_DIR";

/// Settings file path override variable.
pub const SETTINGS_VAR: &str = "AUTOEVS_SETTINGS";

/// Reserved top-level keys of a component document.
pub const COMMON_KEY: &str = "common";
pub const INSTANCES_KEY: &str = "instances";
pub const DEFAULT_INSTANCE_KEY: &str = "default_instance";

/// Instance name reported when a component has no `instances` block.
pub const COMMON_INSTANCE: &str = "common";

/// Placeholder printed instead of secret values.
pub const MASK: &str = "********";
