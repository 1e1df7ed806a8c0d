//! Input validation for autoevs operations.
//!
//! Environment and component names become path segments, so they are
//! restricted to a safe character set.

use crate::error::{ConfigError, Result};

/// Validate an environment name.
///
/// # Errors
///
/// Returns `ConfigError::InvalidName` if the name is empty or contains
/// anything other than ASCII letters, digits, `-` and `_`.
pub fn validate_environment(name: &str) -> Result<()> {
    validate_name("environment", name)
}

/// Validate a component name.
///
/// # Errors
///
/// Returns `ConfigError::InvalidName` under the same rules as environments.
pub fn validate_component(name: &str) -> Result<()> {
    validate_name("component", name)
}

fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::InvalidName {
            kind,
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Return the permission bits of `path` when they grant any access to group or others.
///
/// Returns `None` when the file is owner-only or cannot be inspected.
#[cfg(unix)]
pub fn loose_permissions(path: &std::path::Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).ok()?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        Some(mode)
    } else {
        None
    }
}

#[cfg(not(unix))]
pub fn loose_permissions(_path: &std::path::Path) -> Option<u32> {
    None
}
