//! Show command.
//!
//! Prints the resolved configuration of a component. Sensitive values are
//! masked unless `--reveal` is given.

use serde_yaml::Mapping;

use crate::cli::output;
use crate::core::resolver::{ConfigResolver, DecryptMode, ResolvedConfig};
use crate::core::settings::Settings;
use crate::error::{ConfigError, Result};

/// Display options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub reveal: bool,
    pub tolerant: bool,
    pub json: bool,
}

/// Resolve and print one component instance.
pub fn execute(settings: &Settings, component: &str, instance: Option<&str>, options: Options) -> Result<()> {
    let mode = if options.tolerant {
        DecryptMode::Tolerant
    } else {
        DecryptMode::Strict
    };
    let mut resolver = ConfigResolver::from_settings(settings)?.with_mode(mode);
    let resolved = resolver.resolve(&settings.environment, component, instance)?;

    let values = if options.reveal {
        resolved.values().clone()
    } else {
        resolved.masked(resolver.detector())
    };

    if options.json {
        println!("{}", render_json(&resolved, &values)?);
    } else {
        output::dimmed(&format!(
            "# {}/{}/{} ({})",
            resolved.environment(),
            resolved.component(),
            resolved.instance(),
            resolved.source().display()
        ));
        print!("{}", render_yaml(&resolved, &values)?);
    }

    Ok(())
}

fn render_json(resolved: &ResolvedConfig, values: &Mapping) -> Result<String> {
    let values = serde_json::to_value(values).map_err(|e| render_error(resolved, e.to_string()))?;
    let body = serde_json::json!({
        "environment": resolved.environment(),
        "component": resolved.component(),
        "instance": resolved.instance(),
        "values": values,
    });
    serde_json::to_string_pretty(&body).map_err(|e| render_error(resolved, e.to_string()))
}

fn render_yaml(resolved: &ResolvedConfig, values: &Mapping) -> Result<String> {
    serde_yaml::to_string(values).map_err(|e| render_error(resolved, e.to_string()))
}

fn render_error(resolved: &ResolvedConfig, reason: String) -> crate::error::Error {
    ConfigError::InvalidStructure {
        path: resolved.source().to_path_buf(),
        reason,
    }
    .into()
}
