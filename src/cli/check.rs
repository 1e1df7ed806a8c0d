//! Check command.
//!
//! Resolves every instance of every component in the environment and
//! reports the ones that fail.

use tracing::debug;

use crate::cli::output;
use crate::core::resolver::ConfigResolver;
use crate::core::settings::Settings;
use crate::error::{ConfigError, Result};

/// Resolve everything under `<config_dir>/<env>`.
pub fn execute(settings: &Settings) -> Result<()> {
    let environment = settings.environment.as_str();
    let mut resolver = ConfigResolver::from_settings(settings)?;
    let components = resolver.components(environment)?;

    output::section(&format!("Check: {}", environment));
    if components.is_empty() {
        output::warn(&format!(
            "no component files under {}",
            settings.environment_dir(environment).display()
        ));
        return Ok(());
    }

    let mut total = 0;
    let mut failed = 0;
    for component in &components {
        let instances = match resolver.instances(environment, component) {
            Ok(names) if names.is_empty() => vec![None],
            Ok(names) => names.into_iter().map(Some).collect(),
            Err(e) => {
                total += 1;
                failed += 1;
                output::error(&format!("{}: {}", component, e));
                continue;
            }
        };

        for instance in instances {
            total += 1;
            match resolver.resolve(environment, component, instance.as_deref()) {
                Ok(resolved) => {
                    debug!(component = %component, instance = resolved.instance(), "resolved");
                    output::success(&format!(
                        "{}/{} ({} keys)",
                        component,
                        resolved.instance(),
                        resolved.values().len()
                    ));
                }
                Err(e) => {
                    failed += 1;
                    output::error(&format!(
                        "{}/{}: {}",
                        component,
                        instance.as_deref().unwrap_or("default"),
                        e
                    ));
                }
            }
        }
    }

    if failed > 0 {
        return Err(ConfigError::Unresolved { failed, total }.into());
    }
    output::success(&format!("{} configuration(s) resolved", total));
    Ok(())
}
