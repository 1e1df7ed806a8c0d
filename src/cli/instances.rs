//! Instances command.

use crate::cli::output;
use crate::core::resolver::ConfigResolver;
use crate::core::settings::Settings;
use crate::error::Result;

/// List the instances of a component, marking the one used by default.
pub fn execute(settings: &Settings, component: &str) -> Result<()> {
    let resolver = ConfigResolver::from_settings(settings)?;
    let document = resolver.load_document(&settings.environment, component)?;
    let names = document.instance_names();

    output::section(&format!("{} ({})", component, settings.environment));
    if names.is_empty() {
        output::dimmed("no instances, common block only");
        return Ok(());
    }

    let default = document.select_instance(component, None).ok();
    for name in names {
        if default.as_deref() == Some(name) {
            output::list_item(&format!("{} (default)", output::key(name)));
        } else {
            output::list_item(name);
        }
    }
    Ok(())
}
