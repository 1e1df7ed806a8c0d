//! Encrypt commands.
//!
//! `encrypt` rewrites configuration files in place; `encrypt-value`
//! encrypts one value for pasting into a file by hand.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use dialoguer::{Password, Select};
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::settings::Settings;
use crate::core::tool::{Action, Decision, EncryptionTool};
use crate::error::{Error, Result, ToolError};

/// Run options for `encrypt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub dry_run: bool,
    pub interactive: bool,
}

/// Encrypt sensitive values in `paths` (default: the environment's config directory).
pub fn files(settings: &Settings, paths: Vec<PathBuf>, fields: &[String], options: Options) -> Result<()> {
    let Options { dry_run, interactive } = options;
    let environment = settings.environment.as_str();
    let paths = if paths.is_empty() {
        vec![settings.environment_dir(environment)]
    } else {
        paths
    };
    info!(environment, files = paths.len(), dry_run, interactive, "encrypting config files");

    let fields = (!fields.is_empty()).then_some(fields);
    let tool = EncryptionTool::from_settings(settings, environment, fields)?;
    let results = if interactive {
        tool.encrypt_paths_with(&paths, dry_run, &mut ask)?
    } else {
        tool.encrypt_paths(&paths, dry_run)?
    };

    let total = results.len();
    let mut failed = 0;
    let mut fields_changed = 0;
    let mut cancelled = None;

    for (path, result) in results {
        match result {
            Ok(report) => {
                if report.changes.is_empty() {
                    output::dimmed(&format!("{}: no sensitive fields", path.display()));
                    continue;
                }
                output::header(&output::path(path.display()));
                for change in &report.changes {
                    output::list_item(&format!("{}  {}", output::key(&change.path), change.action));
                }
                if let Some(backup) = &report.backup {
                    output::kv("backup", output::path(backup.display()));
                }
                fields_changed += report.count(Action::Encrypted) + report.count(Action::WouldEncrypt);
            }
            Err(Error::Tool(ToolError::Cancelled(_))) => {
                output::warn(&format!("{}: cancelled, file left unchanged", path.display()));
                cancelled = Some(path);
            }
            Err(e) => {
                failed += 1;
                output::error(&format!("{}: {}", path.display(), e));
            }
        }
    }

    if let Some(path) = cancelled {
        return Err(ToolError::Cancelled(path).into());
    }

    let files = if total == 1 { "file" } else { "files" };
    if dry_run {
        output::success(&format!(
            "dry run: {} field(s) would be encrypted in {} {}",
            fields_changed, total, files
        ));
    } else {
        output::success(&format!(
            "{} field(s) encrypted in {} {}",
            fields_changed, total, files
        ));
    }

    if failed > 0 {
        return Err(ToolError::Failed { failed, total }.into());
    }
    Ok(())
}

/// Ask whether to encrypt one field.
///
/// Uses a selection menu on a terminal; otherwise reads one `y`/`n`/`q`
/// line from stdin. End of input quits.
fn ask(path: &str, len: usize) -> Result<Decision> {
    let masked = "*".repeat(len.min(8));

    if io::stdin().is_terminal() {
        let choice = Select::new()
            .with_prompt(format!("Encrypt {} ({})?", path, masked))
            .items(&["yes", "no, keep plaintext", "quit without writing"])
            .default(0)
            .interact()?;
        return Ok(match choice {
            0 => Decision::Encrypt,
            1 => Decision::Skip,
            _ => Decision::Quit,
        });
    }

    eprint!("encrypt {} ({})? [y/n/q] ", path, masked);
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        eprintln!();
        return Ok(Decision::Quit);
    }
    Ok(parse_answer(&line))
}

/// Map a typed answer to a decision. Anything but yes or quit keeps the plaintext.
fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Encrypt,
        "q" | "quit" => Decision::Quit,
        _ => Decision::Skip,
    }
}

/// Encrypt one value from a hidden prompt, or from stdin when piped.
pub fn value(settings: &Settings) -> Result<()> {
    let environment = settings.environment.as_str();
    let tool = EncryptionTool::from_settings(settings, environment, None)?;

    let plaintext = if io::stdin().is_terminal() {
        Zeroizing::new(
            Password::new()
                .with_prompt(format!("Value to encrypt for '{}'", environment))
                .interact()?,
        )
    } else {
        let mut input = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut input)?;
        let trimmed = input.trim_end_matches(['\n', '\r']).to_string();
        Zeroizing::new(trimmed)
    };

    if plaintext.is_empty() {
        output::warn("empty value, nothing to encrypt");
        return Ok(());
    }

    let envelope = tool.encrypt_value(&plaintext)?;
    println!("{}", envelope);
    Ok(())
}
