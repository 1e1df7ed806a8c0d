//! Command-line interface.

pub mod check;
pub mod completions;
pub mod encrypt;
pub mod instances;
pub mod output;
pub mod seed;
pub mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::settings::Settings;
use crate::error::Result;

/// autoevs - per-environment configuration with encrypted credentials.
#[derive(Parser)]
#[command(
    name = "autoevs",
    about = "Per-environment configuration with encrypted credentials",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Environment to operate on (default: settings file, then "prod")
    #[arg(short, long, global = true, env = "AUTOEVS_ENV")]
    pub env: Option<String>,

    /// Settings file (default: ./autoevs.toml)
    #[arg(long, global = true, env = "AUTOEVS_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Manage the environment's seed
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },

    /// Encrypt sensitive values in configuration files in place
    Encrypt {
        /// Files or directories (default: <config_dir>/<env>)
        paths: Vec<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Ask before encrypting each field (y/n/q when stdin is piped)
        #[arg(short, long, conflicts_with = "dry_run")]
        interactive: bool,
        /// Encrypt exactly these key names instead of detecting them
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Encrypt a single value read from a prompt or stdin
    EncryptValue,

    /// Show the resolved configuration of a component
    Show {
        /// Component name (e.g. hive)
        component: String,
        /// Instance name (default: the component's default instance)
        instance: Option<String>,
        /// Print secrets in clear text
        #[arg(long)]
        reveal: bool,
        /// Keep undecryptable values instead of failing
        #[arg(long)]
        tolerant: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the instances of a component
    Instances {
        /// Component name
        component: String,
    },

    /// Resolve every component of the environment
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Seed subcommands.
#[derive(Subcommand)]
pub enum SeedAction {
    /// Generate a new seed file for the environment
    Generate {
        /// Overwrite an existing seed file
        #[arg(short, long)]
        force: bool,
        /// Also print the encoded seed to stdout
        #[arg(long)]
        print: bool,
    },

    /// Show where the environment's seed is loaded from
    Status,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let Cli {
        command,
        env,
        settings,
        ..
    } = cli;

    if let Completions { shell } = &command {
        return completions::execute(shell.clone());
    }

    let settings = Settings::load(settings.as_deref())?.with_environment(env)?;

    match command {
        Seed { action } => match action {
            SeedAction::Generate { force, print } => seed::generate(&settings, force, print),
            SeedAction::Status => seed::status(&settings),
        },
        Encrypt {
            paths,
            dry_run,
            interactive,
            fields,
        } => encrypt::files(
            &settings,
            paths,
            &fields,
            encrypt::Options {
                dry_run,
                interactive,
            },
        ),
        EncryptValue => encrypt::value(&settings),
        Show {
            component,
            instance,
            reveal,
            tolerant,
            json,
        } => show::execute(
            &settings,
            &component,
            instance.as_deref(),
            show::Options {
                reveal,
                tolerant,
                json,
            },
        ),
        Instances { component } => instances::execute(&settings, &component),
        Check => check::execute(&settings),
        Completions { .. } => Ok(()),
    }
}
