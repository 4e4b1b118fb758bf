//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("openapi2crd")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Compile OpenAPI resource descriptions into Kubernetes CustomResourceDefinitions")
            .subcommand(commands::generate::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::plugins::command())
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("generate", sub_matches)) => commands::generate::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("plugins", sub_matches)) => commands::plugins::run(sub_matches).await,
            _ => {
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::{Context, Result};
    use std::path::PathBuf;

    /// The `--config` argument shared by every command
    pub fn config_arg() -> clap::Arg {
        clap::Arg::new("config")
            .short('c')
            .long("config")
            .help("Configuration file path")
            .value_name("FILE")
            .required(true)
    }

    /// Load and validate the configuration named by `--config`
    pub fn load_config(matches: &clap::ArgMatches) -> Result<crate::Config> {
        let config_path = matches
            .get_one::<String>("config")
            .map(PathBuf::from)
            .context("--config is required")?;
        crate::Config::from_file(&config_path)
            .with_context(|| format!("failed to load configuration {}", config_path.display()))
    }
}
