//! Validate command implementation

use crate::cli::utils;
use crate::generator::Generator;
use anyhow::Result;
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("validate")
        .about("Validate configuration file and its plugin sets")
        .arg(utils::config_arg())
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Validating configuration file");

    let config = utils::load_config(matches)?;
    let generator = Generator::new(&config)?;

    println!("Configuration file is valid!");
    println!("OpenAPI definitions: {}", config.spec.openapi.len());
    for definition in &config.spec.openapi {
        let source = definition
            .path
            .as_deref()
            .or(definition.package.as_deref())
            .unwrap_or_default();
        println!("  - {} ({})", definition.name, source);
    }

    println!("CRDs: {}", config.spec.crd.len());
    for crd in &config.spec.crd {
        println!(
            "  - {}.{} ({})",
            crd.gvk.kind,
            crd.gvk.group,
            crd.major_versions().join(", ")
        );
    }

    for set in generator.plugin_sets() {
        println!(
            "Plugin set {}{}: {} plugins",
            set.name,
            if set.default { " (default)" } else { "" },
            set.plugins.len()
        );
    }

    Ok(())
}
