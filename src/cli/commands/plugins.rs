//! Plugins command implementation

use crate::cli::utils;
use crate::generator::Generator;
use crate::plugin::PluginCatalog;
use anyhow::Result;
use clap::{ArgMatches, Command};

pub fn command() -> Command {
    Command::new("plugins")
        .about("List available plugins, or the resolved plugin sets of a configuration")
        .arg(utils::config_arg().required(false))
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    if matches.get_one::<String>("config").is_none() {
        let catalog = PluginCatalog::builtin();
        println!("Available plugins:");
        for name in catalog.names() {
            if let Some(plugin) = catalog.get(name) {
                println!("  {:<32} {}", name, plugin.stage());
            }
        }
        return Ok(());
    }

    let config = utils::load_config(matches)?;
    let generator = Generator::new(&config)?;

    for set in generator.plugin_sets() {
        println!(
            "{}{}:",
            set.name,
            if set.default { " (default)" } else { "" }
        );
        for plugin in set.plugins.values() {
            println!("  {:<32} {}", plugin.name(), plugin.stage());
        }
    }

    Ok(())
}
