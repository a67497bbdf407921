use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::{CliConfig, ConfigLoader};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate and print the merged hub configuration
    Show,
    /// Validate the merged configuration without printing it
    Check,
    /// Show the user and project config file locations
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load()?;
            println!("{}", render(&config)?);
            Ok(())
        }
        ConfigCommands::Check => {
            let config = ConfigLoader::load()?;
            check(&config)?;
            println!("configuration ok");
            Ok(())
        }
        ConfigCommands::Path => {
            if let Some(user) = ConfigLoader::user_config_path() {
                println!("User config:    {}", describe(&user));
            }
            println!(
                "Project config: {}",
                describe(&ConfigLoader::project_config_path())
            );
            Ok(())
        }
    }
}

/// Rejects a merged configuration the hub would refuse to start with
fn check(config: &CliConfig) -> Result<()> {
    config
        .hub_config()
        .validate()
        .context("merged hub configuration is invalid")
}

fn render(config: &CliConfig) -> Result<String> {
    check(config)?;
    toml::to_string_pretty(config).context("failed to serialize configuration")
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not present)", path.display())
    }
}
