//! `config` commands.

use clap::Subcommand;
use roofscan::config::{config_file_path, EngineConfig};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration in INI syntax
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
    }
}

fn run_path() -> Result<(), CliError> {
    let path = config_file_path()?;
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist, defaults are in effect)");
    }
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = EngineConfig::load()?;
    print!("{}", config.to_ini_string());
    Ok(())
}
