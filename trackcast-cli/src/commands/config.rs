//! Configuration inspection commands.

use std::path::PathBuf;

use clap::Subcommand;
use trackcast::config::{config_file_path, ExtrapolationConfig};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective extrapolation settings
    Show {
        /// Read this file instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Show { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_ini_string());
            Ok(())
        }
    }
}

/// Load settings from `path`, or from the default location when `None`.
pub fn load_config(path: Option<&std::path::Path>) -> Result<ExtrapolationConfig, CliError> {
    let config = match path {
        Some(path) => ExtrapolationConfig::load_from(path)?,
        None => ExtrapolationConfig::load()?,
    };
    Ok(config)
}
