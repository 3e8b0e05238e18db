//! layerconf demo
//!
//! Loads a sample application configuration from a file, `APP_*`
//! environment variables and command-line flags, then prints it.

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use layerconf::cli::get::run_get;
use layerconf::cli::{AppConfig, Cli, Command};
use layerconf::logging::{LogTarget, init_logging};
use layerconf::{ClapFlags, Loader};
use tracing::{debug, info};

fn main() -> Result<()> {
    // Keep the command: explicit flags are looked up by long name
    let command = Cli::command();
    let matches = command.clone().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = Loader::new();
    loader
        .register_file(&cli.config_file)
        .register_flags(ClapFlags::new(&command, &matches))
        .register_env(cli.env_prefix.as_str());
    debug!(?loader, "Loader ready");

    let mut config = AppConfig::default();
    loader.load(&mut config)?;
    info!(name = %config.name, "Configuration loaded");

    match &cli.command {
        None | Some(Command::Show) => println!("{}", cli.output.render(&config)?),
        Some(Command::Get(args)) => println!("{}", run_get(&config, args)?),
    }

    Ok(())
}
