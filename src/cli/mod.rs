//! CLI definitions for the `layerconf` demo binary.
//!
//! The binary loads [`AppConfig`] from a file, `APP_*` environment variables
//! and the configuration flags below, then prints the result. Configuration
//! flags are plain strings: conversion is left to the loader, so that only
//! flags given on the command line take part.

pub mod demo;
pub mod get;

use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use get::GetArgs;
use std::path::PathBuf;

pub use demo::{AppConfig, DatabaseConfig, LogLevel};

/// Layered configuration loader demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to load first
    #[arg(long, default_value = "layerconf.yaml")]
    pub config_file: PathBuf,

    /// Prefix of environment variables to load
    #[arg(long, default_value = "APP")]
    pub env_prefix: String,

    /// Output format of the loaded configuration
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,

    /// Application name
    #[arg(long)]
    pub name: Option<String>,

    /// Server host
    #[arg(long)]
    pub host: Option<String>,

    /// Server port
    #[arg(long)]
    pub port: Option<String>,

    /// Enable debug mode
    #[arg(long)]
    pub debug: bool,

    /// Log level of the application (error, warn, info, debug)
    #[arg(long)]
    pub level: Option<String>,

    /// Database host
    #[arg(long)]
    pub database_host: Option<String>,

    /// Database port
    #[arg(long)]
    pub database_port: Option<String>,

    /// Enable SSL for the database
    #[arg(long)]
    pub database_ssl: bool,

    /// Additional configuration file named by the configuration itself
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the whole loaded configuration (default)
    Show,

    /// Print a single value by dot-path
    Get(GetArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_flags_use_dashed_long_names() {
        let command = Cli::command();
        let longs: Vec<&str> = command.get_arguments().filter_map(|a| a.get_long()).collect();
        assert!(longs.contains(&"database-host"));
        assert!(longs.contains(&"database-port"));
        assert!(longs.contains(&"config-file"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["layerconf"]).unwrap();
        assert_eq!(cli.config_file, PathBuf::from("layerconf.yaml"));
        assert_eq!(cli.env_prefix, "APP");
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.command.is_none());
    }
}
