use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod error;
mod jira;
mod rotation;
mod selector;
mod state;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    let log_dir = config::app_data_dir().join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("avatar-rotate.log");

    // Logs go to a file, stdout carries only the result
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.as_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Load configuration and start logging; completions skip this
fn startup(config_path: Option<&PathBuf>) -> Result<Config> {
    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(config_path).context("Failed to load configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting avatar-rotate with config from: {:?}", config_path);
    Ok(config)
}

fn run(command: Commands, config: impl FnOnce() -> Result<Config>) -> Result<()> {
    match command {
        Commands::Rotate { dry_run } => commands::rotate::run(dry_run, &config()?),
        Commands::Show => commands::show::run(&config()?),
        Commands::Reset => commands::reset::run(&config()?),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Bare invocation performs a rotation
    let command = cli.command.unwrap_or(Commands::Rotate { dry_run: false });

    run(command, || startup(cli.config.as_ref()))
}
