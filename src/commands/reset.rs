use colored::*;
use eyre::{Context, Result};

use crate::config::Config;
use crate::state::{FileStateStore, StateStore};

pub fn run(config: &Config) -> Result<()> {
    let store = FileStateStore::new(config.state_path());
    store.clear().context("Failed to reset state")?;

    log::info!("Cleared state file {}", store.path().display());
    println!("{} Recorded avatar cleared; the next sequential run starts over", "✓".green());
    Ok(())
}
