//! Apply the next avatar and record it

use colored::*;
use eyre::{Context, Result};

use crate::config::Config;
use crate::jira::JiraClient;
use crate::rotation::{Outcome, Rotation};
use crate::state::FileStateStore;

pub fn run(dry_run: bool, config: &Config) -> Result<()> {
    let store = FileStateStore::new(config.state_path());
    let client = JiraClient::new(config);

    let mut rotation = Rotation::new(config, &store, &client);
    let outcome = rotation
        .run(dry_run)
        .map_err(|e| {
            let kind = e.kind();
            eyre::Report::new(e).wrap_err(kind)
        })
        .context("Avatar rotation failed")?;

    log::info!("Run ended {} with avatar {}", rotation.phase(), outcome.id());

    match outcome {
        Outcome::Applied(id) => println!("{} {}", "SUCCESS:".green().bold(), id),
        Outcome::Planned(id) => println!("{} {}", "Next avatar:".cyan(), id),
    }
    Ok(())
}
