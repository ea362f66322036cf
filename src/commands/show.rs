//! Read-only summary of configuration and recorded state

use colored::*;
use eyre::{Context, Result};

use crate::config::{Config, UsageOrder};
use crate::selector;
use crate::state::{FileStateStore, StateStore};

pub fn run(config: &Config) -> Result<()> {
    let store = FileStateStore::new(config.state_path());
    // Plain read, show never materializes the record
    let last = store.read().context("Failed to read state")?;

    println!("{}", "Avatar rotation".bold());
    println!("{}", "═".repeat(50));
    println!("User:        {}", config.username);
    println!("Service:     {}", config.api_base());
    println!("Order:       {}", config.usage_order);
    println!(
        "Avatars:     {}",
        config
            .avatar_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("State file:  {}", store.path().display());
    println!();

    match last {
        Some(id) if !config.avatar_ids.contains(&id) => {
            println!("Last applied: {} {}", id, "(no longer configured)".yellow())
        }
        Some(id) => println!("Last applied: {}", id),
        None => println!("Last applied: {}", "none".dimmed()),
    }

    if config.avatar_ids.is_empty() {
        println!("{} avatar_ids is empty, rotation will fail", "✗".red());
        return Ok(());
    }

    match config.usage_order {
        UsageOrder::Sequential => {
            let next = selector::select_next(&config.avatar_ids, config.usage_order, last)?;
            println!("Next:         {}", next.to_string().green());
        }
        UsageOrder::Random => println!("Next:         {}", "random pick".dimmed()),
    }
    Ok(())
}
