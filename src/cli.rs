use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "avatar-rotate",
    about = "Rotate your issue-tracker profile avatar through a configured list",
    version,
    after_help = "Logs are written to: ~/.local/share/avatar-rotate/logs/avatar-rotate.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to avatar-rotate config file (YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select the next avatar, apply it and record it (default)
    Rotate {
        /// Only show which avatar would be applied
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the recorded avatar and what the next run would do
    Show,

    /// Forget the recorded avatar so the sequence restarts
    Reset,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
