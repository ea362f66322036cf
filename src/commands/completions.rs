use clap::CommandFactory;
use clap_complete::{Shell, generate};
use eyre::Result;
use std::io::{self, Write};

use crate::cli::Cli;

pub fn run(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout())
}

fn write_completions<W: Write>(shell: Shell, out: &mut W) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}
