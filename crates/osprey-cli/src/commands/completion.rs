use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io;

/// Write a completion script for `shell` to stdout.
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    tracing::debug!("Generating {} completions for {}", shell, name);
    generate(shell, cmd, name, &mut io::stdout());
    Ok(())
}
