//! Shell completion scripts for the CLI.

use clap::CommandFactory;
use clap_complete::{generate, shells::Shell};
use std::io::{self, Write};

pub const BIN_NAME: &str = "healthpal";

/// Write the completion script for `shell` to `out`.
pub fn write_completion(shell: Shell, out: &mut dyn Write) {
    let mut app = crate::Cli::command();
    generate(shell, &mut app, BIN_NAME, out);
}

pub fn generate_completion(shell: Shell) {
    write_completion(shell, &mut io::stdout());
}
