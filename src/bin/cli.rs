// src/bin/cli.rs
use std::process::ExitCode;

use peloton_import::cli;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    // Errors propagate to color-eyre, which prints them and exits with 1.
    let passed = cli::run()?;
    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
