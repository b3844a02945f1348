//! # Sidecart CLI Entry Point
//!
//! Parses arguments and hands off to [`sidecart_cli::run`]; the setup lives
//! in lib.rs so it can be tested without a process.

use clap::Parser;
use std::process::ExitCode;

use sidecart_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match sidecart_cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sidecart: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
