//! # `teacoop` Entry Point
//!
//! Prints the command's JSON result on stdout. Failures print
//! `{"code": ..., "message": ...}` on stderr and exit non-zero.
//!
//! The actual setup is in lib.rs for testability.

use std::process::ExitCode;

use clap::Parser;

use teacoop_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match teacoop_cli::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}
