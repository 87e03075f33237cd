//! SQL Matrix CLI - boundary-value test matrices for database routines

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{inspect, matrix, validate};

fn main() {
    let cli = Cli::parse();

    let result: Result<()> = match &cli.command {
        cli::Commands::Validate(args) => validate::execute(args, &cli.global),
        cli::Commands::Matrix(args) => matrix::execute(args, &cli.global),
        cli::Commands::Inspect(args) => inspect::execute(args, &cli.global),
    };

    if let Err(err) = result {
        match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::exit(code.0),
            None => {
                eprintln!("Error: {err:?}");
                std::process::exit(1);
            }
        }
    }
}
