//! lite-rs CLI: loads a program description, binds every operator against a
//! scope of declared inputs, prints the inferred shapes and optionally runs
//! the reference CPU kernels.

mod cli;
mod commands;

use std::process;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match &cli.command {
        Commands::Check {
            program,
            inputs,
            options,
            run,
            seed,
        } => commands::check(program, inputs, options.as_deref(), *run, *seed),
        Commands::Ops => commands::ops(),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
