//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use lite_rs::Shape;

#[derive(Parser)]
#[command(name = "lite-rs")]
#[command(about = "Bind lite-rs programs, infer their shapes and run reference kernels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Attach every operator of a program and print the inferred shapes
    Check {
        /// Program JSON file ({"ops": [...]})
        #[arg(value_name = "PROGRAM")]
        program: PathBuf,

        /// Input tensor declaration, e.g. `x=3,4` (repeatable)
        #[arg(short, long = "input", value_name = "NAME=DIMS", value_parser = parse_input)]
        inputs: Vec<(String, Shape)>,

        /// Build options JSON file
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Fill inputs with random data and run the reference kernels
        #[arg(long)]
        run: bool,

        /// Seed for the random input data
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// List the registered operator types
    Ops,
}

/// Parses `name=d0,d1,...` into a variable name and shape.
pub fn parse_input(raw: &str) -> Result<(String, Shape)> {
    let (name, dims) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=DIMS, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("input name is empty in '{raw}'");
    }
    let dims = dims
        .split(',')
        .map(|dim| {
            dim.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid dimension '{dim}' in '{raw}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if dims.is_empty() {
        bail!("input '{name}' has no dimensions");
    }
    Ok((name.to_string(), Shape::new(dims)))
}
