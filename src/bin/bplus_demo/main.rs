//! Interactive console for exploring how a [`BPlusTreeSet`] reshapes itself.
//!
//! Reads commands such as `ADD 1 2 3`, `REMOVE 2` or `PRINT` from standard input. Diagnostics go to standard
//! error through `env_logger`; set `RUST_LOG=trace` to watch splits, borrows and merges as they happen.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use bplus_tree_set::{BPlusTreeSet, DEFAULT_BRANCHING_FACTOR};
use clap::Parser;
use log::error;

use crate::console::Console;

mod command;
mod console;

#[derive(Parser, Debug)]
#[command(name = "bplus-demo", version)]
#[command(about = "A CLI application demonstrating B+ tree operations")]
struct Args {
    /// Branching factor of the B+ tree
    #[arg(short = 'B', long, default_value_t = DEFAULT_BRANCHING_FACTOR)]
    branching_factor: usize,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let set = match BPlusTreeSet::with_branching_factor(args.branching_factor) {
        Ok(set) => set,
        Err(err) => {
            error!("Illegal argument passed: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut console = Console::new(set, io::stdout().lock());
    console.run(io::stdin().lock()).context("console I/O failed")?;
    Ok(ExitCode::SUCCESS)
}
