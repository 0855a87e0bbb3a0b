//! Interactive command shell. Reads command lines one at a time and hands
//! them to the [`Dispatcher`], printing whatever comes back. `--script` lets
//! a file replace stdin for batch runs; the command grammar is unchanged
//! either way.

use crate::dispatcher::{Dispatcher, Outcome};
use crate::persistence::Ledger;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "order-book-cli")]
#[command(
    author = "Andrew Odiit",
    version = "0.1",
    about = "A continuous double-auction limit order book"
)]
pub struct Cli {
    /// Path to a parity-db directory for persisting orders and trade
    /// history. Omit to run with an in-memory book only.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Read commands from this file instead of stdin, one per line.
    #[arg(long)]
    pub script: Option<PathBuf>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let ledger = match cli.store {
        Some(path) => Some(Ledger::open(&path)?),
        None => None,
    };
    let mut dispatcher = Dispatcher::new(ledger);

    let mut reader: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // EOF: stdin closed or script exhausted
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        match dispatcher.dispatch(trimmed) {
            Ok(Outcome::Response(response)) => {
                writeln!(out, "{response}")?;
            }
            Ok(Outcome::Quit) => break,
            Err(e) => {
                warn!(command = trimmed, error = %e, "command rejected");
                writeln!(out, "{}", e.render())?;
            }
        }
    }

    Ok(())
}
