//! recfeed CLI: stream records from piped stdin, a default command, or a directory walk.

use anyhow::Result;
use clap::Parser;
use recfeed::engine::{Cli, handle_run};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(code)
}
