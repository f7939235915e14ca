//! CLI command handler: resolve settings, run one pass, print records to stdout.

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::unbounded;
use log::{debug, warn};
use std::io::{self, BufWriter, Stdout, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{create_counter, finish_counter, set_counter};
use crate::utils::config::{PackagePaths, kib_to_bytes};
use crate::utils::recfeed_toml::{apply_file_to_settings, load_recfeed_toml};
use crate::utils::setup_logging;
use crate::{
    Delimiter, PassOutcome, Reader, ReaderEvent, Record, RunSettings, SourceConfig, WalkerOpts,
};

/// Exit status after Ctrl+C, as shells report SIGINT.
const EXIT_CANCELLED: u8 = 130;

/// Defaults and environment, then `.recfeed.toml` in the working directory, then flags.
pub fn resolve_settings(cli: &Cli) -> Result<RunSettings> {
    let mut settings = RunSettings::default();
    if let Some(file) = load_recfeed_toml(&std::env::current_dir()?) {
        apply_file_to_settings(&file, &mut settings)?;
    }
    if let Some(read0) = cli.read0 {
        settings.reader.delimiter = Delimiter::from_read0(read0);
    }
    if let Some(ref spec) = cli.walker {
        settings.walker = WalkerOpts::parse(spec)?;
    }
    if let Some(ref root) = cli.walker_root {
        settings.walker_root = root.clone();
    }
    if let Some(ref skip) = cli.walker_skip {
        settings.walker_skip = skip.clone();
    }
    if let Some(size) = cli.slab_kb.and_then(|kb| kib_to_bytes(kb as usize)) {
        settings.reader.slab_size = size;
    }
    if let Some(size) = cli.buf_kb.and_then(|kb| kib_to_bytes(kb as usize)) {
        settings.reader.buffer_size = size;
    }
    if let Some(sync) = cli.sync {
        settings.reader.wait = sync;
    }
    if let Some(progress) = cli.progress {
        settings.progress = progress;
    }
    if let Some(verbose) = cli.verbose {
        settings.verbose = verbose;
    }
    settings.command = cli.command.clone().filter(|c| !c.is_empty());
    Ok(settings)
}

fn flush(out: &Mutex<BufWriter<Stdout>>) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = out.flush() {
        debug!("flush stdout: {}", e);
    }
}

/// Run one pass and write every record to stdout followed by the delimiter.
pub fn handle_run(cli: &Cli) -> Result<ExitCode> {
    let settings = resolve_settings(cli)?;
    setup_logging(settings.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        PackagePaths::get().pkg_name().to_uppercase(),
        settings
    );

    let delim = settings.reader.delimiter.byte();
    let out = Arc::new(Mutex::new(BufWriter::new(io::stdout())));
    let count = Arc::new(AtomicUsize::new(0));
    let pusher = {
        let out = Arc::clone(&out);
        let count = Arc::clone(&count);
        move |record: Record| {
            let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
            let ok = out.write_all(&record).and_then(|_| out.write_all(&[delim]));
            if ok.is_err() {
                return false;
            }
            count.fetch_add(1, Ordering::Relaxed);
            true
        }
    };

    let (tx, rx) = unbounded();
    let reader = Arc::new(Reader::new(pusher, tx, settings.reader.clone()));
    let reader_handler = Arc::clone(&reader);
    ctrlc::set_handler(move || reader_handler.terminate()).context("set Ctrl+C handler")?;

    let source = match settings.command {
        Some(command) => SourceConfig::Command {
            command,
            environ: None,
        },
        None => SourceConfig::from_env(
            settings.walker_root.clone(),
            settings.walker.clone(),
            settings.walker_skip.clone(),
        ),
    };
    debug!("source: {}", source.kind());

    let worker = {
        let reader = Arc::clone(&reader);
        thread::spawn(move || reader.read(source))
    };

    let bar = settings.progress.then(|| create_counter("Reading"));
    let mut retry = None;
    for event in rx.iter() {
        match event {
            ReaderEvent::ReadNew => {
                flush(&out);
                if let Some(bar) = &bar {
                    set_counter(bar, count.load(Ordering::Relaxed));
                }
            }
            ReaderEvent::ReadFin(payload) => {
                retry = payload;
                break;
            }
        }
    }
    flush(&out);
    if let Some(bar) = &bar {
        finish_counter(bar, count.load(Ordering::Relaxed));
    }

    let outcome = worker
        .join()
        .map_err(|_| anyhow!("reader thread panicked"))??;
    debug!("{:?}: {} records", outcome, count.load(Ordering::Relaxed));

    if let Some(command) = retry {
        warn!("Source command failed; retry with: {}", command);
        return Ok(ExitCode::FAILURE);
    }
    Ok(match outcome {
        PassOutcome::Completed => ExitCode::SUCCESS,
        PassOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
        PassOutcome::Failed => ExitCode::FAILURE,
    })
}
