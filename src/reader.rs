//! Lifecycle controller: selects a source, runs one pass at a time, and
//! coordinates cancellation and completion with the notifier.

use anyhow::bail;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::engine::slab::{Record, SlabAllocator};
use crate::engine::splitter::Splitter;
use crate::pipeline::context::{Phase, ReaderState, SourceKind, lock_state};
use crate::pipeline::notifier::{Backoff, EventSink, PassSignal, spawn_notifier};
use crate::pipeline::{read_files, read_from_command, read_from_stdin};
use crate::utils::process::{close_stdin, kill_command};
use crate::{PassOutcome, ReaderEvent, ReaderOpts, Result, SourceConfig, WalkerOpts};

/// Reads records from one source per pass and reports progress to an [`EventSink`].
///
/// `pusher` receives every record in order and returns whether the push should
/// count towards a readiness notification. Share the reader behind an `Arc` to
/// call [`terminate`](Self::terminate) from another thread.
pub struct Reader<F>
where
    F: Fn(Record) -> bool + Send + Sync,
{
    pusher: F,
    sink: Arc<dyn EventSink>,
    opts: ReaderOpts,
    signal: Arc<PassSignal>,
    state: Mutex<ReaderState>,
    fin_tx: Sender<()>,
    fin_rx: Receiver<()>,
}

impl<F> Reader<F>
where
    F: Fn(Record) -> bool + Send + Sync,
{
    pub fn new<S>(pusher: F, sink: S, opts: ReaderOpts) -> Self
    where
        S: EventSink + 'static,
    {
        let (fin_tx, fin_rx) = bounded(1);
        Reader {
            pusher,
            sink: Arc::new(sink),
            opts,
            signal: Arc::new(PassSignal::new()),
            state: Mutex::new(ReaderState::new()),
            fin_tx,
            fin_rx,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        lock_state(&self.state).effective_phase()
    }

    /// Read from piped stdin, else the default command from the environment, else a walk of `root`.
    pub fn read_source(
        &self,
        root: PathBuf,
        walker: WalkerOpts,
        ignores: Vec<String>,
    ) -> Result<PassOutcome> {
        self.read(SourceConfig::from_env(root, walker, ignores))
    }

    /// Start a new pass running `command` with an optional replacement environment.
    pub fn restart(
        &self,
        command: &str,
        environ: Option<Vec<(String, String)>>,
    ) -> Result<PassOutcome> {
        self.read(SourceConfig::Command {
            command: command.to_string(),
            environ,
        })
    }

    /// Run one pass over `config` to completion. Errors only when another pass
    /// is still reading; the pass's own failures are reported through the
    /// outcome and the `ReadFin` payload. A previous pass that is finishing is
    /// first brought to Done.
    pub fn read(&self, config: SourceConfig) -> Result<PassOutcome> {
        self.begin_pass(&config)?;
        debug!("pass started: {}", config.kind());

        let mut splitter = Splitter::new(&self.opts);
        let on_record = |record: Record| {
            if (self.pusher)(record) {
                self.signal.mark_new();
            }
        };
        let result = match &config {
            SourceConfig::Stdin => read_from_stdin(&mut splitter, on_record),
            SourceConfig::Command { command, environ } => read_from_command(
                &self.state,
                command,
                environ.as_deref(),
                &mut splitter,
                on_record,
                self.opts.poll_min,
            ),
            SourceConfig::Walk {
                root,
                opts,
                ignores,
            } => {
                let mut slabs = SlabAllocator::new(self.opts.slab_size);
                read_files(root, opts, ignores, &self.state, &mut slabs, on_record)
            }
        };
        Ok(self.fin(result))
    }

    /// Cancel the running pass: kill its command or close stdin; the walker
    /// notices the flag on its own. No-op when no pass is reading.
    pub fn terminate(&self) {
        let mut st = lock_state(&self.state);
        if st.phase != Phase::Reading || st.killed {
            return;
        }
        st.killed = true;
        match st.source {
            Some(SourceKind::Command) => {
                if let Some(child) = st.child.as_mut() {
                    debug!("terminate: killing pid {}", child.id());
                    kill_command(child);
                }
            }
            Some(SourceKind::Stdin) => close_stdin(),
            Some(SourceKind::Walk) | None => {}
        }
    }

    fn begin_pass(&self, config: &SourceConfig) -> Result<()> {
        let previous = {
            let mut st = lock_state(&self.state);
            if st.phase == Phase::Reading {
                bail!("cannot start a pass while another one is reading");
            }
            st.killed = false;
            st.child = None;
            st.command = None;
            st.source = Some(match config {
                SourceConfig::Stdin => SourceKind::Stdin,
                SourceConfig::Command { .. } => SourceKind::Command,
                SourceConfig::Walk { .. } => SourceKind::Walk,
            });
            st.phase = Phase::Reading;
            st.notifier.take()
        };
        // Joined outside the lock: a slow sink must not hold up `terminate`.
        // The finish signal is already set, so it exits within one poll interval.
        if let Some(handle) = previous {
            let _ = handle.join();
        }

        self.signal.reset();
        let handoff = self.opts.wait.then(|| self.fin_tx.clone());
        let notifier = spawn_notifier(
            Arc::clone(&self.signal),
            Arc::clone(&self.sink),
            Backoff::from_opts(&self.opts),
            handoff,
        );
        lock_state(&self.state).notifier = Some(notifier);
        Ok(())
    }

    fn fin(&self, result: Result<()>) -> PassOutcome {
        let (outcome, payload) = {
            let mut st = lock_state(&self.state);
            st.phase = Phase::Finishing;
            st.source = None;
            if let Some(mut child) = st.child.take() {
                kill_command(&mut child);
                let _ = child.wait();
            }
            let outcome = match (&result, st.killed) {
                (_, true) => PassOutcome::Cancelled,
                (Ok(()), false) => PassOutcome::Completed,
                (Err(e), false) => {
                    warn!("{:#}", e);
                    PassOutcome::Failed
                }
            };
            let payload = match outcome {
                PassOutcome::Failed => st.command.clone(),
                _ => None,
            };
            (outcome, payload)
        };
        debug!("pass finished: {:?}", outcome);
        self.signal.finish(payload);
        if self.opts.wait {
            let _ = self.fin_rx.recv();
        }
        outcome
    }
}

/// Records gathered by [`collect_records`], with how the pass ended.
#[derive(Debug)]
pub struct Collected {
    pub records: Vec<Record>,
    pub outcome: PassOutcome,
    /// Payload of the `ReadFin` event.
    pub retry: Option<String>,
    /// Number of `ReadNew` events seen before `ReadFin`.
    pub ready_events: usize,
}

/// Run a single pass over `config` and collect every record. Blocks until
/// the notifier has published `ReadFin`.
pub fn collect_records(config: SourceConfig, opts: ReaderOpts) -> Result<Collected> {
    let records = Mutex::new(Vec::new());
    let (tx, rx) = unbounded();
    let reader = Reader::new(
        |record: Record| {
            lock_vec(&records).push(record);
            true
        },
        tx,
        opts,
    );
    let outcome = reader.read(config)?;
    let mut ready_events = 0;
    let retry = loop {
        match rx.recv()? {
            ReaderEvent::ReadNew => ready_events += 1,
            ReaderEvent::ReadFin(payload) => break payload,
        }
    };
    drop(reader);
    Ok(Collected {
        records: records.into_inner().unwrap_or_else(|e| e.into_inner()),
        outcome,
        retry,
        ready_events,
    })
}

fn lock_vec(v: &Mutex<Vec<Record>>) -> std::sync::MutexGuard<'_, Vec<Record>> {
    v.lock().unwrap_or_else(|e| e.into_inner())
}
