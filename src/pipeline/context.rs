//! Per-pass reader state shared between the reading thread and `terminate` callers.

use std::process::Child;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

/// Lifecycle of a read pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Reading,
    Finishing,
    Done,
}

/// Which driver is producing records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Stdin,
    Command,
    Walk,
}

/// Mutable state guarded by one mutex.
pub struct ReaderState {
    pub killed: bool,
    pub phase: Phase,
    pub source: Option<SourceKind>,
    /// Running command, kept here so `terminate` can kill it.
    pub child: Option<Child>,
    /// Command text of the current pass, reported back for retry on failure.
    pub command: Option<String>,
    pub notifier: Option<JoinHandle<()>>,
}

impl ReaderState {
    pub fn new() -> Self {
        ReaderState {
            killed: false,
            phase: Phase::Idle,
            source: None,
            child: None,
            command: None,
            notifier: None,
        }
    }

    /// Phase as observed from outside: Finishing becomes Done once the notifier has exited.
    pub fn effective_phase(&self) -> Phase {
        match self.phase {
            Phase::Finishing if self.notifier.as_ref().is_none_or(|h| h.is_finished()) => {
                Phase::Done
            }
            phase => phase,
        }
    }
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock the state, recovering from a poisoned mutex (the state is plain data).
pub fn lock_state(state: &Mutex<ReaderState>) -> MutexGuard<'_, ReaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// True once `terminate` has been called for the current pass.
pub fn is_killed(state: &Mutex<ReaderState>) -> bool {
    lock_state(state).killed
}
