//! Adaptive notifier: coalesces pushes into periodic `ReadNew` events and
//! publishes exactly one `ReadFin` per pass.

use crossbeam_channel::Sender;
use log::debug;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::types::{ReaderEvent, ReaderOpts};

/// Receiver of reader events (readiness and completion).
pub trait EventSink: Send + Sync {
    fn publish(&self, event: ReaderEvent);
}

impl EventSink for Sender<ReaderEvent> {
    fn publish(&self, event: ReaderEvent) {
        // A dropped receiver means nobody is listening anymore.
        let _ = self.send(event);
    }
}

const READY: u8 = 0;
const READ_NEW: u8 = 1;
const FINISHED: u8 = 2;

/// Tri-state shared between the producer and the notifier, plus the finish payload.
pub struct PassSignal {
    state: AtomicU8,
    payload: Mutex<Option<String>>,
}

impl PassSignal {
    pub fn new() -> Self {
        PassSignal {
            state: AtomicU8::new(READY),
            payload: Mutex::new(None),
        }
    }

    /// Back to Ready for a new pass.
    pub fn reset(&self) {
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.state.store(READY, Ordering::Release);
    }

    /// Producer side: a record was pushed. Never overrides Finished.
    pub fn mark_new(&self) {
        let _ = self
            .state
            .compare_exchange(READY, READ_NEW, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Notifier side: ReadNew → Ready. True if there was something to announce.
    pub fn take_new(&self) -> bool {
        self.state
            .compare_exchange(READ_NEW, READY, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Terminal transition. `payload` is the retry command, if any.
    pub fn finish(&self, payload: Option<String>) {
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = payload;
        self.state.store(FINISHED, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Acquire) == FINISHED
    }

    fn take_payload(&self) -> Option<String> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Default for PassSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll interval that grows by `step` while idle, capped at `max`, and snaps back to `min`.
#[derive(Clone, Debug)]
pub struct Backoff {
    min: Duration,
    step: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(min: Duration, step: Duration, max: Duration) -> Self {
        let max = max.max(min);
        Backoff {
            min,
            step,
            max,
            current: min,
        }
    }

    pub fn from_opts(opts: &ReaderOpts) -> Self {
        Self::new(opts.poll_min, opts.poll_step, opts.poll_max)
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn reset(&mut self) -> Duration {
        self.current = self.min;
        self.current
    }

    pub fn grow(&mut self) -> Duration {
        self.current = (self.current + self.step).min(self.max);
        self.current
    }
}

/// Start the poll loop for one pass. When it sees Finished it hands off on
/// `handoff` (if set), publishes `ReadFin` and exits.
pub fn spawn_notifier(
    signal: Arc<PassSignal>,
    sink: Arc<dyn EventSink>,
    mut backoff: Backoff,
    handoff: Option<Sender<()>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut published = 0_usize;
        loop {
            if signal.take_new() {
                sink.publish(ReaderEvent::ReadNew);
                published += 1;
                backoff.reset();
            } else if signal.is_finished() {
                let payload = signal.take_payload();
                if let Some(tx) = handoff {
                    let _ = tx.send(());
                }
                debug!(
                    "notifier: finished after {} ready events (retry: {:?})",
                    published, payload
                );
                sink.publish(ReaderEvent::ReadFin(payload));
                return;
            } else {
                backoff.grow();
            }
            thread::sleep(backoff.current());
        }
    })
}
