//! Record counter on stderr, driven by readiness events.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " records"
    )))
}

/// Move the counter to `n`. Uses try_lock so the event loop never blocks on the bar.
pub fn set_counter(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.update_to(n);
    }
}

/// Final refresh so the last count is shown.
pub fn finish_counter(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update_to(n);
        let _ = bar.refresh();
        eprintln!();
    }
}
