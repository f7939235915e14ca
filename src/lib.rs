//! recfeed: input acquisition for interactive record pickers.
//!
//! A [`Reader`] produces records from exactly one source per pass (piped
//! stdin, a shell command, or a directory walk), hands each one to a pusher
//! callback, and publishes coalesced [`ReaderEvent`]s to an [`EventSink`].

pub mod engine;
pub mod pipeline;
pub mod reader;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::slab::{Backing, Record};
pub use pipeline::notifier::EventSink;
pub use reader::{Collected, Reader, collect_records};

/// Result alias used by public recfeed API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
