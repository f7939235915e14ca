//! Pipeline components: reader state, notifier, source drivers.

pub mod command;
pub mod context;
pub mod notifier;
pub mod stdin;
pub mod walk;

pub use command::read_from_command;
pub use context::{Phase, ReaderState, SourceKind, lock_state};
pub use notifier::{Backoff, EventSink, PassSignal, spawn_notifier};
pub use stdin::read_from_stdin;
pub use walk::read_files;
