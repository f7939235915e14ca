//! Engine: record storage, splitting, path tools, and the CLI surface.

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod slab;
pub mod splitter;
pub mod tools;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::{handle_run, resolve_settings};
pub use slab::{Backing, Record, SlabAllocator};
pub use splitter::Splitter;
pub use tools::{clean_path, display_path, is_hidden_name, is_ignored_name, path_relative_to};
