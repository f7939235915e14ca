pub mod config;
pub mod logger;
pub mod process;
pub mod recfeed_toml;
pub mod tty;

pub use config::*;
pub use logger::setup_logging;
pub use process::{close_stdin, kill_command, shell_command};
pub use tty::stdin_is_tty;
