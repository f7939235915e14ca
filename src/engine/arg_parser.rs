use clap::Parser;
use std::path::PathBuf;

/// Stream candidate records from stdin, a command, or a directory walk.
#[derive(Clone, Debug, Parser)]
#[command(name = "recfeed")]
#[command(
    about = "Emit records from piped stdin, $RECFEED_DEFAULT_COMMAND, or a directory walk."
)]
pub struct Cli {
    /// Read and write NUL-delimited records instead of lines.
    #[arg(long, short = '0', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub read0: Option<bool>,

    /// Walker options, comma-separated: file, dir, follow, hidden, relative.
    #[arg(long, value_name = "OPTS")]
    pub walker: Option<String>,

    /// Directory to walk. Default: current directory.
    #[arg(long, value_name = "DIR")]
    pub walker_root: Option<PathBuf>,

    /// Directory names to skip during the walk, comma-separated.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub walker_skip: Option<Vec<String>>,

    /// Run this command instead of selecting a source automatically.
    #[arg(long, short = 'c')]
    pub command: Option<String>,

    /// Wait for the notifier hand-off before the pass completes.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub sync: Option<bool>,

    /// Slab size in KiB.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub slab_kb: Option<u32>,

    /// Read buffer size in KiB.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub buf_kb: Option<u32>,

    /// Show a record counter on stderr.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
