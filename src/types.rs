//! Public and internal types for the recfeed API and pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::utils::config::{
    BufferConsts, DEFAULT_WALKER_SKIP, EnvVars, PackagePaths, PollConsts, kib_from_env,
};

/// Event published to the rest of the application while a pass runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReaderEvent {
    /// One or more records were pushed since the last `ReadNew`.
    ReadNew,
    /// The pass is over. Carries the command to offer for retry, or `None` on
    /// success or explicit cancellation.
    ReadFin(Option<String>),
}

/// How a pass ended, as seen by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Natural end of input (and zero exit status for commands).
    Completed,
    /// `terminate` was called; no retry is offered whatever the exit status.
    Cancelled,
    /// I/O, spawn, or exit-status failure.
    Failed,
}

/// Record delimiter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Newline,
    Nul,
}

impl Delimiter {
    pub fn from_read0(read0: bool) -> Self {
        if read0 { Delimiter::Nul } else { Delimiter::Newline }
    }

    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Newline => b'\n',
            Delimiter::Nul => b'\0',
        }
    }
}

/// Filesystem walker options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkerOpts {
    /// Emit regular files (and anything that is not a directory).
    pub file: bool,
    /// Emit directories.
    pub dir: bool,
    /// Follow symbolic links.
    pub follow: bool,
    /// Include entries whose base name starts with `.`.
    pub hidden: bool,
    /// Emit paths relative to the root instead of rooted at it.
    pub relative: bool,
}

impl Default for WalkerOpts {
    fn default() -> Self {
        Self {
            file: true,
            dir: false,
            follow: true,
            hidden: true,
            relative: false,
        }
    }
}

impl WalkerOpts {
    /// Parse a comma-separated list such as `file,dir,follow,hidden`.
    /// Options not named are off.
    pub fn parse(spec: &str) -> crate::Result<Self> {
        let mut opts = WalkerOpts {
            file: false,
            dir: false,
            follow: false,
            hidden: false,
            relative: false,
        };
        for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "file" => opts.file = true,
                "dir" => opts.dir = true,
                "follow" => opts.follow = true,
                "hidden" => opts.hidden = true,
                "relative" => opts.relative = true,
                other => anyhow::bail!("invalid walker option: {other}"),
            }
        }
        if !opts.file && !opts.dir {
            anyhow::bail!("walker must include 'file' or 'dir': {spec}");
        }
        Ok(opts)
    }
}

/// Splitter and notifier tuning for one reader.
#[derive(Clone, Debug)]
pub struct ReaderOpts {
    pub delimiter: Delimiter,
    /// Capacity of each slab (bytes).
    pub slab_size: usize,
    /// Capacity of the buffered reader (bytes).
    pub buffer_size: usize,
    pub poll_min: Duration,
    pub poll_step: Duration,
    pub poll_max: Duration,
    /// Block the finishing pass until the notifier has handed off.
    pub wait: bool,
}

impl Default for ReaderOpts {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Newline,
            slab_size: BufferConsts::SLAB_SIZE,
            buffer_size: BufferConsts::READ_BUFFER_SIZE,
            poll_min: PollConsts::MIN,
            poll_step: PollConsts::STEP,
            poll_max: PollConsts::MAX,
            wait: false,
        }
    }
}

impl ReaderOpts {
    /// Defaults with `SLAB_KB` / `BUF_KB` overrides applied.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(size) = kib_from_env(EnvVars::SLAB_KB) {
            opts.slab_size = size;
        }
        if let Some(size) = kib_from_env(EnvVars::BUF_KB) {
            opts.buffer_size = size;
        }
        opts
    }
}

/// The single source a pass reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceConfig {
    Stdin,
    Command {
        command: String,
        /// Replacement environment; `None` inherits ours.
        environ: Option<Vec<(String, String)>>,
    },
    Walk {
        root: PathBuf,
        opts: WalkerOpts,
        ignores: Vec<String>,
    },
}

impl SourceConfig {
    /// Pick the source: piped stdin wins, then a default command, then the walker.
    pub fn select(
        is_tty: bool,
        default_command: Option<String>,
        root: PathBuf,
        opts: WalkerOpts,
        ignores: Vec<String>,
    ) -> Self {
        if !is_tty {
            return SourceConfig::Stdin;
        }
        match default_command.filter(|c| !c.is_empty()) {
            Some(command) => SourceConfig::Command {
                command,
                environ: None,
            },
            None => SourceConfig::Walk {
                root,
                opts,
                ignores,
            },
        }
    }

    /// Like [`select`](Self::select) using the real terminal probe and the default-command variable.
    pub fn from_env(root: PathBuf, opts: WalkerOpts, ignores: Vec<String>) -> Self {
        let default_command = std::env::var(PackagePaths::get().default_command_var()).ok();
        Self::select(
            crate::utils::tty::stdin_is_tty(),
            default_command,
            root,
            opts,
            ignores,
        )
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Stdin => "stdin",
            SourceConfig::Command { .. } => "command",
            SourceConfig::Walk { .. } => "walker",
        }
    }
}

/// Default walker skip list as owned strings.
pub fn default_walker_skip() -> Vec<String> {
    DEFAULT_WALKER_SKIP.iter().map(|s| s.to_string()).collect()
}

/// Fully resolved CLI settings (defaults → environment → `.recfeed.toml` → flags).
#[derive(Clone, Debug)]
pub struct RunSettings {
    pub reader: ReaderOpts,
    pub walker: WalkerOpts,
    pub walker_root: PathBuf,
    pub walker_skip: Vec<String>,
    /// Forces the command driver when set.
    pub command: Option<String>,
    /// Show a record counter on stderr.
    pub progress: bool,
    pub verbose: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            reader: ReaderOpts::from_env(),
            walker: WalkerOpts::default(),
            walker_root: PathBuf::from("."),
            walker_skip: default_walker_skip(),
            command: None,
            progress: false,
            verbose: false,
        }
    }
}
