//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    default_command_var: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                default_command_var: format!("{}_DEFAULT_COMMAND", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory config file name (e.g. `.recfeed.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable holding the default source command (e.g. `RECFEED_DEFAULT_COMMAND`).
    pub fn default_command_var(&self) -> &str {
        &self.default_command_var
    }
}

// ---- Environment overrides ----

/// Environment variable names read by the reader.
pub struct EnvVars;

impl EnvVars {
    /// Slab size override in KiB.
    pub const SLAB_KB: &'static str = "SLAB_KB";
    /// Read buffer size override in KiB.
    pub const BUF_KB: &'static str = "BUF_KB";
    /// Shell used to run source commands.
    pub const SHELL: &'static str = "SHELL";
}

/// Shell used when `$SHELL` is unset or empty.
pub const DEFAULT_SHELL: &str = "sh";

// ---- Buffers ----

/// Slab and read-buffer sizing.
pub struct BufferConsts;

impl BufferConsts {
    /// Default slab size (bytes). 128 KiB.
    pub const SLAB_SIZE: usize = 128 * 1024;
    /// Default buffered-reader capacity (bytes). 64 KiB.
    pub const READ_BUFFER_SIZE: usize = 64 * 1024;
    /// Records longer than `slab / OVERSIZE_DIVISOR` get their own allocation.
    pub const OVERSIZE_DIVISOR: usize = 10;
}

// ---- Notifier polling ----

/// Adaptive notifier poll intervals.
pub struct PollConsts;

impl PollConsts {
    pub const MIN: Duration = Duration::from_millis(10);
    pub const STEP: Duration = Duration::from_millis(5);
    pub const MAX: Duration = Duration::from_millis(50);
}

// ---- Walker ----

/// Directory names skipped by the walker unless overridden.
pub const DEFAULT_WALKER_SKIP: &[&str] = &[".git", "node_modules"];

/// Base names starting with this character are hidden.
pub const HIDDEN_PREFIX: char = '.';

/// KiB to bytes. Zero and sizes that do not fit in `usize` yield `None`.
pub fn kib_to_bytes(kb: usize) -> Option<usize> {
    if kb == 0 {
        return None;
    }
    kb.checked_mul(1024)
}

/// Read a size override in KiB from `var`. Missing, unparsable, zero, or overflowing values yield `None`.
pub fn kib_from_env(var: &str) -> Option<usize> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .and_then(kib_to_bytes)
}
