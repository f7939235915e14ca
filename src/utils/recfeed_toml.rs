//! Load `.recfeed.toml` from a directory (CLI only). Lib callers pass `ReaderOpts` directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::kib_to_bytes;
use crate::{Delimiter, RunSettings, WalkerOpts};

#[derive(Debug, Deserialize)]
pub(crate) struct RecfeedToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    read0: Option<bool>,
    walker: Option<String>,
    walker_root: Option<String>,
    walker_skip: Option<Vec<String>>,
    sync: Option<bool>,
    slab_kb: Option<usize>,
    buf_kb: Option<usize>,
    progress: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if missing or unparsable.
pub(crate) fn load_recfeed_toml(dir: &Path) -> Option<RecfeedToml> {
    let path = dir.join(crate::utils::config::PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_recfeed_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_recfeed_toml(s: &str) -> Result<RecfeedToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite settings field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $settings:expr, $sec_field:ident => $($field:ident).+) => {
        if let Some(v) = $sec.$sec_field {
            $settings.$($field).+ = v;
        }
    };
}

/// Apply file config to settings (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_settings(
    file: &RecfeedToml,
    settings: &mut RunSettings,
) -> crate::Result<()> {
    let sec = &file.settings;
    if let Some(read0) = sec.read0 {
        settings.reader.delimiter = Delimiter::from_read0(read0);
    }
    if let Some(ref spec) = sec.walker {
        settings.walker = WalkerOpts::parse(spec)?;
    }
    if let Some(ref root) = sec.walker_root {
        settings.walker_root = PathBuf::from(root);
    }
    if let Some(ref skip) = sec.walker_skip {
        settings.walker_skip = skip.clone();
    }
    apply_file_opt!(sec, settings, sync => reader.wait);
    if let Some(size) = sec.slab_kb.and_then(kib_to_bytes) {
        settings.reader.slab_size = size;
    }
    if let Some(size) = sec.buf_kb.and_then(kib_to_bytes) {
        settings.reader.buffer_size = size;
    }
    apply_file_opt!(sec, settings, progress => progress);
    apply_file_opt!(sec, settings, verbose => verbose);
    Ok(())
}
