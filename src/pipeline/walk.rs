//! Walker driver: recursive directory traversal emitting paths as records.

use anyhow::anyhow;
use log::{debug, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::Result;
use crate::engine::slab::{Record, SlabAllocator};
use crate::engine::tools::{display_path, is_hidden_name, is_ignored_name, path_to_bytes};
use crate::pipeline::context::{ReaderState, is_killed};
use crate::types::WalkerOpts;

/// Result of one visited entry.
enum Visit {
    /// Emit (or not) and keep going.
    Continue,
    /// Do not descend into this directory.
    SkipDir,
}

/// Decide what to do with an entry below the root.
fn classify(name: &OsStr, is_dir: bool, opts: &WalkerOpts, ignores: &[String]) -> (Visit, bool) {
    if !opts.hidden && is_hidden_name(name) {
        return (if is_dir { Visit::SkipDir } else { Visit::Continue }, false);
    }
    if is_dir && is_ignored_name(name, ignores) {
        return (Visit::SkipDir, false);
    }
    let emit = (opts.file && !is_dir) || (opts.dir && is_dir);
    (Visit::Continue, emit)
}

/// Walk `root` in traversal order, calling `on_record` for every entry whose
/// type matches `opts`. Unreadable entries are skipped; an unreadable root is
/// an error. The killed flag in `state` is checked after every visited entry.
pub fn read_files<F>(
    root: &Path,
    opts: &WalkerOpts,
    ignores: &[String],
    state: &Mutex<ReaderState>,
    slabs: &mut SlabAllocator,
    mut on_record: F,
) -> Result<()>
where
    F: FnMut(Record),
{
    let mut it = WalkDir::new(root).follow_links(opts.follow).into_iter();
    let mut count = 0_usize;
    let mut skipped: Vec<(PathBuf, String)> = Vec::new();

    while let Some(next) = it.next() {
        match next {
            Ok(entry) if entry.depth() > 0 => {
                let is_dir = entry.file_type().is_dir();
                let (visit, emit) = classify(entry.file_name(), is_dir, opts, ignores);
                if emit {
                    let path = display_path(entry.path(), root, opts.relative);
                    on_record(slabs.alloc(&path_to_bytes(&path), &[]));
                    count += 1;
                }
                if matches!(visit, Visit::SkipDir) {
                    it.skip_current_dir();
                }
            }
            Ok(_) => {}
            Err(err) if err.depth() == 0 => {
                return Err(anyhow!("cannot walk {}: {}", root.display(), err));
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("<unknown>"));
                skipped.push((path, err.to_string()));
            }
        }
        if is_killed(state) {
            debug!("walker: cancelled after {} paths", count);
            return Ok(());
        }
    }

    if !skipped.is_empty() {
        warn!(
            "Skipped {} entries due to permission errors or access issues",
            skipped.len()
        );
        for (path, msg) in &skipped {
            debug!("  skipped: {} ({})", path.display(), msg);
        }
    }
    debug!("walker: {} paths under {}", count, root.display());
    Ok(())
}
