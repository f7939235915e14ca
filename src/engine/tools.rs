//! Path and filter utilities

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::utils::config::HIDDEN_PREFIX;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// preceding normal components. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Path as emitted by the walker: relative to `root` when asked, always cleaned.
pub fn display_path(path: &Path, root: &Path, relative: bool) -> PathBuf {
    if relative && let Some(rel) = path_relative_to(path, root) {
        return clean_path(&rel);
    }
    clean_path(path)
}

/// True if the base name marks a hidden entry.
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with(HIDDEN_PREFIX)
}

/// True if the base name is in the ignore set.
pub fn is_ignored_name(name: &OsStr, ignores: &[String]) -> bool {
    ignores.iter().any(|ignore| OsStr::new(ignore) == name)
}

/// Raw bytes of a path for use as a record.
#[cfg(unix)]
pub fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
pub fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}
