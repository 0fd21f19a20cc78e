//! Path helpers shared by the catalog, reconciler and planner.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Name of the directory holding temporaries, created next to each target.
pub const TEMP_DIR_NAME: &str = ".tmp-edir";

/// Marker prefixed to relative paths in the listing.
pub const RELATIVE_MARKER: &str = "./";

/// Path as shown in messages: directories get a trailing separator.
pub fn display_path(path: &Path, is_dir: bool) -> String {
    let mut shown = path.display().to_string();
    if is_dir && !shown.ends_with(MAIN_SEPARATOR) {
        shown.push(MAIN_SEPARATOR);
    }
    shown
}

/// Path as written in the listing: relative paths get `./` so leading
/// whitespace in names stays visible, directories a trailing separator.
pub fn listing_path(path: &Path, is_dir: bool) -> String {
    let shown = display_path(path, is_dir);
    if path.is_absolute() {
        shown
    } else {
        format!("{RELATIVE_MARKER}{shown}")
    }
}

/// Drops leading `.` components, so `./a` and `a` compare equal.
pub fn clean_path(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .skip_while(|c| matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Resolves an edited name back to a path: trailing separators and the
/// relative marker are presentation only.
pub fn resolve_listing_name(name: &str) -> PathBuf {
    let trimmed = if name.len() > 1 {
        name.trim_end_matches(MAIN_SEPARATOR)
    } else {
        name
    };
    let trimmed = if trimmed.is_empty() { name } else { trimmed };
    clean_path(Path::new(trimmed))
}

/// Builds the `n`th disambiguated sibling of `path`: `name~` for 0,
/// `name~n` after that.
pub fn build_unique_basename(path: &Path, n: u64) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|v| v.to_os_string())
        .unwrap_or_else(|| OsString::from("item"));
    if n == 0 {
        name.push("~");
    } else {
        name.push(format!("~{n}"));
    }
    path.with_file_name(name)
}

/// Returns `path` if it is free, otherwise the disambiguated sibling with
/// the lowest unused suffix.
pub fn unique_path(path: &Path, mut taken: impl FnMut(&Path) -> bool) -> PathBuf {
    if !taken(path) {
        return path.to_path_buf();
    }
    (0..)
        .map(|n| build_unique_basename(path, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| path.to_path_buf())
}

/// Directory that contains `path`, with `.` for bare names.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Directory that holds the temporary for a rename onto `target`.
pub fn temp_dir_for(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(TEMP_DIR_NAME),
        _ => PathBuf::from(TEMP_DIR_NAME),
    }
}
