//! Default options read from `$XDG_CONFIG_HOME/edir-flags.conf`.

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const FLAGS_FILE: &str = "edir-flags.conf";

pub fn flags_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(FLAGS_FILE))
}

/// Splits the contents of a flags file into arguments. Everything from a
/// `#` to the end of its line is a comment.
pub fn parse_flags(text: &str) -> Result<Vec<String>> {
    let stripped: Vec<&str> = text
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(flags, _)| flags))
        .collect();
    shlex::split(&stripped.join(" ")).ok_or_else(|| anyhow!("unbalanced quotes"))
}

fn read_flags(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let flags = parse_flags(&text).with_context(|| format!("parsing {}", path.display()))?;
    debug!("default flags from {}: {:?}", path.display(), flags);
    Ok(flags)
}

/// The process arguments with default flags inserted after the program name.
pub fn command_line(mut args: impl Iterator<Item = OsString>) -> Result<Vec<OsString>> {
    let mut full: Vec<OsString> = args.next().into_iter().collect();
    if let Some(path) = flags_file() {
        full.extend(read_flags(&path)?.into_iter().map(OsString::from));
    }
    full.extend(args);
    Ok(full)
}
