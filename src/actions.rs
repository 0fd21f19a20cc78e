//! Actions files: a plain record of operations that failed, which can be
//! edited and replayed without going through the numbered listing again.
//!
//! ```text
//! # workdir: /home/me/photos
//! d ./old draft
//! r ./img 1.jpg → ./holiday.jpg
//! ```

use crate::catalog::{Catalog, Source};
use crate::driver::Report;
use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::{clean_path, RELATIVE_MARKER};
use crate::models::{ActionKind, EditedLine, RunConfig};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};

const ARROW: &str = " → ";
const WORKDIR_PREFIX: &str = "workdir:";

const HEADER: &str = "\
#
# Be careful when editing this file. The order of entries matters, and so
# does whitespace: everything after the action letter and one space is the
# file name.
#
# Format of this file:
#  d <path>                 delete <path>
#  r <path> → <new path>    rename <path>
#
# The arrow must have exactly one space on each side. File names containing
# the arrow cannot be expressed in this file.
#
# Empty lines and lines starting with a hash mark (#) are ignored.
";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Action {
    Delete(PathBuf),
    Rename(PathBuf, PathBuf),
}

impl Action {
    pub fn source(&self) -> &Path {
        match self {
            Self::Delete(path) | Self::Rename(path, _) => path,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Delete(path) => format!("{} {}", ActionKind::Deleted.letter(), shown(path)),
            Self::Rename(from, to) => format!(
                "{} {}{ARROW}{}",
                ActionKind::Renamed.letter(),
                shown(from),
                shown(to)
            ),
        }
    }
}

fn shown(path: &Path) -> String {
    if path.is_absolute() {
        path.display().to_string()
    } else {
        format!("{RELATIVE_MARKER}{}", path.display())
    }
}

/// The actions that failed in `report`, ready to be written out.
pub fn failed_actions(report: &Report) -> Vec<Action> {
    report
        .failed()
        .map(|record| {
            let source = record.stranded_at.as_ref().unwrap_or(&record.source).clone();
            match (record.kind, &record.destination) {
                (ActionKind::Renamed, Some(to)) => Action::Rename(source, to.clone()),
                _ => Action::Delete(source),
            }
        })
        .collect()
}

/// Full text of an actions file for `actions` run from `workdir`.
pub fn render(workdir: &Path, actions: &[Action]) -> String {
    let mut text = format!("# {WORKDIR_PREFIX} {}\n{HEADER}\n", workdir.display());
    for action in actions {
        text.push_str(&action.render());
        text.push('\n');
    }
    text
}

/// Writes a new actions file named after the current time, in `dir` if
/// possible and in the system temp directory otherwise.
pub fn write_actions_file(dir: &Path, workdir: &Path, actions: &[Action]) -> Result<PathBuf> {
    let prefix = format!("edir-actions-{}-", Local::now().format("%Y-%m-%d_%H.%M.%S"));
    let builder = {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        builder
    };
    let mut file = builder
        .tempfile_in(dir)
        .or_else(|_| builder.tempfile())
        .map_err(|err| CoreError::io(dir, err))?;

    file.write_all(render(workdir, actions).as_bytes())
        .map_err(|err| CoreError::io(file.path(), err))?;
    let (_, path) = file
        .keep()
        .map_err(|err| CoreError::io(&prefix, err.error))?;
    Ok(path)
}

/// A parsed actions file.
#[derive(Debug, Default)]
pub struct ActionsFile {
    pub workdir: Option<PathBuf>,
    pub actions: Vec<Action>,
    /// Lines that could not be parsed, with their 1-based line numbers.
    pub invalid: Vec<(usize, String)>,
}

impl ActionsFile {
    pub fn parse(text: &str) -> Result<Self> {
        let mut parsed = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_start();
            if let Some(comment) = line.strip_prefix('#') {
                if let Some(dir) = comment.trim_start().strip_prefix(WORKDIR_PREFIX) {
                    let dir = PathBuf::from(dir.trim());
                    if let Some(previous) = &parsed.workdir {
                        return Err(CoreError::invalid_input(format!(
                            "workdir was specified multiple times in the actions file ({} and {})",
                            previous.display(),
                            dir.display()
                        )));
                    }
                    parsed.workdir = Some(dir);
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }
            match parse_action(line) {
                Some(action) => parsed.actions.push(action),
                None => parsed.invalid.push((index + 1, raw.to_string())),
            }
        }
        Ok(parsed)
    }

    /// Turns the actions into a catalog plus the edited lines that express
    /// them, so they run through the usual reconcile/plan/execute pipeline.
    /// A later action on the same path replaces an earlier one.
    pub fn replay<F: FileSystem>(
        &self,
        fs: &F,
        config: &RunConfig,
    ) -> Result<(Catalog, Vec<EditedLine>)> {
        let mut sources = String::new();
        for action in &self.actions {
            sources.push_str(&action.source().display().to_string());
            sources.push('\n');
        }
        let replay_config = RunConfig {
            dirnames: true,
            files_only: false,
            dirs_only: false,
            nolinks: false,
            sort: None,
            group_dirs: Default::default(),
            ..config.clone()
        };
        let catalog = Catalog::build(fs, &replay_config, &[Source::Listing(sources)])?;

        let mut lines: Vec<EditedLine> = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            let source = clean_path(action.source());
            let Some(entry) = catalog.entries().iter().find(|e| e.original_path == source) else {
                continue;
            };
            let line = match action {
                Action::Delete(_) => EditedLine {
                    counter: entry.counter,
                    new_name: String::new(),
                    is_deleted: true,
                },
                Action::Rename(_, to) => EditedLine {
                    counter: entry.counter,
                    new_name: to.display().to_string(),
                    is_deleted: false,
                },
            };
            lines.retain(|l| l.counter != line.counter);
            lines.push(line);
        }
        Ok((catalog, lines))
    }
}

fn parse_action(line: &str) -> Option<Action> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    let rest = chars.as_str().strip_prefix(' ')?;
    if rest.is_empty() {
        return None;
    }
    match letter {
        'd' if !rest.contains('→') => Some(Action::Delete(clean_path(Path::new(rest)))),
        'r' => {
            let (from, to) = rest.split_once(ARROW)?;
            if from.is_empty() || to.is_empty() || from.contains('→') || to.contains('→') {
                return None;
            }
            Some(Action::Rename(
                clean_path(Path::new(from)),
                clean_path(Path::new(to)),
            ))
        }
        _ => None,
    }
}
