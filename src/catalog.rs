//! Builds the numbered set of paths offered for editing.

use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::clean_path;
use crate::models::{DirGrouping, Entry, RunConfig, SortKey};
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where catalog paths come from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Source {
    /// A path argument. Directories are expanded to their children unless
    /// directory-name mode is on.
    Path(String),
    /// Newline separated paths, typically read from stdin. Never expanded.
    Listing(String),
}

/// The pre-edit enumeration of managed paths, counters starting at 1.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    /// Builds a catalog from explicit entries, renumbering them in order.
    pub fn from_paths(paths: impl IntoIterator<Item = (PathBuf, bool)>) -> Self {
        let entries = paths
            .into_iter()
            .enumerate()
            .map(|(index, (path, is_dir))| Entry::new(index + 1, path, is_dir))
            .collect();
        Self { entries }
    }

    /// Enumerates `sources` applying the filters and ordering in `config`.
    pub fn build<F: FileSystem>(fs: &F, config: &RunConfig, sources: &[Source]) -> Result<Self> {
        let mut collector = Collector {
            fs,
            config,
            paths: Vec::new(),
            seen: HashSet::new(),
        };
        for source in sources {
            match source {
                Source::Path(name) => collector.add(name, !config.dirnames)?,
                Source::Listing(text) => {
                    for line in text.lines() {
                        let name = line.trim_end_matches('\r');
                        if name.is_empty() || name == "." {
                            continue;
                        }
                        collector.add(name, false)?;
                    }
                }
            }
        }

        let mut paths = collector.paths;
        if paths.is_empty() {
            return Err(CoreError::EmptyCatalog {
                what: empty_description(config),
            });
        }

        if let Some(key) = config.sort {
            sort_paths(fs, &mut paths, key)?;
            if config.sort_reverse {
                paths.reverse();
            }
        }
        match config.group_dirs {
            DirGrouping::None => {}
            DirGrouping::First => paths.sort_by_key(|(_, is_dir)| !*is_dir),
            DirGrouping::Last => paths.sort_by_key(|(_, is_dir)| *is_dir),
        }

        let catalog = Self::from_paths(paths);
        debug!("catalog holds {} entries", catalog.len());
        Ok(catalog)
    }

    /// Flags entries the version-control tool reports as tracked.
    pub fn mark_tracked(&mut self, mut is_tracked: impl FnMut(&Path) -> bool) {
        for entry in &mut self.entries {
            entry.tracked = is_tracked(&entry.original_path);
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, counter: usize) -> Option<&Entry> {
        counter
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Collector<'a, F: FileSystem> {
    fs: &'a F,
    config: &'a RunConfig,
    paths: Vec<(PathBuf, bool)>,
    seen: HashSet<PathBuf>,
}

impl<F: FileSystem> Collector<'_, F> {
    fn add(&mut self, name: &str, expand: bool) -> Result<()> {
        let path = clean_path(Path::new(name));
        if !self.fs.exists(&path) {
            return Err(CoreError::MissingPath(PathBuf::from(name)));
        }

        if expand && self.fs.is_dir(&path) {
            for child in self.fs.list_dir(&path)? {
                let child = clean_path(&child);
                if self.config.all || !is_hidden(&child) {
                    self.append(child);
                }
            }
        } else {
            self.append(path);
        }
        Ok(())
    }

    fn append(&mut self, path: PathBuf) {
        let is_dir = self.fs.is_dir(&path);
        if (self.config.files_only && is_dir) || (self.config.dirs_only && !is_dir) {
            return;
        }
        if self.config.nolinks && self.fs.is_symlink(&path) {
            return;
        }
        if self.seen.insert(path.clone()) {
            self.paths.push((path, is_dir));
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn sort_paths<F: FileSystem>(fs: &F, paths: &mut Vec<(PathBuf, bool)>, key: SortKey) -> Result<()> {
    match key {
        SortKey::Name => paths.sort_by(|a, b| a.0.as_os_str().cmp(b.0.as_os_str())),
        SortKey::Time | SortKey::Size => {
            let mut keyed = paths
                .drain(..)
                .map(|item| fs.stat(&item.0).map(|stat| (stat, item)))
                .collect::<Result<Vec<_>>>()?;
            if key == SortKey::Time {
                keyed.sort_by_key(|((_, modified), _)| *modified);
            } else {
                keyed.sort_by_key(|((size, _), _)| *size);
            }
            paths.extend(keyed.into_iter().map(|(_, item)| item));
        }
    }
    Ok(())
}

fn empty_description(config: &RunConfig) -> &'static str {
    if config.files_only {
        "files"
    } else if config.dirs_only {
        "directories"
    } else {
        "files or directories"
    }
}
