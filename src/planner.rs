//! Orders changes into a sequence that never overwrites or loses data.
//!
//! The pipeline has five fixed phases:
//!
//! 1. deleted files are removed;
//! 2. renamed entries move to a temporary next to their target (or straight
//!    to the target when nothing else in the batch can be in the way);
//! 3. deleted directories are removed if they are already empty;
//! 4. temporaries move to their final names;
//! 5. deleted directories still present are removed.
//!
//! Every original name of a renamed entry is vacated in phase 2, so swaps and
//! cycles resolve in phase 4 without further analysis, and a directory whose
//! children were renamed out can be deleted in the same batch.

use crate::catalog::Catalog;
use crate::fs::FileSystem;
use crate::helpers::{parent_dir, temp_dir_for, unique_path};
use crate::models::{Change, Entry, Operation, Phase, Step};
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// An ordered sequence of steps plus the temporary directories it uses.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub steps: Vec<Step>,
    /// Temporary directories the plan may create, to be cleaned up after.
    pub temp_dirs: Vec<PathBuf>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

struct Pending<'a> {
    entry: &'a Entry,
    to: &'a Path,
}

pub fn plan<F: FileSystem>(fs: &F, catalog: &Catalog, changes: &[Change], recurse: bool) -> Plan {
    let mut deleted_files = Vec::new();
    let mut deleted_dirs = Vec::new();
    let mut renamed = Vec::new();
    for change in changes {
        let entry = match catalog.get(change.counter()) {
            Some(entry) => entry,
            None => continue,
        };
        match change {
            Change::Unchanged { .. } => {}
            Change::Deleted { .. } if entry.is_directory => deleted_dirs.push(entry),
            Change::Deleted { .. } => deleted_files.push(entry),
            Change::Renamed { to, .. } => renamed.push(Pending { entry, to }),
        }
    }

    let moving: Vec<&Path> = deleted_files
        .iter()
        .chain(&deleted_dirs)
        .map(|entry| entry.original_path.as_path())
        .chain(renamed.iter().map(|p| p.entry.original_path.as_path()))
        .collect();

    let mut plan = Plan::default();
    let remove = |entry: &Entry, phase, recursive| Step {
        phase,
        op: Operation::Remove {
            path: entry.original_path.clone(),
            recursive,
        },
        subject: entry.original_path.clone(),
        is_dir: entry.is_directory,
        tracked: entry.tracked,
    };

    for entry in &deleted_files {
        plan.steps.push(remove(*entry, Phase::DeleteFiles, false));
    }

    let mut temps = HashSet::new();
    let mut finals = Vec::new();
    for pending in &renamed {
        let entry = pending.entry;
        let step = |phase, op| Step {
            phase,
            op,
            subject: entry.original_path.clone(),
            is_dir: entry.is_directory,
            tracked: entry.tracked,
        };

        if is_direct(fs, &moving, entry, pending.to) {
            plan.steps.push(step(
                Phase::MoveToTemp,
                Operation::Rename {
                    from: entry.original_path.clone(),
                    to: pending.to.to_path_buf(),
                },
            ));
            continue;
        }

        let temp_dir = temp_dir_for(pending.to);
        let name = pending.to.file_name().unwrap_or(entry.original_path.as_os_str());
        let temp = unique_path(&temp_dir.join(name), |p| temps.contains(p) || fs.exists(p));
        temps.insert(temp.clone());
        if !plan.temp_dirs.contains(&temp_dir) {
            plan.temp_dirs.push(temp_dir);
        }

        plan.steps.push(step(
            Phase::MoveToTemp,
            Operation::RenameToTemp {
                from: entry.original_path.clone(),
                temp: temp.clone(),
            },
        ));
        finals.push(step(
            Phase::MoveFromTemp,
            Operation::RenameFromTemp {
                temp,
                to: pending.to.to_path_buf(),
            },
        ));
    }

    for entry in &deleted_dirs {
        plan.steps.push(remove(*entry, Phase::DeleteEmptyDirs, recurse));
    }
    plan.steps.extend(finals);
    for entry in &deleted_dirs {
        plan.steps.push(remove(*entry, Phase::DeleteRemainingDirs, recurse));
    }

    debug!(
        "planned {} steps using {} temporary directories",
        plan.len(),
        plan.temp_dirs.len()
    );
    plan
}

/// A rename can skip the temporary when its target cannot be occupied by
/// anything else in the batch and it does not disturb other managed paths.
fn is_direct<F: FileSystem>(fs: &F, moving: &[&Path], entry: &Entry, to: &Path) -> bool {
    let parent = parent_dir(to);
    fs.is_dir(&parent)
        && !fs.exists(to)
        && moving.iter().all(|managed| {
            !to.starts_with(managed)
                && !parent.starts_with(managed)
                && (*managed == entry.original_path || !managed.starts_with(&entry.original_path))
        })
}
