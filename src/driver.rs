//! Runs a plan one step at a time, isolating failures per operation.

use crate::backend::Backends;
use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::parent_dir;
use crate::models::{ActionKind, ExitStatusLike, Operation, OutcomeRecord, Phase, Step};
use crate::planner::Plan;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct Report {
    pub records: Vec<OutcomeRecord>,
}

impl Report {
    pub fn applied(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(|r| r.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(|r| !r.succeeded())
    }

    pub fn status(&self) -> ExitStatusLike {
        ExitStatusLike::from_counts(self.applied().count(), self.failed().count())
    }
}

pub struct Driver<'a, F> {
    fs: &'a F,
    backends: &'a Backends<'a, F>,
    /// Final target of every temporary in the plan.
    finals: HashMap<PathBuf, PathBuf>,
    removed: HashSet<PathBuf>,
    stranded: HashSet<PathBuf>,
    phase: Option<Phase>,
    report: Report,
}

impl<'a, F: FileSystem> Driver<'a, F> {
    pub fn new(fs: &'a F, backends: &'a Backends<'a, F>, plan: &Plan) -> Self {
        let finals = plan
            .steps
            .iter()
            .filter_map(|step| match &step.op {
                Operation::RenameFromTemp { temp, to } => Some((temp.clone(), to.clone())),
                _ => None,
            })
            .collect();
        Self {
            fs,
            backends,
            finals,
            removed: HashSet::new(),
            stranded: HashSet::new(),
            phase: None,
            report: Report::default(),
        }
    }

    /// Executes `step`, recording its outcome. Never aborts the run.
    pub fn run_step(&mut self, step: &Step) {
        if self.phase != Some(step.phase) {
            info!("entering phase {:?}", step.phase);
            self.phase = Some(step.phase);
        }
        debug!("{:?}", step.op);

        match &step.op {
            Operation::Remove { path, recursive } => self.remove(step, path, *recursive),
            Operation::RenameToTemp { from, temp } => {
                let result = self.stage(step, from, temp);
                if let Err(err) = result {
                    self.stranded.insert(temp.clone());
                    let to = self.finals.get(temp).cloned();
                    self.record(ActionKind::Renamed, step, to, false, Some(err));
                }
            }
            Operation::RenameFromTemp { temp, to } => {
                if self.stranded.contains(temp) {
                    return;
                }
                if let Err(err) = self.move_into_place(step, temp, to) {
                    warn!("{} left at {}", step.subject.display(), temp.display());
                    self.record(ActionKind::Renamed, step, Some(to.clone()), false, Some(err));
                    if let Some(record) = self.report.records.last_mut() {
                        record.stranded_at = Some(temp.clone());
                    }
                } else {
                    self.record(ActionKind::Renamed, step, Some(to.clone()), false, None);
                }
            }
            Operation::Rename { from, to } => {
                let result = self
                    .check_source(from)
                    .and_then(|_| self.move_into_place(step, from, to));
                self.record(ActionKind::Renamed, step, Some(to.clone()), false, result.err());
            }
        }
    }

    /// Removes the temporary directories the plan used, if they are empty,
    /// and returns the collected report.
    pub fn finish(self, plan: &Plan) -> Report {
        for dir in &plan.temp_dirs {
            if !self.fs.is_dir(dir) {
                continue;
            }
            if self.fs.has_children(dir) {
                warn!("temporaries left in {}", dir.display());
            } else if let Err(err) = self.fs.remove_dir(dir) {
                debug!("could not remove {}: {err}", dir.display());
            }
        }
        self.report
    }

    fn remove(&mut self, step: &Step, path: &Path, recursive: bool) {
        if self.removed.contains(path) {
            return;
        }
        let had_children = self.fs.has_children(path);
        let result = self.check_source(path).and_then(|_| {
            if had_children && !recursive {
                return Err(CoreError::DirectoryNotEmpty(path.to_path_buf()));
            }
            let is_dir = self.fs.is_dir(path) && !self.fs.is_symlink(path);
            let backend = self.backends.for_remove(step.tracked, is_dir);
            debug!("removing {} via {}", path.display(), backend.name());
            backend.remove(path, recursive)
        });

        match result {
            Ok(()) => {
                self.removed.insert(path.to_path_buf());
                self.record(ActionKind::Deleted, step, None, had_children, None);
            }
            Err(err) if step.phase == Phase::DeleteEmptyDirs => {
                debug!("deferring removal of {}: {err}", path.display());
            }
            Err(err) => self.record(ActionKind::Deleted, step, None, false, Some(err)),
        }
    }

    fn stage(&self, step: &Step, from: &Path, temp: &Path) -> Result<()> {
        self.check_source(from)?;
        self.fs.create_dir_all(&parent_dir(temp))?;
        self.backends.for_move(step.tracked).move_path(from, temp)
    }

    fn move_into_place(&self, step: &Step, from: &Path, to: &Path) -> Result<()> {
        if self.fs.exists(to) {
            return Err(CoreError::TargetExists(to.to_path_buf()));
        }
        let backend = self.backends.for_move(step.tracked);
        debug!("moving {} to {} via {}", from.display(), to.display(), backend.name());
        backend.move_path(from, to)
    }

    fn check_source(&self, path: &Path) -> Result<()> {
        if self.fs.exists(path) {
            Ok(())
        } else {
            Err(CoreError::SourceVanished(path.to_path_buf()))
        }
    }

    fn record(
        &mut self,
        kind: ActionKind,
        step: &Step,
        destination: Option<PathBuf>,
        recursive: bool,
        error: Option<CoreError>,
    ) {
        if let Some(err) = &error {
            debug!("{kind} {} failed: {err}", step.subject.display());
        }
        self.report.records.push(OutcomeRecord {
            kind,
            source: step.subject.clone(),
            destination,
            is_dir: step.is_dir,
            recursive,
            stranded_at: None,
            error,
        });
    }
}

/// Executes every step of `plan` in order.
pub fn execute<F: FileSystem>(fs: &F, backends: &Backends<'_, F>, plan: &Plan) -> Report {
    let mut driver = Driver::new(fs, backends, plan);
    for step in &plan.steps {
        driver.run_step(step);
    }
    driver.finish(plan)
}
