//! Executors for the two primitive mutations, `move` and `remove`.
//!
//! The native backend works through [`FileSystem`]; the git and trash
//! backends shell out to external programs. Which one handles a step is
//! decided per path by [`Backends`].

use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::clean_path;
use crate::models::{GitMode, RunConfig};
use log::{debug, warn};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub trait Backend {
    fn name(&self) -> &str;

    fn move_path(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove(&self, path: &Path, recursive: bool) -> Result<()>;
}

/// Direct filesystem moves and removals.
#[derive(Debug, Clone, Copy)]
pub struct NativeBackend<F> {
    fs: F,
}

impl<F: FileSystem> NativeBackend<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> Backend for NativeBackend<F> {
    fn name(&self) -> &str {
        "native"
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        self.fs.rename(from, to)
    }

    fn remove(&self, path: &Path, recursive: bool) -> Result<()> {
        if self.fs.is_symlink(path) || !self.fs.is_dir(path) {
            self.fs.remove_file(path)
        } else if recursive {
            self.fs.remove_dir_all(path)
        } else {
            self.fs.remove_dir(path)
        }
    }
}

/// Paths known to git, as reported by `git ls-files`.
#[derive(Debug, Clone, Default)]
pub struct TrackedSet {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl TrackedSet {
    pub fn from_listing(listing: &str) -> Self {
        let mut set = Self::default();
        for name in listing.split(['\0', '\n']).filter(|n| !n.is_empty()) {
            let path = clean_path(Path::new(name));
            for ancestor in path.ancestors().skip(1) {
                if ancestor.as_os_str().is_empty() {
                    break;
                }
                set.dirs.insert(ancestor.to_path_buf());
            }
            set.files.insert(path);
        }
        set
    }

    /// A file is tracked if listed; a directory if anything below it is.
    pub fn is_tracked(&self, path: &Path) -> bool {
        let path = clean_path(path);
        self.files.contains(&path) || self.dirs.contains(&path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Moves and removals through `git mv` and `git rm`.
#[derive(Debug, Clone, Default)]
pub struct GitBackend {
    workdir: Option<PathBuf>,
}

impl GitBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs git in `workdir` instead of the current directory.
    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(workdir.into()),
        }
    }

    /// Queries git once for every tracked path.
    pub fn tracked_files(&self) -> Result<TrackedSet> {
        let output = run_program("git", ["ls-files", "-z"], self.workdir.as_deref())?;
        Ok(TrackedSet::from_listing(&output))
    }

    fn git<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        run_program("git", args, self.workdir.as_deref()).map(drop)
    }
}

impl Backend for GitBackend {
    fn name(&self) -> &str {
        "git"
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        self.git([
            OsStr::new("mv"),
            OsStr::new("-f"),
            OsStr::new("--"),
            from.as_os_str(),
            to.as_os_str(),
        ])
    }

    fn remove(&self, path: &Path, recursive: bool) -> Result<()> {
        let mut args = vec![OsStr::new("rm"), OsStr::new("-f"), OsStr::new("-q")];
        if recursive {
            args.push(OsStr::new("-r"));
        }
        args.push(OsStr::new("--"));
        args.push(path.as_os_str());
        self.git(args)
    }
}

/// Removals through an external trash program such as `trash-put`.
/// Moves are not affected by trash mode.
#[derive(Debug, Clone)]
pub struct TrashBackend<F> {
    program: String,
    workdir: Option<PathBuf>,
    native: NativeBackend<F>,
}

impl<F: FileSystem> TrashBackend<F> {
    pub fn new(program: impl Into<String>, fs: F) -> Self {
        Self {
            program: program.into(),
            workdir: None,
            native: NativeBackend::new(fs),
        }
    }

    /// Runs the trash program in `workdir` instead of the current directory.
    pub fn in_dir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Fails unless `program` can be found on `PATH`.
    pub fn discover(program: impl Into<String>, fs: F) -> Result<Self> {
        let program = program.into();
        which::which(&program)
            .map_err(|_| CoreError::unavailable(format!("trash program {program} not found")))?;
        Ok(Self::new(program, fs))
    }
}

impl<F: FileSystem> Backend for TrashBackend<F> {
    fn name(&self) -> &str {
        &self.program
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<()> {
        self.native.move_path(from, to)
    }

    fn remove(&self, path: &Path, _recursive: bool) -> Result<()> {
        run_program(
            &self.program,
            [OsStr::new("--"), path.as_os_str()],
            self.workdir.as_deref(),
        )
        .map(drop)
    }
}

/// The backends selected for a run plus git's view of which paths it owns.
pub struct Backends<'a, F> {
    native: NativeBackend<&'a F>,
    git: Option<GitBackend>,
    trash: Option<TrashBackend<&'a F>>,
    tracked: TrackedSet,
}

impl<'a, F: FileSystem> Backends<'a, F> {
    pub fn native(fs: &'a F) -> Self {
        Self {
            native: NativeBackend::new(fs),
            git: None,
            trash: None,
            tracked: TrackedSet::default(),
        }
    }

    pub fn with_git(mut self, git: GitBackend, tracked: TrackedSet) -> Self {
        self.git = Some(git);
        self.tracked = tracked;
        self
    }

    pub fn with_trash(mut self, trash: TrashBackend<&'a F>) -> Self {
        self.trash = Some(trash);
        self
    }

    /// Probes the external tools `config` asks for. A backend requested
    /// explicitly but unusable is an error; automatic git falls back to
    /// native silently.
    pub fn discover(fs: &'a F, config: &RunConfig) -> Result<Self> {
        let mut backends = Self::native(fs);

        if config.git != GitMode::Never {
            let git = GitBackend::new();
            match git.tracked_files() {
                Ok(tracked) if !tracked.is_empty() => backends = backends.with_git(git, tracked),
                Ok(_) | Err(_) if config.git == GitMode::Always => {
                    return Err(CoreError::unavailable(
                        "must be within a git repo to use -g/--git option",
                    ));
                }
                Ok(_) => debug!("git reports no tracked files, using native backend"),
                Err(err) => debug!("git unavailable ({err}), using native backend"),
            }
        }

        if config.trash {
            backends = backends.with_trash(TrashBackend::discover(&config.trash_program, fs)?);
        }
        Ok(backends)
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.git.is_some() && self.tracked.is_tracked(path)
    }

    /// Backend for moving an entry.
    pub fn for_move(&self, tracked: bool) -> &dyn Backend {
        match &self.git {
            Some(git) if tracked => git,
            _ => &self.native,
        }
    }

    /// Backend for removing an entry: git for tracked files, then trash,
    /// then native. Directories never go through `git rm`, which only
    /// knows about their tracked contents.
    pub fn for_remove(&self, tracked: bool, is_dir: bool) -> &dyn Backend {
        match (&self.git, &self.trash) {
            (Some(git), _) if tracked && !is_dir => git,
            (_, Some(trash)) => trash,
            _ => &self.native,
        }
    }
}

/// Runs an external program to completion, returning its stdout.
fn run_program<I, S>(program: &str, args: I, workdir: Option<&Path>) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }
    let output = command
        .output()
        .map_err(|err| CoreError::backend(program, err.to_string()))?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        let message = if stderr.is_empty() {
            match output.status.code() {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            }
        } else {
            stderr
        };
        return Err(CoreError::backend(program, message));
    }
    if !stderr.is_empty() {
        warn!("{program}: {stderr}");
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
