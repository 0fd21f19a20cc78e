use crate::errors::CoreError;
use std::path::PathBuf;

/// How the version-control backend is selected for a run.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum GitMode {
    /// Use git when run inside a repository, otherwise fall back silently.
    #[default]
    Auto,
    /// Require git; running outside a repository is a configuration error.
    Always,
    /// Never use git.
    Never,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortKey {
    Name,
    Time,
    Size,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum DirGrouping {
    #[default]
    None,
    First,
    Last,
}

/// Resolved configuration handed to the core by the CLI layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub all: bool,
    pub recurse: bool,
    pub quiet: bool,
    pub git: GitMode,
    pub dirnames: bool,
    pub trash: bool,
    pub trash_program: String,
    pub files_only: bool,
    pub dirs_only: bool,
    pub nolinks: bool,
    pub suffix: String,
    pub sort: Option<SortKey>,
    pub sort_reverse: bool,
    pub group_dirs: DirGrouping,
    pub args: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            all: false,
            recurse: false,
            quiet: false,
            git: GitMode::Auto,
            dirnames: false,
            trash: false,
            trash_program: "trash-put".to_string(),
            files_only: false,
            dirs_only: false,
            nolinks: false,
            suffix: ".sh".to_string(),
            sort: None,
            sort_reverse: false,
            group_dirs: DirGrouping::None,
            args: Vec::new(),
        }
    }
}

/// One managed path. `counter` is fixed once the catalog is built.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
    pub counter: usize,
    pub original_path: PathBuf,
    pub is_directory: bool,
    /// Whether the version-control tool tracks this path.
    pub tracked: bool,
}

impl Entry {
    pub fn new(counter: usize, original_path: PathBuf, is_directory: bool) -> Self {
        Self {
            counter,
            original_path,
            is_directory,
            tracked: false,
        }
    }
}

/// One parsed line of the edited listing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EditedLine {
    pub counter: usize,
    pub new_name: String,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Change {
    Unchanged { counter: usize },
    Renamed { counter: usize, from: PathBuf, to: PathBuf },
    Deleted { counter: usize, path: PathBuf },
}

impl Change {
    pub fn counter(&self) -> usize {
        match self {
            Self::Unchanged { counter }
            | Self::Renamed { counter, .. }
            | Self::Deleted { counter, .. } => *counter,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Operation {
    Remove { path: PathBuf, recursive: bool },
    RenameToTemp { from: PathBuf, temp: PathBuf },
    RenameFromTemp { temp: PathBuf, to: PathBuf },
    Rename { from: PathBuf, to: PathBuf },
}

/// Phase of the fixed execution pipeline an operation belongs to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Phase {
    DeleteFiles,
    MoveToTemp,
    DeleteEmptyDirs,
    MoveFromTemp,
    DeleteRemainingDirs,
}

/// A planned operation together with what the driver needs to run it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Step {
    pub phase: Phase,
    pub op: Operation,
    /// Catalog path the operation acts on, for reporting.
    pub subject: PathBuf,
    pub is_dir: bool,
    pub tracked: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ActionKind {
    Deleted,
    Renamed,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
        }
    }

    /// Letter used for the action in an actions file.
    pub fn letter(&self) -> char {
        match self {
            Self::Deleted => 'd',
            Self::Renamed => 'r',
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record emitted for every user-visible action, successful or not.
#[derive(Debug)]
pub struct OutcomeRecord {
    pub kind: ActionKind,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub is_dir: bool,
    /// A directory with contents was removed recursively.
    pub recursive: bool,
    /// Where the item was left when a rename failed half way.
    pub stranded_at: Option<PathBuf>,
    pub error: Option<CoreError>,
}

impl OutcomeRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ExitStatusLike {
    Ok,
    Partial,
    Error,
}

impl ExitStatusLike {
    pub fn from_counts(applied: usize, failed: usize) -> Self {
        match (applied, failed) {
            (_, 0) => Self::Ok,
            (0, _) => Self::Error,
            _ => Self::Partial,
        }
    }

    pub fn as_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Partial => 1,
            Self::Error => 2,
        }
    }
}
