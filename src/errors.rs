use std::{fmt, io, path::PathBuf};

/// Shared error type used by the core and the `edir` binary.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// File system I/O failure.
    #[error("{1} ({0})")]
    Io(PathBuf, #[source] io::Error),

    /// The edited listing could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Nothing matched the sources and filters; not a failure.
    #[error("No {what}.")]
    EmptyCatalog { what: &'static str },

    /// A path named on the command line or stdin does not exist.
    #[error("{0} does not exist")]
    MissingPath(PathBuf),

    /// An operation was rejected due to configuration/argument issues.
    #[error("invalid command input: {0}")]
    InvalidInput(String),

    /// Non-recursive removal of a directory that still has children.
    #[error("Directory not empty")]
    DirectoryNotEmpty(PathBuf),

    /// The final target of a rename appeared after planning.
    #[error("target {0} already exists")]
    TargetExists(PathBuf),

    /// The source of an operation disappeared after the catalog was built.
    #[error("source {0} vanished")]
    SourceVanished(PathBuf),

    /// An external backend program failed.
    #[error("{program} error: {message}")]
    Backend { program: String, message: String },

    /// The editor could not be run or exited with an error.
    #[error("editor failed: {0}")]
    Editor(String),

    /// A backend that was explicitly requested cannot be used.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    pub fn backend(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            program: program.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }
}

/// What was wrong with a line of the edited listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The line does not start with a counter.
    MissingCounter,
    /// The counter does not fit in an integer.
    InvalidCounter(String),
    /// The counter is not followed by whitespace.
    MissingSeparator,
    /// Nothing follows the counter.
    EmptyName,
    /// The counter is not in `1..=max`.
    OutOfRange { counter: u64, max: usize },
    /// The counter was already used on an earlier line.
    DuplicateCounter(u64),
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCounter => write!(f, "does not start with a number"),
            Self::InvalidCounter(digits) => write!(f, "number {digits} invalid"),
            Self::MissingSeparator => write!(f, "number is not followed by whitespace"),
            Self::EmptyName => write!(f, "has no name after the number"),
            Self::OutOfRange { counter, .. } => write!(f, "number {counter} out of range"),
            Self::DuplicateCounter(counter) => write!(f, "number {counter} repeated"),
        }
    }
}

/// A malformed line in the edited listing. Raised before any mutation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line} {kind}:\n{text}")]
pub struct FormatError {
    pub line: usize,
    pub kind: FormatErrorKind,
    pub text: String,
}

impl FormatError {
    pub fn new(line: usize, kind: FormatErrorKind, text: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            text: text.into(),
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
