//! Core of `edir`: rename and delete paths by editing a numbered listing.
//!
//! The pipeline is catalog → codec (serialize) → editor → codec (parse) →
//! reconcile → plan → execute. Editor invocation and console output live
//! in the `edir` binary; this crate performs no terminal I/O.

pub mod actions;
pub mod backend;
pub mod catalog;
pub mod codec;
pub mod driver;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod models;
pub mod planner;
pub mod reconcile;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, Backends, GitBackend, NativeBackend, TrackedSet, TrashBackend};
pub use catalog::{Catalog, Source};
pub use driver::{execute, Driver, Report};
pub use errors::{CoreError, FormatError, FormatErrorKind, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use models::{
    ActionKind,
    Change,
    DirGrouping,
    EditedLine,
    Entry,
    ExitStatusLike,
    GitMode,
    Operation,
    OutcomeRecord,
    Phase,
    RunConfig,
    SortKey,
    Step,
};
pub use planner::{plan, Plan};
pub use reconcile::reconcile;
pub use session::{apply, edit_listing, Editor};

/// Re-export a small stable API surface for the binary.
pub mod prelude {
    pub use crate::{
        actions::{self, Action, ActionsFile},
        backend::Backends,
        catalog::{Catalog, Source},
        codec,
        driver::{execute, Report},
        errors::{CoreError, Result},
        fs::{FileSystem, RealFileSystem},
        helpers::*,
        models::*,
        planner::plan,
        reconcile::{has_work, reconcile},
        session::{apply, edit_listing, Editor},
    };
}
