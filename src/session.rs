//! One editing session: hand the listing to an editor, read it back, and
//! apply the result.

use crate::backend::Backends;
use crate::catalog::Catalog;
use crate::codec;
use crate::driver::{execute, Report};
use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::models::EditedLine;
use crate::planner::plan;
use crate::reconcile::{has_work, reconcile};
use log::info;
use std::fs;
use std::path::Path;

/// Base name of the file handed to the editor.
pub const LISTING_STEM: &str = "edir";

/// Something that lets the user edit a file in place and returns once done.
pub trait Editor {
    fn edit(&self, path: &Path) -> Result<()>;
}

impl<T> Editor for T
where
    T: Fn(&Path) -> Result<()>,
{
    fn edit(&self, path: &Path) -> Result<()> {
        self(path)
    }
}

/// Writes the listing for `catalog` to a private temporary file ending in
/// `suffix`, runs `editor` on it and parses what it left behind.
///
/// Format errors surface here, before anything on disk has been touched.
pub fn edit_listing(catalog: &Catalog, suffix: &str, editor: &dyn Editor) -> Result<Vec<EditedLine>> {
    let dir = tempfile::tempdir().map_err(|err| CoreError::io(std::env::temp_dir(), err))?;
    let path = dir.path().join(format!("{LISTING_STEM}{suffix}"));

    fs::write(&path, codec::serialize(catalog.entries())).map_err(|err| CoreError::io(&path, err))?;
    editor.edit(&path)?;
    let text = fs::read_to_string(&path).map_err(|err| CoreError::io(&path, err))?;

    Ok(codec::parse(&text, catalog.len())?)
}

/// Reconciles `lines` against `catalog`, plans and executes the result.
pub fn apply<F: FileSystem>(
    fs: &F,
    backends: &Backends<'_, F>,
    mut catalog: Catalog,
    lines: &[EditedLine],
    recurse: bool,
) -> Report {
    catalog.mark_tracked(|path| backends.is_tracked(path));
    let changes = reconcile(fs, &catalog, lines);
    if !has_work(&changes) {
        info!("no changes");
        return Report::default();
    }
    let plan = plan(fs, &catalog, &changes, recurse);
    execute(fs, backends, &plan)
}
