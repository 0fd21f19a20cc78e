use crate::errors::CoreError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filesystem abstraction boundary for the catalog, planner and backends.
///
/// Keeping this trait narrow makes it easy to write deterministic tests and
/// allows the in-memory implementation used to simulate plans step by step.
pub trait FileSystem {
    /// Returns true when path exists (symlink-aware: a dangling link exists).
    fn exists(&self, path: &Path) -> bool;

    /// Returns true when path resolves to a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns true when path itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Size in bytes and modification time, for catalog ordering.
    fn stat(&self, path: &Path) -> crate::Result<(u64, SystemTime)>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Removes a file or symlink.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Removes an empty directory.
    fn remove_dir(&self, path: &Path) -> crate::Result<()>;

    /// Removes a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Renames/moves a path.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths, sorted by name.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;

    /// True when `path` is a real directory with at least one child.
    fn has_children(&self, path: &Path) -> bool {
        !self.is_symlink(path)
            && self.is_dir(path)
            && self.list_dir(path).map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|metadata| metadata.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn stat(&self, path: &Path) -> crate::Result<(u64, SystemTime)> {
        let metadata = fs::metadata(path).map_err(|err| CoreError::io(path, err))?;
        let modified = metadata
            .modified()
            .map_err(|err| CoreError::io(path, err))?;
        Ok((metadata.len(), modified))
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_dir(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir(path).map_err(|err| CoreError::io(path, err))
    }

    fn remove_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::remove_dir_all(path).map_err(|err| CoreError::io(path, err))
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        fs::rename(from, to).map_err(|err| CoreError::io(from, err))
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        let mut children = fs::read_dir(path)
            .map_err(|err| CoreError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| CoreError::io(path, err))?;
        children.sort();
        Ok(children)
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        (**self).is_symlink(path)
    }

    fn stat(&self, path: &Path) -> crate::Result<(u64, SystemTime)> {
        (**self).stat(path)
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        (**self).create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        (**self).remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> crate::Result<()> {
        (**self).remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> crate::Result<()> {
        (**self).remove_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        (**self).rename(from, to)
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        (**self).list_dir(path)
    }
}
