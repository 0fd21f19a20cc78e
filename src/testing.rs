//! In-memory filesystem for simulating plans operation by operation.

use crate::errors::{CoreError, Result};
use crate::fs::FileSystem;
use crate::helpers::{clean_path, parent_dir};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Node {
    Dir,
    File { size: u64, tag: String },
    Symlink,
}

/// Paths are keyed relative to an implicit root `.`, which always exists.
#[derive(Debug, Default)]
pub(crate) struct MemoryFileSystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    overwritten: RefCell<Vec<PathBuf>>,
}

fn key(path: &Path) -> PathBuf {
    clean_path(path)
}

fn not_found(path: &Path) -> CoreError {
    CoreError::io(path, io::Error::from(io::ErrorKind::NotFound))
}

fn failure(path: &Path, message: &str) -> CoreError {
    CoreError::io(path, io::Error::new(io::ErrorKind::Other, message.to_string()))
}

impl MemoryFileSystem {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_dir(&self, path: &str) {
        self.nodes.borrow_mut().insert(key(Path::new(path)), Node::Dir);
    }

    /// Adds a file whose content tag is its own path.
    pub(crate) fn add_file(&self, path: &str) {
        self.add_file_sized(path, 0);
    }

    pub(crate) fn add_file_sized(&self, path: &str, size: u64) {
        self.nodes.borrow_mut().insert(
            key(Path::new(path)),
            Node::File {
                size,
                tag: path.to_string(),
            },
        );
    }

    pub(crate) fn add_symlink(&self, path: &str) {
        self.nodes
            .borrow_mut()
            .insert(key(Path::new(path)), Node::Symlink);
    }

    /// Content tag of the file at `path`.
    pub(crate) fn tag(&self, path: &str) -> Option<String> {
        match self.nodes.borrow().get(&key(Path::new(path))) {
            Some(Node::File { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    /// Paths that were replaced by a rename onto an existing path.
    pub(crate) fn overwritten(&self) -> Vec<PathBuf> {
        self.overwritten.borrow().clone()
    }

    /// Every path currently present, sorted.
    pub(crate) fn paths(&self) -> Vec<String> {
        self.nodes
            .borrow()
            .keys()
            .map(|p| p.display().to_string())
            .collect()
    }

    fn node(&self, path: &Path) -> Option<Node> {
        let key = key(path);
        if key == Path::new(".") {
            return Some(Node::Dir);
        }
        self.nodes.borrow().get(&key).cloned()
    }

    fn descendants(&self, path: &Path) -> Vec<PathBuf> {
        let root = key(path);
        self.nodes
            .borrow()
            .keys()
            .filter(|k| *k != &root && (root == Path::new(".") || k.starts_with(&root)))
            .cloned()
            .collect()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.node(path) == Some(Node::Dir)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        self.node(path) == Some(Node::Symlink)
    }

    fn stat(&self, path: &Path) -> Result<(u64, SystemTime)> {
        match self.node(path) {
            Some(Node::File { size, .. }) => Ok((size, UNIX_EPOCH + Duration::from_secs(size))),
            Some(_) => Ok((0, UNIX_EPOCH)),
            None => Err(not_found(path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in key(path).ancestors() {
            if ancestor.as_os_str().is_empty() || ancestor == Path::new(".") {
                continue;
            }
            match nodes.get(ancestor) {
                Some(Node::Dir) => {}
                Some(_) => return Err(failure(ancestor, "not a directory")),
                None => {
                    nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match self.node(path) {
            Some(Node::Dir) => Err(failure(path, "is a directory")),
            Some(_) => {
                self.nodes.borrow_mut().remove(&key(path));
                Ok(())
            }
            None => Err(not_found(path)),
        }
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        match self.node(path) {
            Some(Node::Dir) if self.descendants(path).is_empty() => {
                self.nodes.borrow_mut().remove(&key(path));
                Ok(())
            }
            Some(Node::Dir) => Err(failure(path, "directory not empty")),
            Some(_) => Err(failure(path, "not a directory")),
            None => Err(not_found(path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let mut doomed = self.descendants(path);
        doomed.push(key(path));
        let mut nodes = self.nodes.borrow_mut();
        for p in doomed {
            nodes.remove(&p);
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let source = self.node(from).ok_or_else(|| not_found(from))?;
        if !self.is_dir(&parent_dir(&key(to))) {
            return Err(not_found(to));
        }
        if let Some(existing) = self.node(to) {
            if existing == Node::Dir && !self.descendants(to).is_empty() {
                return Err(failure(to, "directory not empty"));
            }
            if (existing == Node::Dir) != (source == Node::Dir) {
                return Err(failure(to, "kind mismatch"));
            }
            self.overwritten.borrow_mut().push(key(to));
        }

        let (from_key, to_key) = (key(from), key(to));
        let moved = self.descendants(from);
        let mut nodes = self.nodes.borrow_mut();
        nodes.remove(&from_key);
        nodes.insert(to_key.clone(), source);
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                if let Ok(rest) = old.strip_prefix(&from_key) {
                    nodes.insert(to_key.join(rest), node);
                }
            }
        }
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        let dir = key(path);
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|k| parent_dir(k) == dir)
            .cloned()
            .collect())
    }
}
