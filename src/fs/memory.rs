//! In-memory filesystem for tests.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
};

use super::{DirEntryInfo, FileSystem};

#[derive(Debug, Default)]
pub struct MemFs {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    read_only: Cell<bool>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `dir` and all of its ancestors.
    pub fn add_dir(&self, dir: impl AsRef<Path>) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in dir.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Create a file, creating its parent directories as needed.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.into());
    }

    /// Reject every subsequent write with `PermissionDenied`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.files.borrow().contains_key(path) || self.dirs.borrow().contains(path)
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.as_os_str().is_empty() => true,
            Some(parent) => self.dirs.borrow().contains(parent),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

impl FileSystem for MemFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        if !self.dirs.borrow().contains(dir) {
            return Err(not_found(dir));
        }
        let mut entries: Vec<DirEntryInfo> = self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| name_of(p).map(DirEntryInfo::file))
            .collect();
        entries.extend(
            self.dirs
                .borrow()
                .iter()
                .filter(|p| p.parent() == Some(dir))
                .filter_map(|p| name_of(p).map(DirEntryInfo::dir)),
        );
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.contents(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.read_only.get() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: read-only filesystem", path.display()),
            ));
        }
        if !self.parent_exists(path) {
            return Err(not_found(path));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
