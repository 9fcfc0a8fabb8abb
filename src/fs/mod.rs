//! Filesystem capability used by plugin discovery and report aggregation.
//!
//! Callers receive a `&dyn FileSystem` instead of touching `std::fs`
//! directly, so tests can hand in a [`MemFs`].

use std::{fs, io, path::Path};

mod memory;

pub use memory::MemFs;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: false }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_dir: true }
    }
}

pub trait FileSystem {
    /// List `dir`, sorted by entry name.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// The host operating system's filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // Names that are not valid UTF-8 can never match a prefix.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // Follow symlinks: PATH directories are full of them.
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            entries.push(DirEntryInfo { name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_listing_is_sorted_and_marks_dirs() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        fs::write(tmp.path().join("b.json"), b"[]")?;
        fs::write(tmp.path().join("a.json"), b"[]")?;
        fs::create_dir(tmp.path().join("c"))?;

        let listing = OsFs.list_dir(tmp.path())?;
        assert_eq!(
            listing,
            vec![
                DirEntryInfo::file("a.json"),
                DirEntryInfo::file("b.json"),
                DirEntryInfo::dir("c"),
            ]
        );
        Ok(())
    }

    #[test]
    fn os_listing_of_missing_dir_fails() {
        let err = OsFs.list_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
