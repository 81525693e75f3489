//! path layout beneath the `.git` metadata directory (spec.md §4.1)
//!
//! grounded on the teacher's `mk_bitdir`/`mk_bitfile` helpers in `repo.rs`,
//! minus path interning — this crate has no arena-backed repo context, so a
//! plain owned `PathBuf` is simplest.

use crate::error::BitResult;
use std::path::{Path, PathBuf};

/// resolves paths relative to a root directory (the `.git` directory),
/// creating intermediate directories on demand
#[derive(Debug, Clone)]
pub struct PathLayout {
    root: PathBuf,
}

impl PathLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// join `parts` onto the root without touching the filesystem
    pub fn path(&self, parts: &[&str]) -> PathBuf {
        let mut p = self.root.clone();
        for part in parts {
            p.push(part);
        }
        p
    }

    /// resolve a directory under the root, optionally creating it (and its
    /// ancestors) if missing
    pub fn dir(&self, parts: &[&str], create: bool) -> BitResult<PathBuf> {
        let p = self.path(parts);
        if p.is_dir() {
            return Ok(p);
        }
        if p.exists() {
            bail!("`{}` exists and is not a directory", p.display());
        }
        if create {
            std::fs::create_dir_all(&p)?;
            Ok(p)
        } else {
            bail!("directory `{}` does not exist", p.display());
        }
    }

    /// resolve a file under the root, ensuring its parent directory exists
    pub fn file(&self, parts: &[&str]) -> BitResult<PathBuf> {
        let p = self.path(parts);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = PathLayout::new(tmp.path());
        let dir = layout.dir(&["refs", "heads"], true).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn dir_fails_without_create_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = PathLayout::new(tmp.path());
        assert!(layout.dir(&["refs", "heads"], false).is_err());
    }

    #[test]
    fn dir_fails_when_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("HEAD"), b"x").unwrap();
        let layout = PathLayout::new(tmp.path());
        assert!(layout.dir(&["HEAD"], true).is_err());
    }

    #[test]
    fn file_creates_parent_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = PathLayout::new(tmp.path());
        let f = layout.file(&["objects", "ab", "cdef"]).unwrap();
        assert!(f.parent().unwrap().is_dir());
    }
}
