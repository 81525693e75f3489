//! atomic "read, write elsewhere, rename over" helper (spec.md §4.6/§4.7:
//! refs and the index are both rewritten as a whole, never in place)
//!
//! grounded on the teacher's `lockfile.rs`; trimmed down to the single
//! pattern this core needs (no readonly flag, no generic `Filelock<T>`
//! wrapper — callers serialize their own data).

use crate::error::BitResult;
use anyhow::Context;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

const LOCK_EXT: &str = "lock";

/// a lockfile guarding writes to `path`
///
/// on success, `commit` renames the lockfile over `path`. if the lockfile
/// is dropped without `commit` having been called, the lockfile is removed
/// and the guarded file is left untouched.
pub struct Lockfile {
    lockfile: File,
    path: PathBuf,
    lockfile_path: PathBuf,
    committed: bool,
}

impl Lockfile {
    pub fn new(path: impl AsRef<Path>) -> BitResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lockfile_path = Self::lockfile_path(path);
        let lockfile = File::options()
            .create_new(true)
            .write(true)
            .open(&lockfile_path)
            .with_context(|| {
                format!(
                    "failed to acquire lock on `{}` (`{}` already exists)",
                    path.display(),
                    lockfile_path.display()
                )
            })?;
        Ok(Self { lockfile, path: path.to_path_buf(), lockfile_path, committed: false })
    }

    fn lockfile_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(LOCK_EXT);
        path.with_file_name(name)
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.lockfile.write_all(bytes)
    }

    /// renames the lockfile over the guarded path, making the write visible
    pub fn commit(mut self) -> BitResult<()> {
        self.lockfile.flush()?;
        std::fs::rename(&self.lockfile_path, &self.path).with_context(|| {
            format!(
                "failed to commit lockfile `{}` to `{}`",
                self.lockfile_path.display(),
                self.path.display()
            )
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Write for Lockfile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lockfile.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lockfile.flush()
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.lockfile_path);
        }
    }
}

/// write `bytes` to `path` atomically via a [`Lockfile`]
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> BitResult<()> {
    let mut lockfile = Lockfile::new(path)?;
    lockfile.write_all(bytes)?;
    lockfile.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("HEAD");
        write_atomic(&path, b"ref: refs/heads/master\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"ref: refs/heads/master\n");
    }

    #[test]
    fn write_atomic_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("HEAD");
        write_atomic(&path, b"a").unwrap();
        write_atomic(&path, b"b").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"b");
    }

    #[test]
    fn concurrent_lock_acquisition_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index");
        let _first = Lockfile::new(&path).unwrap();
        assert!(Lockfile::new(&path).is_err());
    }

    #[test]
    fn dropped_lockfile_does_not_touch_target() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index");
        std::fs::write(&path, b"original").unwrap();
        {
            let mut lockfile = Lockfile::new(&path).unwrap();
            lockfile.write_all(b"new").unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"original");
    }
}
