//! staging: `add` reads the current index, hashes the given files as blobs,
//! and rewrites the index with those entries upserted (spec.md §4.7)
//!
//! grounded on the teacher's `cmd/bit_add.rs`, filled in where the teacher
//! leaves a stub — directory expansion uses `walkdir`, matching the crate's
//! existing dependency choice (SPEC_FULL.md §4.7).

use crate::error::BitResult;
use crate::index::{self, Index};
use crate::obj::{Blob, Object};
use crate::repo::Repository;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

impl Repository {
    /// stage every regular file reachable from `paths` (each either a file
    /// or a directory, expanded recursively) into the index
    pub fn add(&self, paths: &[PathBuf]) -> BitResult<()> {
        let mut index = self.index()?;
        for path in paths {
            let absolute = self.worktree().join(path);
            for file in walk_files(&absolute)? {
                self.stage_file(&mut index, &file)?;
            }
        }
        self.write_index(&index)
    }

    fn stage_file(&self, index: &mut Index, absolute_path: &Path) -> BitResult<()> {
        let relative = absolute_path
            .strip_prefix(self.worktree())
            .unwrap_or(absolute_path)
            .as_os_str()
            .as_bytes()
            .to_vec();
        let bytes = std::fs::read(absolute_path)?;
        let oid = self.write_object(&Object::Blob(Blob::new(bytes)))?;
        let entry = index::entry_for_file(&relative, absolute_path, oid)?;
        debug!("staged `{}` as {}", String::from_utf8_lossy(&entry.path), oid);
        index.upsert(entry);
        Ok(())
    }
}

/// a single file yields itself; a directory yields every regular file
/// beneath it, skipping `.git`
fn walk_files(path: &Path) -> BitResult<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path).into_iter().filter_entry(|e| e.file_name() != ".git") {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_stages_a_single_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = Repository::init(&root).unwrap();
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();

        repo.add(&[PathBuf::from("hello.txt")]).unwrap();

        let index = repo.index().unwrap();
        assert_eq!(index.entries().len(), 1);
        assert_eq!(index.entries()[0].path, b"hello.txt");
    }

    #[test]
    fn add_expands_directories_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = Repository::init(&root).unwrap();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("sub").join("a.txt"), b"x").unwrap();
        std::fs::write(root.join("sub").join("b.txt"), b"y").unwrap();

        repo.add(&[PathBuf::from("sub")]).unwrap();

        let index = repo.index().unwrap();
        let paths: Vec<_> = index.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![b"sub/a.txt".to_vec(), b"sub/b.txt".to_vec()]);
    }

    #[test]
    fn re_adding_a_changed_file_replaces_its_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = Repository::init(&root).unwrap();
        std::fs::write(root.join("a.txt"), b"first").unwrap();
        repo.add(&[PathBuf::from("a.txt")]).unwrap();
        std::fs::write(root.join("a.txt"), b"second").unwrap();
        repo.add(&[PathBuf::from("a.txt")]).unwrap();

        let index = repo.index().unwrap();
        assert_eq!(index.entries().len(), 1);
        let oid = index.entries()[0].oid;
        assert_eq!(repo.read_object(oid).unwrap().as_blob().unwrap().bytes(), b"second");
    }
}
