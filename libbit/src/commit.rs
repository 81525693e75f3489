//! building a tree object from the index and committing it (spec.md §4.9)
//!
//! grounded on the teacher's `cmd/bit_write_tree.rs`/`cmd/bit_commit.rs`,
//! generalized to multiple parents the same way [`crate::obj::commit`] is
//! (SPEC_FULL.md §2b).

use crate::error::{BitResult, BitResultExt};
use crate::hash::Oid;
use crate::index::entry::IndexEntry;
use crate::obj::tree::FileMode;
use crate::obj::{Commit, Object, Tree, TreeEntry};
use crate::repo::Repository;
use crate::signature::{Signature, Time};

impl Repository {
    /// build a tree (recursively, one object per directory level) from the
    /// current index and write it to the object store, returning its id
    pub fn write_tree(&self) -> BitResult<Oid> {
        let index = self.index()?;
        build_tree_level(self, index.entries())
    }

    /// write a commit object with the given parents and tree; does not
    /// touch any ref
    pub fn commit_tree(
        &self,
        tree: Oid,
        parents: Vec<Oid>,
        message: impl Into<Vec<u8>>,
        author: Signature,
        committer: Signature,
    ) -> BitResult<Oid> {
        let commit = Commit::new(tree, parents, author, committer, message);
        self.write_object(&Object::Commit(commit))
    }

    /// the full `add` → `write-tree` → `commit-tree` → move HEAD pipeline:
    /// builds a tree from the current index, commits it with HEAD (if any)
    /// as its sole parent, and advances HEAD to the new commit
    pub fn commit(&self, message: impl Into<Vec<u8>>) -> BitResult<Oid> {
        let tree = self.write_tree()?;
        let parents = match self.head_oid() {
            Ok(oid) => vec![oid],
            Err(err) if err.is_not_found() => Vec::new(),
            Err(err) => return Err(err),
        };
        let signature = self.signature()?;
        let oid = self.commit_tree(tree, parents, message, signature.clone(), signature)?;
        self.update_head(oid)?;
        debug!("committed {}", oid);
        Ok(oid)
    }

    /// the identity used to sign a commit: `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`
    /// if both are set, otherwise `user.name`/`user.email` from config
    /// (spec.md §6 environment variables)
    pub fn signature(&self) -> BitResult<Signature> {
        let env_name = std::env::var("GIT_AUTHOR_NAME").ok();
        let env_email = std::env::var("GIT_AUTHOR_EMAIL").ok();
        let (name, email) = match (env_name, env_email) {
            (Some(name), Some(email)) => (name, email),
            (env_name, env_email) => {
                let config = self.config()?;
                let name = env_name
                    .or_else(|| config.get("user", "name"))
                    .ok_or_else(|| anyhow!("no author identity: set GIT_AUTHOR_NAME or `user.name` in config"))?;
                let email = env_email
                    .or_else(|| config.get("user", "email"))
                    .ok_or_else(|| anyhow!("no author identity: set GIT_AUTHOR_EMAIL or `user.email` in config"))?;
                (name, email)
            }
        };
        Ok(Signature { name, email, time: Time::now() })
    }
}

/// recursively group a sorted, flat list of index entries by their first
/// path component, writing one tree object per directory level
fn build_tree_level(repo: &Repository, entries: &[IndexEntry]) -> BitResult<Oid> {
    let mut tree_entries = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let path = &entries[i].path;
        match path.iter().position(|&b| b == b'/') {
            None => {
                tree_entries.push(TreeEntry {
                    mode: FileMode::from_octal(entries[i].mode)?,
                    name: path.clone(),
                    oid: entries[i].oid,
                });
                i += 1;
            }
            Some(slash) => {
                let prefix = path[..slash].to_vec();
                let mut j = i;
                let mut children = Vec::new();
                while j < entries.len() && entries[j].path.starts_with(&prefix[..])
                    && entries[j].path.get(prefix.len()) == Some(&b'/')
                {
                    let mut child = entries[j].clone();
                    child.path = entries[j].path[prefix.len() + 1..].to_vec();
                    children.push(child);
                    j += 1;
                }
                let sub_oid = build_tree_level(repo, &children)?;
                tree_entries.push(TreeEntry { mode: FileMode::Tree, name: prefix, oid: sub_oid });
                i = j;
            }
        }
    }
    let mut tree = Tree::new(tree_entries);
    tree.sort();
    repo.write_object(&Object::Tree(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repo_with_identity(root: &std::path::Path) -> Repository {
        std::env::set_var("GIT_AUTHOR_NAME", "Test User");
        std::env::set_var("GIT_AUTHOR_EMAIL", "test@example.com");
        Repository::init(root).unwrap()
    }

    #[test]
    fn write_tree_builds_nested_trees_from_index() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = repo_with_identity(&root);
        std::fs::write(root.join("hello.txt"), b"hi\n").unwrap();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::write(root.join("sub").join("a"), b"x").unwrap();
        repo.add(&[PathBuf::from("hello.txt"), PathBuf::from("sub")]).unwrap();

        let tree_oid = repo.write_tree().unwrap();
        let tree = repo.read_object(tree_oid).unwrap().into_tree().unwrap();
        assert_eq!(tree.entries.len(), 2);
        let sub_entry = tree.entries.iter().find(|e| e.name == b"sub").unwrap();
        assert_eq!(sub_entry.mode, FileMode::Tree);
        let sub_tree = repo.read_object(sub_entry.oid).unwrap().into_tree().unwrap();
        assert_eq!(sub_tree.entries[0].name, b"a");
    }

    #[test]
    fn commit_with_no_parent_is_a_valid_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = repo_with_identity(&root);
        std::fs::write(root.join("a"), b"x").unwrap();
        repo.add(&[PathBuf::from("a")]).unwrap();

        let oid = repo.commit("initial commit\n").unwrap();
        let commit = repo.read_object(oid).unwrap().into_commit().unwrap();
        assert!(commit.parents.is_empty());
        assert_eq!(repo.head_oid().unwrap(), oid);
    }

    #[test]
    fn second_commit_has_the_first_as_its_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("r");
        let repo = repo_with_identity(&root);
        std::fs::write(root.join("a"), b"x").unwrap();
        repo.add(&[PathBuf::from("a")]).unwrap();
        let first = repo.commit("first\n").unwrap();

        std::fs::write(root.join("a"), b"y").unwrap();
        repo.add(&[PathBuf::from("a")]).unwrap();
        let second = repo.commit("second\n").unwrap();

        let commit = repo.read_object(second).unwrap().into_commit().unwrap();
        assert_eq!(commit.parents, vec![first]);
    }
}
