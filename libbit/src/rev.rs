//! the name resolver: turns a name string into zero or more candidate
//! object ids, then (optionally) peels the single surviving candidate to a
//! requested kind (spec.md §4.5)
//!
//! grounded on the teacher's `rev.rs`, trimmed to the subset spec.md calls
//! for — no `^`/`~`/`@{}` revspec operators (those presuppose a reflog and
//! richer ancestor traversal this core's non-goals exclude).

use crate::error::{BitError, BitResult, NotFoundKind};
use crate::hash::{self, Oid};
use crate::obj::ObjKind;
use crate::refs::{self, RefStore};
use std::path::Path;

pub struct NameResolver<'a> {
    refs: &'a RefStore,
    objects_path: &'a Path,
}

impl<'a> NameResolver<'a> {
    pub fn new(refs: &'a RefStore, objects_path: &'a Path) -> Self {
        Self { refs, objects_path }
    }

    /// every id whose hex representation the name could plausibly name,
    /// before disambiguation (spec.md §4.5 resolution order)
    fn candidates(&self, name: &str) -> BitResult<Vec<Oid>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        if name == refs::HEAD {
            return Ok(vec![self.refs.resolve(refs::HEAD)?]);
        }
        if hash::is_valid_hex_prefix(name) {
            return self.expand_prefix(&name.to_lowercase());
        }
        for candidate in [format!("refs/tags/{}", name), format!("refs/heads/{}", name)] {
            if self.refs.exists(&candidate) {
                return Ok(vec![self.refs.resolve(&candidate)?]);
            }
        }
        Ok(Vec::new())
    }

    fn expand_prefix(&self, prefix: &str) -> BitResult<Vec<Oid>> {
        let (dir_prefix, rest) = prefix.split_at(2);
        let dir = self.objects_path.join(dir_prefix);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(rest) {
                matches.push(format!("{}{}", dir_prefix, file_name).parse()?);
            }
        }
        Ok(matches)
    }

    /// resolve `name` to a single id, with no kind expectation
    pub fn resolve(&self, name: &str) -> BitResult<Oid> {
        self.resolve_one(name)
    }

    /// resolve `name` to a single id, peeling through tags/commits until
    /// `expected` is reached (`follow = true`) or failing `WrongKind`
    pub fn resolve_as(&self, name: &str, expected: ObjKind, follow: bool, read: &impl Fn(Oid) -> BitResult<ObjKindAndPeel>) -> BitResult<Oid> {
        let oid = self.resolve_one(name)?;
        if !follow {
            return Ok(oid);
        }
        self.peel(oid, expected, read)
    }

    fn resolve_one(&self, name: &str) -> BitResult<Oid> {
        let mut candidates = self.candidates(name)?;
        match candidates.len() {
            0 => Err(BitError::NotFound(NotFoundKind::Revision(name.to_owned())).into()),
            1 => Ok(candidates.remove(0)),
            _ => {
                let candidates = candidates.iter().map(Oid::to_hex).collect();
                Err(BitError::Ambiguous { prefix: name.to_owned(), candidates }.into())
            }
        }
    }

    fn peel(&self, mut oid: Oid, expected: ObjKind, read: &impl Fn(Oid) -> BitResult<ObjKindAndPeel>) -> BitResult<Oid> {
        loop {
            let ObjKindAndPeel { kind, tagged_object, tree } = read(oid)?;
            if kind == expected {
                return Ok(oid);
            }
            match (kind, expected) {
                (ObjKind::Tag, _) => oid = tagged_object.expect("tag object always carries `object`"),
                (ObjKind::Commit, ObjKind::Tree) => oid = tree.expect("commit object always carries `tree`"),
                _ =>
                    return Err(BitError::WrongKind {
                        name: oid.to_hex(),
                        expected: expected.to_string(),
                        actual: kind.to_string(),
                    }
                    .into()),
            }
        }
    }
}

/// the minimal facts about an object the peeling loop needs, decoupled from
/// [`crate::obj::Object`] so the resolver does not depend on the object
/// store directly
#[derive(Debug, Clone, Copy)]
pub struct ObjKindAndPeel {
    pub kind: ObjKind,
    pub tagged_object: Option<Oid>,
    pub tree: Option<Oid>,
}
