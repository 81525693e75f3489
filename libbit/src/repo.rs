//! repository lifecycle: create, discover, and load a repository, and wire
//! together the object store, reference store, config, and index that live
//! beneath its metadata directory (spec.md §4.8)
//!
//! grounded on the teacher's `repo.rs` (`BitRepo::init`/`find`/`load`), with
//! the `OnceCell`-memoized index and path-interning arena dropped — this
//! crate re-reads the index from disk on every operation that needs it
//! (spec.md §4.7: staging is a full read-modify-write, not an in-memory
//! cache), and paths are plain owned `PathBuf`s throughout.

use crate::config::{Config, CoreConfig};
use crate::error::{BitError, BitResult};
use crate::hash::Oid;
use crate::index::Index;
use crate::obj::{Object, ObjKind};
use crate::odb::ObjectDb;
use crate::path::PathLayout;
use crate::refs::{self, RefStore};
use crate::rev::{NameResolver, ObjKindAndPeel};
use std::path::{Path, PathBuf};

const GITDIR: &str = ".git";

/// a live handle onto a repository: a worktree directory paired with its
/// `.git` metadata directory
pub struct Repository {
    worktree: PathBuf,
    gitdir: PathBuf,
    layout: PathLayout,
    odb: ObjectDb,
    refs: RefStore,
}

impl Repository {
    fn new(worktree: PathBuf, gitdir: PathBuf) -> Self {
        let layout = PathLayout::new(gitdir.clone());
        let odb = ObjectDb::new(gitdir.join("objects"));
        let refs = RefStore::new(layout.clone());
        Self { worktree, gitdir, layout, odb, refs }
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn gitdir(&self) -> &Path {
        &self.gitdir
    }

    pub fn odb(&self) -> &ObjectDb {
        &self.odb
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn index_path(&self) -> PathBuf {
        self.gitdir.join("index")
    }

    pub fn config_path(&self) -> PathBuf {
        self.gitdir.join("config")
    }

    /// create a brand new repository at `path`; the target must not exist
    /// or must be an empty directory (spec.md §4.8)
    pub fn init(path: impl AsRef<Path>) -> BitResult<Self> {
        let worktree = path.as_ref();
        if worktree.is_file() {
            bail!("`{}` is not a directory", worktree.display());
        }
        if worktree.is_dir() && std::fs::read_dir(worktree)?.next().is_some() {
            bail!("`{}` already exists and is not empty", worktree.display());
        }
        std::fs::create_dir_all(worktree)?;
        let worktree = worktree.canonicalize()?;
        let gitdir = worktree.join(GITDIR);

        let repo = Self::new(worktree, gitdir);
        repo.layout.dir(&["objects"], true)?;
        repo.layout.dir(&["branches"], true)?;
        repo.layout.dir(&["refs", "heads"], true)?;
        repo.layout.dir(&["refs", "tags"], true)?;

        std::fs::write(
            repo.layout.file(&["description"])?,
            b"Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;

        repo.refs.create_symbolic(refs::HEAD, "refs/heads/master")?;

        let mut config = Config::new();
        CoreConfig::write_defaults(&mut config);
        std::fs::write(repo.layout.file(&["config"])?, config.render())?;

        info!("initialized empty bit repository in `{}`", repo.gitdir.display());
        Ok(repo)
    }

    /// walk ancestors of `cwd` until a directory containing `.git` is
    /// found (spec.md §4.8)
    pub fn find(cwd: impl AsRef<Path>) -> BitResult<Self> {
        let mut dir = cwd.as_ref().canonicalize()?;
        loop {
            let gitdir = dir.join(GITDIR);
            if gitdir.is_dir() {
                return Self::load(dir, gitdir);
            }
            dir = match dir.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return Err(BitError::NotARepository(cwd.as_ref().display().to_string()).into()),
            };
        }
    }

    fn load(worktree: PathBuf, gitdir: PathBuf) -> BitResult<Self> {
        let repo = Self::new(worktree, gitdir);
        // validate repositoryformatversion eagerly: a repo this crate cannot
        // safely operate on should fail at discovery, not on first use
        CoreConfig::from_config(&repo.config()?)?;
        Ok(repo)
    }

    pub fn config(&self) -> BitResult<Config> {
        Config::open(self.config_path())
    }

    pub fn index(&self) -> BitResult<Index> {
        Index::read(&self.index_path())
    }

    pub fn write_index(&self, index: &Index) -> BitResult<()> {
        index.write(&self.index_path())
    }

    pub fn read_object(&self, oid: Oid) -> BitResult<Object> {
        self.odb.read(oid)
    }

    pub fn write_object(&self, obj: &Object) -> BitResult<Oid> {
        self.odb.write(obj)
    }

    pub fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(&self.refs, self.odb.objects_path())
    }

    /// resolve `name` to exactly one id, with no kind expectation or peeling
    pub fn resolve(&self, name: &str) -> BitResult<Oid> {
        self.resolver().resolve(name)
    }

    /// resolve `name`, peeling tag → commit → tree until `expected` is
    /// reached (spec.md §4.5)
    pub fn resolve_as(&self, name: &str, expected: ObjKind, follow: bool) -> BitResult<Oid> {
        self.resolver().resolve_as(name, expected, follow, &|oid| self.peel_info(oid))
    }

    fn peel_info(&self, oid: Oid) -> BitResult<ObjKindAndPeel> {
        let obj = self.read_object(oid)?;
        Ok(match &obj {
            Object::Tag(tag) => ObjKindAndPeel { kind: ObjKind::Tag, tagged_object: Some(tag.object), tree: None },
            Object::Commit(commit) =>
                ObjKindAndPeel { kind: ObjKind::Commit, tagged_object: None, tree: Some(commit.tree) },
            Object::Tree(..) => ObjKindAndPeel { kind: ObjKind::Tree, tagged_object: None, tree: None },
            Object::Blob(..) => ObjKindAndPeel { kind: ObjKind::Blob, tagged_object: None, tree: None },
        })
    }

    /// the id HEAD currently resolves to, or `NotFound` on a fresh repository
    /// with no commits yet
    pub fn head_oid(&self) -> BitResult<Oid> {
        self.refs.resolve(refs::HEAD)
    }

    /// move whichever ref HEAD refers to (directly, or through one level of
    /// symbolic indirection) to point at `oid`
    pub(crate) fn update_head(&self, oid: Oid) -> BitResult<()> {
        match self.refs.read_shallow(refs::HEAD)? {
            refs::Ref::Symbolic(target) => self.refs.create_direct(&target, oid),
            refs::Ref::Direct(..) => self.refs.create_direct(refs::HEAD, oid),
        }
    }
}
