//! the reference store: direct and symbolic refs under `HEAD`, `refs/heads/`
//! and `refs/tags/` (spec.md §4.6)
//!
//! grounded on the teacher's `refs.rs` (`BitRef`/`SymbolicRef`), with the
//! interned-path/global-regex-validated-name machinery dropped — this core
//! only ever builds ref paths itself (from `refs/heads/<name>` or
//! `refs/tags/<name>`), so there is no untrusted ref name to validate.

use crate::error::{BitError, BitResult, NotFoundKind};
use crate::hash::Oid;
use crate::lockfile;
use crate::path::PathLayout;
use std::path::PathBuf;

pub const HEAD: &str = "HEAD";

/// maximum depth of symbolic ref indirection `resolve` will follow before
/// giving up (spec.md §9 REDESIGN FLAGS: defend against symbolic cycles)
const MAX_RESOLVE_DEPTH: usize = 10;

/// the parsed contents of a single ref file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    Direct(Oid),
    /// a path relative to the metadata directory, e.g. `refs/heads/master`
    Symbolic(String),
}

impl Ref {
    fn parse(contents: &str) -> BitResult<Self> {
        let contents = contents.strip_suffix('\n').unwrap_or(contents);
        if let Some(target) = contents.strip_prefix("ref: ") {
            Ok(Ref::Symbolic(target.to_owned()))
        } else {
            Ok(Ref::Direct(contents.parse()?))
        }
    }

    fn render(&self) -> String {
        match self {
            Ref::Direct(oid) => format!("{}\n", oid.to_hex()),
            Ref::Symbolic(target) => format!("ref: {}\n", target),
        }
    }
}

pub struct RefStore {
    layout: PathLayout,
}

impl RefStore {
    pub fn new(layout: PathLayout) -> Self {
        Self { layout }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.layout.path(&relative.split('/').collect::<Vec<_>>())
    }

    fn read(&self, relative: &str) -> BitResult<Ref> {
        let path = self.path(relative);
        let contents = std::fs::read_to_string(&path)
            .map_err(|_| BitError::NotFound(NotFoundKind::Ref(relative.to_owned())))?;
        Ref::parse(&contents)
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// follow a (possibly chained) symbolic ref down to a direct object id
    pub fn resolve(&self, relative: &str) -> BitResult<Oid> {
        let mut current = relative.to_owned();
        for _ in 0..MAX_RESOLVE_DEPTH {
            match self.read(&current)? {
                Ref::Direct(oid) => return Ok(oid),
                Ref::Symbolic(target) => current = target,
            }
        }
        bail!("symbolic ref chain starting at `{}` exceeds depth {}", relative, MAX_RESOLVE_DEPTH)
    }

    /// the immediate (unresolved) contents of a ref, one indirection at most
    pub fn read_shallow(&self, relative: &str) -> BitResult<Ref> {
        self.read(relative)
    }

    pub fn create_direct(&self, relative: &str, oid: Oid) -> BitResult<()> {
        lockfile::write_atomic(self.path(relative), Ref::Direct(oid).render().as_bytes())
    }

    pub fn create_symbolic(&self, relative: &str, target: &str) -> BitResult<()> {
        lockfile::write_atomic(self.path(relative), Ref::Symbolic(target.to_owned()).render().as_bytes())
    }

    /// names of all refs under `refs/heads` and `refs/tags`, sorted, paired
    /// with the id each resolves to
    pub fn list(&self, root: &str) -> BitResult<Vec<(String, Oid)>> {
        let root_path = self.path(root);
        if !root_path.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        collect_ref_names(&root_path, &root_path, &mut names)?;
        names.sort();
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let relative = format!("{}/{}", root, name);
            out.push((relative.clone(), self.resolve(&relative)?));
        }
        Ok(out)
    }
}

fn collect_ref_names(base: &std::path::Path, dir: &std::path::Path, out: &mut Vec<String>) -> BitResult<()> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    children.sort_by_key(|entry| entry.file_name());
    for entry in children {
        let path = entry.path();
        if path.is_dir() {
            collect_ref_names(base, &path, out)?;
        } else {
            let relative = path.strip_prefix(base).expect("child path under base");
            out.push(relative.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/"));
        }
    }
    Ok(())
}
