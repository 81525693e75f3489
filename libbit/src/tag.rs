//! tag creation: lightweight (a ref only) or annotated (a tag object plus
//! a ref to it) (spec.md §4.9)
//!
//! grounded on the original's `cmd_tag` (SPEC_FULL.md §2b) and the
//! teacher's `cmd/bit_branch.rs`, which creates refs the same way.

use crate::error::BitResult;
use crate::hash::Oid;
use crate::obj::{ObjKind, Object, Tag};
use crate::repo::Repository;
use crate::signature::Signature;

impl Repository {
    /// `refs/tags/<name>` pointing directly at `target`
    pub fn tag_lightweight(&self, name: &str, target: Oid) -> BitResult<()> {
        self.refs().create_direct(&tag_ref_path(name), target)
    }

    /// a tag object wrapping `target`, written to the object store, with
    /// `refs/tags/<name>` pointing at the tag object's own id (not at
    /// `target` directly)
    pub fn tag_annotated(
        &self,
        name: &str,
        target: Oid,
        target_kind: ObjKind,
        tagger: Signature,
        message: impl Into<Vec<u8>>,
    ) -> BitResult<Oid> {
        let tag = Tag::new(target, target_kind, name, tagger, message);
        let oid = self.write_object(&Object::Tag(tag))?;
        self.refs().create_direct(&tag_ref_path(name), oid)?;
        Ok(oid)
    }
}

fn tag_ref_path(name: &str) -> String {
    format!("refs/tags/{}", name)
}
