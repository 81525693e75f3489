//! commit objects: a KVLM payload with `tree`, zero or more `parent`,
//! `author`, `committer`, and a free-form message
//!
//! grounded on the teacher's `obj/commit.rs`, generalized to multiple
//! parents (SPEC_FULL.md §2b: the teacher itself stores only
//! `Option<Oid>`, but spec.md §3 calls for "zero or more `parent`").

use crate::error::BitResult;
use crate::hash::{malformed, Oid};
use crate::obj::kvlm::Kvlm;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Oid,
    pub parents: Vec<Oid>,
    pub author: Signature,
    pub committer: Signature,
    pub message: Vec<u8>,
}

impl Commit {
    pub fn new(
        tree: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        message: impl Into<Vec<u8>>,
    ) -> Self {
        Self { tree, parents, author, committer, message: message.into() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut kvlm = Kvlm::new();
        kvlm.push("tree", self.tree.to_hex());
        for parent in &self.parents {
            kvlm.push("parent", parent.to_hex());
        }
        kvlm.push("author", self.author.to_string());
        kvlm.push("committer", self.committer.to_string());
        kvlm.set_message(self.message.clone());
        kvlm.serialize()
    }

    pub fn deserialize(payload: &[u8]) -> BitResult<Self> {
        let kvlm = Kvlm::parse(payload)?;
        let tree = parse_oid(&kvlm, b"tree")?;
        let parents = kvlm
            .get_all(b"parent")
            .iter()
            .map(|v| oid_from_bytes(v))
            .collect::<BitResult<Vec<_>>>()?;
        let author = parse_signature(&kvlm, b"author")?;
        let committer = parse_signature(&kvlm, b"committer")?;
        Ok(Self { tree, parents, author, committer, message: kvlm.message().to_vec() })
    }
}

fn oid_from_bytes(bytes: &[u8]) -> BitResult<Oid> {
    std::str::from_utf8(bytes)
        .map_err(|_| malformed("object id is not valid utf8"))?
        .parse()
        .map_err(|_| malformed(format!("invalid object id `{}`", String::from_utf8_lossy(bytes))))
}

fn parse_oid(kvlm: &Kvlm, key: &[u8]) -> BitResult<Oid> {
    let value = kvlm
        .get(key)
        .ok_or_else(|| malformed(format!("commit is missing required `{}` header", String::from_utf8_lossy(key))))?;
    oid_from_bytes(value)
}

fn parse_signature(kvlm: &Kvlm, key: &[u8]) -> BitResult<Signature> {
    let value = kvlm
        .get(key)
        .ok_or_else(|| malformed(format!("commit is missing required `{}` header", String::from_utf8_lossy(key))))?;
    std::str::from_utf8(value)
        .map_err(|_| malformed(format!("`{}` header is not valid utf8", String::from_utf8_lossy(key))))?
        .parse()
        .map_err(|err| malformed(format!("malformed `{}` header: {}", String::from_utf8_lossy(key), err)))
}
