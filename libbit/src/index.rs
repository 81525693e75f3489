//! the staging area: a single binary file listing what would be committed
//! next (spec.md §4.7)
//!
//! grounded on the teacher's `index.rs`, stripped of the extension records
//! and merge-stage tracking the teacher supports but this core's non-goals
//! (no merges, no sparse checkout) never exercise.

pub mod entry;

pub use entry::IndexEntry;

use crate::error::{BitError, BitResult};
use crate::hash::{self, Hasher, Oid, OID_BYTE_LEN};
use crate::lockfile;
use crate::time::Timespec;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

const SIGNATURE: &[u8; 4] = b"DIRC";
const VERSION: u32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// read the index at `path`; a missing file is treated as an empty
    /// index (spec.md §4.7 staging: "absent file ≡ empty")
    pub fn read(path: &Path) -> BitResult<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Self::parse(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(bytes: &[u8]) -> BitResult<Self> {
        if bytes.len() < 12 + OID_BYTE_LEN {
            return Err(hash::malformed("index file shorter than its fixed header and trailer"));
        }
        let (body, trailer) = bytes.split_at(bytes.len() - OID_BYTE_LEN);
        let expected = hash::hash_bytes(body);
        if expected.as_bytes() != trailer {
            return Err(BitError::ChecksumMismatch.into());
        }

        if &body[0..4] != SIGNATURE {
            return Err(hash::malformed("index file missing `DIRC` signature"));
        }
        let version = u32::from_be_bytes(body[4..8].try_into().unwrap());
        if version != VERSION {
            return Err(hash::malformed(format!("unsupported index version {}", version)));
        }
        let entry_count = u32::from_be_bytes(body[8..12].try_into().unwrap());

        let mut entries = Vec::with_capacity(entry_count as usize);
        let mut cursor = 12;
        for _ in 0..entry_count {
            let (entry, consumed) = IndexEntry::deserialize(&body[cursor..])?;
            cursor += consumed;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(SIGNATURE);
        body.extend_from_slice(&VERSION.to_be_bytes());
        body.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        for entry in &self.entries {
            entry.serialize(&mut body);
        }
        let mut hasher = Hasher::new();
        hasher.update(&body);
        let checksum = hasher.finalize();
        body.extend_from_slice(checksum.as_bytes());
        body
    }

    pub fn write(&self, path: &Path) -> BitResult<()> {
        lockfile::write_atomic(path, &self.serialize())
    }

    /// sort entries by path, git's on-disk order
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// replace any existing entry at `entry.path`, otherwise append, then
    /// resort — the staging operation spec.md §4.7 describes for `add`
    pub fn upsert(&mut self, entry: IndexEntry) {
        self.entries.retain(|e| e.path != entry.path);
        self.entries.push(entry);
        self.sort();
    }
}

/// build the index entry for a single working-tree file, stat-ing it for
/// metadata and using `oid` as its already-hashed blob id
pub fn entry_for_file(relative_path: &[u8], absolute_path: &Path, oid: Oid) -> BitResult<IndexEntry> {
    let metadata = std::fs::symlink_metadata(absolute_path)?;
    let mode = if metadata.is_dir() {
        return Err(hash::malformed("index entries cannot be directories"));
    } else if metadata.permissions().mode() & 0o111 != 0 {
        0o100755
    } else {
        0o100644
    };
    Ok(IndexEntry {
        ctime: Timespec::ctime(&metadata),
        mtime: Timespec::mtime(&metadata),
        dev: metadata.dev() as u32,
        ino: metadata.ino() as u32,
        mode,
        uid: metadata.uid(),
        gid: metadata.gid(),
        size: metadata.len() as u32,
        oid,
        path: relative_path.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> IndexEntry {
        IndexEntry {
            ctime: Timespec::zero(),
            mtime: Timespec::zero(),
            dev: 0,
            ino: 0,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            size: 0,
            oid: Oid::new([1; 20]),
            path: path.as_bytes().to_vec(),
        }
    }

    #[test]
    fn round_trips_through_serialize_and_parse() {
        let mut index = Index::new();
        index.upsert(entry("b.txt"));
        index.upsert(entry("a.txt"));
        let bytes = index.serialize();
        let parsed = Index::parse(&bytes).unwrap();
        assert_eq!(parsed, index);
        // spec.md testable property 4: serialize(parse(bytes)) == bytes
        assert_eq!(parsed.serialize(), bytes);
    }

    #[test]
    fn entries_are_sorted_by_path() {
        let mut index = Index::new();
        index.upsert(entry("z"));
        index.upsert(entry("a"));
        assert_eq!(index.entries().iter().map(|e| e.path.clone()).collect::<Vec<_>>(), vec![b"a".to_vec(), b"z".to_vec()]);
    }

    #[test]
    fn reading_missing_file_yields_empty_index() {
        let tmp = tempfile::tempdir().unwrap();
        let index = Index::read(&tmp.path().join("index")).unwrap();
        assert!(index.entries().is_empty());
    }

    #[test]
    fn corrupt_checksum_fails_to_parse() {
        let mut index = Index::new();
        index.upsert(entry("a.txt"));
        let mut bytes = index.serialize();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(Index::parse(&bytes), Err(err) if matches!(err.downcast_ref::<BitError>(), Some(BitError::ChecksumMismatch))));
    }

    #[test]
    fn upsert_replaces_existing_entry_for_same_path() {
        let mut index = Index::new();
        index.upsert(entry("a.txt"));
        let mut replacement = entry("a.txt");
        replacement.size = 42;
        index.upsert(replacement.clone());
        assert_eq!(index.entries().len(), 1);
        assert_eq!(index.entries()[0].size, 42);
    }
}
