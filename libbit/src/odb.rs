//! the object store: zlib-compressed loose objects under `objects/` (spec.md
//! §4.2)
//!
//! grounded on the teacher's `BitLooseObjDb` in `odb.rs`, with the packed
//! backend dropped — pack files and delta compression are out of scope (see
//! spec.md §1 non-goals).

use crate::error::{BitError, BitResult};
use crate::hash::{self, Oid};
use crate::lockfile;
use crate::obj::{self, Object};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

pub struct ObjectDb {
    objects_path: PathBuf,
}

impl ObjectDb {
    pub fn new(objects_path: impl Into<PathBuf>) -> Self {
        Self { objects_path: objects_path.into() }
    }

    fn obj_path(&self, oid: Oid) -> PathBuf {
        let (dir, file) = oid.split();
        self.objects_path.join(dir).join(file)
    }

    fn locate(&self, oid: Oid) -> BitResult<PathBuf> {
        let path = self.obj_path(oid);
        if path.exists() {
            Ok(path)
        } else {
            Err(BitError::NotFound(crate::error::NotFoundKind::Object(oid.to_hex())).into())
        }
    }

    pub fn exists(&self, oid: Oid) -> bool {
        self.obj_path(oid).exists()
    }

    /// decompress and parse the object at `oid`
    pub fn read(&self, oid: Oid) -> BitResult<Object> {
        let path = self.locate(oid)?;
        let mut envelope = Vec::new();
        ZlibDecoder::new(std::fs::File::open(&path)?).read_to_end(&mut envelope)?;
        let (kind, payload) = obj::unframe(&envelope)?;
        Object::deserialize(kind, payload)
    }

    /// frame, hash, compress and write `obj` to the store; idempotent —
    /// writing an object that already exists under its hash is a no-op
    /// (spec.md §4.2: objects are immutable, so a collision on id means the
    /// same content)
    pub fn write(&self, obj: &Object) -> BitResult<Oid> {
        let payload = obj.serialize();
        let envelope = obj::frame(obj.kind(), &payload);
        let oid = hash::hash_bytes(&envelope);
        self.write_envelope(oid, &envelope)?;
        Ok(oid)
    }

    fn write_envelope(&self, oid: Oid, envelope: &[u8]) -> BitResult<()> {
        let path = self.obj_path(oid);
        if path.exists() {
            return Ok(());
        }
        let mut compressed = Vec::new();
        ZlibEncoder::new(&mut compressed, Compression::default()).write_all(envelope)?;
        lockfile::write_atomic(&path, &compressed)
    }

    pub fn objects_path(&self) -> &Path {
        &self.objects_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::Blob;

    #[test]
    fn write_then_read_round_trips_blob() {
        let tmp = tempfile::tempdir().unwrap();
        let db = ObjectDb::new(tmp.path());
        let obj = Object::Blob(Blob::new(b"Hello".to_vec()));
        let oid = db.write(&obj).unwrap();
        assert_eq!(oid.to_hex(), "5ab2f8a4323abafb10abb68657d9d39f1a775057");
        let read_back = db.read(oid).unwrap();
        assert_eq!(read_back.as_blob().unwrap().bytes(), b"Hello");
    }

    #[test]
    fn write_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let db = ObjectDb::new(tmp.path());
        let obj = Object::Blob(Blob::new(b"same".to_vec()));
        let first = db.write(&obj).unwrap();
        let second = db.write(&obj).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn read_missing_object_fails_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let db = ObjectDb::new(tmp.path());
        let oid: Oid = "5ab2f8a4323abafb10abb68657d9d39f1a775057".parse().unwrap();
        assert!(db.read(oid).is_err());
    }

    #[test]
    fn objects_are_split_into_prefix_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let db = ObjectDb::new(tmp.path());
        let obj = Object::Blob(Blob::new(b"Hello".to_vec()));
        let oid = db.write(&obj).unwrap();
        let (prefix, rest) = oid.split();
        assert!(tmp.path().join(&prefix).join(&rest).exists());
    }

    #[test]
    fn malformed_envelope_fails_on_read() {
        let tmp = tempfile::tempdir().unwrap();
        let db = ObjectDb::new(tmp.path());
        let oid = hash::hash_bytes(b"garbage");
        db.write_envelope(oid, b"bogus 1\0x").unwrap();
        assert!(db.read(oid).is_err());
    }
}
