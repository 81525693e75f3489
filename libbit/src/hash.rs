//! SHA-1 object ids.
//!
//! bit is deliberately pinned to SHA-1 (not SHA-256) as that is what makes
//! the object store bit-for-bit compatible with upstream git.

use crate::error::{BitError, BitGenericError};
use sha1::{Digest, Sha1};
use std::convert::TryInto;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

pub const OID_HEX_LEN: usize = 40;
pub const OID_BYTE_LEN: usize = 20;

/// a 160-bit object id, the key into the object store
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid([u8; OID_BYTE_LEN]);

impl Oid {
    pub fn new(bytes: [u8; OID_BYTE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; OID_BYTE_LEN] {
        &self.0
    }

    /// split into the two-character directory prefix and the remaining 38
    /// hex characters used as the filename under `objects/`
    ///
    /// (see REDESIGN FLAGS in spec.md §9: this must be `hex[2..]`, not the
    /// empty `hex[2..2]` slice a naive port of the original would produce)
    pub fn split(&self) -> (String, String) {
        let hex = hex::encode(self.0);
        (hex[..2].to_owned(), hex[2..].to_owned())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Debug for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl Display for Oid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Oid {
    type Err = BitGenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OID_HEX_LEN {
            bail!("expected a {}-character hex object id, found `{}` ({} characters)", OID_HEX_LEN, s, s.len());
        }
        let bytes = hex::decode(s)
            .map_err(|err| anyhow!("invalid hex in object id `{}`: {}", s, err))?
            .try_into()
            .map_err(|_| anyhow!("object id `{}` did not decode to {} bytes", s, OID_BYTE_LEN))?;
        Ok(Self(bytes))
    }
}

pub fn hash_bytes(bytes: impl AsRef<[u8]>) -> Oid {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    Oid(hasher.finalize().into())
}

/// incremental SHA-1, used for the index trailer checksum
#[derive(Default)]
pub struct Hasher(Sha1);

impl Hasher {
    pub fn new() -> Self {
        Self(Sha1::new())
    }

    pub fn update(&mut self, bytes: impl AsRef<[u8]>) {
        self.0.update(bytes);
    }

    pub fn finalize(self) -> Oid {
        Oid(self.0.finalize().into())
    }
}

/// parses a hex string that may be a full 40-character oid or a 4-40
/// character abbreviation; used by the name resolver
pub fn is_valid_hex_prefix(s: &str) -> bool {
    (4..=OID_HEX_LEN).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn malformed(msg: impl Into<String>) -> BitGenericError {
    anyhow::Error::new(BitError::MalformedObject(msg.into()))
}

#[cfg(test)]
impl quickcheck::Arbitrary for Oid {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let mut bytes = [0u8; OID_BYTE_LEN];
        for byte in &mut bytes {
            *byte = u8::arbitrary(g);
        }
        Self(bytes)
    }
}
