//! the blob object: an opaque byte sequence, no structure at all

use crate::error::BitResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn deserialize(payload: &[u8]) -> BitResult<Self> {
        Ok(Self { bytes: payload.to_vec() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let blob = Blob::new(b"Hello".to_vec());
        assert_eq!(Blob::deserialize(&blob.serialize()).unwrap(), blob);
    }
}
