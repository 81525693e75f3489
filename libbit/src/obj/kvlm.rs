//! key-value-list-with-message: the header grammar shared by commits and
//! annotated tags (spec.md §4.3)
//!
//! grounded on the teacher's `obj/commit.rs`/`obj/tag.rs`, generalized: the
//! teacher stores a single parent as `Option<Oid>` and a plain
//! `HashMap<BitPath, BitString>`, which loses both key order and repeated
//! keys; this instead keeps an ordered list of `(key, values)` pairs, one
//! `Vec<u8>` per occurrence, matching what the original Python's
//! `kvlm_parse` actually builds before the spec's distillation flattened it
//! (see SPEC_FULL.md §2b).

use crate::hash::malformed;
use crate::error::BitResult;

/// the message is stored under this sentinel key (the empty byte string),
/// matching the original's convention and spec.md S3's expected key order
pub const MESSAGE_KEY: &[u8] = b"";

/// an ordered key-value-list-with-message: every value is a list of
/// occurrences (so a length-1 list models an ordinary single-valued key,
/// and a longer one models something like repeated `parent` headers)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    entries: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
}

impl Kvlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_slice()).unwrap_or(&[])
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_all(key).first().map(Vec::as_slice)
    }

    pub fn message(&self) -> &[u8] {
        self.get(MESSAGE_KEY).unwrap_or(&[])
    }

    /// append one more occurrence of `key`, creating the entry (in
    /// insertion order) if this is the first
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key, vec![value.into()])),
        }
    }

    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.push(MESSAGE_KEY, message);
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// parse a payload laid out as header lines (`key SP value LF`, with
    /// continuation lines prefixed by a single space) followed by a blank
    /// line and a free-form message
    ///
    /// iterative over a byte cursor, not recursive (REDESIGN FLAGS, spec.md
    /// §9: the original recurses once per header)
    pub fn parse(payload: &[u8]) -> BitResult<Self> {
        let mut kvlm = Self::new();
        let mut cursor = 0;
        loop {
            if cursor >= payload.len() {
                return Err(malformed("kvlm payload ended before the header/message separator"));
            }
            if payload[cursor] == b'\n' {
                cursor += 1;
                break;
            }
            let space = payload[cursor..]
                .iter()
                .position(|&b| b == b' ')
                .map(|i| i + cursor)
                .ok_or_else(|| malformed("kvlm header line missing a space after the key"))?;
            let key = payload[cursor..space].to_vec();

            // consume the value: the first line plus any continuation lines
            // that start with a single leading space
            let mut value = Vec::new();
            let mut line_start = space + 1;
            loop {
                let newline = payload[line_start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map(|i| i + line_start)
                    .ok_or_else(|| malformed("kvlm header line is not newline-terminated"))?;
                if !value.is_empty() {
                    value.push(b'\n');
                }
                value.extend_from_slice(&payload[line_start..newline]);
                line_start = newline + 1;
                if line_start < payload.len() && payload[line_start] == b' ' {
                    line_start += 1;
                    continue;
                }
                break;
            }
            kvlm.push(key, value);
            cursor = line_start;
        }
        kvlm.set_message(&payload[cursor..]);
        Ok(kvlm)
    }

    /// serialize back into the same grammar `parse` consumes; inverts it
    /// exactly (spec.md testable property 2)
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.entries {
            if key.as_slice() == MESSAGE_KEY {
                continue;
            }
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                // continuation lines: re-insert the leading space that
                // `parse` stripped
                let mut it = value.split(|&b| b == b'\n');
                if let Some(first) = it.next() {
                    out.extend_from_slice(first);
                }
                for line in it {
                    out.push(b'\n');
                    out.push(b' ');
                    out.extend_from_slice(line);
                }
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(self.message());
        out
    }
}
