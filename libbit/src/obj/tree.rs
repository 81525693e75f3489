//! tree objects: an ordered list of `(mode, name, id)` entries, packed back
//! to back with no separator between entries (spec.md §4.4)

use crate::error::BitResult;
use crate::hash::{malformed, Oid};
use std::fmt::{self, Display, Formatter};

/// the entry's file mode, distinguishing only what checkout cares about
/// (non-goal: permission bits beyond executable are not interpreted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Tree,
    Regular,
    Executable,
    Symlink,
    Gitlink,
}

impl FileMode {
    pub fn is_tree(self) -> bool {
        matches!(self, FileMode::Tree)
    }

    pub(crate) fn from_octal(mode: u32) -> BitResult<Self> {
        Ok(match mode {
            0o40000 => FileMode::Tree,
            0o100644 => FileMode::Regular,
            0o100755 => FileMode::Executable,
            0o120000 => FileMode::Symlink,
            0o160000 => FileMode::Gitlink,
            other => return Err(malformed(format!("unrecognized tree entry mode `{:o}`", other))),
        })
    }

    fn to_octal(self) -> u32 {
        match self {
            FileMode::Tree => 0o40000,
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
            FileMode::Symlink => 0o120000,
            FileMode::Gitlink => 0o160000,
        }
    }
}

impl Display for FileMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.to_octal())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: Vec<u8>,
    pub oid: Oid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            // git writes the mode without leading zeros (5 digits for
            // 40000, 6 for the rest); spec.md property 11 requires readers
            // to accept both lengths on parse
            let mode_str = format!("{:o}", entry.mode.to_octal());
            out.extend_from_slice(mode_str.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    pub fn deserialize(payload: &[u8]) -> BitResult<Self> {
        let mut entries = Vec::new();
        let mut cursor = 0;
        while cursor < payload.len() {
            let space = payload[cursor..]
                .iter()
                .position(|&b| b == b' ')
                .map(|i| i + cursor)
                .ok_or_else(|| malformed("tree entry missing space after mode"))?;
            let mode_str = std::str::from_utf8(&payload[cursor..space])
                .map_err(|_| malformed("tree entry mode is not valid ascii"))?;
            if !(5..=6).contains(&mode_str.len()) {
                return Err(malformed(format!("tree entry mode `{}` is not 5 or 6 digits", mode_str)));
            }
            let mode_value = u32::from_str_radix(mode_str, 8)
                .map_err(|_| malformed(format!("tree entry mode `{}` is not valid octal", mode_str)))?;
            let mode = FileMode::from_octal(mode_value)?;

            let nul = payload[space + 1..]
                .iter()
                .position(|&b| b == 0)
                .map(|i| i + space + 1)
                .ok_or_else(|| malformed("tree entry missing NUL after name"))?;
            let name = payload[space + 1..nul].to_vec();

            let id_start = nul + 1;
            let id_end = id_start + crate::hash::OID_BYTE_LEN;
            if id_end > payload.len() {
                return Err(malformed("tree entry truncated before a full object id"));
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&payload[id_start..id_end]);
            entries.push(TreeEntry { mode, name, oid: Oid::new(bytes) });
            cursor = id_end;
        }
        Ok(Self { entries })
    }

    /// git's tree sort order: bytewise on the name, except directory
    /// entries sort as though their name ended in `/`
    pub fn sort_key(entry: &TreeEntry) -> Vec<u8> {
        let mut key = entry.name.clone();
        if entry.mode.is_tree() {
            key.push(b'/');
        }
        key
    }

    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| Self::sort_key(a).cmp(&Self::sort_key(b)));
    }
}
