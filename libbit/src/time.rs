//! filesystem timestamps as stored in index entries (spec.md §4.6)
//!
//! grounded on the teacher's `time.rs`.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::fs::Metadata;
use std::os::unix::prelude::MetadataExt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Timespec {
    pub sec: u32,
    pub nano: u32,
}

impl Timespec {
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn new(sec: u32, nano: u32) -> Self {
        Self { sec, nano }
    }

    fn new_i64(sec: i64, nano: i64) -> Self {
        Self::new(sec as u32, nano as u32)
    }

    pub fn ctime(metadata: &Metadata) -> Self {
        Self::new_i64(metadata.ctime(), metadata.ctime_nsec())
    }

    pub fn mtime(metadata: &Metadata) -> Self {
        Self::new_i64(metadata.mtime(), metadata.mtime_nsec())
    }
}

impl Display for Timespec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sec, self.nano)
    }
}

impl PartialOrd for Timespec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timespec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sec.cmp(&other.sec).then_with(|| self.nano.cmp(&other.nano))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_sec_then_nano() {
        let a = Timespec::new(1, 500);
        let b = Timespec::new(1, 600);
        let c = Timespec::new(2, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
