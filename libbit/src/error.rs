use std::fmt::{self, Display, Formatter};

/// the result type used throughout libbit
///
/// most call sites just propagate with `?`; the small set of callers that
/// need to branch on *why* something failed downcast to [`BitError`]
pub type BitResult<T> = anyhow::Result<T>;
pub type BitGenericError = anyhow::Error;

/// structured error kinds a caller may want to match on
///
/// everything else (malformed input, I/O failure) is surfaced as a plain
/// `anyhow::Error` with a human-readable message; there is no value in
/// giving those their own variants since nothing downstream ever matches on
/// them specifically
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitError {
    #[error("not a bit repository (or any of the parent directories): `{0}`")]
    NotARepository(String),
    #[error("unsupported repository format version `{0}` (only version 0 is supported)")]
    UnsupportedFormat(u32),
    #[error("malformed object: {0}")]
    MalformedObject(String),
    #[error("{0}")]
    NotFound(NotFoundKind),
    #[error("prefix `{prefix}` is ambiguous; candidates: {}", .candidates.join(", "))]
    Ambiguous { prefix: String, candidates: Vec<String> },
    #[error("`{name}` is a {actual}, expected a {expected}")]
    WrongKind { name: String, expected: String, actual: String },
    #[error("index checksum mismatch: index file is corrupt")]
    ChecksumMismatch,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    Object(String),
    Ref(String),
    Revision(String),
}

impl Display for NotFoundKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundKind::Object(id) => write!(f, "object `{}` not found", id),
            NotFoundKind::Ref(name) => write!(f, "reference `{}` not found", name),
            NotFoundKind::Revision(name) => write!(f, "`{}` did not resolve to any object", name),
        }
    }
}

pub trait BitResultExt {
    /// `true` if this error represents something absent rather than broken
    fn is_not_found(&self) -> bool;
}

impl<T> BitResultExt for BitResult<T> {
    fn is_not_found(&self) -> bool {
        match self {
            Ok(..) => false,
            Err(err) => err.is_not_found(),
        }
    }
}

impl BitResultExt for BitGenericError {
    fn is_not_found(&self) -> bool {
        matches!(self.downcast_ref::<BitError>(), Some(BitError::NotFound(..)))
    }
}
