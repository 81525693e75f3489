//! libbit: a minimal, git-compatible object database, reference namespace,
//! and staging index.
//!
//! the four subsystems line up with spec.md §2: [`odb`] is the
//! content-addressed object store, [`refs`]/[`rev`] are the naming layer,
//! [`index`] is the staging area, and [`repo`] ties them together into a
//! repository lifecycle plus the traversal operations (`add`, `commit`,
//! `log`, `checkout`, `tag`) built on top.

#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate log;

pub mod add;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod error;
pub mod hash;
pub mod index;
pub mod lockfile;
pub mod log_graph;
pub mod obj;
pub mod odb;
pub mod path;
pub mod refs;
pub mod repo;
pub mod rev;
pub mod signature;
pub mod tag;
pub mod time;

pub use error::{BitError, BitResult};
pub use hash::Oid;
pub use repo::Repository;
