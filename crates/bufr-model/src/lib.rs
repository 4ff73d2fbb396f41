//! `bufr-model` defines the core data structures of the BUFR query engine.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the query engine (`bufr-query`: target resolution, collection, results)
//! - configuration layers that describe exports as query strings
//! - IPC boundaries via `serde` (JSON-safe schema)

#![forbid(unsafe_code)]

mod query;
mod typ;
mod type_info;

pub use query::{split_path, Query, QueryComponent, QuerySet, SubsetSpec};
pub use typ::{ParseTypError, Typ};
pub use type_info::TypeInfo;
