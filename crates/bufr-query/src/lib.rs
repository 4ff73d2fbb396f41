//! Path-query engine over decoded BUFR subsets.
//!
//! BUFR messages are tables-driven, self-describing binary records; each
//! subset expands to a tree of nested sequences and replications whose shape
//! varies per message. Given a subset already decoded into a flat value
//! inventory (the [`DataProvider`] contract), this crate:
//!
//! - resolves path queries (`*/SEQ/SUBSEQ/LEAF[i]`) against the subset's
//!   descriptor table ([`SubsetTable`], [`QueryRunner`]),
//! - walks the value inventory once per subset, reconstructing replication
//!   counts and extracting target values into a [`DataFrame`],
//! - assembles frames into dense N-dimensional typed arrays, padding jagged
//!   occurrence shapes with [`MISSING_VALUE`] ([`ResultSet`]).
//!
//! The engine is single-threaded and in-memory; one [`QueryRunner`] plus one
//! [`ResultSet`] form a session driven subset-by-subset by the caller.

#![forbid(unsafe_code)]

mod collector;
mod data_object;
mod error;
mod frame;
mod masks;
mod offset_array;
mod provider;
mod result_set;
mod runner;
mod sink;
mod subset_table;
mod target;

pub use data_object::{
    pack_chars, unpack_chars, DataObject, DataValues, OverrideType, ParseOverrideError,
};
pub use error::QueryError;
pub use frame::{DataField, DataFrame};
pub use masks::ProcessingMasks;
pub use provider::DataProvider;
pub use result_set::ResultSet;
pub use runner::QueryRunner;
pub use sink::{DiscardWarnings, WarningSink};
pub use subset_table::{BufrNode, SubsetTable};
pub use target::{Target, TargetComponent, TargetComponentKind, Targets};

/// Sentinel for absent values in assembled arrays. Any value whose magnitude
/// reaches this threshold is treated as missing downstream.
pub const MISSING_VALUE: f64 = 10e10;
