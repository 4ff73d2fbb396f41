use thiserror::Error;

/// Errors surfaced by target resolution and result assembly.
///
/// Queries that simply do not apply to a subset are not errors: they produce
/// empty targets and a message on the session's warning sink.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A query path matched more than one node and carried no occurrence
    /// index to pick one.
    #[error("query must match a single element; are you missing an index? {query}")]
    AmbiguousQuery { query: String },

    /// `ResultSet::get` was asked for a field no query produced.
    #[error("no target found for field \"{field}\"")]
    FieldNotFound { field: String },

    /// The group-by field's dimension path is not a prefix of the target
    /// field's dimension path.
    #[error(
        "group-by field \"{group_by}\" ({group_by_path}) does not share a common \
         path with field \"{field}\" ({field_path})"
    )]
    IncompatibleGroupBy {
        group_by: String,
        group_by_path: String,
        field: String,
        field_path: String,
    },

    /// Conversions between numbers and strings are not supported.
    #[error("cannot convert between numbers and strings for field \"{field}\"")]
    IncompatibleOverride { field: String },

    /// `ResultSet::get` was called before any frames were collected.
    #[error("result set contains no data")]
    EmptyResultSet,

    /// A query path was structurally malformed (empty, or with an empty
    /// component name).
    #[error("invalid query path: {reason}")]
    InvalidPath { reason: String },
}
