//! Error types for ankit-collection.

use thiserror::Error;

/// Result type for ankit-collection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, preparing, or persisting records.
#[derive(Debug, Error)]
pub enum Error {
    /// Two entries of a JSON collection column share the same `name`.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A declared-unique column collided at commit time.
    #[error("unique constraint violated on {table}: {detail}")]
    UniqueConstraint {
        /// Table the write targeted.
        table: &'static str,
        /// Message reported by the storage engine.
        detail: String,
    },

    /// Stored text or integers could not be decoded into a record value.
    #[error("cannot decode column '{column}': {message}")]
    Decode {
        /// Column being decoded.
        column: &'static str,
        /// What went wrong.
        message: String,
    },

    /// A record failed validation before being written.
    #[error("invalid record: {0}")]
    Validation(String),

    /// A record that was expected to exist does not.
    #[error("{table} record not found: {id}")]
    NotFound {
        /// Table that was searched.
        table: &'static str,
        /// Identifier that was looked up.
        id: i64,
    },

    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error (package feature).
    #[cfg(feature = "package")]
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    pub(crate) fn decode(column: &'static str, message: impl Into<String>) -> Self {
        Error::Decode {
            column,
            message: message.into(),
        }
    }

    /// Map a storage error raised while writing to `table`, surfacing
    /// unique and primary key failures as [`Error::UniqueConstraint`].
    pub(crate) fn on_write(table: &'static str, err: rusqlite::Error) -> Self {
        use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    || code.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Error::UniqueConstraint {
                    table,
                    detail: message.unwrap_or_else(|| code.to_string()),
                }
            }
            other => Error::Sqlite(other),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failure_maps_to_unique_constraint() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: notes.guid".to_string()),
        );
        match Error::on_write("notes", err) {
            Error::UniqueConstraint { table, detail } => {
                assert_eq!(table, "notes");
                assert!(detail.contains("notes.guid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_null_failure_is_not_unique() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL),
            None,
        );
        assert!(matches!(Error::on_write("notes", err), Error::Sqlite(_)));
    }

    #[test]
    fn test_other_sqlite_errors_pass_through() {
        let err = Error::on_write("cards", rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, Error::Sqlite(_)));
    }
}
