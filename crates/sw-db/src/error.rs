//! Error types for sw-db

use thiserror::Error;

/// Store errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Could not open the database (D001)
    #[error("[D001] Cannot open database: {0}")]
    ConnectionError(String),

    /// A statement was rejected; the message ends with the statement (D002)
    #[error("[D002] Statement failed: {0}")]
    ExecutionError(String),

    /// A statement referenced a table that does not exist (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// A previous holder of the connection panicked (D004)
    #[error("[D004] Connection lock poisoned: {0}")]
    MutexPoisoned(String),

    /// Version-history row that cannot be decoded (D005)
    #[error("[D005] Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a DuckDB failure of `sql`.
    ///
    /// duckdb::Error carries no structured catalog variants, so missing
    /// tables are recognised by message.
    pub(crate) fn from_statement(err: duckdb::Error, sql: &str) -> Self {
        let msg = format!("{}: {}", err, sql);
        let text = err.to_string();
        if text.contains("Table with name")
            || text.contains("Table or view with name")
            || (text.contains("Catalog Error") && text.contains("Table") && text.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_table_is_classified() {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        let sql = "SELECT * FROM nowhere";
        let err = conn.execute_batch(sql).unwrap_err();

        let classified = DbError::from_statement(err, sql);
        assert!(matches!(classified, DbError::TableNotFound(_)));
        assert!(classified.to_string().ends_with("SELECT * FROM nowhere"));
    }

    #[test]
    fn test_other_failures_are_execution_errors() {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        let sql = "SELEC 1";
        let err = conn.execute_batch(sql).unwrap_err();

        assert!(matches!(
            DbError::from_statement(err, sql),
            DbError::ExecutionError(_)
        ));
    }
}
