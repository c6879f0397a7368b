use thiserror::Error;

/// Errors returned by [`Database`](super::Database) operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// The connection could not be opened or configured.
    #[error("connection failed: {0}")]
    Connection(#[source] rusqlite::Error),

    /// A statement was rejected by the backend.
    #[error("query failed: {source}: {sql}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A database, table, index, column or row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Identifiers are formatted into SQL, so only `[A-Za-z0-9_]` is accepted.
    #[error("invalid identifier: {0:?}")]
    InvalidName(String),

    #[error("unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("table {table} takes {expected} values, got {got}")]
    ColumnCount {
        table: String,
        expected: usize,
        got: usize,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

pub type DbResult<T> = Result<T, DbError>;
