//! Database error types

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Stored value could not be converted to its domain type
    #[error("Decode error: {0}")]
    DecodeFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Creates a decode error for a stored value that no longer parses
    pub fn decode(column: &str, detail: impl std::fmt::Display) -> Self {
        DatabaseError::DecodeFailed(format!("column '{}': {}", column, detail))
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// Maps PostgreSQL error codes to the matching variant.
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                        "23503" => {
                            DatabaseError::ForeignKeyViolation(db_err.message().to_string())
                        }
                        "23514" => {
                            DatabaseError::ConstraintViolation(db_err.message().to_string())
                        }
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

/// Translates database errors to the port error vocabulary
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match &error {
            DatabaseError::NotFound(msg) => PortError::NotFound {
                entity_type: "record".to_string(),
                id: msg.clone(),
            },
            DatabaseError::DuplicateEntry(msg)
            | DatabaseError::ForeignKeyViolation(msg)
            | DatabaseError::ConstraintViolation(msg) => PortError::Conflict {
                message: msg.clone(),
            },
            DatabaseError::ConnectionFailed(msg) => PortError::Connection {
                message: msg.clone(),
                source: None,
            },
            DatabaseError::PoolExhausted => PortError::Connection {
                message: "connection pool exhausted".to_string(),
                source: None,
            },
            _ => PortError::Internal {
                message: error.to_string(),
                source: None,
            },
        }
    }
}
