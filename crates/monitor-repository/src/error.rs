use thiserror::Error;

/// Error types for repository/database operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database error - wraps all SeaORM errors
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// Statement could not be built from the supplied values.
    #[error("Invalid statement: {0}")]
    Statement(String),

    /// Event values that cannot be represented in the store.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// No event table was prepared for the event's chain and contract.
    #[error("No event table prepared for {chain_id}/{contract}")]
    UnknownTable { chain_id: String, contract: String },

    /// Two contracts normalize to the same event table name.
    #[error("Contracts {first} and {second} both map to event table {table}")]
    TableCollision {
        table: String,
        first: String,
        second: String,
    },
}

/// Convenient Result type alias for RepositoryError
pub type Result<T> = std::result::Result<T, RepositoryError>;
