use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("query returned more than one record")]
    MoreThanOneRecord,

    #[error("no record was updated")]
    NoRecordUpdated,

    #[error("optimistic concurrency violation")]
    ConcurrencyViolation,

    #[error("unknown type discriminator value: {0}")]
    UnknownDiscriminator(i64),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("Other database error: {0}")]
    Other(String),
}
