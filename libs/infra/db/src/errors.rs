// [libs/infra/db/src/errors.rs]
//! Error catalog for the device-pool store. Carries the bracketed
//! error-code message prefix convention from the teacher's `DbError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE -> {0}")]
    TransactionError(String),
}
