//! Error type for the DuckDB warehouse layer

use thiserror::Error;

/// Errors surfaced by warehouse queries and service lifecycle
#[derive(Error, Debug)]
pub enum DuckdbError {
    /// DuckDB engine error
    #[error("DuckDB error: {0}")]
    Database(#[from] duckdb::Error),

    /// IO error (including blocking-task join failures)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}
