//! DuckDB warehouse service
//!
//! Owns the connection to the warehouse that backs every page. All row,
//! count, schema and discovery queries go through this service. Uses a
//! single shared connection protected by a mutex; blocking queries run on
//! the blocking pool with a per-query timeout so an unresponsive store
//! cannot hang the serving path.

pub mod error;
pub mod filters;
pub mod repositories;
pub mod rows;
pub mod schema;

pub use error::DuckdbError;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use duckdb::Connection;
use parking_lot::{Mutex, MutexGuard};

use crate::core::constants::DUCKDB_QUERY_TIMEOUT_SECS;

/// DuckDB warehouse service
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take() {
            // Best-effort close - log but don't panic on error
            if let Err((_, e)) = conn.close() {
                tracing::warn!("DuckDB connection close failed during drop: {}", e);
            }
        }
    }
}

impl DuckdbService {
    /// Open the warehouse database file
    pub async fn init(db_path: &Path) -> Result<Self, DuckdbError> {
        let path = db_path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            conn.execute_batch(
                "SET autoinstall_known_extensions = false;
                 SET autoload_known_extensions = false;
                 LOAD json;",
            )?;
            Ok::<_, duckdb::Error>(conn)
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))??;

        tracing::debug!(path = %db_path.display(), "DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Open an in-memory warehouse (used by tests and demo mode)
    pub fn init_in_memory() -> Result<Self, DuckdbError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Get exclusive access to the connection.
    ///
    /// # Panics
    /// Panics if the connection has been closed via `close()`.
    pub fn conn(&self) -> parking_lot::MappedMutexGuard<'_, Connection> {
        MutexGuard::map(self.conn.lock(), |opt| {
            opt.as_mut()
                .expect("DuckDB connection already closed - do not call conn() after close()")
        })
    }

    /// Run a blocking DuckDB query with timeout
    pub async fn run_query<T, F>(self: &Arc<Self>, f: F) -> Result<T, DuckdbError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DuckdbError> + Send + 'static,
    {
        let db = Arc::clone(self);
        let timeout = Duration::from_secs(DUCKDB_QUERY_TIMEOUT_SECS);
        tokio::time::timeout(
            timeout,
            tokio::task::spawn_blocking(move || {
                let conn = db.conn();
                f(&conn)
            }),
        )
        .await
        .map_err(|_| {
            tracing::warn!("DuckDB query timed out after {}s", DUCKDB_QUERY_TIMEOUT_SECS);
            DuckdbError::Timeout {
                timeout_secs: DUCKDB_QUERY_TIMEOUT_SECS,
            }
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "DuckDB query task failed");
            DuckdbError::Io(std::io::Error::other(format!(
                "Query execution failed: {}",
                e
            )))
        })?
    }

    /// Close the DuckDB connection gracefully with explicit error handling
    pub async fn close(self: Arc<Self>) -> Result<(), DuckdbError> {
        tokio::task::spawn_blocking(move || {
            let mut conn_guard = self.conn.lock();
            if let Some(conn) = conn_guard.take() {
                conn.close().map_err(|(_, e)| DuckdbError::Database(e))?;
                tracing::debug!("DuckDB connection closed");
            }
            Ok(())
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))?
    }

    /// Check if the connection is still open (test utility only)
    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }
}
