//! Database execution seam.
//!
//! Executor-backed relation lookups send their `SELECT ... IN (...)` statement
//! through [`LifeExecutor::query_all`]. Anything that can answer that call (a
//! client, a pooled connection, a recording fake in tests) can back a lookup.

use may_postgres::types::ToSql;
use may_postgres::{Client, Error as PostgresError, Row};
use std::fmt;
use std::time::Instant;

use crate::config::TetherConfig;
use crate::connection::{connect, ConnectionError};
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Failure of a query or of the lookup built on it
///
/// Relation builders return these to their caller as they received them.
#[derive(Debug)]
pub enum LifeError {
    /// Error reported by `may_postgres`
    PostgresError(PostgresError),
    /// The statement could not be prepared or bound
    QueryError(String),
    /// A returned row did not convert into a model
    ParseError(String),
    /// Anything else a lookup wants to report
    Other(String),
}

impl fmt::Display for LifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifeError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            LifeError::QueryError(s) => write!(f, "Query error: {s}"),
            LifeError::ParseError(s) => write!(f, "Parse error: {s}"),
            LifeError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for LifeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LifeError::PostgresError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for LifeError {
    fn from(err: PostgresError) -> Self {
        LifeError::PostgresError(err)
    }
}

/// Runs a read statement and hands back its rows
///
/// ```no_run
/// use tether::{LifeExecutor, MayPostgresExecutor, TetherConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = MayPostgresExecutor::from_config(&TetherConfig::load()?)?;
/// let rows = executor.query_all("SELECT id FROM posts", &[])?;
/// let post_ids: Vec<i64> = rows.iter().map(|r| r.get(0)).collect();
/// # Ok(())
/// # }
/// ```
pub trait LifeExecutor {
    /// Run `query` with `params` bound and return every row
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the statement fails.
    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, LifeError>;
}

impl<T: LifeExecutor + ?Sized> LifeExecutor for &T {
    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, LifeError> {
        (**self).query_all(query, params)
    }
}

/// `LifeExecutor` over a single `may_postgres::Client`
pub struct MayPostgresExecutor {
    client: Client,
}

impl MayPostgresExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect to `database.url` from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::InvalidConnectionString` before dialing if the
    /// URL is malformed, or the driver's error if the connection fails.
    pub fn from_config(config: &TetherConfig) -> Result<Self, ConnectionError> {
        connect(&config.database.url).map(Self::new)
    }
}

impl LifeExecutor for MayPostgresExecutor {
    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let start = Instant::now();
        let rows = self.client.query(query, params);

        let _elapsed = start.elapsed();
        #[cfg(feature = "metrics")]
        {
            METRICS.record_query_duration(_elapsed);
            if rows.is_err() {
                METRICS.record_query_error();
            }
        }

        rows.map_err(LifeError::PostgresError)
    }
}
