//! Error types for catalog resolution.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Failures surfaced by the catalog aggregators.
///
/// An empty collection (a domain or organization with no endpoints) is a
/// value, not an error. Only the single-endpoint lookup distinguishes
/// "nothing matched" as a failure.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no endpoint found for ip '{0}'")]
    EndpointNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
