//! Errors raised at the crate boundary.
//!
//! Engine operations themselves never fail: a reference to a missing row is a
//! silent no-op. Only decoding rows or configuration from the outside can go
//! wrong.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid rows: {0}")]
    InvalidRows(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Column '{0}' uses a custom aggregate but no aggregator function was supplied")]
    MissingCustomAggregator(String),
}
