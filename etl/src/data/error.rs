//! Unified error type for the storage layer
//!
//! Two databases participate in a run: the operational source and the
//! warehouse target. Errors keep track of which side produced them so the
//! run driver can report the failing stage precisely.

use thiserror::Error;

/// Error type for storage-layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Operational source database error
    #[error("source database error: {0}")]
    Source(sqlx::Error),

    /// Warehouse database error
    #[error("warehouse database error: {0}")]
    Warehouse(sqlx::Error),

    /// Configuration error (bad connection URL, invalid pool settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Required dimension tables are absent before fact processing
    #[error("missing dimension tables: {}", .tables.join(", "))]
    MissingDimensions { tables: Vec<String> },
}

impl DataError {
    /// Wrap an error from the operational source database
    pub fn from_source(e: sqlx::Error) -> Self {
        Self::Source(e)
    }

    /// Wrap an error from the warehouse database
    pub fn from_warehouse(e: sqlx::Error) -> Self {
        Self::Warehouse(e)
    }

    /// Precondition failure: dimension tables the fact stages rely on are
    /// not present in the warehouse
    pub fn missing_dimensions(tables: Vec<String>) -> Self {
        Self::MissingDimensions { tables }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Source(e) | Self::Warehouse(e) => {
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
                )
            }
            Self::Config(_) | Self::MissingDimensions { .. } => false,
        }
    }

    /// Which database produced this error
    pub fn database(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Warehouse(_) | Self::MissingDimensions { .. } => "warehouse",
            Self::Config(_) => "none",
        }
    }
}
