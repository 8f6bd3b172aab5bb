//! Portal errors.

use std::path::PathBuf;

use rayen_core::models::DateRangeError;
use rayen_core::sheet::SheetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Login failed: {0}")]
    Authentication(String),

    #[error("Menu entry not found: {0}")]
    Navigation(String),

    #[error("Page element not found: {0}")]
    NotFound(String),

    #[error("Fixture parse error: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

pub type PortalResult<T> = Result<T, PortalError>;
