use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Spreadsheet storage errors.
#[derive(Error, Debug)]
pub enum SheetError {
    /// The file is held open by another program (or is read-only).
    #[error("Spreadsheet is locked or read-only, close it in other programs and retry: {}", path.display())]
    Locked { path: PathBuf },

    #[error("Failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read spreadsheet {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to write spreadsheet {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Unsupported spreadsheet format (expected .xlsx or .csv): {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Spreadsheet has no worksheet: {}", path.display())]
    EmptySheet { path: PathBuf },

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

pub type SheetResult<T> = Result<T, SheetError>;

impl SheetError {
    /// True when the failure is a lock on the file rather than bad content.
    pub fn is_locked(&self) -> bool {
        matches!(self, SheetError::Locked { .. })
    }

    /// Wrap an I/O error, turning sharing violations into [`SheetError::Locked`].
    pub(crate) fn from_io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        if is_lock_error(&source) {
            SheetError::Locked {
                path: path.to_path_buf(),
            }
        } else {
            SheetError::Io {
                operation,
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Windows reports files open in Excel as sharing (32) or lock (33) violations.
fn is_lock_error(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::PermissionDenied
        || (cfg!(windows) && matches!(error.raw_os_error(), Some(32) | Some(33)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_locked() {
        let err = SheetError::from_io(
            "open",
            Path::new("pacientes.xlsx"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(err.is_locked());
        assert!(err.to_string().contains("pacientes.xlsx"));
    }

    #[test]
    fn test_not_found_is_io() {
        let err = SheetError::from_io(
            "open",
            Path::new("missing.xlsx"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(!err.is_locked());
        assert!(matches!(err, SheetError::Io { operation: "open", .. }));
    }
}
