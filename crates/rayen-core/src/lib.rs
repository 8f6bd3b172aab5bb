//! Rayen Core Library
//!
//! Text classification and spreadsheet reconciliation for the Rayen APS
//! clinical portal automation.
//!
//! # Architecture
//!
//! ```text
//!   Portal text (popover, record table, anamnesis note)
//!                          │
//!                          ▼
//!                 text::normalize (NFD, no accents, UPPER)
//!                          │
//!       ┌──────────────┬───┴──────────┬──────────────┐
//!       ▼              ▼              ▼              ▼
//!   format_rut     bucket_of    detect_attention  detect_deficit
//!       │              │              │              │
//!       └──────────────┴──────┬───────┴──────────────┘
//!                             ▼
//!                 models::PatientRecord (fill-only-if-empty)
//!                             │
//!                             ▼
//!                 sheet::merge_in_place (record i ↔ row i)
//!                             │
//!                             ▼
//!                 .xlsx / .csv saved atomically
//! ```
//!
//! # Core Principle
//!
//! **Existing data is never overwritten.** A record field that already holds
//! a value keeps it, and by default the merge only writes into empty cells.
//!
//! # Modules
//!
//! - [`text`]: normalization, name cleanup, RUT formatting
//! - [`classify`]: age, attention type, deficit, sex and anamnesis classifiers
//! - [`models`]: `PatientRecord` and `DateRange`
//! - [`sheet`]: spreadsheet document, storage and merge

pub mod classify;
pub mod models;
pub mod sheet;
pub mod text;

// Re-export commonly used types
pub use classify::{
    analyze_anamnesis, AgeBucket, AnamnesisAnalysis, AttentionType, Deficit, Sex,
};
pub use models::{DateRange, DateRangeError, PatientRecord};
pub use sheet::{
    merge_in_place, merge_into_file, CellValue, ColumnAliases, MergeStats, SheetError,
    SheetResult, SpreadsheetDocument, WritePolicy,
};
pub use text::{format_rut, normalize};
