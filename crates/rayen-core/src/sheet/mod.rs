//! Spreadsheet layer: the in-memory document, on-disk formats and the
//! column-wise merge used to write portal data back into clinic sheets.

mod cell;
mod columns;
mod document;
mod error;
mod merge;
mod records;
mod storage;

pub use cell::*;
pub use columns::*;
pub use document::*;
pub use error::{SheetError, SheetResult};
pub use merge::*;
pub use records::*;
pub use storage::*;
