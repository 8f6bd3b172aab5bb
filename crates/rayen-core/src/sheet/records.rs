//! Conversions between sheets and [`PatientRecord`] batches.

use std::path::Path;

use super::{
    save_document, Banding, MergeSource, SheetResult, SpreadsheetDocument, SCHEDULED_COLUMNS,
};
use crate::models::PatientRecord;

/// Read every data row into a record, keeping row order.
pub fn read_records(doc: &SpreadsheetDocument) -> SheetResult<Vec<PatientRecord>> {
    (0..doc.row_count())
        .map(|row| PatientRecord::from_row(doc, row))
        .collect()
}

/// Lay out scheduled patients in the extraction column order.
pub fn scheduled_document(records: &[PatientRecord]) -> SpreadsheetDocument {
    let mut doc = SpreadsheetDocument::new(SCHEDULED_COLUMNS);
    for record in records {
        doc.push_row(
            SCHEDULED_COLUMNS
                .iter()
                .map(|column| record.value_for(column))
                .collect(),
        );
    }
    doc
}

/// Write the extraction workbook with date banding on `FECHA`.
pub fn write_scheduled(records: &[PatientRecord], path: &Path) -> SheetResult<()> {
    let doc = scheduled_document(records);
    let banding = Banding::for_date_column(&doc);
    save_document(&doc, path, banding.as_ref())
}
