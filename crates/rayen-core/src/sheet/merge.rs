//! Column-wise merge of record batches into an existing sheet.
//!
//! Record `i` of a batch belongs to data row `i`. For each canonical column
//! the first header matching one of its aliases is reused; otherwise the
//! column is appended. Under [`WritePolicy::OnlyIfEmpty`] a non-empty cell
//! is never touched, which makes repeated merges of the same batch no-ops.
//! Under [`WritePolicy::Overwrite`] every non-empty record value is written
//! and counted, even when it equals the current cell.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    ensure_unlocked, header_key, load_document, patch_workbook, save_document, CellValue,
    ColumnAliases, SheetFormat, SheetResult, SpreadsheetDocument,
};

/// Headers at least this close to a missing canonical name are reported as
/// probable typos before a new column is created.
const NEAR_MISS_THRESHOLD: f64 = 0.88;

/// Anything that can supply canonical column values for one sheet row.
pub trait MergeSource {
    /// Value for a canonical column name, [`CellValue::Empty`] when absent.
    fn value_for(&self, canonical: &str) -> CellValue;
}

impl<T: MergeSource + ?Sized> MergeSource for &T {
    fn value_for(&self, canonical: &str) -> CellValue {
        (**self).value_for(canonical)
    }
}

impl MergeSource for HashMap<String, CellValue> {
    fn value_for(&self, canonical: &str) -> CellValue {
        self.get(canonical).cloned().unwrap_or_default()
    }
}

impl MergeSource for BTreeMap<String, CellValue> {
    fn value_for(&self, canonical: &str) -> CellValue {
        self.get(canonical).cloned().unwrap_or_default()
    }
}

/// Whether a merge may replace cells that already hold a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Only write into empty cells
    #[default]
    OnlyIfEmpty,
    /// Replace existing values with the record's value
    Overwrite,
}

/// Cells written per canonical column, in alias-map order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    counts: Vec<(String, usize)>,
}

impl MergeStats {
    pub fn get(&self, canonical: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(name, _)| name == canonical)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// `{"SEXO": 3, ...}` for machine-readable reports.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.counts
                .iter()
                .map(|(name, count)| (name.clone(), serde_json::Value::from(*count)))
                .collect(),
        )
    }

    fn record(&mut self, canonical: &str, count: usize) {
        self.counts.push((canonical.to_string(), count));
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .counts
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Merge `records` into `doc` column by column.
///
/// Rows past the end of the batch are left alone and surplus records are
/// ignored.
pub fn merge_in_place<R: MergeSource>(
    doc: &mut SpreadsheetDocument,
    records: &[R],
    aliases: &ColumnAliases,
    policy: WritePolicy,
) -> MergeStats {
    if records.len() > doc.row_count() {
        tracing::warn!(
            records = records.len(),
            rows = doc.row_count(),
            "more records than sheet rows, surplus records ignored"
        );
    }

    let mut stats = MergeStats::default();
    for (canonical, names) in aliases.iter() {
        let col = match doc.find_column(names) {
            Some(col) => col,
            None => {
                warn_near_misses(doc, canonical);
                let col = doc.append_column(canonical);
                tracing::info!(column = canonical, index = col, "created missing column");
                col
            }
        };

        let mut written = 0;
        for (row, record) in records.iter().enumerate().take(doc.row_count()) {
            let value = record.value_for(canonical);
            if value.is_empty() {
                continue;
            }
            let current = doc.cell(row, col);
            if policy == WritePolicy::OnlyIfEmpty && !current.is_empty() {
                continue;
            }
            doc.set_cell(row, col, value);
            written += 1;
        }
        tracing::debug!(column = canonical, written, "merged column");
        stats.record(canonical, written);
    }
    stats
}

/// Load `source`, merge the batch and save the result to `dest`.
///
/// Both paths are checked for locks before any work. `dest` is replaced
/// atomically. Between workbooks only the changed cells and appended
/// headers are written, so other sheets, formulas and formatting are kept.
pub fn merge_file<R: MergeSource>(
    source: &Path,
    dest: &Path,
    records: &[R],
    aliases: &ColumnAliases,
    policy: WritePolicy,
) -> SheetResult<MergeStats> {
    ensure_unlocked(source)?;
    if dest != source {
        ensure_unlocked(dest)?;
    }

    let mut doc = load_document(source)?;
    let before = doc.clone();
    let stats = merge_in_place(&mut doc, records, aliases, policy);

    match (SheetFormat::from_path(source)?, SheetFormat::from_path(dest)?) {
        (SheetFormat::Xlsx, SheetFormat::Xlsx) => {
            patch_workbook(source, dest, &doc.changes_from(&before))?;
        }
        _ => save_document(&doc, dest, None)?,
    }

    tracing::info!("Merged {} cell(s) into {}", stats.total(), dest.display());
    Ok(stats)
}

/// [`merge_file`] writing back to the same file.
pub fn merge_into_file<R: MergeSource>(
    path: &Path,
    records: &[R],
    aliases: &ColumnAliases,
    policy: WritePolicy,
) -> SheetResult<MergeStats> {
    merge_file(path, path, records, aliases, policy)
}

fn warn_near_misses(doc: &SpreadsheetDocument, canonical: &str) {
    let wanted = header_key(canonical);
    for header in doc.headers() {
        let key = header_key(header);
        if key.is_empty() {
            continue;
        }
        let score = strsim::jaro_winkler(&wanted, &key);
        if score >= NEAR_MISS_THRESHOLD {
            tracing::warn!(
                column = canonical,
                header = header.as_str(),
                score,
                "header looks like a misspelling of a missing column; creating a new one"
            );
        }
    }
}
