//! Reading and writing sheets on disk.
//!
//! `.xlsx` is read with calamine. New workbooks are written with
//! rust_xlsxwriter, while existing ones are patched cell by cell with
//! umya-spreadsheet so other sheets, formulas and styles survive. `.csv`
//! goes through the csv crate. Writes land in a temp file next to the
//! target and are renamed into place, so a failed save never leaves a
//! truncated workbook behind. Only the first worksheet is read.

use std::fs::{self, File, OpenOptions};
use std::io::{Cursor, Write};
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;

use super::{CellChange, CellValue, SheetError, SheetResult, SpreadsheetDocument, COL_DATE};

/// Excel's hard limits.
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLS: usize = 16_384;

pub const BAND_YELLOW: u32 = 0xFFF200;
pub const BAND_PINK: u32 = 0xFFB6C1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> SheetResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(SheetFormat::Xlsx),
            Some("csv") => Ok(SheetFormat::Csv),
            _ => Err(SheetError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Alternating fill on one column, switching colour whenever that column's
/// value changes from the previous row. Used to separate days visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banding {
    pub column: usize,
    pub colors: [u32; 2],
}

impl Banding {
    pub fn new(column: usize) -> Self {
        Self {
            column,
            colors: [BAND_YELLOW, BAND_PINK],
        }
    }

    /// Banding on the `FECHA` column, if the sheet has one.
    pub fn for_date_column(doc: &SpreadsheetDocument) -> Option<Self> {
        doc.find_column(&[COL_DATE]).map(Self::new)
    }

    /// Band index (0 or 1) for each data row.
    pub fn row_bands(&self, doc: &SpreadsheetDocument) -> Vec<usize> {
        let mut bands = Vec::with_capacity(doc.row_count());
        let mut current = 0;
        let mut previous: Option<String> = None;
        for row in 0..doc.row_count() {
            let key = doc.cell(row, self.column).as_text();
            if previous.as_ref().is_some_and(|p| *p != key) {
                current ^= 1;
            }
            bands.push(current);
            previous = Some(key);
        }
        bands
    }

    /// Fill colour for each data row.
    pub fn row_colors(&self, doc: &SpreadsheetDocument) -> Vec<u32> {
        self.row_bands(doc)
            .into_iter()
            .map(|band| self.colors[band])
            .collect()
    }
}

/// Fail with [`SheetError::Locked`] when the file is open elsewhere.
///
/// Checks for the `~$name` owner file Office leaves beside open workbooks,
/// then tries to open the file for writing. A missing file is not locked.
pub fn ensure_unlocked(path: &Path) -> SheetResult<()> {
    if let Some(name) = path.file_name() {
        let owner_file = path.with_file_name(format!("~${}", name.to_string_lossy()));
        if owner_file.exists() {
            tracing::warn!("Found Office lock file {}", owner_file.display());
            return Err(SheetError::Locked {
                path: path.to_path_buf(),
            });
        }
    }
    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| SheetError::from_io("open", path, e))?;
    }
    Ok(())
}

/// Load the first worksheet of an `.xlsx` or `.csv` file.
pub fn load_document(path: &Path) -> SheetResult<SpreadsheetDocument> {
    let format = SheetFormat::from_path(path)?;
    fs::metadata(path).map_err(|e| SheetError::from_io("open", path, e))?;

    let doc = match format {
        SheetFormat::Xlsx => load_xlsx(path)?,
        SheetFormat::Csv => load_csv(path)?,
    };
    tracing::info!(
        "Loaded {} row(s) x {} column(s) from {}",
        doc.row_count(),
        doc.column_count(),
        path.display()
    );
    Ok(doc)
}

/// Save a document, replacing `path` atomically.
///
/// Banding is applied to `.xlsx` output only.
pub fn save_document(
    doc: &SpreadsheetDocument,
    path: &Path,
    banding: Option<&Banding>,
) -> SheetResult<()> {
    let bytes = match SheetFormat::from_path(path)? {
        SheetFormat::Xlsx => xlsx_bytes(doc, path, banding)?,
        SheetFormat::Csv => {
            if banding.is_some() {
                tracing::debug!("CSV output has no cell fills; banding skipped");
            }
            csv_bytes(doc, path)?
        }
    };
    write_atomically(path, &bytes)?;
    tracing::info!("Saved {} row(s) to {}", doc.row_count(), path.display());
    Ok(())
}

/// Copy the `.xlsx` workbook at `source` to `dest` with `changes` applied
/// to its first worksheet. Every other cell, sheet and style is kept.
///
/// Dates are written as `DD-MM-YYYY` text, matching what [`load_document`]
/// reads back.
pub fn patch_workbook(source: &Path, dest: &Path, changes: &[CellChange]) -> SheetResult<()> {
    let mut book = umya_spreadsheet::reader::xlsx::read(source).map_err(|e| SheetError::Read {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    let sheet = book.get_sheet_mut(&0).ok_or_else(|| SheetError::EmptySheet {
        path: source.to_path_buf(),
    })?;

    for change in changes {
        if change.row >= XLSX_MAX_ROWS || change.col >= XLSX_MAX_COLS {
            return Err(SheetError::Write {
                path: dest.to_path_buf(),
                message: format!(
                    "cell at row {} column {} is outside the xlsx limits",
                    change.row + 1,
                    change.col + 1
                ),
            });
        }
        let cell = sheet.get_cell_mut(((change.col + 1) as u32, (change.row + 1) as u32));
        match &change.value {
            CellValue::Number(n) => {
                cell.set_value_number(*n);
            }
            CellValue::Bool(b) => {
                cell.set_value_bool(*b);
            }
            other => {
                cell.set_value_string(other.to_string());
            }
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).map_err(|e| {
        SheetError::Write {
            path: dest.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    write_atomically(dest, buffer.get_ref())?;
    tracing::info!("Patched {} cell(s) in {}", changes.len(), dest.display());
    Ok(())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> SheetResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp =
        NamedTempFile::new_in(dir).map_err(|e| SheetError::from_io("create temp file in", dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| SheetError::from_io("write", path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| SheetError::from_io("sync", path, e))?;
    temp.persist(path)
        .map_err(|e| SheetError::from_io("replace", path, e.error))?;
    Ok(())
}

fn load_xlsx(path: &Path) -> SheetResult<SpreadsheetDocument> {
    let read_error = |message: String| SheetError::Read {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SheetError::EmptySheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| read_error(e.to_string()))?;

    // calamine ranges start at the first used cell; re-anchor at A1.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(cell_from_calamine));
        grid.push(cells);
    }

    let mut grid = grid.into_iter();
    let headers = grid
        .next()
        .map(|cells| cells.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    Ok(SpreadsheetDocument::from_parts(headers, grid.collect()))
}

fn cell_from_calamine(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => other
            .as_date()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(other.to_string())),
    }
}

fn load_csv(path: &Path) -> SheetResult<SpreadsheetDocument> {
    let read_error = |e: csv::Error| SheetError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::open(path).map_err(|e| SheetError::from_io("open", path, e))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(read_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(SpreadsheetDocument::from_parts(headers, rows))
}

fn csv_bytes(doc: &SpreadsheetDocument, path: &Path) -> SheetResult<Vec<u8>> {
    let write_error = |message: String| SheetError::Write {
        path: path.to_path_buf(),
        message,
    };

    let width = doc.column_count();
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let mut header: Vec<&str> = doc.headers().iter().map(String::as_str).collect();
    header.resize(width, "");
    writer
        .write_record(&header)
        .map_err(|e| write_error(e.to_string()))?;

    for row in doc.rows() {
        let mut cells: Vec<String> = row.iter().map(CellValue::as_text).collect();
        cells.resize(width, String::new());
        writer
            .write_record(&cells)
            .map_err(|e| write_error(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| write_error(e.to_string()))
}

fn xlsx_bytes(
    doc: &SpreadsheetDocument,
    path: &Path,
    banding: Option<&Banding>,
) -> SheetResult<Vec<u8>> {
    if doc.row_count() + 1 > XLSX_MAX_ROWS || doc.column_count() > XLSX_MAX_COLS {
        return Err(SheetError::Write {
            path: path.to_path_buf(),
            message: format!(
                "{} rows x {} columns exceeds the xlsx limits",
                doc.row_count() + 1,
                doc.column_count()
            ),
        });
    }
    build_workbook(doc, banding).map_err(|e| SheetError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Row and column counts must already be within Excel's limits.
fn build_workbook(doc: &SpreadsheetDocument, banding: Option<&Banding>) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in doc.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    let fills = banding.map(|b| {
        let formats: Vec<Format> = b
            .colors
            .iter()
            .map(|rgb| {
                Format::new()
                    .set_background_color(Color::RGB(*rgb))
                    .set_pattern(FormatPattern::Solid)
            })
            .collect();
        (b.column, b.row_bands(doc), formats)
    });

    for (r, cells) in doc.rows().iter().enumerate() {
        let row = (r + 1) as u32;
        let band = fills
            .as_ref()
            .map(|(column, bands, formats)| (*column, &formats[bands[r]]));
        let width = match band {
            Some((column, _)) => cells.len().max(column + 1),
            None => cells.len(),
        };
        for col in 0..width {
            let cell = cells.get(col).unwrap_or(&CellValue::Empty);
            let format = band.filter(|(column, _)| *column == col).map(|(_, f)| f);
            write_cell(worksheet, row, col as u16, cell, format)?;
        }
    }

    workbook.save_to_buffer()
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    if cell.is_empty() {
        if let Some(format) = format {
            worksheet.write_blank(row, col, format)?;
        }
        return Ok(());
    }
    match (cell, format) {
        (CellValue::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Bool(b), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (other, Some(format)) => {
            worksheet.write_string_with_format(row, col, &other.to_string(), format)?;
        }
        (other, None) => {
            worksheet.write_string(row, col, &other.to_string())?;
        }
    }
    Ok(())
}
