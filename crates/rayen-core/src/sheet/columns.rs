//! Canonical column names and the header aliases accepted for them.

use serde::{Deserialize, Serialize};

pub const COL_DATE: &str = "FECHA";
pub const COL_BLANK_1: &str = "VACIO1";
pub const COL_BLANK_2: &str = "VACIO2";
pub const COL_SECTOR: &str = "SECTOR";
pub const COL_NAME: &str = "NOMBRE";
pub const COL_RUN: &str = "RUN";
pub const COL_ATTENTION: &str = "TIPO DE ATENCIÓN";
pub const COL_AGE: &str = "EDAD";
pub const COL_DEFICIT: &str = "DÉFICIT";
pub const COL_SEX: &str = "SEXO";
pub const COL_COUNSELING: &str = "CONSEJERIA";

/// Column order of the scheduled-patients workbook. The two blank columns
/// are kept for the clinic's manual annotations.
pub const SCHEDULED_COLUMNS: [&str; 11] = [
    COL_DATE,
    COL_BLANK_1,
    COL_BLANK_2,
    COL_SECTOR,
    COL_NAME,
    COL_RUN,
    COL_ATTENTION,
    COL_AGE,
    COL_DEFICIT,
    COL_SEX,
    COL_COUNSELING,
];

/// Ordered canonical name → accepted header spellings.
///
/// Order matters: merge statistics and newly created columns follow it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnAliases {
    entries: Vec<(String, Vec<String>)>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical column. Aliases are tried in order, then the
    /// canonical name itself.
    pub fn with<I, S>(mut self, canonical: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for alias in aliases.into_iter().map(Into::into).chain([canonical.to_string()]) {
            if !names.contains(&alias) {
                names.push(alias);
            }
        }
        self.entries.push((canonical.to_string(), names));
        self
    }

    /// Columns the fill flow writes back to an existing sheet.
    pub fn fill_columns() -> Self {
        Self::new()
            .with(COL_SEX, [COL_SEX])
            .with(COL_COUNSELING, [COL_COUNSELING, "CONSEJERÍA"])
            .with(COL_ATTENTION, [COL_ATTENTION, "TIPO DE ATENCION"])
            .with(COL_DEFICIT, [COL_DEFICIT, "DEFICIT"])
    }

    /// Canonical names in order.
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Accepted spellings for a canonical name.
    pub fn aliases_for(&self, canonical: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == canonical)
            .map(|(_, aliases)| aliases.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, aliases)| (name.as_str(), aliases.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
