//! Date range selection for the extraction flow.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("Day must be between 1 and 31, got {0}")]
    InvalidDay(u32),

    #[error("Start day {start} is after end day {end}")]
    Reversed { start: u32, end: u32 },
}

pub type DateRangeResult<T> = Result<T, DateRangeError>;

/// Inclusive day span within one month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub year: i32,
    pub month: u32,
    pub day_start: u32,
    pub day_end: u32,
}

impl DateRange {
    pub fn new(year: i32, month: u32, day_start: u32, day_end: u32) -> DateRangeResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DateRangeError::InvalidMonth(month));
        }
        for day in [day_start, day_end] {
            if !(1..=31).contains(&day) {
                return Err(DateRangeError::InvalidDay(day));
            }
        }
        if day_start > day_end {
            return Err(DateRangeError::Reversed {
                start: day_start,
                end: day_end,
            });
        }
        Ok(Self {
            year,
            month,
            day_start,
            day_end,
        })
    }

    /// Monday-to-Friday dates in the range. Days that do not exist in the
    /// month (e.g. 31 June) are skipped.
    pub fn weekdays(&self) -> Vec<NaiveDate> {
        (self.day_start..=self.day_end)
            .filter_map(|day| NaiveDate::from_ymd_opt(self.year, self.month, day))
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .collect()
    }

    /// File name of the extraction workbook for this range.
    pub fn output_file_name(&self) -> String {
        format!(
            "pacientes_citados_{}_{:02}_{:02}_{:02}.xlsx",
            self.year, self.month, self.day_start, self.day_end
        )
    }
}
