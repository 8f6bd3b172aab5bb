//! Free-text age parsing and age-bucket assignment.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::normalize;

static YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*a[ñn]os?").expect("valid years regex"));
static MONTHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*mes(es)?").expect("valid months regex"));
static DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*d[ií]as?").expect("valid days regex"));

/// Age group used by the clinic's child-development reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBucket {
    /// 0 to 6 months
    Under7Months,
    /// 7 to 11 months
    Months7To11,
    /// 12 to 17 months
    Months12To17,
    /// 18 to 23 months
    Months18To23,
    /// 24 to 47 months
    Months24To47,
    /// 48 to 59 months
    Months48To59,
    /// 60 months and older
    Months60Plus,
}

/// Inclusive month ranges, in order. The last range is open-ended.
const AGE_RANGES: [(u32, u32, AgeBucket); 7] = [
    (0, 6, AgeBucket::Under7Months),
    (7, 11, AgeBucket::Months7To11),
    (12, 17, AgeBucket::Months12To17),
    (18, 23, AgeBucket::Months18To23),
    (24, 47, AgeBucket::Months24To47),
    (48, 59, AgeBucket::Months48To59),
    (60, u32::MAX, AgeBucket::Months60Plus),
];

impl AgeBucket {
    /// All buckets in ascending order.
    pub const ALL: [AgeBucket; 7] = [
        AgeBucket::Under7Months,
        AgeBucket::Months7To11,
        AgeBucket::Months12To17,
        AgeBucket::Months18To23,
        AgeBucket::Months24To47,
        AgeBucket::Months48To59,
        AgeBucket::Months60Plus,
    ];

    /// Bucket containing `months`. Total over `u32`.
    pub fn from_months(months: u32) -> Self {
        AGE_RANGES
            .iter()
            .find(|(min, max, _)| (*min..=*max).contains(&months))
            .map(|(_, _, bucket)| *bucket)
            .unwrap_or(AgeBucket::Months60Plus)
    }

    /// Inclusive month bounds of this bucket.
    pub fn bounds(&self) -> (u32, u32) {
        AGE_RANGES
            .iter()
            .find(|(_, _, bucket)| bucket == self)
            .map(|(min, max, _)| (*min, *max))
            .unwrap_or((60, u32::MAX))
    }

    /// Short code, e.g. `"7-11mo"`.
    pub fn code(&self) -> &'static str {
        match self {
            AgeBucket::Under7Months => "<7mo",
            AgeBucket::Months7To11 => "7-11mo",
            AgeBucket::Months12To17 => "12-17mo",
            AgeBucket::Months18To23 => "18-23mo",
            AgeBucket::Months24To47 => "24-47mo",
            AgeBucket::Months48To59 => "48-59mo",
            AgeBucket::Months60Plus => ">=60mo",
        }
    }

    /// Label written to the EDAD column of clinic sheets.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Under7Months => "Menor de 7 meses",
            AgeBucket::Months7To11 => "7-11 MESES",
            AgeBucket::Months12To17 => "12-17 MESES",
            AgeBucket::Months18To23 => "18-23 MESES",
            AgeBucket::Months24To47 => "24-47 MESES",
            AgeBucket::Months48To59 => "48-59 MESES",
            AgeBucket::Months60Plus => "60 MESES O MÁS",
        }
    }

    /// Read a bucket back from either its code or its sheet label.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let normalized = normalize(trimmed);
        Self::ALL
            .into_iter()
            .find(|b| b.code() == trimmed || normalize(b.label()) == normalized)
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Total months in an age expression such as `"2 años 3 meses"`.
///
/// Only the first year and month figures count. Anything unparseable is 0.
pub fn parse_months(age_text: &str) -> u32 {
    let years = first_number(&YEARS, age_text);
    let months = first_number(&MONTHS, age_text);
    years.saturating_mul(12).saturating_add(months)
}

/// Age bucket for an age expression, or `None` when it cannot be classified.
///
/// A zero-month age only classifies when days are mentioned (newborns).
pub fn bucket_of(age_text: &str) -> Option<AgeBucket> {
    match parse_months(age_text) {
        0 if DAYS.is_match(age_text) => Some(AgeBucket::Under7Months),
        0 => None,
        months => Some(AgeBucket::from_months(months)),
    }
}

/// LME counseling applies strictly below 4 months.
pub fn is_under_4_months(age_text: &str) -> bool {
    parse_months(age_text) < 4
}

fn first_number(pattern: &Regex, text: &str) -> u32 {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
