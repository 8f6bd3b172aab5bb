//! Attention-type detection from portal vocabulary.
//!
//! The phrase table is matched against [`normalize`]d text, longest phrase
//! first, so "LLAMADO TELEFONICO INEFECTIVO" is never read as a shorter key.

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::text::{is_empty_text, normalize};

/// How a scheduled visit was carried out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AttentionType {
    /// In-person visit (ASISTE)
    Assisted,
    /// Patient did not show up (NSP)
    NoShow,
    CallEffective,
    CallIneffective,
    VideoEffective,
    VideoIneffective,
    TextMessage,
    /// Comprehensive home visit (V.D.I) that took place
    HomeVisitEffective,
    HomeVisitIneffective,
    AdminDischarge,
}

/// Portal phrase → attention type, in table order.
///
/// "DOMICILARIA" is the portal's own spelling.
const ATTENTION_PHRASES: [(&str, AttentionType); 11] = [
    ("ATENCION PRESENCIAL", AttentionType::Assisted),
    ("NO SE PRESENT", AttentionType::NoShow),
    ("NSP", AttentionType::NoShow),
    ("LLAMADO TELEFONICO EFECTIVO", AttentionType::CallEffective),
    ("LLAMADO TELEFONICO INEFECTIVO", AttentionType::CallIneffective),
    ("VIDEOLLAMADA EFECTIVA", AttentionType::VideoEffective),
    ("VIDEOLLAMADA INEFECTIVA", AttentionType::VideoIneffective),
    ("MENSAJERIA DE TEXTO", AttentionType::TextMessage),
    ("VISITA DOMICILARIA INTEGRAL EFECTIVA", AttentionType::HomeVisitEffective),
    ("VISITA DOMICILARIA INTEGRAL INEFECTIVA", AttentionType::HomeVisitIneffective),
    ("EGRESO ADMINISTRATIVO", AttentionType::AdminDischarge),
];

/// The phrase table sorted by descending key length. Stable, so equal
/// lengths keep table order.
static LONGEST_FIRST: LazyLock<Vec<(&'static str, AttentionType)>> = LazyLock::new(|| {
    let mut phrases = ATTENTION_PHRASES.to_vec();
    phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    phrases
});

impl AttentionType {
    /// All attention types in declaration order.
    pub const ALL: [AttentionType; 10] = [
        AttentionType::Assisted,
        AttentionType::NoShow,
        AttentionType::CallEffective,
        AttentionType::CallIneffective,
        AttentionType::VideoEffective,
        AttentionType::VideoIneffective,
        AttentionType::TextMessage,
        AttentionType::HomeVisitEffective,
        AttentionType::HomeVisitIneffective,
        AttentionType::AdminDischarge,
    ];

    /// Label written to the TIPO DE ATENCIÓN column.
    pub fn label(&self) -> &'static str {
        match self {
            AttentionType::Assisted => "ASISTE",
            AttentionType::NoShow => "NSP",
            AttentionType::CallEffective => "LLAMADO TELEFÓNICO EFECTIVO",
            AttentionType::CallIneffective => "LLAMADO TELEFÓNICO INEFECTIVO",
            AttentionType::VideoEffective => "VIDEOLLAMADA EFECTIVA",
            AttentionType::VideoIneffective => "VIDEOLLAMADA INEFECTIVA",
            AttentionType::TextMessage => "MENSAJERÍA DE TEXTO",
            AttentionType::HomeVisitEffective => "V.D.I EFECTIVA",
            AttentionType::HomeVisitIneffective => "V.D.I INEFECTIVA",
            AttentionType::AdminDischarge => "EGRESO ADMINISTRATIVO",
        }
    }

    /// Read an attention type from a sheet cell: an exact label, or any
    /// text the phrase table recognizes.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = normalize(value);
        if normalized.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|t| normalize(t.label()) == normalized)
            .or_else(|| detect_attention_type(value))
    }

    /// Whether this is a no-show.
    pub fn is_no_show(&self) -> bool {
        matches!(self, AttentionType::NoShow)
    }
}

impl fmt::Display for AttentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Detect the attention type mentioned in free text.
///
/// Returns `None` when no phrase matches, which is distinct from a detected
/// [`AttentionType::NoShow`].
pub fn detect_attention_type(raw_text: &str) -> Option<AttentionType> {
    let normalized = normalize(raw_text);
    if normalized.is_empty() {
        return None;
    }
    LONGEST_FIRST
        .iter()
        .find(|(phrase, _)| normalized.contains(phrase))
        .map(|(_, attention)| *attention)
}

/// Canonicalize a TIPO DE ATENCIÓN cell.
///
/// Empty cells give `""`; recognized text gives the canonical label;
/// anything else is returned trimmed but otherwise untouched.
pub fn normalize_attention_cell(value: &str) -> String {
    if is_empty_text(value) {
        return String::new();
    }
    match detect_attention_type(value) {
        Some(attention) => attention.label().to_string(),
        None => value.trim().to_string(),
    }
}
