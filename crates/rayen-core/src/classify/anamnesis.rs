//! Anamnesis analysis: attention type and deficit from the clinical note.

use serde::{Deserialize, Serialize};

use super::{detect_attention_type, detect_deficit, AttentionType, Deficit};
use crate::text::normalize;

/// Result of analyzing an anamnesis note. Either field may be undetected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnamnesisAnalysis {
    pub attention_type: Option<AttentionType>,
    pub deficit: Option<Deficit>,
}

/// Classify a combined "motivo de consulta" + "historial" text.
///
/// A no-show never carries a deficit, whatever the note says.
pub fn analyze_anamnesis(combined_text: &str) -> AnamnesisAnalysis {
    let attention_type = detect_attention_type(combined_text);
    let deficit = match attention_type {
        Some(AttentionType::NoShow) => None,
        _ => detect_deficit(combined_text),
    };
    AnamnesisAnalysis {
        attention_type,
        deficit,
    }
}

/// The two note blocks of an Anamnesis section that matter for analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnamnesisSections {
    /// "MOTIVO DE CONSULTA ..." block
    pub reason: String,
    /// "HISTORIAL DE LA ENFERMEDAD ..." block
    pub history: String,
}

impl AnamnesisSections {
    /// Pick the reason and history blocks out of the texts shown under an
    /// Anamnesis node. Later blocks replace earlier ones of the same kind.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sections = Self::default();
        for text in texts {
            let text = text.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            let heading = normalize(text);
            if heading.starts_with("MOTIVO DE CONSULTA") {
                sections.reason = text.to_string();
            } else if heading.starts_with("HISTORIAL DE LA ENFERMEDAD")
                || heading.starts_with("HISTORIA DE LA ENFERMEDAD")
            {
                sections.history = text.to_string();
            }
        }
        sections
    }

    /// Reason and history joined by a newline, trimmed.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.reason, self.history).trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.reason.trim().is_empty() && self.history.trim().is_empty()
    }
}
