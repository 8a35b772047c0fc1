//! Instruction templates for the content providers.
//!
//! Two mutually exclusive content-style templates keyed by mode, each
//! parameterized by learner level, plus an independent template for the
//! fallback provider and one for document-grounded extraction. Every
//! template demands exactly three sentences and strict JSON so the
//! response can be parsed, not guessed at.

use crate::core::types::{Level, Mode};

const JSON_SHAPE: &str =
    r#"Respond with strict JSON only, no markdown fences: {"topic": "...", "text": "..."}"#;

/// Instruction for the primary provider.
pub fn primary_instruction(level: Level, mode: Mode) -> String {
    match mode {
        Mode::Daily => format!(
            "Write exactly three connected sentences of everyday conversational English \
             suitable for a {} learner practicing shadow reading. Keep the vocabulary \
             natural and spoken, pick one concrete daily-life topic, and give it a short \
             topic label. {}",
            level.as_str(),
            JSON_SHAPE
        ),
        Mode::Ielts => format!(
            "Write exactly three connected sentences in the register of an IELTS speaking \
             part-2 answer, pitched at a {} learner practicing shadow reading. Use one \
             academic-leaning topic and give it a short topic label. {}",
            level.as_str(),
            JSON_SHAPE
        ),
    }
}

/// Independent instruction for the fallback provider. Same contract,
/// phrased without assuming the primary's prompt conventions.
pub fn fallback_instruction(level: Level, mode: Mode) -> String {
    let style = match mode {
        Mode::Daily => "casual everyday speech",
        Mode::Ielts => "formal IELTS speaking-exam style",
    };
    format!(
        "Generate a short English shadow-reading passage of exactly three sentences in \
         {} for a {} learner. Also provide a short topic label. {}",
        style,
        level.as_str(),
        JSON_SHAPE
    )
}

/// Instruction for extracting a passage from an uploaded reference
/// document. Primary provider only; the fallback cannot see the document.
pub fn extraction_instruction() -> String {
    format!(
        "From the attached document, select exactly three representative sentences that \
         read naturally aloud, and give them a short topic label. Do not rewrite the \
         sentences. {}",
        JSON_SHAPE
    )
}
