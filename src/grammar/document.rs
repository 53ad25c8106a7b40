//! Assembly and serialization of the generated grammar document.
//!
//! The document is rebuilt from scratch on every regeneration; only the
//! pattern list varies between builds. Serialization must be byte-stable
//! for equal inputs because the content digest is computed over the text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};
use crate::grammar::rule::ParsedPattern;

/// Document name reported to the host editor.
pub const GRAMMAR_NAME: &str = "ttlgram-extension";

/// Scope identifier the generated grammar is registered under.
pub const GRAMMAR_SCOPE: &str = "ttlgram.ttlextension";

const GRAMMAR_COMMENT: &str =
    "Auto generated tagged template extensions. Do not edit this file directly.";

const TAG_NAME_SCOPE: &str = "entity.name.tag.js";
const QUASI_BEGIN_SCOPE: &str = "punctuation.definition.quasi.begin.js";
const QUASI_END_SCOPE: &str = "punctuation.definition.quasi.end.js";
const EMBEDDED_QUASI_INCLUDE: &str = "source.js.jsx#literal-quasi-embedded";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeRef {
    pub include: String,
}

/// One begin/end block recognizing a tagged template and embedding the
/// target language between the backticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternBlock {
    #[serde(rename = "contentName")]
    pub content_name: String,
    pub begin: String,
    #[serde(rename = "beginCaptures")]
    pub begin_captures: BTreeMap<String, Capture>,
    pub end: String,
    #[serde(rename = "endCaptures")]
    pub end_captures: BTreeMap<String, Capture>,
    pub patterns: Vec<IncludeRef>,
}

impl PatternBlock {
    pub fn from_pattern(pattern: &ParsedPattern) -> Self {
        let mut begin_captures = BTreeMap::new();
        begin_captures.insert(
            "1".to_string(),
            Capture {
                name: TAG_NAME_SCOPE.to_string(),
            },
        );
        begin_captures.insert(
            "2".to_string(),
            Capture {
                name: QUASI_BEGIN_SCOPE.to_string(),
            },
        );

        let mut end_captures = BTreeMap::new();
        end_captures.insert(
            "1".to_string(),
            Capture {
                name: QUASI_END_SCOPE.to_string(),
            },
        );

        Self {
            content_name: pattern.content_scope.clone(),
            // Tag expression, then the opening backtick. The possessive
            // `\s*+` targets the host's oniguruma engine, not our validator.
            begin: format!(r"\s*+({})\s*(`)", pattern.match_expr),
            begin_captures,
            // Closing backtick, unless escaped.
            end: r"\s*(?<!\\)(`)".to_string(),
            end_captures,
            patterns: vec![
                IncludeRef {
                    include: EMBEDDED_QUASI_INCLUDE.to_string(),
                },
                IncludeRef {
                    include: pattern.include_target.clone(),
                },
            ],
        }
    }
}

/// The complete generated grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarDocument {
    pub name: String,
    pub comment: String,
    #[serde(rename = "scopeName")]
    pub scope_name: String,
    #[serde(rename = "fileTypes")]
    pub file_types: Vec<String>,
    pub patterns: Vec<PatternBlock>,
}

impl GrammarDocument {
    pub fn new(patterns: Vec<ParsedPattern>) -> Self {
        Self {
            name: GRAMMAR_NAME.to_string(),
            comment: GRAMMAR_COMMENT.to_string(),
            scope_name: GRAMMAR_SCOPE.to_string(),
            file_types: Vec::new(),
            patterns: patterns.iter().map(PatternBlock::from_pattern).collect(),
        }
    }

    /// Serialize to the artifact text. Field order is fixed by the struct
    /// definitions, so equal documents produce identical text.
    pub fn to_text(&self) -> SynthResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SynthError::artifact_io("serialize grammar document", e))
    }
}
