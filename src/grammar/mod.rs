//! Grammar synthesis: rule parsing, document assembly, content addressing.
//!
//! ```text
//! raw rules --parse--> ParsedPattern --assemble--> GrammarDocument --> text
//!                                                                       |
//!                                                 digest <--------------+
//! ```

pub mod digest;
pub mod document;
pub mod rule;

pub use digest::{ARTIFACT_PREFIX, ARTIFACT_SUFFIX, artifact_filename, is_artifact_filename};
pub use document::{GRAMMAR_NAME, GRAMMAR_SCOPE, GrammarDocument, PatternBlock};
pub use rule::{FancyRegexValidator, ParsedPattern, RegexValidator, parse_rule};

use crate::error::SynthResult;

/// Parse every rule and serialize the assembled document.
///
/// The first failing rule aborts the whole document; partial documents are
/// never produced.
pub fn synthesize_text(rules: &[String], validator: &dyn RegexValidator) -> SynthResult<String> {
    let patterns = rules
        .iter()
        .map(|rule| parse_rule(rule, validator))
        .collect::<SynthResult<Vec<_>>>()?;
    GrammarDocument::new(patterns).to_text()
}
