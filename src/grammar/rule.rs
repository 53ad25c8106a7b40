//! Parsing of tagged-template rule strings.
//!
//! A rule has the form `matchSpec:scopeRef`. The match spec is either a
//! quoted regex source (validated, never compiled for use) or an unquoted
//! literal that gets escaped so it matches itself verbatim inside a regex.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SynthError, SynthResult};

/// Scope references are `scopeName` or `scopeName#anchor`.
static SCOPE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w[\w.]*(#\w[\w.]*)?$").expect("scope grammar is valid"));

/// Validates regex source syntax without keeping the compiled result.
///
/// Grammar patterns are ultimately interpreted by the host editor's engine;
/// we only need to catch syntax errors early enough to name the bad rule.
pub trait RegexValidator: Send + Sync {
    fn validate_syntax(&self, source: &str) -> Result<(), String>;
}

/// Validator backed by `fancy-regex`, which accepts the lookaround
/// constructs TextMate-style pattern authors use.
#[derive(Debug, Default)]
pub struct FancyRegexValidator;

impl RegexValidator for FancyRegexValidator {
    fn validate_syntax(&self, source: &str) -> Result<(), String> {
        fancy_regex::Regex::new(source)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// A validated rule, ready for assembly into a grammar pattern block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// Regex source that recognizes the template tag.
    pub match_expr: String,
    /// Scope applied to the template contents (`scopeRef` before `#`).
    pub content_scope: String,
    /// Full `scopeRef`, used verbatim as the include target.
    pub include_target: String,
}

/// Parse one raw rule string into a [`ParsedPattern`].
///
/// The split is at the *last* `:` because quoted match expressions may
/// contain literal colons, while scope references never do.
pub fn parse_rule(raw: &str, validator: &dyn RegexValidator) -> SynthResult<ParsedPattern> {
    let split = raw.rfind(':').ok_or_else(|| SynthError::MalformedRule {
        rule: raw.to_string(),
    })?;
    let match_spec = &raw[..split];
    let scope_ref = &raw[split + 1..];

    if match_spec.is_empty() || !SCOPE_REF.is_match(scope_ref) {
        return Err(SynthError::MalformedRule {
            rule: raw.to_string(),
        });
    }

    let match_expr = if let Some(rest) = match_spec.strip_prefix('"') {
        // Quoted regex source. The configured string carries one level of
        // escaping, so undo doubled backslashes and escaped quotes before
        // handing it to the validator.
        let Some(source) = rest.strip_suffix('"') else {
            return Err(SynthError::MalformedRegex {
                rule: raw.to_string(),
                reason: "unterminated quote in match spec".to_string(),
            });
        };
        let source = source.replace(r"\\", r"\").replace(r#"\""#, r#"""#);
        validator
            .validate_syntax(&source)
            .map_err(|reason| SynthError::MalformedRegex {
                rule: raw.to_string(),
                reason,
            })?;
        source
    } else if match_spec.contains('"') {
        return Err(SynthError::BadLiteral {
            rule: raw.to_string(),
        });
    } else {
        escape_literal(match_spec)
    };

    let content_scope = scope_ref.split('#').next().unwrap_or(scope_ref);

    Ok(ParsedPattern {
        match_expr,
        content_scope: content_scope.to_string(),
        include_target: scope_ref.to_string(),
    })
}

/// Escape a literal match spec so it matches itself inside a regex.
fn escape_literal(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() * 2);
    for ch in literal.chars() {
        match ch {
            '\\' => out.push_str(r"\\"),
            '|' | '{' | '}' | '(' | ')' | '[' | ']' | '^' | '$' | '+' | '*' | '?' | '.' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
