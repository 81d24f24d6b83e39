//! Structural diagnostics and reserved emission names.
//!
//! Every diagnostic the transform can produce on its own (without type
//! information) is enumerated here as a stable message constant. Diagnostics
//! are collected into the result, never thrown; the host surfaces them
//! alongside whatever the type checker reports against the emitted code.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::SourceSpan;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC MESSAGES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_YIELD_POSITION: &str = "{{yield}} may only appear as a top-level statement";
pub const ERR_YIELD_DYNAMIC_NAME: &str = "Named block {{yield}}s must have a literal block name";
pub const ERR_HASH_POSITIONAL: &str = "{{hash}} only accepts named parameters";
pub const ERR_ARRAY_NAMED: &str = "{{array}} only accepts positional parameters";
pub const ERR_IF_TOO_FEW: &str = "{{if}} requires at least two parameters";
pub const ERR_IF_BLOCK_CONDITION: &str = "{{#if}} requires exactly one condition";
pub const ERR_MIXED_NAMED_BLOCKS: &str = "Named blocks may not be mixed with other content";
pub const ERR_BLOCK_PARAM_NAME: &str = "Block params must be valid TypeScript identifiers";

// ═══════════════════════════════════════════════════════════════════════════════
// RESERVED EMISSION NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Binds the implicit component context in every emitted template.
pub const CONTEXT_IDENT: &str = "Γ";
/// Binds the runtime module namespace in every emitted template.
pub const NAMESPACE_IDENT: &str = "χ";
/// Module specifier the emitted boilerplate imports its types from.
pub const RUNTIME_MODULE: &str = "@weft/runtime";

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformError {
    pub message: String,
    pub location: SourceSpan,
}

impl TransformError {
    pub fn new(message: &str, location: SourceSpan) -> Self {
        TransformError {
            message: message.to_string(),
            location,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIRECTIVE COMMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectiveKind {
    Ignore,
    ExpectError,
    Nocheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub start: u32,
    pub end: u32,
    pub kind: DirectiveKind,
}

lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
    static ref DIRECTIVE_RE: Regex = Regex::new(r"@weft-(ignore|expect-error|nocheck)").unwrap();
}

/// Recognize a checker directive inside a template comment.
pub fn directive_kind(comment: &str) -> Option<DirectiveKind> {
    let cap = DIRECTIVE_RE.captures(comment)?;
    match cap.get(1).map(|m| m.as_str()) {
        Some("ignore") => Some(DirectiveKind::Ignore),
        Some("expect-error") => Some(DirectiveKind::ExpectError),
        Some("nocheck") => Some(DirectiveKind::Nocheck),
        _ => None,
    }
}

/// True when `name` can appear verbatim as an emitted identifier. The
/// pattern is ASCII-only, which also keeps the reserved context and
/// namespace bindings out of reach of template-declared names.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENT_RE.is_match(name)
}

/// Whitespace-only text is allowed between named blocks.
pub fn is_whitespace_text(chars: &str) -> bool {
    chars.chars().all(char::is_whitespace)
}

/// Minimal escaping for emitted string literals: backslash, quote, and
/// newline/CR only.
pub fn escape_string_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Escaping for literal chunks inside an emitted template literal.
pub fn escape_template_chunk(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}
