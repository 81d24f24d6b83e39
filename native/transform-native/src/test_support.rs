//! Shared builders for tests: parsing happens host-side, so tests construct
//! input trees directly, deriving spans from the template text.

use std::collections::HashSet;

use crate::ast::*;
use crate::transform::{template_to_typescript, TransformOptions, TransformResult};

/// Span of the first occurrence of `token` in `source`.
pub fn span(source: &str, token: &str) -> SourceSpan {
    let start = source.find(token).expect("token present in source");
    SourceSpan::new(start as u32, (start + token.len()) as u32)
}

pub fn path(source: &str, text: &str) -> PathExpression {
    let loc = span(source, text);
    let mut segments = text.split('.');
    let head = segments.next().expect("non-empty path").to_string();
    PathExpression {
        head,
        tail: segments.map(str::to_string).collect(),
        loc,
    }
}

pub fn path_expr(source: &str, text: &str) -> Expression {
    Expression::Path(path(source, text))
}

pub fn string_lit(source: &str, value: &str) -> Expression {
    let token = format!("\"{}\"", value);
    Expression::String(StringLiteral {
        value: value.to_string(),
        loc: span(source, &token),
    })
}

pub fn number_lit(source: &str, token: &str, value: f64) -> Expression {
    Expression::Number(NumberLiteral {
        value,
        loc: span(source, token),
    })
}

pub fn hash(pairs: Vec<HashPair>) -> Hash {
    Hash { pairs }
}

/// A `key=value` pair located at the first `key=` occurrence.
pub fn hash_pair(source: &str, key: &str, value: Expression) -> HashPair {
    let token = format!("{}=", key);
    let start = source.find(&token).expect("pair present in source") as u32;
    let end = value.loc().end;
    HashPair {
        key: key.to_string(),
        value,
        loc: SourceSpan::new(start, end),
    }
}

pub fn mustache(
    source: &str,
    token: &str,
    path: Expression,
    params: Vec<Expression>,
    hash: Hash,
) -> MustacheStatement {
    MustacheStatement {
        path,
        params,
        hash,
        loc: span(source, token),
    }
}

pub fn mustache_node(
    source: &str,
    token: &str,
    path: Expression,
    params: Vec<Expression>,
    hash: Hash,
) -> ContentNode {
    ContentNode::Mustache(mustache(source, token, path, params, hash))
}

pub fn text_node(source: &str, token: &str) -> ContentNode {
    ContentNode::Text(TextNode {
        chars: token.to_string(),
        loc: span(source, token),
    })
}

pub fn template(source: &str, body: Vec<ContentNode>) -> Template {
    Template {
        body,
        loc: SourceSpan::new(0, source.len() as u32),
    }
}

pub fn scope_options(names: &[&str]) -> TransformOptions {
    TransformOptions {
        identifiers_in_scope: names.iter().map(|n| n.to_string()).collect::<HashSet<_>>(),
        ..TransformOptions::default()
    }
}

pub fn transform(source: &str, body: Vec<ContentNode>) -> TransformResult {
    template_to_typescript(source, &template(source, body), &TransformOptions::default())
}

pub fn transform_with(
    source: &str,
    body: Vec<ContentNode>,
    options: &TransformOptions,
) -> TransformResult {
    template_to_typescript(source, &template(source, body), options)
}

/// Strip the framer boilerplate, leaving the dedented body statements.
pub fn body_of(code: &str) -> String {
    let marker = "Γ;\n";
    let start = code.find(marker).expect("frame context line") + marker.len();
    let end = code.rfind("  });").expect("frame close");
    code[start..end]
        .lines()
        .map(|line| line.strip_prefix("    ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}
