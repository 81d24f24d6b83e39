//! Template AST input types.
//!
//! The Handlebars-family parser lives on the host side of the bridge and
//! hands the parsed template across as JSON, which these types deserialize.
//! The transform never parses template text itself.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE SPANS
// ═══════════════════════════════════════════════════════════════════════════════

/// Absolute byte range into the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub fn new(start: u32, end: u32) -> Self {
        SourceSpan { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn shifted(&self, by: u32) -> SourceSpan {
        SourceSpan::new(self.start + by, self.end + by)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub body: Vec<ContentNode>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentNode {
    #[serde(rename = "TextNode")]
    Text(TextNode),
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    #[serde(rename = "MustacheCommentStatement")]
    Comment(MustacheCommentStatement),
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    #[serde(rename = "Element")]
    Element(ElementNode),
    /// Pre-classified component form some parsers emit; same shape as `Element`.
    #[serde(rename = "Component")]
    Component(ElementNode),
}

impl ContentNode {
    pub fn loc(&self) -> SourceSpan {
        match self {
            ContentNode::Text(n) => n.loc,
            ContentNode::Mustache(n) => n.loc,
            ContentNode::Comment(n) => n.loc,
            ContentNode::Block(n) => n.loc,
            ContentNode::Element(n) | ContentNode::Component(n) => n.loc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub chars: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustacheCommentStatement {
    pub value: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustacheStatement {
    pub path: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default)]
    pub hash: Hash,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatement {
    pub path: PathExpression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default)]
    pub hash: Hash,
    pub program: Block,
    #[serde(default)]
    pub inverse: Option<Block>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub body: Vec<ContentNode>,
    #[serde(default)]
    pub block_params: Vec<String>,
    /// Set by the parser on an inverse synthesized from `{{else …}}`.
    #[serde(default)]
    pub chained: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<AttrNode>,
    #[serde(default)]
    pub modifiers: Vec<ElementModifierStatement>,
    #[serde(default)]
    pub children: Vec<ContentNode>,
    #[serde(default)]
    pub block_params: Vec<String>,
    #[serde(default)]
    pub self_closing: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

impl ElementNode {
    /// Components are distinguished from plain elements purely by tag shape:
    /// uppercase initial, dotted, `@`-headed, or `this`-headed tags invoke.
    pub fn is_component_tag(&self) -> bool {
        self.tag.starts_with(char::is_uppercase)
            || self.tag.contains('.')
            || self.tag.starts_with('@')
            || self.tag == "this"
    }

    pub fn is_named_block(&self) -> bool {
        self.tag.starts_with(':')
    }

    /// Span of the tag name inside the open tag (right after `<`).
    pub fn tag_span(&self) -> SourceSpan {
        let start = self.loc.start + 1;
        SourceSpan::new(start, start + self.tag.len() as u32)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttrNode {
    pub name: String,
    pub value: AttrValue,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AttrValue {
    #[serde(rename = "TextNode")]
    Text(TextNode),
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    #[serde(rename = "ConcatStatement")]
    Concat(ConcatStatement),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcatStatement {
    #[serde(default)]
    pub parts: Vec<ConcatPart>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ConcatPart {
    #[serde(rename = "TextNode")]
    Text(TextNode),
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementModifierStatement {
    pub path: PathExpression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default)]
    pub hash: Hash,
    #[serde(default)]
    pub loc: SourceSpan,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    #[serde(rename = "PathExpression")]
    Path(PathExpression),
    #[serde(rename = "SubExpression")]
    Sub(SubExpression),
    #[serde(rename = "StringLiteral")]
    String(StringLiteral),
    #[serde(rename = "NumberLiteral")]
    Number(NumberLiteral),
    #[serde(rename = "BooleanLiteral")]
    Boolean(BooleanLiteral),
    #[serde(rename = "NullLiteral")]
    Null(NullLiteral),
    #[serde(rename = "UndefinedLiteral")]
    Undefined(UndefinedLiteral),
}

impl Expression {
    pub fn loc(&self) -> SourceSpan {
        match self {
            Expression::Path(e) => e.loc,
            Expression::Sub(e) => e.loc,
            Expression::String(e) => e.loc,
            Expression::Number(e) => e.loc,
            Expression::Boolean(e) => e.loc,
            Expression::Null(e) => e.loc,
            Expression::Undefined(e) => e.loc,
        }
    }
}

/// A dotted template path. `head` is `this`, an `@name`, or a bare
/// identifier; `tail` holds the remaining dot segments.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathExpression {
    pub head: String,
    #[serde(default)]
    pub tail: Vec<String>,
    #[serde(default)]
    pub loc: SourceSpan,
}

impl PathExpression {
    /// Span of the head token at the start of the path.
    pub fn head_span(&self) -> SourceSpan {
        SourceSpan::new(self.loc.start, self.loc.start + self.head.len() as u32)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExpression {
    pub path: PathExpression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default)]
    pub hash: Hash,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringLiteral {
    pub value: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberLiteral {
    pub value: f64,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanLiteral {
    pub value: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NullLiteral {
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndefinedLiteral {
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hash {
    #[serde(default)]
    pub pairs: Vec<HashPair>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    #[serde(default)]
    pub loc: SourceSpan,
}

impl HashPair {
    /// Span of the key token at the start of the pair.
    pub fn key_span(&self) -> SourceSpan {
        SourceSpan::new(self.loc.start, self.loc.start + self.key.len() as u32)
    }
}
