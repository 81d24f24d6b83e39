//! Statement emission and the template framer.
//!
//! Walks the template body top-down, emitting one typed statement per
//! template construct, and wraps the result in the fixed boilerplate that
//! binds the context type and the runtime namespace. This is the transform's
//! entry point; everything else feeds it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::{
    AttrNode, AttrValue, BlockStatement, ConcatPart, ConcatStatement, ContentNode,
    ElementModifierStatement, ElementNode, MustacheCommentStatement, MustacheStatement,
    SourceSpan, StringLiteral, Template,
};
use crate::emit::{special_form_of, PathMode, SpecialForm};
use crate::mapping::{MappedText, RangeMap};
use crate::scope::ScopeTracker;
use crate::validate::{
    directive_kind, escape_string_literal, escape_template_chunk, is_valid_identifier,
    is_whitespace_text, Directive, TransformError, CONTEXT_IDENT, ERR_BLOCK_PARAM_NAME,
    ERR_IF_BLOCK_CONDITION, ERR_MIXED_NAMED_BLOCKS, ERR_YIELD_DYNAMIC_NAME, ERR_YIELD_POSITION,
    NAMESPACE_IDENT, RUNTIME_MODULE,
};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS AND RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Literal type-parameter clause for the emitted generator signature.
    pub type_params: Option<String>,
    /// Type expression bound as the context; defaults to `unknown`.
    pub context_type: Option<String>,
    /// Statements injected ahead of the runtime-namespace binding.
    pub preamble: Vec<String>,
    /// Names treated as locally in scope; everything else falls back to the
    /// built-ins namespace.
    pub identifiers_in_scope: HashSet<String>,
    /// Byte offset of the template inside a host file; shifts every origin
    /// range the map records.
    pub embedded_start: Option<u32>,
    pub embedded_end: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedModule {
    pub code: String,
    pub directives: Vec<Directive>,
    #[serde(skip)]
    pub ranges: RangeMap,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub result: Option<EmittedModule>,
    pub errors: Vec<TransformError>,
}

/// Rewrite a parsed template into an equivalent typed-TypeScript program.
///
/// Pure function: the same inputs produce byte-identical output. `result` is
/// omitted only when a structural error prevents a syntactically valid
/// emission; local diagnostics keep the best-effort text alongside them.
pub fn template_to_typescript(
    source: &str,
    template: &Template,
    options: &TransformOptions,
) -> TransformResult {
    let mut transformer = Transformer::new(source, options);
    transformer.emit_template(template, options);
    transformer.finish()
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORMER
// ═══════════════════════════════════════════════════════════════════════════════

/// Bare-reference statement queued by the path classifier, flushed after the
/// enclosing top-level statement.
pub(crate) struct PendingReference {
    pub head: String,
    pub origin: SourceSpan,
}

pub(crate) struct Transformer<'a> {
    pub(crate) source: &'a str,
    pub(crate) out: MappedText,
    pub(crate) scope: ScopeTracker,
    pub(crate) errors: Vec<TransformError>,
    pub(crate) directives: Vec<Directive>,
    pub(crate) pending_refs: Vec<PendingReference>,
    pub(crate) fatal: bool,
}

enum OpenTagItem<'n> {
    Attr(&'n AttrNode),
    Modifier(&'n ElementModifierStatement),
}

impl<'a> Transformer<'a> {
    fn new(source: &'a str, options: &TransformOptions) -> Self {
        Transformer {
            source,
            out: MappedText::new(options.embedded_start.unwrap_or(0)),
            scope: ScopeTracker::new(&options.identifiers_in_scope),
            errors: Vec::new(),
            directives: Vec::new(),
            pending_refs: Vec::new(),
            fatal: false,
        }
    }

    fn finish(mut self) -> TransformResult {
        self.errors.sort_by_key(|e| e.location.start);
        self.directives.sort_by_key(|d| d.start);
        if self.fatal {
            return TransformResult {
                result: None,
                errors: self.errors,
            };
        }
        let (code, ranges) = self.out.finish();
        TransformResult {
            result: Some(EmittedModule {
                code,
                directives: self.directives,
                ranges,
            }),
            errors: self.errors,
        }
    }

    // ── framer ──────────────────────────────────────────────────────────────

    fn emit_template(&mut self, template: &Template, options: &TransformOptions) {
        self.out.emit("(() => {\n");
        self.out.push_indent();
        for line in &options.preamble {
            self.out.emit_line(line);
        }
        self.out.emit_line(&format!(
            "let {}!: typeof import(\"{}\");",
            NAMESPACE_IDENT, RUNTIME_MODULE
        ));
        let type_params = options.type_params.as_deref().unwrap_or("");
        let context_type = options.context_type.as_deref().unwrap_or("unknown");
        self.out.emit_line(&format!(
            "return {}.template(function*{}({}: import(\"{}\").ResolveContext<{}>) {{",
            NAMESPACE_IDENT, type_params, CONTEXT_IDENT, RUNTIME_MODULE, context_type
        ));
        self.out.push_indent();
        // Reference the context binding so even an empty template uses it.
        self.out.emit_line(&format!("{};", CONTEXT_IDENT));
        self.emit_content(&template.body, false);
        self.out.pop_indent();
        self.out.emit_line("});");
        self.out.pop_indent();
        self.out.emit("})()");
    }

    // ── content walk ────────────────────────────────────────────────────────

    fn emit_content(&mut self, body: &[ContentNode], chained_inverse: bool) {
        for node in body {
            match node {
                ContentNode::Text(_) => {}
                ContentNode::Comment(c) => self.collect_directive(c),
                ContentNode::Mustache(m) => {
                    self.emit_mustache_content(m);
                    self.flush_pending_refs();
                }
                ContentNode::Block(b) => {
                    self.emit_block_statement(b, chained_inverse);
                    self.flush_pending_refs();
                }
                ContentNode::Element(el) => {
                    if el.is_component_tag() {
                        self.emit_component(el);
                    } else {
                        self.emit_plain_element(el);
                    }
                    self.flush_pending_refs();
                }
                ContentNode::Component(el) => {
                    self.emit_component(el);
                    self.flush_pending_refs();
                }
            }
        }
    }

    /// Body of a construct still being emitted: outer queued references must
    /// not leak into it.
    fn emit_nested_content(&mut self, body: &[ContentNode], chained_inverse: bool) {
        let stashed = std::mem::take(&mut self.pending_refs);
        self.emit_content(body, chained_inverse);
        self.pending_refs = stashed;
    }

    fn flush_pending_refs(&mut self) {
        for reference in std::mem::take(&mut self.pending_refs) {
            self.out.begin_line();
            self.emit_builtin_lookup(&reference.head, reference.origin);
            self.out.emit(";");
            self.out.end_line();
        }
    }

    fn collect_directive(&mut self, comment: &MustacheCommentStatement) {
        if let Some(kind) = directive_kind(&comment.value) {
            self.directives.push(Directive {
                start: comment.loc.start,
                end: comment.loc.end,
                kind,
            });
        }
    }

    // ── mustaches ───────────────────────────────────────────────────────────

    fn emit_mustache_content(&mut self, mustache: &MustacheStatement) {
        match special_form_of(&mustache.path) {
            Some(SpecialForm::Yield) => {
                self.emit_yield(mustache);
                return;
            }
            Some(form) => {
                self.out.begin_line();
                self.emit_special_form(form, &mustache.params, &mustache.hash, mustache.loc);
            }
            None => {
                self.out.begin_line();
                self.out.emit("invokeInline(");
                self.emit_call_value(mustache);
                self.out.emit(")");
            }
        }
        self.out.emit(";");
        self.out.end_line();
    }

    /// A mustache in attribute position; `{{yield}}` is illegal here.
    fn emit_mustache_attr_statement(&mut self, mustache: &MustacheStatement) {
        match special_form_of(&mustache.path) {
            Some(SpecialForm::Yield) => {
                self.errors
                    .push(TransformError::new(ERR_YIELD_POSITION, mustache.loc));
                self.out.begin_line();
                self.out.emit("undefined");
            }
            Some(form) => {
                self.out.begin_line();
                self.emit_special_form(form, &mustache.params, &mustache.hash, mustache.loc);
            }
            None => {
                self.out.begin_line();
                self.out.emit("invokeInline(");
                self.emit_call_value(mustache);
                self.out.emit(")");
            }
        }
        self.out.emit(";");
        self.out.end_line();
    }

    fn emit_yield(&mut self, mustache: &MustacheStatement) {
        let mut target: Option<&StringLiteral> = None;
        for pair in &mustache.hash.pairs {
            if pair.key == "to" {
                match &pair.value {
                    crate::ast::Expression::String(s) => target = Some(s),
                    other => self
                        .errors
                        .push(TransformError::new(ERR_YIELD_DYNAMIC_NAME, other.loc())),
                }
            }
        }
        self.out.begin_line();
        self.out.emit("yield toBlock(");
        match target {
            Some(s) => {
                let text = format!("\"{}\"", escape_string_literal(&s.value));
                self.out.emit_mapped(&text, s.loc);
            }
            None => self.out.emit("\"default\""),
        }
        for param in &mustache.params {
            self.out.emit(", ");
            self.emit_expression(param);
        }
        self.out.emit(");");
        self.out.end_line();
    }

    // ── blocks ──────────────────────────────────────────────────────────────

    fn emit_block_statement(&mut self, block: &BlockStatement, force_fallback: bool) {
        if crate::emit::special_form_of_path(&block.path) == Some(SpecialForm::If) {
            self.emit_if_block(block);
            return;
        }

        let callee_mode = if force_fallback {
            PathMode::CHAINED_CALLEE
        } else {
            PathMode::CALLEE
        };

        let program_spans = self.block_param_spans(block.loc, &block.program.block_params);
        self.validate_block_params(&block.program.block_params, &program_spans);

        self.out.begin_line();
        self.out.emit("yield invokeBlock(resolve(");
        self.emit_path(&block.path, callee_mode);
        self.out.emit(")(");
        self.emit_arg_pack(&block.params, &block.hash);
        self.out.emit("), {");
        self.out.end_line();
        self.out.push_indent();
        self.emit_block_entry(
            "default",
            None,
            &block.program.block_params,
            &program_spans,
            &block.program.body,
            false,
        );
        let mut names = vec!["default"];
        if let Some(inverse) = &block.inverse {
            let inverse_spans = self.block_param_spans(inverse.loc, &inverse.block_params);
            self.validate_block_params(&inverse.block_params, &inverse_spans);
            self.emit_block_entry(
                "inverse",
                None,
                &inverse.block_params,
                &inverse_spans,
                &inverse.body,
                inverse.chained,
            );
            names.push("inverse");
        }
        self.out.pop_indent();
        self.out.begin_line();
        self.out.emit("}");
        for name in &names {
            self.out.emit(&format!(", \"{}\"", name));
        }
        self.out.emit(");");
        self.out.end_line();

        self.out.begin_line();
        self.emit_path(&block.path, callee_mode);
        self.out.emit(";");
        self.out.end_line();
    }

    fn emit_if_block(&mut self, block: &BlockStatement) {
        if block.params.len() != 1 {
            self.errors
                .push(TransformError::new(ERR_IF_BLOCK_CONDITION, block.loc));
        }
        self.out.begin_line();
        self.out.emit("if (");
        match block.params.first() {
            Some(condition) => self.emit_expression(condition),
            None => self.out.emit("undefined"),
        }
        self.out.emit(") {");
        self.out.end_line();
        self.out.push_indent();
        self.emit_nested_content(&block.program.body, false);
        self.out.pop_indent();
        if let Some(inverse) = &block.inverse {
            self.out.begin_line();
            self.out.emit("} else {");
            self.out.end_line();
            self.out.push_indent();
            self.emit_nested_content(&inverse.body, inverse.chained);
            self.out.pop_indent();
        }
        self.out.begin_line();
        self.out.emit("}");
        self.out.end_line();
    }

    fn emit_block_entry(
        &mut self,
        name: &str,
        name_span: Option<SourceSpan>,
        params: &[String],
        param_spans: &[SourceSpan],
        body: &[ContentNode],
        chained: bool,
    ) {
        self.out.begin_line();
        self.out.emit("*");
        match name_span {
            Some(span) if is_valid_identifier(name) => self.out.emit_mapped(name, span),
            Some(span) => {
                self.out.emit("\"");
                self.out.emit_mapped(&escape_string_literal(name), span);
                self.out.emit("\"");
            }
            None if is_valid_identifier(name) => self.out.emit(name),
            None => self
                .out
                .emit(&format!("\"{}\"", escape_string_literal(name))),
        }
        self.out.emit("(");
        for (index, (param, span)) in params.iter().zip(param_spans).enumerate() {
            if index > 0 {
                self.out.emit(", ");
            }
            self.out.emit_mapped(param, *span);
        }
        self.out.emit(") {");
        self.out.end_line();
        self.out.push_indent();
        self.scope.enter(params);
        self.emit_nested_content(body, chained);
        self.scope.leave();
        self.out.pop_indent();
        self.out.begin_line();
        self.out.emit("},");
        self.out.end_line();
    }

    // ── elements and components ─────────────────────────────────────────────

    fn emit_plain_element(&mut self, element: &ElementNode) {
        self.emit_open_tag_items(element, false);
        self.emit_content(&element.children, false);
    }

    fn emit_component(&mut self, element: &ElementNode) {
        self.emit_open_tag_items(element, true);

        let mut named_blocks: Vec<&ElementNode> = Vec::new();
        let mut comments: Vec<&MustacheCommentStatement> = Vec::new();
        let mut mix_span: Option<SourceSpan> = None;
        let mut has_content = false;
        for child in &element.children {
            match child {
                ContentNode::Element(e) | ContentNode::Component(e) if e.is_named_block() => {
                    named_blocks.push(e);
                }
                ContentNode::Text(t) if is_whitespace_text(&t.chars) => {}
                ContentNode::Comment(c) => comments.push(c),
                other => {
                    has_content = true;
                    if mix_span.is_none() {
                        mix_span = Some(other.loc());
                    }
                }
            }
        }
        let use_named = !named_blocks.is_empty();
        if use_named && has_content {
            self.errors.push(TransformError::new(
                ERR_MIXED_NAMED_BLOCKS,
                mix_span.unwrap_or(element.loc),
            ));
        }

        let callee = component_callee(element);
        let default_spans = self.block_param_spans(element.loc, &element.block_params);
        self.validate_block_params(&element.block_params, &default_spans);

        self.out.begin_line();
        self.out.emit("yield invokeBlock(resolve(");
        self.emit_path(&callee, PathMode::CALLEE);
        self.out.emit(")(");
        self.emit_component_args(element);
        self.out.emit("), ");

        let has_default_block =
            !use_named && (has_content || !element.block_params.is_empty());
        // A default block walks every child below; the other branches never
        // revisit the siblings, so their comments are read here.
        if !has_default_block {
            for comment in &comments {
                self.collect_directive(comment);
            }
        }
        if use_named {
            self.out.emit("{");
            self.out.end_line();
            self.out.push_indent();
            for block in &named_blocks {
                let name = &block.tag[1..];
                let name_start = block.loc.start + 2;
                let name_span = SourceSpan::new(name_start, name_start + name.len() as u32);
                let spans = self.block_param_spans(block.loc, &block.block_params);
                self.validate_block_params(&block.block_params, &spans);
                self.emit_block_entry(
                    name,
                    Some(name_span),
                    &block.block_params,
                    &spans,
                    &block.children,
                    false,
                );
            }
            self.out.pop_indent();
            self.out.begin_line();
            self.out.emit("}");
            for block in &named_blocks {
                self.out
                    .emit(&format!(", \"{}\"", escape_string_literal(&block.tag[1..])));
            }
            self.out.emit(");");
            self.out.end_line();
        } else if has_default_block {
            self.out.emit("{");
            self.out.end_line();
            self.out.push_indent();
            self.emit_block_entry(
                "default",
                None,
                &element.block_params,
                &default_spans,
                &element.children,
                false,
            );
            self.out.pop_indent();
            self.out.begin_line();
            self.out.emit("}, \"default\");");
            self.out.end_line();
        } else {
            self.out.emit("{});");
            self.out.end_line();
        }

        self.out.begin_line();
        self.emit_path(&callee, PathMode::CALLEE);
        self.out.emit(";");
        self.out.end_line();
    }

    /// Plain attributes and modifiers, merged in source order. Components
    /// additionally skip their `@`-args, which the invocation consumes.
    fn emit_open_tag_items(&mut self, element: &ElementNode, skip_args: bool) {
        let mut items: Vec<(u32, OpenTagItem)> = Vec::new();
        for attr in &element.attributes {
            if skip_args && attr.name.starts_with('@') {
                continue;
            }
            items.push((attr.loc.start, OpenTagItem::Attr(attr)));
        }
        for modifier in &element.modifiers {
            items.push((modifier.loc.start, OpenTagItem::Modifier(modifier)));
        }
        items.sort_by_key(|(start, _)| *start);
        for (_, item) in items {
            match item {
                OpenTagItem::Attr(attr) => self.emit_attr_statement(attr),
                OpenTagItem::Modifier(modifier) => self.emit_modifier(modifier),
            }
            self.flush_pending_refs();
        }
    }

    fn emit_attr_statement(&mut self, attr: &AttrNode) {
        match &attr.value {
            AttrValue::Text(_) => {}
            AttrValue::Mustache(m) => self.emit_mustache_attr_statement(m),
            AttrValue::Concat(c) => self.emit_concat_statement(c),
        }
    }

    fn emit_concat_statement(&mut self, concat: &ConcatStatement) {
        self.out.begin_line();
        self.emit_concat_value(concat);
        self.out.emit(";");
        self.out.end_line();
    }

    /// Interpolated value as a template-literal string coercion.
    pub(crate) fn emit_concat_value(&mut self, concat: &ConcatStatement) {
        self.out.emit("`");
        for part in &concat.parts {
            match part {
                ConcatPart::Text(t) => self.out.emit(&escape_template_chunk(&t.chars)),
                ConcatPart::Mustache(m) => {
                    self.out.emit("${");
                    self.emit_interp_part(m);
                    self.out.emit("}");
                }
            }
        }
        self.out.emit("`");
    }

    fn emit_modifier(&mut self, modifier: &ElementModifierStatement) {
        self.out.begin_line();
        self.out.emit("invokeModifier(resolve(");
        self.emit_path(&modifier.path, PathMode::VALUE);
        self.out.emit(")(");
        self.emit_arg_pack(&modifier.params, &modifier.hash);
        self.out.emit("));");
        self.out.end_line();
    }

    fn emit_component_args(&mut self, element: &ElementNode) {
        let args: Vec<&AttrNode> = element
            .attributes
            .iter()
            .filter(|a| a.name.starts_with('@'))
            .collect();
        if args.is_empty() {
            self.out.emit("{}");
            return;
        }
        self.out.emit("{ ");
        for attr in args {
            let key = &attr.name[1..];
            let key_start = attr.loc.start + 1;
            let key_span = SourceSpan::new(key_start, key_start + key.len() as u32);
            if is_valid_identifier(key) {
                self.out.emit_mapped(key, key_span);
            } else {
                self.out.emit("\"");
                self.out.emit_mapped(&escape_string_literal(key), key_span);
                self.out.emit("\"");
            }
            self.out.emit(": ");
            match &attr.value {
                AttrValue::Text(t) => {
                    let text = format!("\"{}\"", escape_string_literal(&t.chars));
                    self.out.emit_mapped(&text, t.loc);
                }
                AttrValue::Mustache(m) => self.emit_arg_value(m),
                AttrValue::Concat(c) => self.emit_concat_value(c),
            }
            self.out.emit(", ");
        }
        self.out.emit("}");
    }

    // ── block params ────────────────────────────────────────────────────────

    /// Locate `as |a b|` param tokens inside `region` of the source so
    /// diagnostics and the range map can point at them.
    fn block_param_spans(&self, region: SourceSpan, params: &[String]) -> Vec<SourceSpan> {
        if params.is_empty() {
            return Vec::new();
        }
        let start = region.start as usize;
        let end = (region.end as usize).min(self.source.len());
        let slice = if start < end { &self.source[start..end] } else { "" };
        let mut cursor = slice.find("as |").map(|i| i + 4).unwrap_or(0);
        let mut spans = Vec::with_capacity(params.len());
        for param in params {
            match slice[cursor..].find(param.as_str()).map(|i| cursor + i) {
                Some(found) => {
                    spans.push(SourceSpan::new(
                        (start + found) as u32,
                        (start + found + param.len()) as u32,
                    ));
                    cursor = found + param.len();
                }
                None => spans.push(SourceSpan::new(region.start, region.start)),
            }
        }
        spans
    }

    fn validate_block_params(&mut self, params: &[String], spans: &[SourceSpan]) {
        for (param, span) in params.iter().zip(spans) {
            if !is_valid_identifier(param) {
                self.errors
                    .push(TransformError::new(ERR_BLOCK_PARAM_NAME, *span));
                self.fatal = true;
            }
        }
    }
}

/// Synthesize the invocation path for a component tag.
fn component_callee(element: &ElementNode) -> crate::ast::PathExpression {
    let mut segments = element.tag.split('.');
    let head = segments.next().unwrap_or("").to_string();
    let tail: Vec<String> = segments.map(str::to_string).collect();
    crate::ast::PathExpression {
        head,
        tail,
        loc: element.tag_span(),
    }
}
