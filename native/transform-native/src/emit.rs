//! Expression emission: literals, paths, subexpressions, argument packs,
//! and the special forms the transform recognizes by name.
//!
//! Path classification resolves the first segment of a dotted path against
//! the context, the named args, or the lexical scope; anything else compiles
//! to a lookup in the reserved built-ins namespace so the host type checker
//! reports the unknown name at the right span.

use crate::ast::{Expression, Hash, HashPair, MustacheStatement, PathExpression, SourceSpan};
use crate::transform::{PendingReference, Transformer};
use crate::validate::{
    escape_string_literal, is_valid_identifier, TransformError, CONTEXT_IDENT, ERR_ARRAY_NAMED,
    ERR_HASH_POSITIONAL, ERR_IF_TOO_FEW, ERR_YIELD_POSITION, NAMESPACE_IDENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialForm {
    If,
    Array,
    Hash,
    Yield,
}

/// Special forms are recognized by name alone and never routed through
/// `resolve`.
pub(crate) fn special_form_of(expr: &Expression) -> Option<SpecialForm> {
    match expr {
        Expression::Path(p) => special_form_of_path(p),
        _ => None,
    }
}

pub(crate) fn special_form_of_path(path: &PathExpression) -> Option<SpecialForm> {
    if !path.tail.is_empty() {
        return None;
    }
    match path.head.as_str() {
        "if" => Some(SpecialForm::If),
        "array" => Some(SpecialForm::Array),
        "hash" => Some(SpecialForm::Hash),
        "yield" => Some(SpecialForm::Yield),
        _ => None,
    }
}

/// How a path emission behaves at its resolution site.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathMode {
    /// Route through the built-ins namespace without consulting the scope.
    pub force_fallback: bool,
    /// Queue the trailing bare-reference statement for fallback heads.
    pub queue_fallback_ref: bool,
}

impl PathMode {
    /// A value or helper-callee position.
    pub const VALUE: PathMode = PathMode {
        force_fallback: false,
        queue_fallback_ref: true,
    };
    /// A block or component callee; the invocation emits its own trailing
    /// reference, so nothing is queued.
    pub const CALLEE: PathMode = PathMode {
        force_fallback: false,
        queue_fallback_ref: false,
    };
    /// Callee of a parser-chained `{{else name …}}` block: always the
    /// built-in fallback, scope notwithstanding.
    pub const CHAINED_CALLEE: PathMode = PathMode {
        force_fallback: true,
        queue_fallback_ref: false,
    };
}

impl<'a> Transformer<'a> {
    pub(crate) fn emit_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Path(p) => {
                if p.tail.is_empty() && p.head == "yield" {
                    self.errors
                        .push(TransformError::new(ERR_YIELD_POSITION, p.loc));
                    self.out.emit("undefined");
                } else {
                    self.emit_path(p, PathMode::VALUE);
                }
            }
            Expression::Sub(s) => match special_form_of_path(&s.path) {
                Some(form) => self.emit_special_form(form, &s.params, &s.hash, s.loc),
                None => {
                    self.out.emit("resolve(");
                    self.emit_path(&s.path, PathMode::VALUE);
                    self.out.emit(")(");
                    self.emit_arg_pack(&s.params, &s.hash);
                    self.out.emit(")");
                }
            },
            Expression::String(l) => {
                let text = format!("\"{}\"", escape_string_literal(&l.value));
                self.out.emit_mapped(&text, l.loc);
            }
            Expression::Number(l) => {
                self.out.emit_mapped(&format_number(l.value), l.loc);
            }
            Expression::Boolean(l) => {
                self.out
                    .emit_mapped(if l.value { "true" } else { "false" }, l.loc);
            }
            Expression::Null(l) => self.out.emit_mapped("null", l.loc),
            Expression::Undefined(l) => self.out.emit_mapped("undefined", l.loc),
        }
    }

    /// Classify a dotted path and emit its resolution. The head maps as a
    /// whole to its chosen form; tail segments map to their name characters.
    pub(crate) fn emit_path(&mut self, path: &PathExpression, mode: PathMode) {
        let head_span = path.head_span();
        let this_head = !mode.force_fallback && path.head == "this";
        if this_head {
            self.out
                .emit_mapped(&format!("{}.this", CONTEXT_IDENT), head_span);
        } else if let Some(name) = path.head.strip_prefix('@') {
            let text = if is_valid_identifier(name) {
                format!("{}.args.{}", CONTEXT_IDENT, name)
            } else {
                format!(
                    "{}.args[\"{}\"]",
                    CONTEXT_IDENT,
                    escape_string_literal(name)
                )
            };
            self.out.emit_mapped(&text, head_span);
        } else if !mode.force_fallback && self.scope.has(&path.head) {
            self.out.emit_mapped(&path.head, head_span);
        } else {
            self.emit_builtin_lookup(&path.head, head_span);
            if mode.queue_fallback_ref {
                self.pending_refs.push(PendingReference {
                    head: path.head.clone(),
                    origin: head_span,
                });
            }
        }

        let mut cursor = head_span.end;
        for (index, segment) in path.tail.iter().enumerate() {
            cursor += 1; // the separating dot
            let seg_span = SourceSpan::new(cursor, cursor + segment.len() as u32);
            // The head is never chained; a `this` head additionally keeps its
            // first member access plain.
            let optional = !(this_head && index == 0);
            self.emit_tail_segment(segment, seg_span, optional);
            cursor = seg_span.end;
        }
    }

    fn emit_tail_segment(&mut self, segment: &str, span: SourceSpan, optional: bool) {
        if is_valid_identifier(segment) {
            self.out.emit(if optional { "?." } else { "." });
            self.out.emit_mapped(segment, span);
        } else {
            self.out.emit(if optional { "?.[\"" } else { "[\"" });
            self.out.emit_mapped(&escape_string_literal(segment), span);
            self.out.emit("\"]");
        }
    }

    pub(crate) fn emit_builtin_lookup(&mut self, head: &str, origin: SourceSpan) {
        let text = format!(
            "{}.BuiltIns[\"{}\"]",
            NAMESPACE_IDENT,
            escape_string_literal(head)
        );
        self.out.emit_mapped(&text, origin);
    }

    /// The named-args object: always present, `{}` when empty, source order
    /// preserved otherwise.
    pub(crate) fn emit_named_object(&mut self, pairs: &[HashPair]) {
        if pairs.is_empty() {
            self.out.emit("{}");
            return;
        }
        self.out.emit("{ ");
        for pair in pairs {
            let key_span = pair.key_span();
            if is_valid_identifier(&pair.key) {
                self.out.emit_mapped(&pair.key, key_span);
            } else {
                self.out.emit("\"");
                self.out
                    .emit_mapped(&escape_string_literal(&pair.key), key_span);
                self.out.emit("\"");
            }
            self.out.emit(": ");
            self.emit_expression(&pair.value);
            self.out.emit(", ");
        }
        self.out.emit("}");
    }

    /// Named-args object first, then the positional arguments.
    pub(crate) fn emit_arg_pack(&mut self, params: &[Expression], hash: &Hash) {
        self.emit_named_object(&hash.pairs);
        for param in params {
            self.out.emit(", ");
            self.emit_expression(param);
        }
    }

    /// The `resolve`/`resolveOrReturn` invocation for a mustache, without any
    /// statement-position wrapper. Callers dispatch special forms first.
    pub(crate) fn emit_call_value(&mut self, mustache: &MustacheStatement) {
        let bare = mustache.params.is_empty() && mustache.hash.pairs.is_empty();
        self.out
            .emit(if bare { "resolveOrReturn(" } else { "resolve(" });
        self.emit_expression(&mustache.path);
        self.out.emit(")(");
        self.emit_arg_pack(&mustache.params, &mustache.hash);
        self.out.emit(")");
    }

    /// A named-argument value: a bare path passes the value through
    /// untouched; anything with arguments is a helper invocation.
    pub(crate) fn emit_arg_value(&mut self, mustache: &MustacheStatement) {
        if let Some(form) = special_form_of(&mustache.path) {
            self.emit_special_form(form, &mustache.params, &mustache.hash, mustache.loc);
            return;
        }
        if mustache.params.is_empty() && mustache.hash.pairs.is_empty() {
            self.emit_expression(&mustache.path);
        } else {
            self.out.emit("resolve(");
            self.emit_expression(&mustache.path);
            self.out.emit(")(");
            self.emit_arg_pack(&mustache.params, &mustache.hash);
            self.out.emit(")");
        }
    }

    /// One mustache inside an interpolated attribute value.
    pub(crate) fn emit_interp_part(&mut self, mustache: &MustacheStatement) {
        match special_form_of(&mustache.path) {
            Some(form) => {
                self.emit_special_form(form, &mustache.params, &mustache.hash, mustache.loc)
            }
            None => self.emit_call_value(mustache),
        }
    }

    pub(crate) fn emit_special_form(
        &mut self,
        form: SpecialForm,
        params: &[Expression],
        hash: &Hash,
        loc: SourceSpan,
    ) {
        match form {
            SpecialForm::If => {
                if params.len() < 2 {
                    self.errors.push(TransformError::new(ERR_IF_TOO_FEW, loc));
                }
                self.out.emit("(");
                self.emit_operand(params.first());
                self.out.emit(") ? (");
                self.emit_operand(params.get(1));
                self.out.emit(") : (");
                self.emit_operand(params.get(2));
                self.out.emit(")");
            }
            SpecialForm::Array => {
                if !hash.pairs.is_empty() {
                    self.errors.push(TransformError::new(ERR_ARRAY_NAMED, loc));
                }
                self.out.emit("[");
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        self.out.emit(", ");
                    }
                    self.emit_expression(param);
                }
                self.out.emit("]");
            }
            SpecialForm::Hash => {
                if !params.is_empty() {
                    self.errors
                        .push(TransformError::new(ERR_HASH_POSITIONAL, loc));
                }
                self.out.emit("(");
                self.emit_named_object(&hash.pairs);
                self.out.emit(")");
            }
            SpecialForm::Yield => {
                self.errors
                    .push(TransformError::new(ERR_YIELD_POSITION, loc));
                self.out.emit("undefined");
            }
        }
    }

    fn emit_operand(&mut self, expr: Option<&Expression>) {
        match expr {
            Some(e) => self.emit_expression(e),
            None => self.out.emit("undefined"),
        }
    }
}

/// Numeric literals print integral values without a fraction.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
