//! Range-mapped text builder.
//!
//! Accumulates the emitted program while recording which emitted spans
//! correspond to which template spans. Mappings are recorded in emission
//! order with disjoint emitted ranges; finalization builds the second index
//! so both directions answer in O(log n).

use serde::Serialize;

use crate::ast::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeEntry {
    pub original: SourceSpan,
    pub emitted: SourceSpan,
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

const INDENT_UNIT: &str = "  ";

#[derive(Debug)]
pub struct MappedText {
    text: String,
    entries: Vec<RangeEntry>,
    indent: usize,
    /// Added to every recorded origin range; nonzero when the template is
    /// embedded in a host file.
    origin_offset: u32,
}

impl MappedText {
    pub fn new(origin_offset: u32) -> Self {
        MappedText {
            text: String::new(),
            entries: Vec::new(),
            indent: 0,
            origin_offset,
        }
    }

    pub fn offset(&self) -> u32 {
        self.text.len() as u32
    }

    /// Append text without recording a mapping.
    pub fn emit(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append text and record a mapping from `origin` to the emitted span.
    pub fn emit_mapped(&mut self, text: &str, origin: SourceSpan) {
        let start = self.offset();
        self.text.push_str(text);
        let entry = RangeEntry {
            original: origin.shifted(self.origin_offset),
            emitted: SourceSpan::new(start, self.offset()),
        };
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |prev| prev.emitted.end <= entry.emitted.start),
            "mapping spans must stay disjoint and in emission order"
        );
        self.entries.push(entry);
    }

    /// Append text with every line prefixed by the current indent.
    pub fn emit_indented(&mut self, text: &str) {
        let indent = INDENT_UNIT.repeat(self.indent);
        let mut first = true;
        for line in text.split('\n') {
            if !first {
                self.text.push('\n');
            }
            if !line.is_empty() {
                self.text.push_str(&indent);
                self.text.push_str(line);
            }
            first = false;
        }
    }

    /// A full line: indent, text, newline.
    pub fn emit_line(&mut self, text: &str) {
        self.emit_indented(text);
        self.text.push('\n');
    }

    /// Start a composite line whose pieces are emitted individually.
    pub fn begin_line(&mut self) {
        let indent = INDENT_UNIT.repeat(self.indent);
        self.text.push_str(&indent);
    }

    pub fn end_line(&mut self) {
        self.text.push('\n');
    }

    pub fn push_indent(&mut self) {
        self.indent += 1;
    }

    pub fn pop_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn finish(self) -> (String, RangeMap) {
        let mut by_original = self.entries.clone();
        by_original.sort_by_key(|e| (e.original.start, e.emitted.start));
        (
            self.text,
            RangeMap {
                by_emitted: self.entries,
                by_original,
            },
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RANGE MAP
// ═══════════════════════════════════════════════════════════════════════════════

/// Bidirectional offset map between the template and the emitted program.
/// Both indexes hold the same entries; gaps correspond to synthesized
/// scaffolding and answer `None`.
#[derive(Debug, Clone, Serialize)]
pub struct RangeMap {
    #[serde(rename = "entries")]
    by_emitted: Vec<RangeEntry>,
    #[serde(skip)]
    by_original: Vec<RangeEntry>,
}

impl RangeMap {
    /// Entries in emission order.
    pub fn entries(&self) -> &[RangeEntry] {
        &self.by_emitted
    }

    pub fn original_to_emitted(&self, offset: u32) -> Option<u32> {
        Self::lookup(&self.by_original, offset, |e| e.original, |e| e.emitted)
    }

    pub fn emitted_to_original(&self, offset: u32) -> Option<u32> {
        Self::lookup(&self.by_emitted, offset, |e| e.emitted, |e| e.original)
    }

    fn lookup(
        index: &[RangeEntry],
        offset: u32,
        from: impl Fn(&RangeEntry) -> SourceSpan,
        to: impl Fn(&RangeEntry) -> SourceSpan,
    ) -> Option<u32> {
        let upper = index.partition_point(|e| from(e).start <= offset);
        for entry in index[..upper].iter().rev() {
            let src = from(entry);
            if src.contains(offset) {
                let dst = to(entry);
                let delta = offset - src.start;
                return Some((dst.start + delta).min(dst.end));
            }
            if src.end <= offset {
                break;
            }
        }
        None
    }
}
