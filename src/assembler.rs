//! Reconstructs the logical pattern text of a pattern-bearing expression.
//!
//! A pattern may be spread over several literals (`"a" + "b"`, template
//! chunks around `${}` holes). The assembler flattens those into one string
//! and keeps the segment list so that any logical offset can be mapped back
//! to the report position of the literal it came from.

use crate::ast::PatternExpr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    RegexLiteralBody,
    StringLiteral,
    TemplateChunk,
}

/// One contiguous run of statically known pattern text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSegment {
    pub text: String,
    /// Report position of the first character of `text`.
    pub source_start: usize,
    pub kind: SegmentKind,
    /// Offset of the first character of `text` in the logical pattern.
    logical_start: usize,
    /// Whether a template `${}` hole sits right before this segment.
    after_hole: bool,
}

impl PatternSegment {
    fn logical_len(&self) -> usize {
        utf16_len(&self.text)
    }

    fn contains(&self, logical: usize) -> bool {
        logical >= self.logical_start && logical < self.logical_start + self.logical_len()
    }
}

/// The logical pattern plus the segments it was built from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssembledPattern {
    text: String,
    segments: Vec<PatternSegment>,
}

impl AssembledPattern {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    fn push(&mut self, text: String, source_start: usize, kind: SegmentKind, after_hole: bool) {
        let logical_start = utf16_len(&self.text);
        self.text.push_str(&text);
        self.segments.push(PatternSegment {
            text,
            source_start,
            kind,
            logical_start,
            after_hole,
        });
    }

    /// Logical offsets, in ascending order, where a template hole separates
    /// two segments.
    pub fn hole_offsets(&self) -> Vec<usize> {
        self.segments
            .iter()
            .filter(|s| s.after_hole)
            .map(|s| s.logical_start)
            .collect()
    }

    /// Whether the logical range `[start, start + len)` straddles a template
    /// hole. Such text is not contiguous in the source, so a match there is
    /// not a real occurrence.
    pub fn crosses_hole(&self, start: usize, len: usize) -> bool {
        self.segments
            .iter()
            .any(|s| s.after_hole && s.logical_start > start && s.logical_start < start + len)
    }

    /// Maps a logical offset (UTF-16 code units into `text`) to its report
    /// position, using the first segment whose range contains it. Offsets at
    /// or past the end map relative to the last segment.
    pub fn resolve(&self, logical: usize) -> usize {
        let segment = self
            .segments
            .iter()
            .find(|s| s.contains(logical))
            .or_else(|| self.segments.last());
        match segment {
            Some(s) => s.source_start + logical.saturating_sub(s.logical_start),
            None => logical,
        }
    }
}

/// Builds the logical pattern for `expr`, or `None` when any part of it is
/// not statically known.
pub fn assemble(expr: &PatternExpr) -> Option<AssembledPattern> {
    let mut pattern = AssembledPattern::default();
    collect(expr, &mut pattern)?;
    Some(pattern)
}

fn collect(expr: &PatternExpr, out: &mut AssembledPattern) -> Option<()> {
    match expr {
        PatternExpr::RegExpLiteral { pattern, anchor } => {
            out.push(pattern.clone(), *anchor, SegmentKind::RegexLiteralBody, false);
        }
        PatternExpr::StringLiteral { value, anchor } => {
            out.push(value.clone(), *anchor, SegmentKind::StringLiteral, false);
        }
        PatternExpr::Template(chunks) => {
            for (i, chunk) in chunks.iter().enumerate() {
                let kind = SegmentKind::TemplateChunk;
                out.push(chunk.text.clone(), chunk.anchor, kind, i > 0);
            }
        }
        PatternExpr::Concat(operands) => {
            for operand in operands {
                collect(operand, out)?;
            }
        }
        PatternExpr::Constructor(arg) => collect(arg.as_deref()?, out)?,
        PatternExpr::Opaque => return None,
    }
    Some(())
}

pub(crate) fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}
