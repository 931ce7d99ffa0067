//! Lexical scan for lookaround group openers.
//!
//! Known limitation: character classes are not tracked, so `[(?=]` is
//! reported even though the parenthesis is literal there. The scan only
//! understands backslash escaping.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookaroundKind {
    Lookahead,
    NegativeLookahead,
    Lookbehind,
    NegativeLookbehind,
}

/// Assertion direction. Support data only depends on this, not on negation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Lookahead,
    Lookbehind,
}

impl LookaroundKind {
    /// Recognises the text following an unescaped `(`.
    fn from_opener(rest: &str) -> Option<Self> {
        let rest = rest.strip_prefix('?')?;
        if rest.starts_with('=') {
            Some(LookaroundKind::Lookahead)
        } else if rest.starts_with('!') {
            Some(LookaroundKind::NegativeLookahead)
        } else if rest.starts_with("<=") {
            Some(LookaroundKind::Lookbehind)
        } else if rest.starts_with("<!") {
            Some(LookaroundKind::NegativeLookbehind)
        } else {
            None
        }
    }

    /// Length of the opener text, `(` included.
    pub fn opener_len(self) -> usize {
        match self {
            LookaroundKind::Lookahead | LookaroundKind::NegativeLookahead => 3,
            LookaroundKind::Lookbehind | LookaroundKind::NegativeLookbehind => 4,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            LookaroundKind::Lookahead | LookaroundKind::NegativeLookahead => Direction::Lookahead,
            LookaroundKind::Lookbehind | LookaroundKind::NegativeLookbehind => {
                Direction::Lookbehind
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookaroundKind::Lookahead => "lookahead",
            LookaroundKind::NegativeLookahead => "negative lookahead",
            LookaroundKind::Lookbehind => "lookbehind",
            LookaroundKind::NegativeLookbehind => "negative lookbehind",
        }
    }
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Lookahead => "lookahead",
            Direction::Lookbehind => "lookbehind",
        }
    }
}

impl fmt::Display for LookaroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LookaroundOccurrence {
    pub kind: LookaroundKind,
    /// Offset of the `(` in UTF-16 code units.
    pub offset: usize,
}

/// Returns every lookaround opener in `pattern`, in ascending offset order.
pub fn scan(pattern: &str) -> Vec<LookaroundOccurrence> {
    scan_with_breaks(pattern, &[])
}

/// Like [`scan`], but a backslash never escapes across any of the sorted
/// `breaks` offsets (UTF-16 code units). Text on either side of a break was
/// not adjacent in the source, e.g. across a template `${}` hole.
pub fn scan_with_breaks(pattern: &str, breaks: &[usize]) -> Vec<LookaroundOccurrence> {
    let mut found = Vec::new();
    let mut escaped = false;
    let mut offset = 0;
    let mut breaks = breaks.iter().copied().peekable();
    for (i, ch) in pattern.char_indices() {
        while breaks.next_if(|&b| b <= offset).is_some() {
            escaped = false;
        }
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '('
            && let Some(kind) = LookaroundKind::from_opener(&pattern[i + 1..])
        {
            found.push(LookaroundOccurrence { kind, offset });
        }
        offset += ch.len_utf16();
    }
    found
}
