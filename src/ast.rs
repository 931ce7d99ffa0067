//! Descriptors for pattern-bearing expressions.
//! A host with its own AST builds these directly; `parser` builds them from
//! raw source text. Every `anchor` is the report position (UTF-16 code units)
//! of the first content character of that literal.

#[derive(Clone, Debug, PartialEq)]
pub enum PatternExpr {
    /// `/pattern/flags`, with the pattern body as written.
    RegExpLiteral { pattern: String, anchor: usize },
    /// A string literal, quotes stripped and escapes decoded.
    StringLiteral { value: String, anchor: usize },
    /// A template literal. Holes are not represented; each chunk carries its
    /// own anchor.
    Template(Vec<TemplateChunk>),
    /// `a + b + c`, flattened in evaluation order.
    Concat(Vec<PatternExpr>),
    /// `RegExp(arg)` or `new RegExp(arg)`. `None` when called without arguments.
    Constructor(Option<Box<PatternExpr>>),
    /// Anything whose text is not statically known.
    Opaque,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateChunk {
    pub text: String,
    pub anchor: usize,
}

impl PatternExpr {
    pub fn regex(pattern: impl Into<String>, anchor: usize) -> Self {
        PatternExpr::RegExpLiteral {
            pattern: pattern.into(),
            anchor,
        }
    }

    pub fn string(value: impl Into<String>, anchor: usize) -> Self {
        PatternExpr::StringLiteral {
            value: value.into(),
            anchor,
        }
    }

    pub fn constructor(arg: PatternExpr) -> Self {
        PatternExpr::Constructor(Some(Box::new(arg)))
    }

    /// Appends `rhs` as the right operand of a `+`, keeping chains flat.
    pub fn concat(self, rhs: PatternExpr) -> Self {
        match self {
            PatternExpr::Concat(mut operands) => {
                operands.push(rhs);
                PatternExpr::Concat(operands)
            }
            lhs => PatternExpr::Concat(vec![lhs, rhs]),
        }
    }
}

/// A pattern-bearing expression found in source, with the byte range of the
/// whole expression (the regex literal or the constructor call).
#[derive(Clone, Debug, PartialEq)]
pub struct PatternSite {
    pub expr: PatternExpr,
    pub start: usize,
    pub end: usize,
}
