use crate::browsers::BrowserTarget;
use crate::scanner::{Direction, LookaroundKind};
use std::fmt;

/// A finding for one lookaround occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Report position, as resolved by the assembler.
    pub position: usize,
    pub message: String,
}

impl Diagnostic {
    /// Message used when no targets are configured.
    pub fn disallowed(kind: LookaroundKind, position: usize) -> Self {
        Diagnostic {
            position,
            message: format!("Disallowed {kind} match group at position {position}"),
        }
    }

    /// Message naming every target that lacks support, in configured order.
    pub fn unsupported(targets: &[&BrowserTarget], direction: Direction, position: usize) -> Self {
        let names = targets
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Diagnostic {
            position,
            message: format!("{names}: unsupported {direction} match group at position {position}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A diagnostic together with the byte range of the expression it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDiagnostic {
    pub start: usize,
    pub end: usize,
    pub diagnostic: Diagnostic,
}
