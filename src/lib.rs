//! Static detection of lookahead and lookbehind groups in JavaScript regular
//! expressions.
//!
//! The pipeline has three stages:
//! - [`assembler`] rebuilds the logical pattern from regex literals, string
//!   arguments to `RegExp`, `+` chains and template chunks;
//! - [`scanner`] finds `(?=`, `(?!`, `(?<=` and `(?<!` openers in it;
//! - [`compat`] decides which occurrences to report, either unconditionally
//!   or for the configured browser targets that lack support.
//!
//! Hosts that already have an AST build [`PatternExpr`] values and call
//! [`Analyzer::analyze`]. [`Analyzer::lint_source`] runs the bundled lexer and
//! pattern parser over raw source text first.

pub mod assembler;
pub mod ast;
pub mod browsers;
pub mod compat;
pub mod diagnostic;
pub mod lexer;
pub mod parser;
pub mod scanner;
pub mod settings;

pub use ast::{PatternExpr, PatternSite, TemplateChunk};
pub use browsers::BrowserTarget;
pub use compat::Resolver;
pub use diagnostic::{Diagnostic, SourceDiagnostic};
pub use parser::ParseError;
pub use scanner::{LookaroundKind, LookaroundOccurrence};
pub use settings::{Settings, SettingsError};

/// Runs assembly, scanning and resolution with one fixed set of targets.
#[derive(Debug, Clone)]
pub struct Analyzer {
    resolver: Resolver,
}

impl Analyzer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            resolver: Resolver::from_settings(settings),
        }
    }

    /// Flags every lookaround regardless of browser support.
    pub fn unconditional() -> Self {
        Self {
            resolver: Resolver::new(Vec::new()),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Diagnostics for one pattern-bearing expression, in occurrence order.
    /// Expressions whose text is not statically known yield nothing.
    pub fn analyze(&self, expr: &PatternExpr) -> Vec<Diagnostic> {
        let Some(pattern) = assembler::assemble(expr) else {
            return Vec::new();
        };
        scanner::scan_with_breaks(pattern.text(), &pattern.hole_offsets())
            .into_iter()
            .filter(|occ| !pattern.crosses_hole(occ.offset, occ.kind.opener_len()))
            .filter_map(|occ| self.resolver.resolve(occ.kind, pattern.resolve(occ.offset)))
            .collect()
    }

    /// Extracts pattern sites from JavaScript source and analyzes each.
    pub fn lint_source(&self, source: &str) -> Vec<SourceDiagnostic> {
        self.analyze_sites(parser::extract_patterns(source))
    }

    /// Like [`Analyzer::lint_source`], but rejects source the lexer cannot
    /// tokenize instead of skipping past the bad token.
    pub fn lint_source_strict(&self, source: &str) -> Result<Vec<SourceDiagnostic>, ParseError> {
        Ok(self.analyze_sites(parser::extract_patterns_strict(source)?))
    }

    fn analyze_sites(&self, sites: Vec<PatternSite>) -> Vec<SourceDiagnostic> {
        sites
            .into_iter()
            .flat_map(|site| {
                self.analyze(&site.expr)
                    .into_iter()
                    .map(move |diagnostic| SourceDiagnostic {
                        start: site.start,
                        end: site.end,
                        diagnostic,
                    })
            })
            .collect()
    }
}
