use crate::ast::{PatternExpr, PatternSite, TemplateChunk};
use crate::lexer::{Keyword, LexError, Lexer, Punct, Spanned, Token};
use std::fmt;

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError { message: e.message }
    }
}

const CONSTRUCTOR_NAME: &str = "RegExp";

/// Finds regex literals and `RegExp` constructor calls in JavaScript source.
///
/// This is not a full JavaScript parser. It works over the token stream and
/// only understands the expression shapes a pattern argument can take:
/// literals, `+` chains, parentheses, templates and nested constructor calls.
/// Everything else becomes `PatternExpr::Opaque`.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Regex literals met inside template holes of the argument being parsed.
    hole_sites: Vec<PatternSite>,
}

impl<'a> Parser<'a> {
    /// Tokenizes `source`, skipping past anything the lexer rejects.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(spanned) if spanned.token == Token::Eof => {
                    tokens.push(spanned);
                    break;
                }
                Ok(spanned) if spanned.token == Token::LineTerminator => {}
                Ok(spanned) => tokens.push(spanned),
                Err(err) => lexer.recover(&err),
            }
        }
        Self {
            source,
            tokens,
            pos: 0,
            hole_sites: Vec::new(),
        }
    }

    /// Strict variant that fails on the first lexing error.
    pub fn new_strict(source: &'a str) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source)
            .tokenize_all()?
            .into_iter()
            .filter(|s| s.token != Token::LineTerminator)
            .collect();
        Ok(Self {
            source,
            tokens,
            pos: 0,
            hole_sites: Vec::new(),
        })
    }

    fn current(&self) -> &Spanned {
        // tokens always ends with Eof and pos never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).map(|i| &self.tokens[i].token)
    }

    fn advance(&mut self) -> &Spanned {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.tokens[idx].token != Token::Eof {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn eat(&mut self, expected: Punct) -> bool {
        if *self.peek() == Token::Punct(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Walks the whole token stream and returns every pattern site in
    /// source order.
    pub fn parse_program(&mut self) -> Vec<PatternSite> {
        let mut sites = Vec::new();
        while *self.peek() != Token::Eof {
            if let Some(site) = self.parse_pattern_site() {
                sites.push(site);
                sites.append(&mut self.hole_sites);
            } else {
                self.advance();
            }
        }
        sites
    }

    fn parse_pattern_site(&mut self) -> Option<PatternSite> {
        let start = self.current().start;
        match self.peek() {
            Token::RegExpLiteral { pattern } => {
                let expr = PatternExpr::regex(pattern.clone(), 0);
                let end = self.advance().end;
                Some(PatternSite { expr, start, end })
            }
            _ if self.at_constructor() => {
                let open = self.skip_constructor_callee();
                let end = self.matching_paren_end(open);
                let expr = self.parse_constructor_arguments();
                Some(PatternSite { expr, start, end })
            }
            _ => None,
        }
    }

    /// `new RegExp` or a bare `RegExp(` that is not a member access.
    fn at_constructor(&self) -> bool {
        if matches!(
            self.previous(),
            Some(Token::Punct(Punct::Dot | Punct::OptionalChain))
        ) {
            return false;
        }
        let is_name = |t: &Token| matches!(t, Token::Identifier(n) if n == CONSTRUCTOR_NAME);
        match self.peek() {
            Token::Keyword(Keyword::New) => is_name(self.peek_at(1)),
            t if is_name(t) => *self.peek_at(1) == Token::Punct(Punct::LeftParen),
            _ => false,
        }
    }

    /// Consumes `new`? `RegExp` and returns the index of the following token.
    fn skip_constructor_callee(&mut self) -> usize {
        if *self.peek() == Token::Keyword(Keyword::New) {
            self.advance();
        }
        self.advance();
        self.pos
    }

    /// Byte offset just past the `)` that closes the call whose `(` is at
    /// token index `open`. Falls back to the end of the callee when there is
    /// no argument list.
    fn matching_paren_end(&self, open: usize) -> usize {
        let Some(first) = self.tokens.get(open) else {
            return self.source.len();
        };
        if first.token != Token::Punct(Punct::LeftParen) {
            return self.tokens[open - 1].end;
        }
        let mut depth = 0usize;
        for spanned in &self.tokens[open..] {
            match spanned.token {
                Token::Punct(Punct::LeftParen) => depth += 1,
                Token::Punct(Punct::RightParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return spanned.end;
                    }
                }
                Token::Eof => return spanned.start,
                _ => {}
            }
        }
        self.source.len()
    }

    /// Parses `( arg, ... )` after the callee. Only the first argument is the
    /// pattern. When it is not a clean literal expression the cursor is
    /// rewound to it, so literals nested inside it are still visited.
    fn parse_constructor_arguments(&mut self) -> PatternExpr {
        if !self.eat(Punct::LeftParen) {
            return PatternExpr::Constructor(None);
        }
        if self.eat(Punct::RightParen) {
            return PatternExpr::Constructor(None);
        }
        let arg_start = self.pos;
        let hole_mark = self.hole_sites.len();
        let arg = self.parse_concat();
        let terminated = matches!(
            self.peek(),
            Token::Punct(Punct::Comma | Punct::RightParen)
        );
        if terminated && arg != PatternExpr::Opaque {
            self.skip_to_closing_paren();
            PatternExpr::constructor(arg)
        } else {
            // the main loop revisits these tokens, hole literals included
            self.pos = arg_start;
            self.hole_sites.truncate(hole_mark);
            PatternExpr::constructor(PatternExpr::Opaque)
        }
    }

    /// Consumes the remaining arguments and the `)` of the current call.
    fn skip_to_closing_paren(&mut self) {
        let mut depth = 1usize;
        loop {
            match self.advance().token {
                Token::Punct(Punct::LeftParen) => depth += 1,
                Token::Punct(Punct::RightParen) => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Token::Eof => return,
                _ => {}
            }
        }
    }

    fn parse_concat(&mut self) -> PatternExpr {
        let mut expr = self.parse_operand();
        while *self.peek() == Token::Punct(Punct::Plus) {
            self.advance();
            let rhs = self.parse_operand();
            expr = expr.concat(rhs);
        }
        expr
    }

    fn parse_operand(&mut self) -> PatternExpr {
        if self.at_constructor() {
            self.skip_constructor_callee();
            return self.parse_constructor_arguments();
        }
        match self.peek().clone() {
            Token::StringLiteral(value) => {
                self.advance();
                PatternExpr::string(value, 1)
            }
            Token::RegExpLiteral { pattern } => {
                self.advance();
                PatternExpr::regex(pattern, 1)
            }
            Token::NoSubstitutionTemplate(Some(text)) => {
                self.advance();
                PatternExpr::Template(vec![TemplateChunk { text, anchor: 0 }])
            }
            Token::TemplateHead(Some(text)) => self.parse_template(text),
            Token::Punct(Punct::LeftParen) => {
                self.advance();
                let inner = self.parse_concat();
                if self.eat(Punct::RightParen) {
                    inner
                } else {
                    PatternExpr::Opaque
                }
            }
            _ => PatternExpr::Opaque,
        }
    }

    /// Collects the literal chunks of a template starting at its head.
    /// Tokens inside `${ }` holes are skipped, including nested templates,
    /// except regex literals, which are queued as sites of their own.
    fn parse_template(&mut self, head: String) -> PatternExpr {
        let body_start = self.advance().start + 1;
        let mut chunks = vec![TemplateChunk {
            text: head,
            anchor: 0,
        }];
        let mut nested = 0usize;
        loop {
            let spanned = self.advance().clone();
            let (cooked, is_tail) = match spanned.token {
                Token::Eof => return PatternExpr::Opaque,
                Token::TemplateHead(..) => {
                    nested += 1;
                    continue;
                }
                Token::TemplateMiddle(..) if nested > 0 => continue,
                Token::TemplateTail(..) if nested > 0 => {
                    nested -= 1;
                    continue;
                }
                Token::TemplateMiddle(cooked) => (cooked, false),
                Token::TemplateTail(cooked) => (cooked, true),
                Token::RegExpLiteral { pattern } => {
                    self.hole_sites.push(PatternSite {
                        expr: PatternExpr::regex(pattern, 0),
                        start: spanned.start,
                        end: spanned.end,
                    });
                    continue;
                }
                _ => continue,
            };
            let Some(text) = cooked else {
                return PatternExpr::Opaque;
            };
            // Chunk content starts right after the closing `}` of the hole.
            let content_start = spanned.start + 1;
            let anchor = self.source[body_start..content_start].encode_utf16().count();
            chunks.push(TemplateChunk { text, anchor });
            if is_tail {
                return PatternExpr::Template(chunks);
            }
        }
    }
}

/// Extracts every pattern site from `source`, tolerating lexing errors.
pub fn extract_patterns(source: &str) -> Vec<PatternSite> {
    Parser::new(source).parse_program()
}

/// Like [`extract_patterns`], but fails on the first lexing error.
pub fn extract_patterns_strict(source: &str) -> Result<Vec<PatternSite>, ParseError> {
    Ok(Parser::new_strict(source)?.parse_program())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exprs(src: &str) -> Vec<PatternExpr> {
        extract_patterns(src).into_iter().map(|s| s.expr).collect()
    }

    #[test]
    fn bare_regex_literal() {
        let sites = extract_patterns("const regexp = /(?=a)/;");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].expr, PatternExpr::regex("(?=a)", 0));
        assert_eq!((sites[0].start, sites[0].end), (15, 22));
    }

    #[test]
    fn plain_strings_are_not_sites() {
        assert!(exprs(r#"var str = "(?=foo)""#).is_empty());
    }

    #[test]
    fn constructor_with_string() {
        let sites = extract_patterns(r#"new RegExp("(?<=a)", "g")"#);
        assert_eq!(
            sites[0].expr,
            PatternExpr::constructor(PatternExpr::string("(?<=a)", 1))
        );
        assert_eq!((sites[0].start, sites[0].end), (0, 25));
    }

    #[test]
    fn call_without_new() {
        assert_eq!(
            exprs(r#"RegExp("x")"#),
            vec![PatternExpr::constructor(PatternExpr::string("x", 1))]
        );
    }

    #[test]
    fn member_call_is_ignored() {
        assert!(exprs(r#"lib.RegExp("(?=a)")"#).is_empty());
    }

    #[test]
    fn constructor_with_regex_argument() {
        assert_eq!(
            exprs("new RegExp(/(?!a)/);"),
            vec![PatternExpr::constructor(PatternExpr::regex("(?!a)", 1))]
        );
    }

    #[test]
    fn concatenation_is_flattened() {
        assert_eq!(
            exprs(r#"new RegExp("" + "(?=a)" + "")"#),
            vec![PatternExpr::constructor(PatternExpr::Concat(vec![
                PatternExpr::string("", 1),
                PatternExpr::string("(?=a)", 1),
                PatternExpr::string("", 1),
            ]))]
        );
    }

    #[test]
    fn parenthesized_concatenation() {
        assert_eq!(
            exprs(r#"new RegExp(("a" + "b"))"#),
            vec![PatternExpr::constructor(PatternExpr::Concat(vec![
                PatternExpr::string("a", 1),
                PatternExpr::string("b", 1),
            ]))]
        );
    }

    #[test]
    fn non_literal_operand_is_opaque() {
        assert_eq!(
            exprs(r#"new RegExp("(?=" + x + ")")"#),
            vec![PatternExpr::constructor(PatternExpr::Opaque)]
        );
        assert_eq!(
            exprs(r#"new RegExp("(?=a)".repeat(2))"#),
            vec![PatternExpr::constructor(PatternExpr::Opaque)]
        );
    }

    #[test]
    fn literals_inside_opaque_arguments_are_still_found() {
        assert_eq!(
            exprs("new RegExp(/(?=a)/.source + b)"),
            vec![
                PatternExpr::constructor(PatternExpr::Opaque),
                PatternExpr::regex("(?=a)", 0),
            ]
        );
    }

    #[test]
    fn template_chunks_carry_body_offsets() {
        assert_eq!(
            exprs("new RegExp(`a${b}(?=c)${ `x${y}` }d`)"),
            vec![PatternExpr::constructor(PatternExpr::Template(vec![
                TemplateChunk { text: "a".into(), anchor: 0 },
                TemplateChunk { text: "(?=c)".into(), anchor: 5 },
                TemplateChunk { text: "d".into(), anchor: 22 },
            ]))]
        );
    }

    #[test]
    fn regex_in_template_hole_is_its_own_site() {
        let sites = extract_patterns("new RegExp(`a${/(?<=b)/.source}`)");
        assert_eq!(
            sites.iter().map(|s| s.expr.clone()).collect::<Vec<_>>(),
            vec![
                PatternExpr::constructor(PatternExpr::Template(vec![
                    TemplateChunk { text: "a".into(), anchor: 0 },
                    TemplateChunk { text: "".into(), anchor: 19 },
                ])),
                PatternExpr::regex("(?<=b)", 0),
            ]
        );
        assert_eq!((sites[1].start, sites[1].end), (15, 23));
    }

    #[test]
    fn hole_regex_is_not_duplicated_on_rewind() {
        assert_eq!(
            exprs("new RegExp(`${/(?=a)/}` + x)"),
            vec![
                PatternExpr::constructor(PatternExpr::Opaque),
                PatternExpr::regex("(?=a)", 0),
            ]
        );
    }

    #[test]
    fn nested_constructor_is_one_site() {
        assert_eq!(
            exprs(r#"new RegExp(new RegExp("(?=a)"))"#),
            vec![PatternExpr::constructor(PatternExpr::constructor(
                PatternExpr::string("(?=a)", 1)
            ))]
        );
    }

    #[test]
    fn constructor_without_arguments() {
        assert_eq!(
            exprs("new RegExp; new RegExp()"),
            vec![PatternExpr::Constructor(None), PatternExpr::Constructor(None)]
        );
    }

    #[test]
    fn jsx_attribute_regex() {
        assert_eq!(
            exprs("<Component prop={/(?=a)/}/>"),
            vec![PatternExpr::regex("(?=a)", 0)]
        );
    }

    #[test]
    fn strict_mode_reports_lex_errors() {
        let err = extract_patterns_strict("'unterminated").unwrap_err();
        assert_eq!(err.to_string(), "SyntaxError: Unterminated string literal");
        assert_eq!(
            extract_patterns_strict("/(?=a)/").unwrap()[0].expr,
            PatternExpr::regex("(?=a)", 0)
        );
    }
}
