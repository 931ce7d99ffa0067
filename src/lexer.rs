use std::fmt;
use std::str::Chars;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    Keyword(Keyword),

    NumericLiteral,
    StringLiteral(String),
    RegExpLiteral { pattern: String },

    // Template parts carry the cooked text, None when an escape is invalid
    NoSubstitutionTemplate(Option<String>),
    TemplateHead(Option<String>),
    TemplateMiddle(Option<String>),
    TemplateTail(Option<String>),

    Punct(Punct),

    LineTerminator,
    Eof,
}

/// Punctuators the pattern parser cares about. Everything else collapses
/// into `Other` (an operator that may be followed by an expression) or
/// `Update` (`++`/`--`, which usually close an operand).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punct {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Dot,
    OptionalChain,
    Comma,
    Semicolon,
    Arrow,
    Plus,
    Update,
    Other,
}

/// Keywords that change how a following `/` or `{` is read. Any other
/// reserved word is lexed as an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Await,
    Case,
    Delete,
    Do,
    Else,
    Finally,
    For,
    If,
    In,
    Instanceof,
    New,
    Of,
    Return,
    Super,
    This,
    Throw,
    Try,
    Typeof,
    Void,
    While,
    With,
    Yield,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Keyword> {
        match s {
            "await" => Some(Keyword::Await),
            "case" => Some(Keyword::Case),
            "delete" => Some(Keyword::Delete),
            "do" => Some(Keyword::Do),
            "else" => Some(Keyword::Else),
            "finally" => Some(Keyword::Finally),
            "for" => Some(Keyword::For),
            "if" => Some(Keyword::If),
            "in" => Some(Keyword::In),
            "instanceof" => Some(Keyword::Instanceof),
            "new" => Some(Keyword::New),
            "of" => Some(Keyword::Of),
            "return" => Some(Keyword::Return),
            "super" => Some(Keyword::Super),
            "this" => Some(Keyword::This),
            "throw" => Some(Keyword::Throw),
            "try" => Some(Keyword::Try),
            "typeof" => Some(Keyword::Typeof),
            "void" => Some(Keyword::Void),
            "while" => Some(Keyword::While),
            "with" => Some(Keyword::With),
            "yield" => Some(Keyword::Yield),
            _ => None,
        }
    }

    /// `this` and `super` are values; every other keyword here starts an
    /// expression, so a `/` after it opens a regex literal.
    fn precedes_expression(self) -> bool {
        !matches!(self, Keyword::This | Keyword::Super)
    }

    /// Keywords whose parenthesized head is followed by a statement.
    fn has_statement_head(self) -> bool {
        matches!(
            self,
            Keyword::If | Keyword::For | Keyword::While | Keyword::With
        )
    }
}

/// A token with the byte range it occupies in the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

#[derive(Clone, Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
    /// Byte offset where the failing token began.
    pub token_start: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

// Longest operators first so that matching is maximal munch.
const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "**", "<<", ">>", "+=", "-=", "*=", "%=", "&=", "|=",
    "^=", "<", ">", "=", "!", "~", "?", ":", ";", "-", "*", "%", "&", "|", "^", "@",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Brace {
    Block,
    Object,
    Template,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    current: Option<char>,
    offset: usize,
    line: u32,
    column: u32,
    token_start: usize,
    /// Whether a `/` at this point opens a regex literal rather than dividing.
    regex_allowed: bool,
    /// Whether a `{` at this point opens a block rather than an object literal.
    block_allowed: bool,
    /// Set right after `if`, `for`, `while` or `with`.
    statement_head: bool,
    /// Set when the last `)` or `}` ended a statement head or a block.
    closed_statement: bool,
    braces: Vec<Brace>,
    /// One entry per open `(`: true when it holds a statement head.
    parens: Vec<bool>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            current,
            offset: 0,
            line: 1,
            column: 0,
            token_start: 0,
            regex_allowed: true,
            block_allowed: true,
            statement_head: false,
            closed_statement: false,
            braces: Vec::new(),
            parens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current;
        if let Some(c) = ch {
            self.offset += c.len_utf8();
            self.column += 1;
            self.current = self.chars.next();
        }
        ch
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            location: self.location(),
            token_start: self.token_start,
        }
    }

    /// Resume lexing one character past the start of the token that failed.
    /// Bracket and regex context are reset, since the failed token may have
    /// been part of a template or JSX text we could not follow.
    pub fn recover(&mut self, err: &LexError) {
        let restart = self.source[err.token_start..]
            .chars()
            .next()
            .map_or(self.source.len(), |c| err.token_start + c.len_utf8());
        let consumed = &self.source[..restart];
        self.line = 1 + consumed.matches('\n').count() as u32;
        self.column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |l| l.chars().count() as u32);
        self.offset = restart;
        self.chars = self.source[restart..].chars();
        self.current = self.chars.next();
        self.regex_allowed = true;
        self.block_allowed = true;
        self.statement_head = false;
        self.closed_statement = false;
        self.braces.clear();
        self.parens.clear();
    }

    fn is_line_terminator(ch: char) -> bool {
        matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(
            ch,
            '\t' | '\u{000B}' | '\u{000C}' | ' ' | '\u{00A0}' | '\u{FEFF}'
        ) || ch.is_whitespace() && !Self::is_line_terminator(ch)
    }

    fn is_identifier_start(ch: char) -> bool {
        ch == '_' || ch == '$' || ch.is_ascii_alphabetic() || unicode_id_start(ch)
    }

    fn is_identifier_continue(ch: char) -> bool {
        ch == '_'
            || ch == '$'
            || ch.is_ascii_alphanumeric()
            || ch == '\u{200C}'
            || ch == '\u{200D}'
            || unicode_id_continue(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if Self::is_whitespace(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if Self::is_line_terminator(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<bool, LexError> {
        let mut has_line_terminator = false;
        loop {
            match self.advance() {
                Some('*') => {
                    if self.peek() == Some('/') {
                        self.advance();
                        return Ok(has_line_terminator);
                    }
                }
                Some(ch) if Self::is_line_terminator(ch) => {
                    has_line_terminator = true;
                    self.handle_newline(ch);
                }
                Some(_) => {}
                None => return Err(self.error("Unterminated block comment")),
            }
        }
    }

    fn handle_newline(&mut self, ch: char) {
        if ch == '\r' && self.peek() == Some('\n') {
            self.advance();
        }
        self.line += 1;
        self.column = 0;
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error("Unterminated string literal")),
                Some(ch) if ch == quote => return Ok(s),
                Some(ch) if Self::is_line_terminator(ch) => {
                    return Err(self.error("Unterminated string literal"));
                }
                Some('\\') => {
                    if let Some(c) = self.read_escape_sequence()? {
                        s.push(c);
                    }
                }
                Some(ch) => s.push(ch),
            }
        }
    }

    /// Decodes the escape after a consumed `\`. Returns `None` for a line
    /// continuation, which contributes no character.
    fn read_escape_sequence(&mut self) -> Result<Option<char>, LexError> {
        let decoded = match self.advance() {
            None => return Err(self.error("Unterminated escape sequence")),
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000C}',
            Some('v') => '\u{000B}',
            Some(ch @ '0'..='7') => {
                // Legacy octal escapes, up to three digits with a leading 0-3.
                let mut val = ch as u32 - '0' as u32;
                let max_digits = if ch <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            self.advance();
                            val = val * 8 + d;
                        }
                        None => break,
                    }
                }
                char::from_u32(val).unwrap_or('\u{FFFD}')
            }
            Some('x') => {
                let hi = self.advance().and_then(hex_val);
                let lo = self.advance().and_then(hex_val);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => char::from_u32(hi * 16 + lo).unwrap_or('\u{FFFD}'),
                    _ => return Err(self.error("Invalid hex escape")),
                }
            }
            Some('u') => self.read_unicode_escape()?,
            Some(ch) if Self::is_line_terminator(ch) => {
                self.handle_newline(ch);
                return Ok(None);
            }
            Some(ch) => ch,
        };
        Ok(Some(decoded))
    }

    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let mut val: u32 = 0;
        if self.peek() == Some('{') {
            self.advance();
            let mut digits = 0;
            loop {
                match self.advance() {
                    Some('}') if digits > 0 => break,
                    Some(ch) => {
                        let d = hex_val(ch).ok_or_else(|| self.error("Invalid Unicode escape"))?;
                        val = val * 16 + d;
                        if val > 0x10FFFF {
                            return Err(self.error("Unicode code point out of range"));
                        }
                        digits += 1;
                    }
                    None => return Err(self.error("Unterminated Unicode escape")),
                }
            }
        } else {
            for _ in 0..4 {
                let ch = self
                    .advance()
                    .ok_or_else(|| self.error("Invalid Unicode escape"))?;
                val = val * 16 + hex_val(ch).ok_or_else(|| self.error("Invalid Unicode escape"))?;
            }
        }
        // Lone surrogates cannot be represented in a Rust string.
        Ok(char::from_u32(val).unwrap_or('\u{FFFD}'))
    }

    fn read_numeric_literal(&mut self) {
        // Values are irrelevant here, only the extent of the token.
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                let exponent = matches!(ch, 'e' | 'E');
                self.advance();
                if exponent && matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> Token {
        let mut name = String::new();
        name.push(first);
        while let Some(ch) = self.peek() {
            if Self::is_identifier_continue(ch) {
                name.push(ch);
                self.advance();
            } else if ch == '\\' && self.peek_next() == Some('u') {
                self.advance();
                self.advance();
                match self.read_unicode_escape() {
                    Ok(c) => name.push(c),
                    Err(_) => break,
                }
            } else {
                break;
            }
        }

        match Keyword::from_str(&name) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(name),
        }
    }

    /// Reads a regex literal body and flags; the opening `/` is already
    /// consumed.
    fn lex_regex(&mut self) -> Result<Token, LexError> {
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            match self.advance() {
                None => return Err(self.error("Unterminated regular expression")),
                Some(ch) if Self::is_line_terminator(ch) => {
                    return Err(self.error("Unterminated regular expression"));
                }
                Some('/') if !in_class => break,
                Some('\\') => {
                    pattern.push('\\');
                    match self.advance() {
                        Some(c) if !Self::is_line_terminator(c) => pattern.push(c),
                        _ => return Err(self.error("Unterminated regular expression")),
                    }
                }
                Some(ch) => {
                    match ch {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        _ => {}
                    }
                    pattern.push(ch);
                }
            }
        }
        // flags
        while self.peek().is_some_and(Self::is_identifier_continue) {
            self.advance();
        }
        Ok(Token::RegExpLiteral { pattern })
    }

    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        let token = self.scan_token()?;
        self.update_context(&token);
        Ok(Spanned {
            token,
            start: self.token_start,
            end: self.offset,
        })
    }

    /// Records what a following `/` and `{` mean after `token`.
    fn update_context(&mut self, token: &Token) {
        let (regex_allowed, block_allowed) = match token {
            Token::LineTerminator => return,
            Token::Keyword(kw) => (
                kw.precedes_expression(),
                matches!(
                    kw,
                    Keyword::Else | Keyword::Do | Keyword::Try | Keyword::Finally
                ),
            ),
            Token::Identifier(_)
            | Token::NumericLiteral
            | Token::StringLiteral(_)
            | Token::RegExpLiteral { .. }
            | Token::NoSubstitutionTemplate(_)
            | Token::TemplateTail(_) => (false, false),
            // `if (x) {` and `function f() {` both open blocks
            Token::Punct(Punct::RightParen) => (self.closed_statement, true),
            Token::Punct(Punct::RightBrace) => (self.closed_statement, self.closed_statement),
            Token::Punct(Punct::RightBracket | Punct::Update) => (false, false),
            Token::Punct(Punct::LeftBrace | Punct::Semicolon | Punct::Arrow) | Token::Eof => {
                (true, true)
            }
            _ => (true, false),
        };
        self.regex_allowed = regex_allowed;
        self.block_allowed = block_allowed;
        self.statement_head = matches!(token, Token::Keyword(kw) if kw.has_statement_head());
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace();
            self.token_start = self.offset;

            let ch = match self.peek() {
                None => return Ok(Token::Eof),
                Some(ch) => ch,
            };

            if Self::is_line_terminator(ch) {
                self.advance();
                self.handle_newline(ch);
                return Ok(Token::LineTerminator);
            }

            if ch == '/' {
                if self.peek_next() == Some('/') {
                    self.skip_line_comment();
                    continue;
                }
                if self.peek_next() == Some('*') {
                    self.advance();
                    self.advance();
                    if self.skip_block_comment()? {
                        return Ok(Token::LineTerminator);
                    }
                    continue;
                }
            }

            // Hashbang
            if ch == '#' && self.offset == 0 && self.peek_next() == Some('!') {
                self.skip_line_comment();
                continue;
            }

            self.advance();

            if ch == '\'' || ch == '"' {
                return Ok(Token::StringLiteral(self.read_string(ch)?));
            }

            if ch == '`' {
                let (cooked, is_tail) = self.read_template_chars()?;
                return Ok(if is_tail {
                    Token::NoSubstitutionTemplate(cooked)
                } else {
                    self.braces.push(Brace::Template);
                    Token::TemplateHead(cooked)
                });
            }

            if ch.is_ascii_digit() || (ch == '.' && self.peek().is_some_and(|c| c.is_ascii_digit()))
            {
                self.read_numeric_literal();
                return Ok(Token::NumericLiteral);
            }

            if Self::is_identifier_start(ch) {
                return Ok(self.read_identifier(ch));
            }

            // Private names (#field) behave like identifiers.
            if ch == '#' && self.peek().is_some_and(Self::is_identifier_start) {
                let first = self.advance().unwrap_or('#');
                return Ok(self.read_identifier(first));
            }

            if ch == '/' && self.regex_allowed {
                return self.lex_regex();
            }

            return self.read_punctuator(ch);
        }
    }

    // Returns (cooked, is_tail). is_tail=true means ended with backtick, false means ${
    fn read_template_chars(&mut self) -> Result<(Option<String>, bool), LexError> {
        let mut cooked = Some(String::new());
        loop {
            match self.advance() {
                None => return Err(self.error("Unterminated template literal")),
                Some('`') => return Ok((cooked, true)),
                Some('$') if self.peek() == Some('{') => {
                    self.advance();
                    return Ok((cooked, false));
                }
                Some('\\') => match self.read_escape_sequence() {
                    Ok(Some(c)) => {
                        if let Some(ref mut s) = cooked {
                            s.push(c);
                        }
                    }
                    Ok(None) => {}
                    Err(_) => cooked = None,
                },
                Some(ch) if Self::is_line_terminator(ch) => {
                    // CRLF and lone CR both cook to LF
                    self.handle_newline(ch);
                    if let Some(ref mut s) = cooked {
                        s.push(if ch == '\r' { '\n' } else { ch });
                    }
                }
                Some(ch) => {
                    if let Some(ref mut s) = cooked {
                        s.push(ch);
                    }
                }
            }
        }
    }

    fn read_template_continuation(&mut self) -> Result<Token, LexError> {
        let (cooked, is_tail) = self.read_template_chars()?;
        if is_tail {
            Ok(Token::TemplateTail(cooked))
        } else {
            self.braces.push(Brace::Template);
            Ok(Token::TemplateMiddle(cooked))
        }
    }

    fn read_punctuator(&mut self, ch: char) -> Result<Token, LexError> {
        let punct = match ch {
            '{' => {
                let brace = if self.block_allowed {
                    Brace::Block
                } else {
                    Brace::Object
                };
                self.braces.push(brace);
                Punct::LeftBrace
            }
            '}' => {
                let brace = self.braces.pop();
                if brace == Some(Brace::Template) {
                    return self.read_template_continuation();
                }
                self.closed_statement = brace == Some(Brace::Block);
                Punct::RightBrace
            }
            '(' => {
                self.parens.push(self.statement_head);
                Punct::LeftParen
            }
            ')' => {
                self.closed_statement = self.parens.pop().unwrap_or(false);
                Punct::RightParen
            }
            '[' => Punct::LeftBracket,
            ']' => Punct::RightBracket,
            ',' => Punct::Comma,
            '.' if self.peek() == Some('.') && self.peek_next() == Some('.') => {
                self.advance();
                self.advance();
                Punct::Other
            }
            '.' => Punct::Dot,
            '?' if self.peek() == Some('.')
                && !self.peek_next().is_some_and(|c| c.is_ascii_digit()) =>
            {
                self.advance();
                Punct::OptionalChain
            }
            '+' | '-' if self.peek() == Some(ch) => {
                self.advance();
                Punct::Update
            }
            '+' if self.peek() != Some('=') => Punct::Plus,
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                }
                Punct::Other
            }
            _ => {
                let source = self.source;
                let rest = &source[self.token_start..];
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .ok_or_else(|| self.error(format!("Unexpected character: {ch}")))?;
                for _ in 1..op.chars().count() {
                    self.advance();
                }
                match *op {
                    ";" => Punct::Semicolon,
                    "=>" => Punct::Arrow,
                    _ => Punct::Other,
                }
            }
        };
        Ok(Token::Punct(punct))
    }

    pub fn tokenize_all(&mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

fn hex_val(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

fn unicode_id_start(ch: char) -> bool {
    !ch.is_ascii() && unicode_ident::is_xid_start(ch)
}

fn unicode_id_continue(ch: char) -> bool {
    !ch.is_ascii() && unicode_ident::is_xid_continue(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        lexer
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .filter(|t| !matches!(t, Token::LineTerminator))
            .collect()
    }

    fn regex(pattern: &str) -> Token {
        Token::RegExpLiteral {
            pattern: pattern.into(),
        }
    }

    fn regexes(src: &str) -> Vec<Token> {
        lex(src)
            .into_iter()
            .filter(|t| matches!(t, Token::RegExpLiteral { .. }))
            .collect()
    }

    #[test]
    fn empty_source() {
        assert_eq!(lex(""), vec![Token::Eof]);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            lex("const x = new RegExp"),
            vec![
                Token::Identifier("const".into()),
                Token::Identifier("x".into()),
                Token::Punct(Punct::Other),
                Token::Keyword(Keyword::New),
                Token::Identifier("RegExp".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_literals_are_decoded() {
        assert_eq!(
            lex(r#""hello""#),
            vec![Token::StringLiteral("hello".into()), Token::Eof]
        );
        assert_eq!(
            lex(r"'he\nllo'"),
            vec![Token::StringLiteral("he\nllo".into()), Token::Eof]
        );
        assert_eq!(
            lex(r#""\\(?=x)""#),
            vec![Token::StringLiteral(r"\(?=x)".into()), Token::Eof]
        );
        assert_eq!(
            lex(r#""A\x42""#),
            vec![Token::StringLiteral("AB".into()), Token::Eof]
        );
    }

    #[test]
    fn regex_at_expression_start() {
        assert_eq!(
            lex("x = /(?<=a)b/gu;"),
            vec![
                Token::Identifier("x".into()),
                Token::Punct(Punct::Other),
                regex("(?<=a)b"),
                Token::Punct(Punct::Semicolon),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert_eq!(
            lex("a / b / c"),
            vec![
                Token::Identifier("a".into()),
                Token::Punct(Punct::Other),
                Token::Identifier("b".into()),
                Token::Punct(Punct::Other),
                Token::Identifier("c".into()),
                Token::Eof,
            ]
        );
        assert_eq!(
            lex("f(x) / 2"),
            vec![
                Token::Identifier("f".into()),
                Token::Punct(Punct::LeftParen),
                Token::Identifier("x".into()),
                Token::Punct(Punct::RightParen),
                Token::Punct(Punct::Other),
                Token::NumericLiteral,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn regex_class_may_contain_slash() {
        assert_eq!(lex("/[/]x/"), vec![regex("[/]x"), Token::Eof]);
        assert_eq!(lex(r"/a\/b/"), vec![regex(r"a\/b"), Token::Eof]);
    }

    #[test]
    fn regex_after_keyword() {
        assert_eq!(
            lex("return /x/"),
            vec![Token::Keyword(Keyword::Return), regex("x"), Token::Eof]
        );
    }

    #[test]
    fn regex_after_statement_head() {
        assert_eq!(regexes("if (ok) /(?<=a)/.test(s)"), vec![regex("(?<=a)")]);
        assert_eq!(regexes("while (f(x)) /a/.exec(s)"), vec![regex("a")]);
        assert!(regexes("if (a) b = (c) / d / e").is_empty());
    }

    #[test]
    fn regex_after_block() {
        assert_eq!(
            regexes("function f() {}\n/(?<=a)/.test(s)"),
            vec![regex("(?<=a)")]
        );
        assert_eq!(regexes("try {} finally {} /b/"), vec![regex("b")]);
        assert!(regexes("x = {a: 1} / 2 / 3").is_empty());
        assert!(regexes("x = f({}) / 2 / 3").is_empty());
    }

    #[test]
    fn object_literal_inside_template_hole() {
        assert!(regexes("`${ {a: 1} / 2 / 3 }`").is_empty());
    }

    #[test]
    fn comments() {
        assert_eq!(lex("// comment\n42"), vec![Token::NumericLiteral, Token::Eof]);
        assert_eq!(lex("/* block */ 42"), vec![Token::NumericLiteral, Token::Eof]);
    }

    #[test]
    fn template_literal() {
        assert_eq!(
            lex("`hello`"),
            vec![Token::NoSubstitutionTemplate(Some("hello".into())), Token::Eof]
        );
    }

    #[test]
    fn template_line_terminators_cook_to_lf() {
        assert_eq!(
            lex("`a\r\nb\rc`"),
            vec![Token::NoSubstitutionTemplate(Some("a\nb\nc".into())), Token::Eof]
        );
        let mut lexer = Lexer::new("`a\r\nb`");
        let tokens = lexer.tokenize_all().unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (0, 6));
    }

    #[test]
    fn template_with_substitutions() {
        assert_eq!(
            lex("`a${ {b: 1} }c${d}e`"),
            vec![
                Token::TemplateHead(Some("a".into())),
                Token::Punct(Punct::LeftBrace),
                Token::Identifier("b".into()),
                Token::Punct(Punct::Other),
                Token::NumericLiteral,
                Token::Punct(Punct::RightBrace),
                Token::TemplateMiddle(Some("c".into())),
                Token::Identifier("d".into()),
                Token::TemplateTail(Some("e".into())),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn spans_are_byte_ranges() {
        let mut lexer = Lexer::new("f(\"ab\")");
        let tokens = lexer.tokenize_all().unwrap();
        assert_eq!(tokens[2].token, Token::StringLiteral("ab".into()));
        assert_eq!((tokens[2].start, tokens[2].end), (2, 6));
    }

    #[test]
    fn recover_skips_failing_token() {
        let src = "it's (/(?=a)/)";
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(s) if s.token == Token::Eof => break,
                Ok(s) => tokens.push(s.token),
                Err(e) => lexer.recover(&e),
            }
        }
        assert_eq!(tokens.first(), Some(&Token::Identifier("it".into())));
        assert!(tokens.contains(&regex("(?=a)")));
    }

    #[test]
    fn error_location() {
        let mut lexer = Lexer::new("\n  \"abc");
        let err = loop {
            match lexer.next_token() {
                Ok(_) => continue,
                Err(e) => break e,
            }
        };
        assert_eq!(err.token_start, 3);
        assert_eq!(err.location.line, 2);
        assert_eq!(err.to_string(), "2:6: Unterminated string literal");
    }
}
