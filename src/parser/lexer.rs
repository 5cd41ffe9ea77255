//! Tokenizer for Python-like source text
//!
//! A character-by-character state machine turning raw text into a flat [`Token`]
//! sequence. Besides ordinary tokens it synthesizes the structural `Newline`, `Indent`
//! and `Dedent` tokens from line breaks and leading whitespace, using an
//! [`IndentStack`].
//!
//! The tokenizer never stops at a malformed construct. Each one becomes a best-effort
//! token plus a [`LexError`], so one run reports every lexical problem in the file.
//!
//! # States
//!
//! ```text
//! Start ──letter──▶ InIdentifier      Start ──quote──▶ InString
//!       ──digit───▶ InNumber                ──"""────▶ InMultilineString / InMultilineComment
//!       ──op char─▶ InOperator              ──#──────▶ InComment
//! ```
//!
//! Every state returns to `Start` once its token is flushed.

use super::classify::{is_keyword, is_number, is_operator, split_base_prefix, starts_operator};
use super::errors::{LexError, LexErrorKind, NumberError};
use super::indent::{IndentStack, IndentUnderflow};
use crate::config::LexerOptions;
use std::fmt;
use tracing::{debug, trace};

/// Keywords that begin statements. See `Tokenizer::statement_follows`.
const STATEMENT_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "while", "for", "try", "except", "finally",
    "return", "import", "from",
];

/// Source location for diagnostics. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    Operator,
    Delimiter,
    StringQuote,
    StringLiteral,
    Newline,
    Indent,
    Dedent,
    Ellipsis,
    EndOfFile,
}

impl TokenKind {
    /// Upper-case tag used in tables and as the label of parse-tree leaves.
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Delimiter => "DELIMITER",
            TokenKind::StringQuote => "STRING_QUOTE",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Ellipsis => "ELLIPSIS",
            TokenKind::EndOfFile => "END_OF_FILE",
        }
    }

    /// Tokens that describe layout rather than source text.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndOfFile
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "Keyword",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::Operator => "Operator",
            TokenKind::Delimiter => "Delimiter",
            TokenKind::StringQuote => "StringQuote",
            TokenKind::StringLiteral => "StringLiteral",
            TokenKind::Newline => "Newline",
            TokenKind::Indent => "Indent",
            TokenKind::Dedent => "Dedent",
            TokenKind::Ellipsis => "Ellipsis",
            TokenKind::EndOfFile => "EndOfFile",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    /// Kind and exact lexeme match.
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }
}

/// Output of one tokenizer run.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Tokenizes `source` with default options.
pub fn tokenize(source: &str) -> Lexed {
    Tokenizer::new(source).tokenize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InIdentifier,
    InNumber,
    InOperator,
    InString,
    InMultilineString,
    InComment,
    InMultilineComment,
}

/// Opening quote of the string or documentation comment being scanned.
#[derive(Debug, Clone)]
struct OpenQuote {
    ch: char,
    lexeme: String,
    location: SourceLocation,
}

pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    options: LexerOptions,
    state: State,
    lexeme: String,
    token_start: SourceLocation,
    token_start_pos: usize,
    quote: Option<OpenQuote>,
    indents: IndentStack,
    at_line_start: bool,
    line_width: usize,
    brackets: Vec<(char, SourceLocation)>,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, LexerOptions::default())
    }

    pub fn with_options(source: &str, options: LexerOptions) -> Self {
        Tokenizer {
            input: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            options,
            state: State::Start,
            lexeme: String::new(),
            token_start: SourceLocation::new(1, 1),
            token_start_pos: 0,
            quote: None,
            indents: IndentStack::new(),
            at_line_start: true,
            line_width: 0,
            brackets: Vec::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Runs the state machine to the end of input.
    pub fn tokenize(mut self) -> Lexed {
        debug!(chars = self.input.len(), "tokenizing");

        loop {
            let Some(c) = self.peek() else {
                if self.state == State::Start {
                    break;
                }
                self.flush_at_end();
                continue;
            };

            if self.at_line_start && self.state == State::Start && self.measure_indent(c) {
                continue;
            }

            match self.state {
                State::Start => self.scan_start(c),
                State::InIdentifier => self.scan_identifier(c),
                State::InNumber => self.scan_number(c),
                State::InOperator => self.scan_operator(c),
                State::InString => self.scan_string(c),
                State::InMultilineString | State::InMultilineComment => self.scan_triple(c),
                State::InComment => self.scan_comment(c),
            }
        }

        self.finish()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Moves the cursor back to `position` on the current line.
    fn rewind(&mut self, position: usize) {
        let back = self.position.saturating_sub(position);
        self.position = position;
        self.column = self.column.saturating_sub(back).max(1);
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn emit(&mut self, kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) {
        let token = Token::new(kind, lexeme, location);
        trace!(kind = %token.kind, lexeme = ?token.lexeme, line = location.line, "token");
        self.tokens.push(token);
    }

    fn error(&mut self, kind: LexErrorKind, location: SourceLocation) {
        let err = LexError::new(kind, location);
        debug!(%err, "lexical error");
        self.errors.push(err);
    }

    /// Starts a multi-character token with the current character.
    /// `-5` and `-.5` both start a numeral.
    fn digits_follow_minus(&self) -> bool {
        match self.peek_ahead(1) {
            Some('.') => self.peek_ahead(2).is_some_and(|c| c.is_ascii_digit()),
            next => next.is_some_and(|c| c.is_ascii_digit()),
        }
    }

    fn begin(&mut self, state: State) {
        self.token_start = self.location();
        self.token_start_pos = self.position;
        self.lexeme.clear();
        if let Some(c) = self.advance() {
            self.lexeme.push(c);
        }
        self.state = state;
    }

    /// Consumes leading whitespace of a logical line. Returns true when a character was
    /// consumed; on the first substantive character the indentation is applied.
    fn measure_indent(&mut self, c: char) -> bool {
        match c {
            ' ' => {
                self.line_width += 1;
                self.advance();
                true
            }
            '\t' => {
                let tab = self.options.tab_width.max(1);
                self.line_width = (self.line_width / tab + 1) * tab;
                self.advance();
                true
            }
            '\r' | '\x0c' => {
                self.advance();
                true
            }
            // blank and comment-only lines leave indentation alone
            '\n' | '#' => false,
            _ => {
                self.at_line_start = false;
                self.apply_indent();
                false
            }
        }
    }

    fn apply_indent(&mut self) {
        let width = self.line_width;
        let location = self.location();

        if width > self.indents.top() {
            self.indents.push(width);
            self.emit(TokenKind::Indent, "", location);
            return;
        }

        while width < self.indents.top() {
            match self.indents.pop() {
                Ok(_) => self.emit(TokenKind::Dedent, "", location),
                Err(IndentUnderflow) => {
                    self.error(LexErrorKind::IndentUnderflow, location);
                    break;
                }
            }
        }

        if width > self.indents.top() {
            // landed between two levels: open a fresh level so Indent/Dedent stay paired
            self.error(LexErrorKind::InconsistentDedent { width }, location);
            self.indents.push(width);
            self.emit(TokenKind::Indent, "", location);
        }
    }

    fn scan_start(&mut self, c: char) {
        let next = self.peek_ahead(1);
        match c {
            ' ' | '\t' | '\r' | '\x0c' => {
                self.advance();
            }
            '\n' => self.newline(),
            '#' => {
                self.advance();
                self.state = State::InComment;
            }
            '\'' | '"' => {
                let location = self.location();
                self.open_quote(c, String::new(), location);
            }
            '.' if next == Some('.') && self.peek_ahead(2) == Some('.') => {
                let location = self.location();
                for _ in 0..3 {
                    self.advance();
                }
                self.emit(TokenKind::Ellipsis, "...", location);
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => self.begin(State::InNumber),
            '-' if self.digits_follow_minus() && self.negative_literal_allowed() => {
                self.begin(State::InNumber)
            }
            c if c.is_ascii_digit() => self.begin(State::InNumber),
            c if c.is_ascii_alphabetic() || c == '_' => self.begin(State::InIdentifier),
            ':' => self.begin(State::InOperator),
            '!' if next == Some('=') => self.begin(State::InOperator),
            c if starts_operator(c) => self.begin(State::InOperator),
            '(' | '[' | '{' => {
                let location = self.location();
                self.brackets.push((c, location));
                self.advance();
                self.emit(TokenKind::Delimiter, c.to_string(), location);
            }
            ')' | ']' | '}' => {
                let location = self.location();
                self.brackets.pop();
                self.advance();
                self.emit(TokenKind::Delimiter, c.to_string(), location);
            }
            ',' | ';' | '@' | '.' => {
                let location = self.location();
                self.advance();
                self.emit(TokenKind::Delimiter, c.to_string(), location);
            }
            other => {
                let location = self.location();
                self.advance();
                self.error(LexErrorKind::UnrecognizedCharacter(other), location);
            }
        }
    }

    /// A `-` before a digit is part of the literal only after nothing, an operator or an
    /// opening delimiter. After an operand (including a closing bracket) it is subtraction.
    fn negative_literal_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Operator => true,
                TokenKind::Delimiter => !matches!(token.lexeme.as_str(), ")" | "]" | "}"),
                _ => false,
            },
        }
    }

    fn newline(&mut self) {
        let location = self.location();
        self.advance();
        if !self.brackets.is_empty() && self.statement_follows() {
            for (bracket, opened) in std::mem::take(&mut self.brackets) {
                self.error(LexErrorKind::UnclosedBracket(bracket), opened);
            }
        }
        if self.brackets.is_empty() {
            self.emit(TokenKind::Newline, "\n", location);
            self.at_line_start = true;
            self.line_width = 0;
        }
    }

    /// Whether the line after an open bracket starts a new statement: a statement
    /// keyword indented no deeper than the line that opened the bracket.
    fn statement_follows(&self) -> bool {
        let tab = self.options.tab_width.max(1);
        let mut width = 0;
        let mut rest = self.input[self.position..].iter().copied().peekable();
        while let Some(&c) = rest.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / tab + 1) * tab,
                '\r' | '\x0c' => {}
                _ => break,
            }
            rest.next();
        }
        let word: String = rest
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        width <= self.line_width && STATEMENT_KEYWORDS.contains(&word.as_str())
    }

    fn scan_identifier(&mut self, c: char) {
        if c.is_ascii_alphanumeric() || c == '_' {
            self.lexeme.push(c);
            self.advance();
        } else if (c == '\'' || c == '"') && is_string_prefix(&self.lexeme) {
            let prefix = std::mem::take(&mut self.lexeme);
            let location = self.token_start;
            self.state = State::Start;
            self.open_quote(c, prefix, location);
        } else {
            self.flush_word();
        }
    }

    fn flush_word(&mut self) {
        let word = std::mem::take(&mut self.lexeme);
        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.emit(kind, word, self.token_start);
        self.state = State::Start;
    }

    fn scan_operator(&mut self, c: char) {
        let mut candidate = self.lexeme.clone();
        candidate.push(c);
        if is_operator(&candidate) {
            self.lexeme = candidate;
            self.advance();
        } else {
            self.flush_operator();
        }
    }

    fn flush_operator(&mut self) {
        let op = std::mem::take(&mut self.lexeme);
        self.emit(TokenKind::Operator, op, self.token_start);
        self.state = State::Start;
    }

    fn scan_number(&mut self, c: char) {
        let extends = match c {
            c if c.is_ascii_alphanumeric() || c == '_' => true,
            '.' => !(self.peek_ahead(1) == Some('.') && self.peek_ahead(2) == Some('.')),
            '+' | '-' => self.lexeme.ends_with(['e', 'E']) && !is_hex_candidate(&self.lexeme),
            _ => false,
        };
        if extends {
            self.lexeme.push(c);
            self.advance();
        } else {
            self.finish_number();
        }
    }

    /// Emits the accumulated numeric candidate, or its longest valid prefix plus a
    /// diagnostic when the whole candidate is not a number.
    fn finish_number(&mut self) {
        let candidate = std::mem::take(&mut self.lexeme);
        let start = self.token_start;
        self.state = State::Start;

        if is_number(&candidate) {
            self.emit(TokenKind::Number, candidate, start);
            return;
        }

        let prefix_len = (1..=candidate.len())
            .rev()
            .find(|&len| is_number(&candidate[..len]))
            .unwrap_or(0);
        let prefix = &candidate[..prefix_len];
        let reason = malformed_reason(&candidate, prefix, &candidate[prefix_len..]);

        let (kept, restart) = match reason {
            NumberError::TrailingDecimal => {
                let kept = prefix.trim_end_matches('.');
                (kept, Some(kept.len()))
            }
            NumberError::InvalidSuffix => (prefix, Some(prefix_len)),
            _ => (prefix, None),
        };
        let kept = kept.to_string();

        self.error(
            LexErrorKind::MalformedNumber {
                lexeme: candidate.clone(),
                reason,
            },
            start,
        );
        if !kept.is_empty() {
            self.emit(TokenKind::Number, kept, start);
        }
        if let Some(offset) = restart {
            self.rewind(self.token_start_pos + offset);
        }
    }

    fn open_quote(&mut self, c: char, prefix: String, location: SourceLocation) {
        let triple = self.peek_ahead(1) == Some(c) && self.peek_ahead(2) == Some(c);
        let region_start = self.position - prefix.chars().count();

        if triple {
            let is_string = self.input[..region_start]
                .iter()
                .rev()
                .find(|ch| !ch.is_whitespace())
                == Some(&'=');
            for _ in 0..3 {
                self.advance();
            }
            let lexeme = format!("{prefix}{c}{c}{c}");
            if is_string {
                self.emit(TokenKind::StringQuote, lexeme.clone(), location);
                self.state = State::InMultilineString;
            } else {
                self.state = State::InMultilineComment;
            }
            self.quote = Some(OpenQuote {
                ch: c,
                lexeme,
                location,
            });
        } else {
            self.advance();
            let lexeme = format!("{prefix}{c}");
            self.emit(TokenKind::StringQuote, lexeme.clone(), location);
            self.quote = Some(OpenQuote {
                ch: c,
                lexeme,
                location,
            });
            self.state = State::InString;
        }

        self.lexeme.clear();
        self.token_start = self.location();
    }

    fn scan_string(&mut self, c: char) {
        let Some(quote_ch) = self.quote.as_ref().map(|open| open.ch) else {
            self.state = State::Start;
            return;
        };
        match c {
            '\\' => self.push_escape(),
            '\n' => {
                if let Some(open) = self.quote.take() {
                    self.error(
                        LexErrorKind::UnterminatedString { quote: open.lexeme },
                        open.location,
                    );
                }
                self.close_string(None);
            }
            c if c == quote_ch => {
                let location = self.location();
                self.advance();
                self.close_string(Some((c.to_string(), location)));
            }
            c => {
                self.lexeme.push(c);
                self.advance();
            }
        }
    }

    fn scan_triple(&mut self, c: char) {
        let Some(quote_ch) = self.quote.as_ref().map(|open| open.ch) else {
            self.state = State::Start;
            return;
        };

        if c == '\\' {
            self.push_escape();
            return;
        }

        let closes = (c == '"' || c == '\'')
            && self.peek_ahead(1) == Some(c)
            && self.peek_ahead(2) == Some(c);
        if !closes {
            self.lexeme.push(c);
            self.advance();
            return;
        }

        let location = self.location();
        for _ in 0..3 {
            self.advance();
        }
        let closing = format!("{c}{c}{c}");
        if c != quote_ch {
            let opened = quote_ch.to_string().repeat(3);
            self.error(
                LexErrorKind::MismatchedTripleQuote {
                    opened,
                    closed: closing.clone(),
                },
                location,
            );
        }

        if self.state == State::InMultilineString {
            self.close_string(Some((closing, location)));
        } else {
            self.lexeme.clear();
            self.quote = None;
            self.state = State::Start;
        }
    }

    /// Keeps a backslash and the character it escapes.
    fn push_escape(&mut self) {
        if let Some(backslash) = self.advance() {
            self.lexeme.push(backslash);
        }
        if let Some(escaped) = self.advance() {
            self.lexeme.push(escaped);
        }
    }

    /// Emits the literal body and, when present, the closing quote.
    fn close_string(&mut self, closing: Option<(String, SourceLocation)>) {
        let body = std::mem::take(&mut self.lexeme);
        self.emit(TokenKind::StringLiteral, body, self.token_start);
        if let Some((lexeme, location)) = closing {
            self.emit(TokenKind::StringQuote, lexeme, location);
        }
        self.quote = None;
        self.state = State::Start;
    }

    fn scan_comment(&mut self, c: char) {
        if c == '\n' {
            self.state = State::Start;
        } else {
            self.advance();
        }
    }

    /// Handles a state still open when the input runs out.
    fn flush_at_end(&mut self) {
        match self.state {
            State::Start => {}
            State::InIdentifier => self.flush_word(),
            State::InNumber => self.finish_number(),
            State::InOperator => self.flush_operator(),
            State::InComment => self.state = State::Start,
            State::InString | State::InMultilineString => {
                let (quote, location) = match &self.quote {
                    Some(open) => (open.lexeme.clone(), open.location),
                    None => (String::new(), self.token_start),
                };
                let kind = if self.state == State::InString {
                    LexErrorKind::UnterminatedString { quote }
                } else {
                    LexErrorKind::UnterminatedTripleQuote { quote }
                };
                self.error(kind, location);
                self.close_string(None);
            }
            State::InMultilineComment => {
                let location = self
                    .quote
                    .as_ref()
                    .map_or(self.token_start, |open| open.location);
                self.error(LexErrorKind::UnterminatedDocComment, location);
                self.lexeme.clear();
                self.quote = None;
                self.state = State::Start;
            }
        }
    }

    fn finish(mut self) -> Lexed {
        for (bracket, location) in std::mem::take(&mut self.brackets) {
            self.error(LexErrorKind::UnclosedBracket(bracket), location);
        }

        let location = self.location();
        if self
            .tokens
            .last()
            .is_some_and(|token| token.kind != TokenKind::Newline)
        {
            self.emit(TokenKind::Newline, "\n", location);
        }

        while self.indents.depth() > 1 {
            if self.indents.pop().is_err() {
                break;
            }
            self.emit(TokenKind::Dedent, "", location);
        }
        self.emit(TokenKind::EndOfFile, "", location);

        debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "tokenized"
        );
        Lexed {
            tokens: self.tokens,
            errors: self.errors,
        }
    }
}

fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "b" | "f" | "u" | "rb" | "br" | "fr" | "rf"
    )
}

fn is_hex_candidate(lexeme: &str) -> bool {
    let body = lexeme.strip_prefix('-').unwrap_or(lexeme);
    body.starts_with("0x") || body.starts_with("0X")
}

/// Picks the diagnostic sub-kind for a rejected numeric candidate, given its longest
/// valid prefix and the remainder after it.
fn malformed_reason(candidate: &str, prefix: &str, rest: &str) -> NumberError {
    let body = candidate.strip_prefix('-').unwrap_or(candidate);
    let next = rest.chars().next();

    if split_base_prefix(body).is_some() {
        NumberError::BadBasePrefix
    } else if prefix.ends_with(['j', 'J']) || matches!(next, Some('j' | 'J')) {
        NumberError::BadComplexSuffix
    } else if next == Some('.') {
        if prefix.contains(['e', 'E']) {
            NumberError::BadExponent
        } else {
            NumberError::MultipleDecimals
        }
    } else if matches!(next, Some('e' | 'E')) {
        NumberError::BadExponent
    } else if prefix.ends_with('.') {
        NumberError::TrailingDecimal
    } else {
        NumberError::InvalidSuffix
    }
}
