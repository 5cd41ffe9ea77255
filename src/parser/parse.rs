//! Parser state and shared machinery
//!
//! This module provides the [`Parser`] struct: the borrowed token slice, the cursor,
//! the error list and the recovery flag, plus the helpers every grammar procedure
//! uses (`peek`, `advance`, `expect`, `synchronize`, look-ahead predicates).
//!
//! # Parser Architecture
//!
//! Grammar procedures are split across `impl Parser` blocks:
//! - `statements`: statement dispatch, simple statements, `if`/`while`/`for` and blocks
//! - `expressions`: the expression precedence ladder, calls and literals
//! - `declarations`: `def`, `class`, `import`/`from` and `try`
//!
//! # Error Recovery
//!
//! A failed [`Parser::expect`] records an error and calls [`Parser::synchronize`],
//! which skips to a token that can restart a statement and raises the recovery flag.
//! While the flag is up, further failed matches are silent, and the next
//! `parse_statement`/`parse_statement_list` call returns `None` and lowers it. A
//! successful match also lowers it, since the parser is back in step with the input.

use super::errors::{SyntaxError, SyntaxErrorKind, TokenDesc};
use super::lexer::{SourceLocation, Token, TokenKind};
use super::tree::{NodeKind, ParseTreeNode};
use tracing::{debug, trace};

pub(crate) const AUGMENTED_OPERATORS: &[&str] = &["+=", "-=", "*=", "/=", "%=", "//="];

/// Deepest expression nesting (groups, unary and `not` chains, inline `else` arms).
const MAX_NESTING_DEPTH: usize = 64;

/// Output of one parser run.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub root: ParseTreeNode,
    pub errors: Vec<SyntaxError>,
}

/// Parses a complete token sequence.
pub fn parse(tokens: &[Token]) -> Parsed {
    let mut parser = Parser::new(tokens);
    let root = parser.parse_program();
    Parsed {
        root,
        errors: parser.into_errors(),
    }
}

/// Recursive descent parser over a borrowed token slice.
pub struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) position: usize,
    pub(crate) errors: Vec<SyntaxError>,
    pub(crate) recovering: bool,
    nesting_depth: usize,
    eof: Token,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let location = tokens
            .last()
            .map_or(SourceLocation::new(1, 1), |t| t.location);
        Parser {
            tokens,
            position: 0,
            errors: Vec::new(),
            recovering: false,
            nesting_depth: 0,
            eof: Token::new(TokenKind::EndOfFile, "", location),
        }
    }

    /// `program -> statement*`
    pub fn parse_program(&mut self) -> ParseTreeNode {
        debug!(tokens = self.tokens.len(), "parsing");
        let mut program = ParseTreeNode::new(NodeKind::Program);

        while !self.is_at_end() {
            if let Some(statement) = self.parse_statement() {
                program.push(statement);
            }
        }

        debug!(
            nodes = program.size(),
            errors = self.errors.len(),
            "parsed"
        );
        program
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    /// Current token. Past the end of the slice this is a synthetic `EndOfFile`.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&self.eof)
    }

    /// Moves one token forward; stays put on `EndOfFile`.
    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn check_lexeme(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.peek().is(kind, lexeme)
    }

    /// Word operators (`and`, `or`, `not`, `in`, `is`) are lexed as keywords but also
    /// belong to the operator vocabulary, so accept either kind.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        word_at(self.peek(), word)
    }

    /// Consumes the current token into `node` as a leaf.
    pub(crate) fn take(&mut self, node: &mut ParseTreeNode) {
        let leaf = ParseTreeNode::leaf(self.peek());
        self.advance();
        node.push(leaf);
    }

    /// Matches a token of `kind`, appending it to `node`.
    pub(crate) fn expect(&mut self, node: &mut ParseTreeNode, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.take(node);
            self.recovering = false;
            true
        } else {
            self.mismatch(TokenDesc::kind(kind));
            false
        }
    }

    /// Matches a token of `kind` with exactly this lexeme, appending it to `node`.
    pub(crate) fn expect_lexeme(
        &mut self,
        node: &mut ParseTreeNode,
        kind: TokenKind,
        lexeme: &str,
    ) -> bool {
        if self.check_lexeme(kind, lexeme) {
            self.take(node);
            self.recovering = false;
            true
        } else {
            self.mismatch(TokenDesc::exact(kind, lexeme));
            false
        }
    }

    fn mismatch(&mut self, expected: TokenDesc) {
        if self.recovering {
            trace!(%expected, "suppressed mismatch while recovering");
            return;
        }
        let found = TokenDesc::of(self.peek());
        self.report(SyntaxErrorKind::Expected { expected, found });
        self.synchronize();
    }

    /// Records an error at the current token.
    pub(crate) fn report(&mut self, kind: SyntaxErrorKind) {
        let location = self.peek().location;
        self.report_at(kind, location);
    }

    pub(crate) fn report_at(&mut self, kind: SyntaxErrorKind, location: SourceLocation) {
        let err = SyntaxError::new(kind, location);
        debug!(%err, "syntax error");
        self.errors.push(err);
    }

    /// Enters one level of expression nesting (groups, unary operators, `not` and the
    /// `else` arm of an inline conditional). Past [`MAX_NESTING_DEPTH`] this reports,
    /// skips the rest of the line and returns `false`; otherwise pair it with
    /// [`Parser::leave_nesting`].
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            if !self.recovering {
                self.report(SyntaxErrorKind::Unsupported(format!(
                    "nesting deeper than {MAX_NESTING_DEPTH} levels"
                )));
                self.skip_line();
            }
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    /// Operator loops stop once an error has moved the cursor past the expression.
    pub(crate) fn continues(&self) -> bool {
        !self.recovering
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Skips to a token that can restart parsing and raises the recovery flag.
    ///
    /// Stops at a keyword, identifier, `Dedent`, `Newline` or `EndOfFile`, consumes a
    /// `Newline` found there, and always moves at least one token unless the input is
    /// exhausted.
    pub(crate) fn synchronize(&mut self) {
        self.recovering = true;
        let start = self.position;

        while !matches!(
            self.peek().kind,
            TokenKind::Keyword
                | TokenKind::Identifier
                | TokenKind::Dedent
                | TokenKind::Newline
                | TokenKind::EndOfFile
        ) {
            self.advance();
        }
        if self.check(TokenKind::Newline) {
            self.advance();
        }
        if self.position == start {
            self.advance();
        }

        trace!(from = start, to = self.position, "synchronized");
    }

    /// Drops the rest of the logical line, its `Newline` included, and raises the
    /// recovery flag.
    fn skip_line(&mut self) {
        self.recovering = true;
        let start = self.position;
        while !matches!(
            self.peek().kind,
            TokenKind::Newline | TokenKind::EndOfFile
        ) {
            self.advance();
        }
        if self.check(TokenKind::Newline) {
            self.advance();
        }
        trace!(from = start, to = self.position, "skipped line");
    }

    /// Looks past an assignment target (`name`, `.attr` and `[index]` trailers) and
    /// returns the operator that follows it when that operator assigns.
    pub(crate) fn assignment_operator(&self) -> Option<&Token> {
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let mut offset = 1;
        loop {
            let token = self.peek_at(offset);
            if token.is(TokenKind::Delimiter, ".")
                && self.peek_at(offset + 1).kind == TokenKind::Identifier
            {
                offset += 2;
            } else if token.is(TokenKind::Delimiter, "[") {
                offset = self.matching_bracket(offset)? + 1;
            } else {
                break;
            }
        }

        let op = self.peek_at(offset);
        let assigns = op.kind == TokenKind::Operator
            && (op.lexeme == "=" || AUGMENTED_OPERATORS.contains(&op.lexeme.as_str()));
        assigns.then_some(op)
    }

    /// Offset of the bracket closing the one at `open`, within the current line.
    fn matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut offset = open;
        loop {
            let token = self.peek_at(offset);
            match (token.kind, token.lexeme.as_str()) {
                (TokenKind::Delimiter, "[" | "(" | "{") => depth += 1,
                (TokenKind::Delimiter, "]" | ")" | "}") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(offset);
                    }
                }
                (TokenKind::Newline | TokenKind::EndOfFile, _) => return None,
                _ => {}
            }
            offset += 1;
        }
    }

    /// `name ( . name )* (`
    pub(crate) fn is_call_ahead(&self) -> bool {
        if !self.check(TokenKind::Identifier) {
            return false;
        }
        let mut offset = 1;
        while self.peek_at(offset).is(TokenKind::Delimiter, ".")
            && self.peek_at(offset + 1).kind == TokenKind::Identifier
        {
            offset += 2;
        }
        self.peek_at(offset).is(TokenKind::Delimiter, "(")
    }

    /// Whether the cursor sits inside the body of a `for` or `while`.
    ///
    /// Walks backward pairing `Dedent`s with the `Indent`s that opened them. An
    /// unpaired `Indent` opens a block enclosing the cursor; its header decides: a loop
    /// means inside, a `def`/`class` body means the loop (if any) is out of reach.
    pub(crate) fn is_inside_loop(&self) -> bool {
        let end = self.position.min(self.tokens.len());
        let mut closed = 0usize;

        for index in (0..end).rev() {
            match self.tokens[index].kind {
                TokenKind::Dedent => closed += 1,
                TokenKind::Indent if closed > 0 => closed -= 1,
                TokenKind::Indent => match self.block_header(index) {
                    Some("for" | "while") => return true,
                    Some("def" | "class") => return false,
                    _ => {}
                },
                _ => {}
            }
        }
        false
    }

    /// First keyword of the logical line whose block opens with the `Indent` at
    /// `indent`.
    fn block_header(&self, indent: usize) -> Option<&str> {
        let mut start = indent.checked_sub(1)?;
        while start > 0
            && !matches!(
                self.tokens[start - 1].kind,
                TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
            )
        {
            start -= 1;
        }
        let header = &self.tokens[start];
        (header.kind == TokenKind::Keyword).then_some(header.lexeme.as_str())
    }
}

pub(crate) fn word_at(token: &Token, word: &str) -> bool {
    matches!(token.kind, TokenKind::Keyword | TokenKind::Operator) && token.lexeme == word
}
