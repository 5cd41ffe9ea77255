//! Diagnostics produced by the tokenizer and the parser
//!
//! Nothing here aborts a run. The tokenizer and parser push these records into their
//! error lists and keep going; callers receive the full list next to whatever tokens or
//! tree could be built. Every record renders as `line N: message`.

use super::lexer::{SourceLocation, Token, TokenKind};
use std::fmt;

/// A lexical problem at a source location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {}", .location.line, .kind)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

impl LexError {
    pub fn new(kind: LexErrorKind, location: SourceLocation) -> Self {
        LexError { kind, location }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal opened with {quote}")]
    UnterminatedString { quote: String },

    #[error("unterminated triple-quoted string opened with {quote}")]
    UnterminatedTripleQuote { quote: String },

    #[error("unterminated documentation comment")]
    UnterminatedDocComment,

    #[error("triple-quoted region opened with {opened} but closed with {closed}")]
    MismatchedTripleQuote { opened: String, closed: String },

    #[error("malformed number `{lexeme}`: {reason}")]
    MalformedNumber { lexeme: String, reason: NumberError },

    #[error("unrecognized character {0:?}")]
    UnrecognizedCharacter(char),

    #[error("unindent to width {width} does not match any outer indentation level")]
    InconsistentDedent { width: usize },

    #[error("indentation stack underflow")]
    IndentUnderflow,

    #[error("bracket {0:?} was never closed")]
    UnclosedBracket(char),
}

/// Why a numeric candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("multiple decimal points")]
    MultipleDecimals,
    #[error("trailing decimal point")]
    TrailingDecimal,
    #[error("invalid exponent")]
    BadExponent,
    #[error("invalid digits for base prefix")]
    BadBasePrefix,
    #[error("invalid complex suffix")]
    BadComplexSuffix,
    #[error("invalid characters after number")]
    InvalidSuffix,
}

/// A token kind with an optional exact lexeme, used on both sides of an
/// expected/found message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDesc {
    pub kind: TokenKind,
    pub lexeme: Option<String>,
}

impl TokenDesc {
    pub fn kind(kind: TokenKind) -> Self {
        TokenDesc { kind, lexeme: None }
    }

    pub fn exact(kind: TokenKind, lexeme: &str) -> Self {
        TokenDesc {
            kind,
            lexeme: Some(lexeme.to_string()),
        }
    }

    pub fn of(token: &Token) -> Self {
        let lexeme = (!token.kind.is_structural() && !token.lexeme.is_empty())
            .then(|| token.lexeme.clone());
        TokenDesc {
            kind: token.kind,
            lexeme,
        }
    }
}

impl fmt::Display for TokenDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lexeme {
            Some(lexeme) => write!(f, "{} '{}'", self.kind, lexeme),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// A syntactic problem at a source location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {}: {}", .location.line, .kind)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub location: SourceLocation,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, location: SourceLocation) -> Self {
        SyntaxError { kind, location }
    }

    pub fn line(&self) -> usize {
        self.location.line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("expected {expected} but found {found}")]
    Expected { expected: TokenDesc, found: TokenDesc },

    #[error("unexpected {0} at start of statement")]
    UnexpectedToken(TokenDesc),

    #[error("expected an expression but found {0}")]
    ExpectedFactor(TokenDesc),

    #[error("'{0}' outside loop")]
    OutsideLoop(String),

    #[error("invalid dictionary key: {0}")]
    InvalidDictKey(String),

    #[error("unsupported construct: {0}")]
    Unsupported(String),
}

/// Either kind of diagnostic, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::Lex(err) => err.line(),
            Diagnostic::Syntax(err) => err.line(),
        }
    }

    /// Short phase label: `lexical` or `syntax`.
    pub fn phase(&self) -> &'static str {
        match self {
            Diagnostic::Lex(_) => "lexical",
            Diagnostic::Syntax(_) => "syntax",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_message() {
        let err = SyntaxError::new(
            SyntaxErrorKind::Expected {
                expected: TokenDesc::exact(TokenKind::Operator, ":"),
                found: TokenDesc::kind(TokenKind::Newline),
            },
            SourceLocation::new(1, 5),
        );
        assert_eq!(
            err.to_string(),
            "line 1: expected Operator ':' but found Newline"
        );
    }

    #[test]
    fn test_number_message() {
        let err = LexError::new(
            LexErrorKind::MalformedNumber {
                lexeme: "3.14.15".to_string(),
                reason: NumberError::MultipleDecimals,
            },
            SourceLocation::new(2, 1),
        );
        assert_eq!(
            err.to_string(),
            "line 2: malformed number `3.14.15`: multiple decimal points"
        );
        let diagnostic = Diagnostic::from(err);
        assert_eq!(diagnostic.line(), 2);
        assert_eq!(diagnostic.phase(), "lexical");
    }

    #[test]
    fn test_number_reasons_read_as_phrases() {
        assert_eq!(NumberError::BadExponent.to_string(), "invalid exponent");
        assert_eq!(
            NumberError::InvalidSuffix.to_string(),
            "invalid characters after number"
        );
        let source: &dyn std::error::Error = &NumberError::BadBasePrefix;
        assert_eq!(source.to_string(), "invalid digits for base prefix");
    }

    #[test]
    fn test_found_token_hides_structural_lexeme() {
        let token = Token::new(TokenKind::Newline, "\n", SourceLocation::new(1, 4));
        assert_eq!(TokenDesc::of(&token).to_string(), "Newline");
        let token = Token::new(TokenKind::Identifier, "y", SourceLocation::new(2, 5));
        assert_eq!(TokenDesc::of(&token).to_string(), "Identifier 'y'");
    }
}
