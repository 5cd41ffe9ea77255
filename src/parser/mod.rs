//! Python-like source front end
//!
//! This module turns source text into tokens and tokens into a concrete parse tree:
//! - [`classify`]: lexeme predicates (keywords, operators, delimiters, numbers)
//! - [`lexer`]: tokenization with indentation tracking (source text → tokens)
//! - [`parse`]: the [`Parser`] state and its recovery protocol (tokens → tree)
//! - [`tree`]: parse tree nodes
//! - [`errors`]: lexical and syntax diagnostics
//!
//! # Supported Subset
//!
//! - Statements: assignments (including augmented and attribute/index targets), calls,
//!   `if`/`elif`/`else`, `while`, `for`, `def`, `class`, `try`/`except`/`finally`,
//!   `import`/`from`, `return`, `del`, `break`, `continue`, `pass`
//! - Expressions: `or`/`and`/`not`, comparisons, arithmetic, unary operators, `**`,
//!   calls, attribute and index trailers, list and dict literals, inline `if`/`else`
//! - No `with`, `lambda`, comprehensions, decorators or `yield`
//!
//! # Failure Policy
//!
//! Neither phase stops at the first problem. The tokenizer downgrades malformed input to
//! a best-effort token plus a [`LexError`]; the parser records a [`SyntaxError`] and
//! resynchronizes. Both return whatever they built alongside the diagnostics.

pub mod classify;
mod declarations;
pub mod errors;
mod expressions;
pub mod indent;
pub mod lexer;
pub mod parse;
mod statements;
pub mod tree;

pub use errors::{Diagnostic, LexError, LexErrorKind, NumberError, SyntaxError, SyntaxErrorKind};
pub use lexer::{tokenize, Lexed, SourceLocation, Token, TokenKind, Tokenizer};
pub use parse::{parse, Parsed, Parser};
pub use tree::{NodeKind, ParseTreeNode};
