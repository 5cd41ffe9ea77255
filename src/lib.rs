//! # Introduction
//!
//! pyfront is the front end of a Python-like language. It tokenizes source text with an
//! indentation-aware state machine, builds a scope-aware symbol table from the tokens
//! and parses them into a concrete parse tree, reporting every lexical and syntax error
//! it meets instead of stopping at the first. The results can be printed as text,
//! exported as a Graphviz graph or browsed in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//!                     ┌→ Symbol table builder → SymbolTable
//! Source → Tokenizer ─┤
//!                     └→ Parser → ParseTreeNode (+ SyntaxErrors)
//! ```
//!
//! 1. [`parser`]: classifier, tokenizer and recursive descent parser.
//! 2. [`symbols`]: two-pass symbol table over the token sequence.
//! 3. [`report`] and [`dot`]: text and Graphviz renderings of the results.
//! 4. [`config`]: tokenizer and scope options.
//! 5. [`ui`]: ratatui viewer; not part of the stable library API.
//!
//! ```
//! use pyfront::{analyze, config::Config};
//!
//! let analysis = analyze("x = 5\n", &Config::default());
//! assert!(analysis.is_clean());
//! assert_eq!(analysis.tree.children.len(), 1);
//! ```

pub mod config;
pub mod dot;
pub mod parser;
pub mod report;
pub mod symbols;
pub mod ui;

use config::Config;
use parser::{Diagnostic, LexError, ParseTreeNode, SyntaxError, Token, Tokenizer};
use symbols::{SymbolTable, SymbolTableBuilder};
use tracing::info;

/// Everything one run over a source text produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: String,
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexError>,
    pub symbols: SymbolTable,
    pub tree: ParseTreeNode,
    pub syntax_errors: Vec<SyntaxError>,
}

impl Analysis {
    /// Lexical then syntax diagnostics, each group in the order found.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lex_errors
            .iter()
            .cloned()
            .map(Diagnostic::from)
            .chain(self.syntax_errors.iter().cloned().map(Diagnostic::from))
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.lex_errors.len() + self.syntax_errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

/// Runs the tokenizer, the symbol table builder and the parser over `source`.
pub fn analyze(source: &str, config: &Config) -> Analysis {
    let lexed = Tokenizer::with_options(source, config.lexer).tokenize();
    let symbols = SymbolTableBuilder::new(config.scopes).build(&lexed.tokens);
    let parsed = parser::parse(&lexed.tokens);

    info!(
        tokens = lexed.tokens.len(),
        symbols = symbols.len(),
        nodes = parsed.root.size(),
        lex_errors = lexed.errors.len(),
        syntax_errors = parsed.errors.len(),
        "analysis complete"
    );

    Analysis {
        source: source.to_string(),
        tokens: lexed.tokens,
        lex_errors: lexed.errors,
        symbols,
        tree: parsed.root,
        syntax_errors: parsed.errors,
    }
}
