//! Run configuration
//!
//! The library takes plain option structs; the binary maps command-line flags onto
//! them.

/// Tokenizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Column stop used when a tab appears in leading whitespace.
    pub tab_width: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions { tab_width: 8 }
    }
}

/// Which block headers open a scope in the symbol table. Either way a scope closes when
/// its body ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopePolicy {
    /// `def`/`class` open a scope named after the declared name, and
    /// `if`/`for`/`while`/`elif`/`else` open one named after the keyword.
    #[default]
    ControlBlocks,
    /// Only `def`/`class` open scopes.
    Lexical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub lexer: LexerOptions,
    pub scopes: ScopePolicy,
}
