//! Scope-aware symbol table
//!
//! The table is built from the token sequence alone, in two passes:
//!
//! 1. **Occurrences**: every `Identifier` token is recorded under `(name, scope)`, where
//!    the scope is the innermost one open at that token. `def`/`class` names land in the
//!    enclosing scope before their own scope opens.
//! 2. **Inference**: `NAME = value` refines the entry's kind and value from the first
//!    token of the value. A bare name on the right copies the kind and value of that
//!    name's entry (one hop, innermost scope first).
//!
//! Which headers open scopes is chosen by [`ScopePolicy`].

pub mod scope;

use crate::config::ScopePolicy;
use crate::parser::classify;
use crate::parser::lexer::{Token, TokenKind};
use rustc_hash::FxHashMap;
use scope::ScopeStack;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub use scope::GLOBAL_SCOPE;

/// Headers that open a pseudo-scope named after the keyword under
/// [`ScopePolicy::ControlBlocks`].
const CONTROL_HEADERS: &[&str] = &["if", "elif", "else", "for", "while"];

/// Inferred kind of a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    #[default]
    Unknown,
    Numeric,
    String,
    Boolean,
    List,
    Dict,
    Function,
    Class,
    BuiltinFunction,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Unknown => "unknown",
            SymbolKind::Numeric => "numeric",
            SymbolKind::String => "string",
            SymbolKind::Boolean => "boolean",
            SymbolKind::List => "list",
            SymbolKind::Dict => "dict",
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::BuiltinFunction => "builtin_function",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    /// 1-based, in order of first sighting.
    pub id: usize,
    pub name: String,
    /// Lines the name appears on in this scope, first sighting first, no repeats.
    pub lines: Vec<usize>,
    pub kind: SymbolKind,
    pub value: Option<String>,
    pub scope: String,
}

impl SymbolEntry {
    fn add_line(&mut self, line: usize) {
        // tokens arrive in source order, so a repeat is always the last line
        if self.lines.last() != Some(&line) {
            self.lines.push(line);
        }
    }
}

/// Entries keyed by `(name, scope)`, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    index: FxHashMap<(String, String), usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, scope: &str) -> Option<&SymbolEntry> {
        self.index
            .get(&(name.to_string(), scope.to_string()))
            .map(|&i| &self.entries[i])
    }

    /// Looks `name` up through a scope chain, innermost scope first.
    pub fn resolve(&self, name: &str, chain: &[String]) -> Option<&SymbolEntry> {
        chain.iter().rev().find_map(|scope| self.get(name, scope))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a sighting of `name` in `scope`; returns the entry's position.
    fn record(&mut self, name: &str, scope: &str, line: usize) -> usize {
        let key = (name.to_string(), scope.to_string());
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].add_line(line);
            return i;
        }

        let kind = if classify::is_builtin(name) {
            SymbolKind::BuiltinFunction
        } else {
            SymbolKind::Unknown
        };
        let i = self.entries.len();
        self.entries.push(SymbolEntry {
            id: i + 1,
            name: name.to_string(),
            lines: vec![line],
            kind,
            value: None,
            scope: scope.to_string(),
        });
        self.index.insert(key, i);
        i
    }

    fn refine(&mut self, at: usize, kind: SymbolKind, value: Option<String>) {
        if let Some(entry) = self.entries.get_mut(at) {
            entry.kind = kind;
            entry.value = value;
        }
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a SymbolEntry;
    type IntoIter = std::slice::Iter<'a, SymbolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a table with the default scope policy.
pub fn build_symbol_table(tokens: &[Token]) -> SymbolTable {
    SymbolTableBuilder::new(ScopePolicy::default()).build(tokens)
}

pub struct SymbolTableBuilder {
    policy: ScopePolicy,
}

/// Where pass 1 filed an identifier token.
struct Sighting {
    entry: usize,
    chain: Rc<[String]>,
}

impl SymbolTableBuilder {
    pub fn new(policy: ScopePolicy) -> Self {
        SymbolTableBuilder { policy }
    }

    pub fn build(&self, tokens: &[Token]) -> SymbolTable {
        let mut table = SymbolTable::new();
        let sightings = self.record_occurrences(tokens, &mut table);
        infer_kinds(tokens, &sightings, &mut table);
        debug!(
            entries = table.len(),
            policy = ?self.policy,
            "symbol table built"
        );
        table
    }

    /// Pass 1. Returns, for each token position, where an identifier was filed.
    fn record_occurrences(
        &self,
        tokens: &[Token],
        table: &mut SymbolTable,
    ) -> Vec<Option<Sighting>> {
        let mut scopes = ScopeStack::new();
        let mut sightings = Vec::with_capacity(tokens.len());

        for (i, token) in tokens.iter().enumerate() {
            let mut sighting = None;
            match token.kind {
                TokenKind::Identifier => {
                    let entry = table.record(&token.lexeme, scopes.current(), token.line());
                    sighting = Some(Sighting {
                        entry,
                        chain: scopes.chain(),
                    });
                    if i > 0 && declares(&tokens[i - 1]) {
                        scopes.open(token.lexeme.as_str());
                    }
                }
                TokenKind::Keyword
                    if self.policy == ScopePolicy::ControlBlocks
                        && CONTROL_HEADERS.contains(&token.lexeme.as_str())
                        && starts_statement(tokens, i) =>
                {
                    scopes.open(token.lexeme.as_str());
                }
                TokenKind::Indent => scopes.enter_block(),
                TokenKind::Dedent => scopes.leave_block(),
                TokenKind::Newline => {
                    let body_follows = tokens
                        .get(i + 1)
                        .is_some_and(|next| next.kind == TokenKind::Indent);
                    scopes.end_line(body_follows);
                }
                _ => {}
            }
            sightings.push(sighting);
        }
        sightings
    }
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new(ScopePolicy::default())
    }
}

/// Pass 2.
fn infer_kinds(tokens: &[Token], sightings: &[Option<Sighting>], table: &mut SymbolTable) {
    for (i, sighting) in sightings.iter().enumerate() {
        let Some(target) = sighting else {
            continue;
        };

        if i > 0 && declares(&tokens[i - 1]) {
            let kind = if tokens[i - 1].lexeme == "class" {
                SymbolKind::Class
            } else {
                SymbolKind::Function
            };
            table.refine(target.entry, kind, None);
            continue;
        }

        let assigns = tokens
            .get(i + 1)
            .is_some_and(|t| t.is(TokenKind::Operator, "="));
        if !assigns {
            continue;
        }
        let Some(value) = tokens.get(i + 2) else {
            continue;
        };

        let inferred = match (value.kind, value.lexeme.as_str()) {
            (TokenKind::Number, lexeme) => Some((SymbolKind::Numeric, Some(lexeme.to_string()))),
            (TokenKind::StringLiteral, text) => {
                Some((SymbolKind::String, Some(text.to_string())))
            }
            (TokenKind::StringQuote, _) => tokens
                .get(i + 3)
                .filter(|t| t.kind == TokenKind::StringLiteral)
                .map(|t| (SymbolKind::String, Some(t.lexeme.clone()))),
            (TokenKind::Keyword, "True" | "False") => {
                Some((SymbolKind::Boolean, Some(value.lexeme.clone())))
            }
            (TokenKind::Delimiter, "[") => Some((SymbolKind::List, Some("[]".to_string()))),
            (TokenKind::Delimiter, "{") => Some((SymbolKind::Dict, Some("{}".to_string()))),
            (TokenKind::Identifier, name) if is_bare_name(tokens, i + 2) => sightings[i + 2]
                .as_ref()
                .and_then(|source| table.resolve(name, &source.chain))
                .map(|entry| (entry.kind, entry.value.clone())),
            _ => None,
        };

        if let Some((kind, value)) = inferred {
            table.refine(target.entry, kind, value);
        }
    }
}

fn declares(token: &Token) -> bool {
    token.kind == TokenKind::Keyword && matches!(token.lexeme.as_str(), "def" | "class")
}

/// Whether the token at `i` is the first of a logical line.
fn starts_statement(tokens: &[Token], i: usize) -> bool {
    i == 0
        || matches!(
            tokens[i - 1].kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
        )
}

/// An identifier not followed by a call, attribute or index trailer.
fn is_bare_name(tokens: &[Token], i: usize) -> bool {
    !tokens.get(i + 1).is_some_and(|next| {
        next.kind == TokenKind::Delimiter && matches!(next.lexeme.as_str(), "(" | "." | "[")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn table(source: &str) -> SymbolTable {
        build_symbol_table(&tokenize(source).tokens)
    }

    fn lexical(source: &str) -> SymbolTable {
        SymbolTableBuilder::new(ScopePolicy::Lexical).build(&tokenize(source).tokens)
    }

    #[test]
    fn test_numeric_assignment() {
        let symbols = table("x = 5\n");
        assert_eq!(symbols.len(), 1);
        let x = symbols.get("x", "global").unwrap();
        assert_eq!(x.id, 1);
        assert_eq!(x.kind, SymbolKind::Numeric);
        assert_eq!(x.value.as_deref(), Some("5"));
        assert_eq!(x.lines, vec![1]);
    }

    #[test]
    fn test_literal_kinds() {
        let symbols = table("s = 'hi'\nb = True\nl = [1]\nd = {}\nn = None\n");
        let kind = |name: &str| symbols.get(name, "global").map(|e| e.kind);
        assert_eq!(kind("s"), Some(SymbolKind::String));
        assert_eq!(symbols.get("s", "global").unwrap().value.as_deref(), Some("hi"));
        assert_eq!(kind("b"), Some(SymbolKind::Boolean));
        assert_eq!(kind("l"), Some(SymbolKind::List));
        assert_eq!(kind("d"), Some(SymbolKind::Dict));
        assert_eq!(kind("n"), Some(SymbolKind::Unknown));
    }

    #[test]
    fn test_copy_from_identifier() {
        let symbols = table("a = 3\nb = a\nc = a.real\nd = f(a)\n");
        let b = symbols.get("b", "global").unwrap();
        assert_eq!(b.kind, SymbolKind::Numeric);
        assert_eq!(b.value.as_deref(), Some("3"));
        assert_eq!(symbols.get("c", "global").unwrap().kind, SymbolKind::Unknown);
        assert_eq!(symbols.get("d", "global").unwrap().kind, SymbolKind::Unknown);
    }

    #[test]
    fn test_lines_deduplicated_in_order() {
        let symbols = table("x = 1\nx = x + x\ny = x\n");
        assert_eq!(symbols.get("x", "global").unwrap().lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_function_scope() {
        let symbols = table("def f(a):\n    b = a\n    return b\nc = 1\n");
        let f = symbols.get("f", "global").unwrap();
        assert_eq!(f.kind, SymbolKind::Function);
        assert!(symbols.get("a", "f").is_some());
        assert!(symbols.get("b", "f").is_some());
        assert_eq!(symbols.get("c", "global").map(|e| e.id), Some(4));
    }

    #[test]
    fn test_class_and_method_scopes() {
        let symbols = table("class C:\n    def m(self):\n        pass\nx = C\n");
        assert_eq!(symbols.get("C", "global").unwrap().kind, SymbolKind::Class);
        assert_eq!(symbols.get("m", "C").unwrap().kind, SymbolKind::Function);
        assert!(symbols.get("self", "m").is_some());
        // `x = C` copies the class kind
        assert_eq!(symbols.get("x", "global").unwrap().kind, SymbolKind::Class);
    }

    #[test]
    fn test_builtins() {
        let symbols = table("print(format(x))\n");
        assert_eq!(
            symbols.get("print", "global").unwrap().kind,
            SymbolKind::BuiltinFunction
        );
        assert_eq!(
            symbols.get("format", "global").unwrap().kind,
            SymbolKind::BuiltinFunction
        );
        assert_eq!(symbols.get("x", "global").unwrap().kind, SymbolKind::Unknown);
    }

    #[test]
    fn test_control_blocks_open_pseudo_scopes() {
        let source = "x = 1\nif x:\n    y = x\nelse:\n    y = 2\nz = y\n";
        let symbols = table(source);
        assert!(symbols.get("x", "if").is_some());
        assert!(symbols.get("y", "if").is_some());
        assert!(symbols.get("y", "else").is_some());
        assert!(symbols.get("z", "global").is_some());
        // `y = x` resolves `x` innermost first: the `if` sighting has no kind yet
        assert_eq!(symbols.get("y", "if").unwrap().kind, SymbolKind::Unknown);
        assert_eq!(
            symbols.get("y", "else").unwrap().value.as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_lexical_policy_ignores_control_blocks() {
        let source = "x = 1\nif x:\n    y = x\ndef f(): return y\nz = y\n";
        let symbols = lexical(source);
        assert!(symbols.get("x", "if").is_none());
        let y = symbols.get("y", "global").unwrap();
        assert_eq!(y.kind, SymbolKind::Numeric);
        assert_eq!(y.lines, vec![3, 5]);
        // one-line body closed at its newline
        assert!(symbols.get("y", "f").is_some());
        assert!(symbols.get("z", "global").is_some());
    }

    #[test]
    fn test_try_block_does_not_close_function_scope() {
        let source = "def f():\n    try:\n        a = 1\n    except:\n        pass\n    b = 2\n";
        let symbols = table(source);
        assert!(symbols.get("a", "f").is_some());
        assert!(symbols.get("b", "f").is_some());
    }

    #[test]
    fn test_iteration_in_id_order() {
        let symbols = table("b = 1\na = 2\n");
        let names: Vec<&str> = symbols.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!((&symbols).into_iter().count(), 2);
    }
}
