// Integration tests for the tokenizer, symbol table and parser

use pyfront::config::{Config, LexerOptions, ScopePolicy};
use pyfront::parser::errors::TokenDesc;
use pyfront::parser::{
    parse, tokenize, LexErrorKind, NodeKind, NumberError, SyntaxErrorKind, TokenKind,
};
use pyfront::symbols::{build_symbol_table, SymbolKind, SymbolTableBuilder, GLOBAL_SCOPE};
use pyfront::{analyze, dot, report};

fn lex(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source)
        .tokens
        .into_iter()
        .map(|t| (t.kind, t.lexeme))
        .collect()
}

#[test]
fn test_simple_assignment() {
    use TokenKind::*;
    let tokens = lex("x = 5\n");
    let expected = [(Identifier, "x"), (Operator, "="), (Number, "5")];
    for (token, (kind, lexeme)) in tokens.iter().zip(expected) {
        assert_eq!(token.0, kind);
        assert_eq!(token.1, lexeme);
    }
    assert_eq!(tokens[3].0, Newline);
    assert_eq!(tokens.last().map(|t| t.0), Some(EndOfFile));

    let symbols = build_symbol_table(&tokenize("x = 5\n").tokens);
    assert_eq!(symbols.len(), 1);
    let x = symbols.get("x", GLOBAL_SCOPE).expect("x should be recorded");
    assert_eq!(x.kind, SymbolKind::Numeric);
    assert_eq!(x.value.as_deref(), Some("5"));
}

#[test]
fn test_function_definition() {
    use TokenKind::*;
    let source = "def f():\n    return 1\n";
    let kinds: Vec<TokenKind> = lex(source).into_iter().map(|t| t.0).collect();
    assert_eq!(
        &kinds[..11],
        &[
            Keyword, Identifier, Delimiter, Delimiter, Operator, Newline, Indent, Keyword, Number,
            Newline, Dedent
        ]
    );

    let analysis = analyze(source, &Config::default());
    assert!(analysis.is_clean(), "{:?}", analysis.diagnostics());
    assert_eq!(analysis.tree.children.len(), 1);
    assert_eq!(analysis.tree.children[0].kind, NodeKind::FuncDef);

    let f = analysis.symbols.get("f", GLOBAL_SCOPE).expect("f should be recorded");
    assert_eq!(f.kind, SymbolKind::Function);
}

#[test]
fn test_missing_colon_recovers() {
    let analysis = analyze("if x\n    y = 1\n", &Config::default());
    assert!(analysis.lex_errors.is_empty());
    assert_eq!(analysis.syntax_errors.len(), 1);
    assert_eq!(
        analysis.syntax_errors[0].kind,
        SyntaxErrorKind::Expected {
            expected: TokenDesc::exact(TokenKind::Operator, ":"),
            found: TokenDesc::kind(TokenKind::Newline),
        }
    );

    let if_stmt = analysis.tree.find(NodeKind::IfStmt).expect("if_stmt survives");
    let body = if_stmt
        .child(NodeKind::StatementList)
        .expect("nested block survives");
    assert!(body.find(NodeKind::Assignment).is_some());
}

#[test]
fn test_break_outside_loop() {
    let analysis = analyze("break\nx = 1\n", &Config::default());
    assert_eq!(analysis.syntax_errors.len(), 1);
    assert_eq!(
        analysis.syntax_errors[0].kind,
        SyntaxErrorKind::OutsideLoop("break".to_string())
    );
    // parsing went on past the bad statement
    assert!(analysis.tree.find(NodeKind::Assignment).is_some());
}

#[test]
fn test_malformed_number() {
    let lexed = tokenize("x = 3.14.15\n");
    assert_eq!(lexed.tokens[2].kind, TokenKind::Number);
    assert_eq!(lexed.tokens[2].lexeme, "3.14");
    assert!(matches!(
        &lexed.errors[0].kind,
        LexErrorKind::MalformedNumber {
            reason: NumberError::MultipleDecimals,
            ..
        }
    ));
}

#[test]
fn test_errors_on_several_lines_are_all_reported() {
    let source = "x = (1\nif a\n    b = 1\nbreak\nc = $\n";
    let analysis = analyze(source, &Config::default());

    let lexical: Vec<(usize, &LexErrorKind)> = analysis
        .lex_errors
        .iter()
        .map(|e| (e.line(), &e.kind))
        .collect();
    assert_eq!(
        lexical,
        vec![
            (1, &LexErrorKind::UnclosedBracket('(')),
            (5, &LexErrorKind::UnrecognizedCharacter('$')),
        ]
    );

    let newline = TokenDesc::kind(TokenKind::Newline);
    let syntax: Vec<(usize, &SyntaxErrorKind)> = analysis
        .syntax_errors
        .iter()
        .map(|e| (e.line(), &e.kind))
        .collect();
    assert_eq!(
        syntax,
        vec![
            (
                1,
                &SyntaxErrorKind::Expected {
                    expected: TokenDesc::exact(TokenKind::Delimiter, ")"),
                    found: newline.clone(),
                }
            ),
            (
                2,
                &SyntaxErrorKind::Expected {
                    expected: TokenDesc::exact(TokenKind::Operator, ":"),
                    found: newline.clone(),
                }
            ),
            (4, &SyntaxErrorKind::OutsideLoop("break".to_string())),
            (5, &SyntaxErrorKind::ExpectedFactor(newline)),
        ]
    );

    // lexical diagnostics come first
    let phases: Vec<&str> = analysis.diagnostics().iter().map(|d| d.phase()).collect();
    assert_eq!(
        phases,
        ["lexical", "lexical", "syntax", "syntax", "syntax", "syntax"]
    );

    // the block under the broken header still parses
    let if_stmt = analysis.tree.find(NodeKind::IfStmt).expect("if_stmt survives");
    assert!(if_stmt.find(NodeKind::Assignment).is_some());
}

#[test]
fn test_indentation_balances() {
    let source = "\
class Point:
    def __init__(self, x, y):
        self.x = x
        if x > 0:
            self.y = y
        else:
            pass

p = Point(1, 2)
";
    let lexed = tokenize(source);
    assert!(lexed.errors.is_empty(), "{:?}", lexed.errors);
    let indents = lexed.tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
    let dedents = lexed.tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
    assert_eq!(indents, 4);
    assert_eq!(indents, dedents);

    let parsed = parse(&lexed.tokens);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    // the blank line stays inside the innermost block
    let kinds: Vec<NodeKind> = parsed.root.children.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![NodeKind::ClassDef, NodeKind::Assignment]);
}

#[test]
fn test_tab_width_option() {
    let source = "if x:\n\ty = 1\n        z = 2\n";
    let narrow = Config {
        lexer: LexerOptions { tab_width: 4 },
        ..Config::default()
    };
    // a tab at width 8 lines up with eight spaces
    assert!(analyze(source, &Config::default()).is_clean());
    assert!(!analyze(source, &narrow).is_clean());
}

#[test]
fn test_scope_policies() {
    let source = "for i in items:\n    total = i\n";
    let tokens = tokenize(source).tokens;

    let blocks = SymbolTableBuilder::new(ScopePolicy::ControlBlocks).build(&tokens);
    assert!(blocks.get("total", "for").is_some());

    let lexical = SymbolTableBuilder::new(ScopePolicy::Lexical).build(&tokens);
    assert!(lexical.get("total", GLOBAL_SCOPE).is_some());
    assert!(lexical.get("total", "for").is_none());
}

#[test]
fn test_method_symbols() {
    let source = "\
class Greeter:
    def greet(self, name):
        message = \"hi\"
        print(message, name)
";
    let symbols = build_symbol_table(&tokenize(source).tokens);
    assert_eq!(
        symbols.get("Greeter", GLOBAL_SCOPE).map(|e| e.kind),
        Some(SymbolKind::Class)
    );
    assert_eq!(
        symbols.get("greet", "Greeter").map(|e| e.kind),
        Some(SymbolKind::Function)
    );
    let message = symbols.get("message", "greet").expect("message is local");
    assert_eq!(message.kind, SymbolKind::String);
    assert_eq!(message.lines, vec![3, 4]);
    assert_eq!(
        symbols.get("print", "greet").map(|e| e.kind),
        Some(SymbolKind::BuiltinFunction)
    );
}

#[test]
fn test_reports_for_clean_program() {
    let analysis = analyze("total = 1 + 2\nprint(total)\n", &Config::default());
    assert!(analysis.is_clean());

    let tokens = report::token_table(&analysis.tokens);
    assert!(tokens.ends_with(&format!("Total tokens: {}\n", analysis.tokens.len())));

    let symbols = report::symbol_table(&analysis.symbols);
    assert!(symbols.contains("| total "));
    assert!(symbols.contains("builtin_function"));

    let outline = report::tree_outline(&analysis.tree);
    assert!(outline.starts_with("program\n  assignment\n"));
    assert!(outline.contains("  func_call\n"));

    assert_eq!(report::diagnostics(&analysis.diagnostics()), "No errors.\n");
}

#[test]
fn test_dot_export_covers_every_node() {
    let analysis = analyze(
        "def add(a, b):\n    return a + b\nprint(add(1, 2))\n",
        &Config::default(),
    );
    let graph = dot::to_dot(&analysis.tree);
    let nodes = graph.lines().filter(|l| l.contains("[label=")).count();
    let edges = graph.lines().filter(|l| l.contains(" -> ")).count();
    assert_eq!(nodes, analysis.tree.size());
    assert_eq!(edges, nodes - 1);
    assert!(graph.contains("[label=\"func_def\"]"));
}

#[test]
fn test_empty_source() {
    let analysis = analyze("", &Config::default());
    assert!(analysis.is_clean());
    assert!(analysis.tree.children.is_empty());
    assert!(analysis.symbols.is_empty());
    assert_eq!(analysis.tokens.last().map(|t| t.kind), Some(TokenKind::EndOfFile));
}

#[test]
fn test_larger_program_parses_cleanly() {
    let source = r#"
from os import path as p, sep
import sys

def fib(n: int = 10) -> int:
    a, b = 0, 1
    return a
"#;
    // tuple assignment targets are not part of the grammar
    let analysis = analyze(source, &Config::default());
    assert!(!analysis.syntax_errors.is_empty());

    let source = r#"
from os import path as p, sep
import sys

def fib(n: int = 10) -> int:
    a = 0
    b = 1
    while n > 0:
        t = a + b
        a = b
        b = t
        n -= 1
        if a > 1000:
            break
    return a

try:
    data = {"count": fib(5), "items": [1, 2, 3]}
except ValueError as err:
    print("bad", err)
finally:
    del data
"#;
    let analysis = analyze(source, &Config::default());
    assert!(analysis.is_clean(), "{:?}", analysis.diagnostics());
    let statements = analysis.tree.children.iter().filter(|c| !c.is_leaf()).count();
    assert_eq!(statements, 4);
    assert!(analysis.tree.find(NodeKind::DictLiteral).is_some());
    assert!(analysis.tree.find(NodeKind::BreakStmt).is_some());
}
