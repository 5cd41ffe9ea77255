//! Property-based tests for the front end.
//!
//! 1. **Tokenizing never panics** and always ends with `EndOfFile`
//! 2. **Indentation stays paired**: as many `Indent` as `Dedent` tokens
//! 3. **Parsing never panics** on arbitrary or near-valid input
//! 4. **Symbol table ids and lines are well formed**
//! 5. **Valid numerals lex as one `Number` token** with the same lexeme

use proptest::prelude::*;

use pyfront::config::Config;
use pyfront::parser::classify::is_number;
use pyfront::parser::{parse, tokenize, NodeKind, TokenKind};
use pyfront::symbols::build_symbol_table;
use pyfront::{analyze, dot, report};

// ============================================================================
// Generators
// ============================================================================

/// Statements and headers that exercise most grammar paths.
const FRAGMENTS: &[&str] = &[
    "x = 5",
    "y = x + 2 * (3 - 1)",
    "if x > 0:",
    "elif x < 0:",
    "else:",
    "while n:",
    "for i in items:",
    "def f(a, b=1, *args, **kw) -> int:",
    "class C(Base):",
    "return a if b else c",
    "break",
    "continue",
    "pass",
    "try:",
    "except ValueError as e:",
    "finally:",
    "import os.path as p",
    "from . import x, y",
    "d = {\"k\": [1, 2], 'j': (3,)}",
    "print(\"hi\", sep=\"\")",
    "s = '''doc'''",
    "del a[0], b.c",
    "n += 1",
    "x = not a in b is not c",
    "lambda: 0",
    "x = 3.14.15",
    "y = (1,",
    "  ",
    "# comment",
];

fn indentation() -> impl Strategy<Value = String> {
    prop::sample::select(&["", "    ", "        ", "\t", "  "][..]).prop_map(str::to_string)
}

/// Lines of fragments at random indentation.
fn near_valid_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (indentation(), prop::sample::select(FRAGMENTS)),
        0..12,
    )
    .prop_map(|lines| {
        lines
            .into_iter()
            .map(|(indent, line)| format!("{indent}{line}\n"))
            .collect::<String>()
    })
}

/// Every numeral shape the classifier accepts, optionally negated.
fn numeral() -> impl Strategy<Value = String> {
    let body = prop_oneof![
        "[1-9][0-9]{0,6}",
        "0[0-9]{0,4}",
        "[0-9]{1,4}\\.[0-9]{0,4}",
        "\\.[0-9]{1,4}",
        "[0-9]{1,3}(\\.[0-9]{0,3})?[eE][+-]?[0-9]{1,2}",
        "\\.[0-9]{1,3}[eE][+-]?[0-9]{1,2}",
        "0[xX][0-9a-fA-F]{1,6}",
        "0[oO][0-7]{1,6}",
        "0[bB][01]{1,8}",
        "[0-9]{1,3}(\\.[0-9]{0,3})?([eE][+-]?[0-9]{1,2})?[jJ]",
        "\\.[0-9]{1,3}[jJ]",
    ];
    (any::<bool>(), body).prop_map(|(negative, body)| {
        if negative {
            format!("-{body}")
        } else {
            body
        }
    })
}

// ============================================================================
// Property tests
// ============================================================================

fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: tokenizing arbitrary text terminates with `EndOfFile`.
    #[test]
    fn tokenize_never_panics(input in "\\PC{0,300}") {
        let lexed = tokenize(&input);
        prop_assert_eq!(lexed.tokens.last().map(|t| t.kind), Some(TokenKind::EndOfFile));
    }

    /// Property 2: every `Indent` is closed by a `Dedent`.
    #[test]
    fn indents_and_dedents_pair_up(input in near_valid_source()) {
        let lexed = tokenize(&input);
        let indents = lexed.tokens.iter().filter(|t| t.kind == TokenKind::Indent).count();
        let dedents = lexed.tokens.iter().filter(|t| t.kind == TokenKind::Dedent).count();
        prop_assert_eq!(indents, dedents, "unpaired indentation for {:?}", input);
    }

    /// Property 3: parsing arbitrary text yields a program node.
    #[test]
    fn parse_never_panics(input in "\\PC{0,300}") {
        let parsed = parse(&tokenize(&input).tokens);
        prop_assert_eq!(parsed.root.kind, NodeKind::Program);
    }

    /// Property 3b: the whole pipeline and its renderings survive near-valid input.
    #[test]
    fn analyze_never_panics_near_valid(input in near_valid_source()) {
        let analysis = analyze(&input, &Config::default());
        prop_assert_eq!(analysis.tree.kind, NodeKind::Program);
        let graph = dot::to_dot(&analysis.tree);
        let edges = graph.lines().filter(|l| l.contains(" -> ")).count();
        prop_assert_eq!(edges + 1, analysis.tree.size());
        let _ = report::token_table(&analysis.tokens);
        let _ = report::symbol_table(&analysis.symbols);
    }

    /// Property 4: ids run 1..=n and line lists are strictly increasing.
    #[test]
    fn symbol_entries_well_formed(input in near_valid_source()) {
        let symbols = build_symbol_table(&tokenize(&input).tokens);
        for (i, entry) in symbols.iter().enumerate() {
            prop_assert_eq!(entry.id, i + 1);
            prop_assert!(!entry.lines.is_empty());
            prop_assert!(entry.lines.windows(2).all(|w| w[0] < w[1]), "{:?}", entry.lines);
        }
    }

    /// Property 5: a valid numeral is one `Number` token with the same text.
    #[test]
    fn numerals_lex_whole(text in numeral()) {
        prop_assert!(is_number(&text));
        let lexed = tokenize(&text);
        prop_assert!(lexed.errors.is_empty(), "{:?}", lexed.errors);
        prop_assert_eq!(lexed.tokens[0].kind, TokenKind::Number);
        prop_assert_eq!(&lexed.tokens[0].lexeme, &text);
        prop_assert_eq!(lexed.tokens[1].kind, TokenKind::Newline);
    }
}
