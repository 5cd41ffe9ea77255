//! Plain-text reports
//!
//! Boxed tables for tokens and symbols, an indented outline of the parse tree and a
//! diagnostics listing. Used by `--print` and by the tests; the terminal viewer renders
//! the same data with ratatui widgets instead.

use crate::parser::errors::Diagnostic;
use crate::parser::lexer::Token;
use crate::parser::tree::ParseTreeNode;
use crate::symbols::SymbolTable;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A `+---+` boxed grid sized to its widest cell per column.
struct Grid {
    headers: Vec<&'static str>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    fn new(columns: &[(&'static str, Align)]) -> Self {
        Grid {
            headers: columns.iter().map(|(h, _)| *h).collect(),
            align: columns.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn render(&self) -> String {
        let widths = self.widths();
        let rule = {
            let mut rule = String::from("+");
            for width in &widths {
                rule.push_str(&"-".repeat(width + 2));
                rule.push('+');
            }
            rule.push('\n');
            rule
        };

        let mut out = rule.clone();
        let headers: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        self.render_row(&mut out, &headers, &widths, true);
        out.push_str(&rule);
        for row in &self.rows {
            self.render_row(&mut out, row, &widths, false);
        }
        out.push_str(&rule);
        out
    }

    fn render_row(&self, out: &mut String, cells: &[String], widths: &[usize], header: bool) {
        out.push('|');
        for ((cell, width), align) in cells.iter().zip(widths).zip(&self.align) {
            let _ = match (align, header) {
                (Align::Right, false) => write!(out, " {cell:>width$} |"),
                _ => write!(out, " {cell:<width$} |"),
            };
        }
        out.push('\n');
    }
}

/// Escapes control characters so every lexeme fits on one table line.
fn printable(lexeme: &str) -> String {
    lexeme.escape_debug().to_string()
}

/// `#`, `Type`, `Value`, `Line`, `Col` for every token.
pub fn token_table(tokens: &[Token]) -> String {
    let mut grid = Grid::new(&[
        ("#", Align::Right),
        ("Type", Align::Left),
        ("Value", Align::Left),
        ("Line", Align::Right),
        ("Col", Align::Right),
    ]);
    for (i, token) in tokens.iter().enumerate() {
        grid.row(vec![
            (i + 1).to_string(),
            token.kind.tag().to_string(),
            printable(&token.lexeme),
            token.location.line.to_string(),
            token.location.column.to_string(),
        ]);
    }

    let mut out = grid.render();
    let _ = writeln!(out, "Total tokens: {}", tokens.len());
    out
}

/// `ID`, `Identifier`, `Type`, `Value`, `Scope`, `Lines` for every entry in id order.
pub fn symbol_table(table: &SymbolTable) -> String {
    if table.is_empty() {
        return "No identifiers found.\n".to_string();
    }

    let mut grid = Grid::new(&[
        ("ID", Align::Right),
        ("Identifier", Align::Left),
        ("Type", Align::Left),
        ("Value", Align::Left),
        ("Scope", Align::Left),
        ("Lines", Align::Left),
    ]);
    for entry in table {
        let lines: Vec<String> = entry.lines.iter().map(usize::to_string).collect();
        grid.row(vec![
            entry.id.to_string(),
            entry.name.clone(),
            entry.kind.to_string(),
            entry
                .value
                .as_deref()
                .map_or_else(|| "undefined".to_string(), printable),
            entry.scope.clone(),
            lines.join(", "),
        ]);
    }

    let mut out = grid.render();
    let _ = writeln!(out, "Total identifiers: {}", table.len());
    out
}

/// One node per line, indented two spaces per level.
pub fn tree_outline(root: &ParseTreeNode) -> String {
    let mut out = String::new();
    for (depth, node) in root.preorder() {
        let indent = "  ".repeat(depth);
        let _ = match &node.value {
            Some(value) => writeln!(out, "{indent}{}: {}", node.label(), printable(value)),
            None => writeln!(out, "{indent}{}", node.label()),
        };
    }
    out
}

/// One diagnostic per line, prefixed with its phase.
pub fn diagnostics(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "No errors.\n".to_string();
    }
    let mut out = String::new();
    for diagnostic in diagnostics {
        let _ = writeln!(out, "{} error, {diagnostic}", diagnostic.phase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, tokenize};
    use crate::symbols::build_symbol_table;

    #[test]
    fn test_token_table_layout() {
        let tokens = tokenize("x = 5\n").tokens;
        let table = token_table(&tokens);
        let lines: Vec<&str> = table.lines().collect();
        // widest type is END_OF_FILE
        assert_eq!(lines[0], "+---+-------------+-------+------+-----+");
        assert_eq!(lines[1], "| # | Type        | Value | Line | Col |");
        assert_eq!(lines[3], "| 1 | IDENTIFIER  | x     |    1 |   1 |");
        assert_eq!(lines[6], "| 4 | NEWLINE     | \\n    |    1 |   6 |");
        assert_eq!(lines.last().copied(), Some("Total tokens: 5"));
    }

    #[test]
    fn test_symbol_table_layout() {
        let symbols = build_symbol_table(&tokenize("x = 5\ny = x\nz = q\n").tokens);
        let table = symbol_table(&symbols);
        assert!(table.contains("|  1 | x          | numeric | 5         | global | 1, 2  |"));
        assert!(table.contains("| undefined |"));
        assert!(table.ends_with("Total identifiers: 4\n"));
    }

    #[test]
    fn test_empty_reports() {
        assert_eq!(symbol_table(&SymbolTable::new()), "No identifiers found.\n");
        assert_eq!(diagnostics(&[]), "No errors.\n");
    }

    #[test]
    fn test_tree_outline() {
        let tokens = tokenize("pass\n").tokens;
        let outline = tree_outline(&parse(&tokens).root);
        assert_eq!(outline, "program\n  pass_stmt\n    KEYWORD: pass\n    NEWLINE\n");
    }

    #[test]
    fn test_diagnostics_listing() {
        let lexed = tokenize("x = 3.14.15\n");
        let parsed = parse(&lexed.tokens);
        let all: Vec<Diagnostic> = lexed
            .errors
            .into_iter()
            .map(Diagnostic::from)
            .chain(parsed.errors.into_iter().map(Diagnostic::from))
            .collect();
        let listing = diagnostics(&all);
        assert!(listing.starts_with("lexical error, line 1: "));
    }
}
