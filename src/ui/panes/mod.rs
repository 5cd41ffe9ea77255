//! TUI pane rendering modules
//!
//! Each pane module exports one `render_*` function that draws a view of the
//! [`Analysis`](crate::Analysis) into a [`Rect`] and clamps the scroll offset it is given.
//!
//! # Pane Modules
//!
//! - [`source`]: source text highlighted from the token stream, with error line marks
//! - [`tokens`]: the token sequence with kinds and positions
//! - [`symbols`]: symbol table entries with scope and line lists
//! - [`tree`]: indented parse tree outline
//! - [`diagnostics`]: lexical and syntax errors
//! - [`status`]: status bar with counts and keybindings

pub mod diagnostics;
pub mod source;
pub mod status;
pub mod symbols;
pub mod tokens;
pub mod tree;

pub use diagnostics::render_diagnostics_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
pub use symbols::render_symbols_pane;
pub use tokens::render_tokens_pane;
pub use tree::render_tree_pane;

use crate::parser::classify;
use crate::parser::lexer::TokenKind;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders},
};

/// Bordered block with the focused or normal border color.
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Rows available inside a bordered pane, at least one.
pub(crate) fn visible_rows(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

/// Clamp `offset` so the last page of `total` rows stays full.
pub(crate) fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
}

/// Color of a token, shared by the source and token panes.
pub(crate) fn token_style(kind: TokenKind, lexeme: &str) -> Style {
    match kind {
        TokenKind::Keyword => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        TokenKind::Identifier if classify::is_builtin(lexeme) => {
            Style::default().fg(DEFAULT_THEME.function)
        }
        TokenKind::Identifier => Style::default().fg(DEFAULT_THEME.fg),
        TokenKind::Number | TokenKind::Ellipsis => Style::default().fg(DEFAULT_THEME.number),
        TokenKind::StringQuote | TokenKind::StringLiteral => {
            Style::default().fg(DEFAULT_THEME.string)
        }
        TokenKind::Delimiter => match lexeme {
            "(" | ")" | "[" | "]" | "{" | "}" => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        },
        TokenKind::Operator => Style::default().fg(DEFAULT_THEME.secondary),
        TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndOfFile => {
            Style::default().fg(DEFAULT_THEME.structural)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = 50;
        clamp_scroll(&mut offset, 30, 10);
        assert_eq!(offset, 20);
        clamp_scroll(&mut offset, 5, 10);
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_visible_rows_never_zero() {
        assert_eq!(visible_rows(Rect::new(0, 0, 10, 1)), 1);
        assert_eq!(visible_rows(Rect::new(0, 0, 10, 12)), 10);
    }
}
