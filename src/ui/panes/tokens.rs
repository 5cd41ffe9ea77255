//! Token list pane

use super::{clamp_scroll, pane_block, token_style, visible_rows};
use crate::parser::lexer::Token;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn token_line(index: usize, token: &Token) -> Line<'static> {
    let lexeme = if token.kind.is_structural() {
        String::new()
    } else {
        token.lexeme.escape_debug().to_string()
    };

    Line::from(vec![
        Span::styled(
            format!("{:>5} ", index + 1),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!("{:<15}", token.kind.tag()),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled(
            format!("{:>4}:{:<4} ", token.location.line, token.location.column),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(lexeme, token_style(token.kind, &token.lexeme)),
    ])
}

/// Render the token list
pub fn render_tokens_pane(
    frame: &mut Frame,
    area: Rect,
    tokens: &[Token],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Tokens ({}) ", tokens.len());
    let block = pane_block(&title, is_focused);

    if tokens.is_empty() {
        let paragraph = Paragraph::new("(no tokens)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = visible_rows(area);
    clamp_scroll(scroll_offset, tokens.len(), visible_height);

    let items: Vec<ListItem> = tokens
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, token)| ListItem::new(token_line(i, token)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
