//! Diagnostics pane

use super::{clamp_scroll, pane_block, visible_rows};
use crate::parser::errors::Diagnostic;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

/// Render the list of lexical and syntax errors
pub fn render_diagnostics_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[Diagnostic],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Errors ({}) ", diagnostics.len());
    let block = pane_block(&title, is_focused);

    if diagnostics.is_empty() {
        let paragraph = Paragraph::new("No errors.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.success));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = visible_rows(area);
    clamp_scroll(scroll_offset, diagnostics.len(), visible_height);

    let items: Vec<ListItem> = diagnostics
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|diagnostic| {
            let phase_color = match diagnostic {
                Diagnostic::Lex(_) => DEFAULT_THEME.secondary,
                Diagnostic::Syntax(_) => DEFAULT_THEME.error,
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", diagnostic.phase()),
                    Style::default()
                        .fg(phase_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(diagnostic.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
