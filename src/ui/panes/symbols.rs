//! Symbol table pane
//!
//! One row per entry in id order. Entries whose kind is still unknown show their value
//! as `undefined` in the comment color.

use super::{clamp_scroll, pane_block, visible_rows};
use crate::symbols::{SymbolEntry, SymbolKind, SymbolTable};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn kind_style(kind: SymbolKind) -> Style {
    match kind {
        SymbolKind::Unknown => Style::default().fg(DEFAULT_THEME.comment),
        SymbolKind::BuiltinFunction => Style::default().fg(DEFAULT_THEME.function),
        SymbolKind::Numeric => Style::default().fg(DEFAULT_THEME.number),
        SymbolKind::String => Style::default().fg(DEFAULT_THEME.string),
        _ => Style::default().fg(DEFAULT_THEME.type_name),
    }
}

fn entry_line(entry: &SymbolEntry) -> Line<'static> {
    let value = match entry.value.as_deref() {
        Some(value) => Span::styled(
            format!("{:<12} ", value.escape_debug().to_string()),
            Style::default().fg(DEFAULT_THEME.fg),
        ),
        None => Span::styled(
            format!("{:<12} ", "undefined"),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    };
    let lines: Vec<String> = entry.lines.iter().map(usize::to_string).collect();

    Line::from(vec![
        Span::styled(
            format!("{:>4} ", entry.id),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!("{:<16} ", entry.name),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{:<17} ", entry.kind.as_str()), kind_style(entry.kind)),
        value,
        Span::styled(
            format!("{:<12} ", entry.scope),
            Style::default().fg(DEFAULT_THEME.primary),
        ),
        Span::styled(lines.join(", "), Style::default().fg(DEFAULT_THEME.comment)),
    ])
}

/// Render the symbol table
pub fn render_symbols_pane(
    frame: &mut Frame,
    area: Rect,
    table: &SymbolTable,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Symbols ({}) ", table.len());
    let block = pane_block(&title, is_focused);

    if table.is_empty() {
        let paragraph = Paragraph::new("No identifiers found.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = visible_rows(area);
    clamp_scroll(scroll_offset, table.len(), visible_height);

    let items: Vec<ListItem> = table
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|entry| ListItem::new(entry_line(entry)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
