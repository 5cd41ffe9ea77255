//! Parse tree outline pane

use super::{clamp_scroll, pane_block, token_style, visible_rows};
use crate::parser::tree::{NodeKind, ParseTreeNode};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn node_line(depth: usize, node: &ParseTreeNode) -> Line<'static> {
    let guide = Span::styled("│ ".repeat(depth), Style::default().fg(DEFAULT_THEME.border_normal));

    match node.kind {
        NodeKind::Terminal(kind) => {
            let mut spans = vec![
                guide,
                Span::styled(kind.tag(), Style::default().fg(DEFAULT_THEME.comment)),
            ];
            if let Some(value) = &node.value {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    value.escape_debug().to_string(),
                    token_style(kind, value),
                ));
            }
            Line::from(spans)
        }
        kind => Line::from(vec![
            guide,
            Span::styled(kind.label(), Style::default().fg(DEFAULT_THEME.type_name)),
        ]),
    }
}

/// Render the parse tree as an indented outline
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    root: &ParseTreeNode,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let nodes = root.preorder();
    let title = format!(" Parse Tree ({} nodes) ", nodes.len());
    let block = pane_block(&title, is_focused);

    let visible_height = visible_rows(area);
    clamp_scroll(scroll_offset, nodes.len(), visible_height);

    let items: Vec<ListItem> = nodes
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|&(depth, node)| ListItem::new(node_line(depth, node)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
