//! Source pane rendering with syntax highlighting
//!
//! Highlighting comes from the token stream rather than a separate scanner: every token
//! colors the characters it spans on its line, and text after the last token that starts
//! with `#` is a comment. Lines with a diagnostic get a red line number and a marker.

use super::{clamp_scroll, pane_block, token_style, visible_rows};
use crate::parser::lexer::Token;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source: &'a str,
    pub tokens: &'a [Token],
    pub error_lines: &'a FxHashSet<usize>,
    pub title: &'a str,
}

/// Groups the tokens that own visible text by their 1-based line.
fn tokens_by_line(tokens: &[Token]) -> FxHashMap<usize, Vec<&Token>> {
    let mut lines: FxHashMap<usize, Vec<&Token>> = FxHashMap::default();
    for token in tokens.iter().filter(|t| !t.kind.is_structural()) {
        lines.entry(token.line()).or_default().push(token);
    }
    lines
}

/// Styles one source line from the tokens that start on it.
pub(crate) fn highlight_line<'a>(text: &'a str, tokens: &[&Token]) -> Line<'a> {
    let chars: Vec<char> = text.chars().collect();
    let mut styles = vec![Style::default().fg(DEFAULT_THEME.fg); chars.len()];

    let mut end_of_code = 0;
    for token in tokens {
        let start = token.location.column.saturating_sub(1);
        let end = (start + token.lexeme.chars().count()).min(chars.len());
        let style = token_style(token.kind, &token.lexeme);
        for slot in styles.iter_mut().take(end).skip(start) {
            *slot = style;
        }
        end_of_code = end_of_code.max(end);
    }

    if let Some(hash) = chars
        .iter()
        .skip(end_of_code)
        .position(|&c| c == '#')
        .map(|i| i + end_of_code)
    {
        let comment = Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::ITALIC);
        for slot in &mut styles[hash..] {
            *slot = comment;
        }
    }

    // Merge runs of equal style into spans
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_style = styles.first().copied().unwrap_or_default();
    for (c, style) in chars.into_iter().zip(styles) {
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }

    Line::from(spans)
}

/// Render the source pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" {} ", data.title);
    let block = pane_block(&title, is_focused);

    let lines: Vec<&str> = data.source.lines().collect();
    let visible_height = visible_rows(area);
    clamp_scroll(scroll_offset, lines.len(), visible_height);

    let by_line = tokens_by_line(data.tokens);
    let no_tokens = Vec::new();

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, text)| {
            let line_num = idx + 1;
            let has_error = data.error_lines.contains(&line_num);

            let (marker, num_style) = if has_error {
                (
                    "●",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (" ", Style::default().fg(DEFAULT_THEME.comment))
            };

            let mut content = highlight_line(text, by_line.get(&line_num).unwrap_or(&no_tokens));
            if has_error {
                for span in &mut content.spans {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![
                Span::styled(marker, num_style),
                Span::styled(format!("{:4} ", line_num), num_style),
            ];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    fn spans_of(source: &str) -> Vec<(String, Style)> {
        let tokens = tokenize(source).tokens;
        let by_line = tokens_by_line(&tokens);
        let first = source.lines().next().unwrap_or_default();
        highlight_line(first, &by_line[&1])
            .spans
            .into_iter()
            .map(|s| (s.content.into_owned(), s.style))
            .collect()
    }

    #[test]
    fn test_keyword_and_number_are_colored() {
        let spans = spans_of("if x > 10:\n    pass\n");
        assert_eq!(spans[0].0, "if");
        assert_eq!(spans[0].1.fg, Some(DEFAULT_THEME.keyword));
        let ten = spans.iter().find(|(text, _)| text == "10").unwrap();
        assert_eq!(ten.1.fg, Some(DEFAULT_THEME.number));
    }

    #[test]
    fn test_trailing_comment() {
        let spans = spans_of("x = 1  # one\n");
        let last = spans.last().unwrap();
        assert_eq!(last.0, "# one");
        assert_eq!(last.1.fg, Some(DEFAULT_THEME.comment));
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let spans = spans_of("s = \"a # b\"\n");
        assert!(spans.iter().all(|(_, style)| style.fg != Some(DEFAULT_THEME.comment)));
    }
}
