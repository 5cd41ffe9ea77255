//! Main TUI application state and logic

use crate::parser::errors::Diagnostic;
use crate::ui::panes::{self, source::SourceRenderData};
use crate::ui::theme::DEFAULT_THEME;
use crate::Analysis;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::Tabs,
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::Duration;

/// Rows moved by PageUp/PageDown
const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Diagnostics,
    Results,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> diagnostics -> results)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Results,
            FocusedPane::Results => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Results,
            FocusedPane::Diagnostics => FocusedPane::Source,
            FocusedPane::Results => FocusedPane::Diagnostics,
        }
    }
}

/// View shown in the results pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTab {
    Tokens,
    Symbols,
    Tree,
}

impl ResultTab {
    pub const ALL: [ResultTab; 3] = [ResultTab::Tokens, ResultTab::Symbols, ResultTab::Tree];

    pub fn index(self) -> usize {
        match self {
            ResultTab::Tokens => 0,
            ResultTab::Symbols => 1,
            ResultTab::Tree => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResultTab::Tokens => "1 Tokens",
            ResultTab::Symbols => "2 Symbols",
            ResultTab::Tree => "3 Parse Tree",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The main application state
pub struct App {
    /// Everything the viewer shows
    pub analysis: Analysis,

    /// Lexical then syntax errors, computed once
    pub diagnostics: Vec<Diagnostic>,

    /// Lines that carry at least one diagnostic
    pub error_lines: FxHashSet<usize>,

    /// Shown in the source pane title
    pub file_name: String,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Currently selected results view
    pub result_tab: ResultTab,

    /// Per-pane scroll offsets, clamped on render
    pub source_scroll: usize,
    pub diagnostics_scroll: usize,
    pub result_scroll: [usize; 3],

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
}

impl App {
    /// Create a new app over a finished analysis
    pub fn new(analysis: Analysis, file_name: String) -> Self {
        let diagnostics = analysis.diagnostics();
        let error_lines = diagnostics.iter().map(Diagnostic::line).collect();
        let status_message = format!(
            "{} tokens, {} symbols, {} nodes",
            analysis.tokens.len(),
            analysis.symbols.len(),
            analysis.tree.size()
        );

        App {
            analysis,
            diagnostics,
            error_lines,
            file_name,
            focused_pane: FocusedPane::Source,
            result_tab: ResultTab::Tokens,
            source_scroll: 0,
            diagnostics_scroll: 0,
            result_scroll: [0; 3],
            should_quit: false,
            status_message,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes above, status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Errors (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: tab strip over the selected view
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(columns[1]);

        panes::render_source_pane(
            frame,
            left_rows[0],
            SourceRenderData {
                source: &self.analysis.source,
                tokens: &self.analysis.tokens,
                error_lines: &self.error_lines,
                title: &self.file_name,
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_diagnostics_pane(
            frame,
            left_rows[1],
            &self.diagnostics,
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        let tabs = Tabs::new(ResultTab::ALL.iter().map(|tab| tab.title()))
            .select(self.result_tab.index())
            .style(Style::default().fg(DEFAULT_THEME.comment))
            .highlight_style(
                Style::default()
                    .fg(DEFAULT_THEME.border_focused)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, right_rows[0]);

        let focused = self.focused_pane == FocusedPane::Results;
        let scroll = &mut self.result_scroll[self.result_tab.index()];
        match self.result_tab {
            ResultTab::Tokens => {
                panes::render_tokens_pane(frame, right_rows[1], &self.analysis.tokens, focused, scroll)
            }
            ResultTab::Symbols => {
                panes::render_symbols_pane(frame, right_rows[1], &self.analysis.symbols, focused, scroll)
            }
            ResultTab::Tree => {
                panes::render_tree_pane(frame, right_rows[1], &self.analysis.tree, focused, scroll)
            }
        }

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.diagnostics.len(),
        );
    }

    /// Scroll offset of the focused pane
    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Diagnostics => &mut self.diagnostics_scroll,
            FocusedPane::Results => &mut self.result_scroll[self.result_tab.index()],
        }
    }

    fn select_tab(&mut self, tab: ResultTab) {
        self.result_tab = tab;
        self.focused_pane = FocusedPane::Results;
        self.status_message = format!("Showing {}", &tab.title()[2..]);
    }

    /// Scroll the source pane to the diagnostic at the top of the errors pane
    fn jump_to_diagnostic(&mut self) {
        if let Some(diagnostic) = self.diagnostics.get(self.diagnostics_scroll) {
            let line = diagnostic.line();
            self.source_scroll = line.saturating_sub(3);
            self.status_message = format!("Line {line}: {diagnostic}");
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Char('1') => self.select_tab(ResultTab::Tokens),
            KeyCode::Char('2') => self.select_tab(ResultTab::Symbols),
            KeyCode::Char('3') => self.select_tab(ResultTab::Tree),
            KeyCode::Left => self.select_tab(self.result_tab.prev()),
            KeyCode::Right => self.select_tab(self.result_tab.next()),
            KeyCode::Up => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(1);
            }
            KeyCode::Down => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_sub(PAGE);
            }
            KeyCode::PageDown => {
                let scroll = self.focused_scroll();
                *scroll = scroll.saturating_add(PAGE);
            }
            KeyCode::Home => *self.focused_scroll() = 0,
            // clamped to the last page on the next render
            KeyCode::End => *self.focused_scroll() = usize::MAX,
            KeyCode::Enter if self.focused_pane == FocusedPane::Diagnostics => {
                self.jump_to_diagnostic();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;
    use crate::config::Config;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn app(source: &str) -> App {
        App::new(analyze(source, &Config::default()), "test.py".to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_focus_cycles() {
        let mut pane = FocusedPane::Source;
        for _ in 0..3 {
            pane = pane.next();
        }
        assert_eq!(pane, FocusedPane::Source);
        assert_eq!(FocusedPane::Source.prev(), FocusedPane::Results);
        assert_eq!(FocusedPane::Results.prev().next(), FocusedPane::Results);
    }

    #[test]
    fn test_tab_keys() {
        let mut app = app("x = 1\n");
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.result_tab, ResultTab::Tree);
        assert_eq!(app.focused_pane, FocusedPane::Results);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.result_tab, ResultTab::Tokens);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.result_tab, ResultTab::Tree);
    }

    #[test]
    fn test_scroll_is_per_tab() {
        let mut app = app("x = 1\n");
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.result_scroll, [PAGE, 1, 0]);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.result_scroll[1], 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app("");
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_error_lines_and_jump() {
        let mut app = app("x = 1\ny = (2\nz = 3\n");
        assert!(!app.diagnostics.is_empty());
        assert!(app.error_lines.contains(&app.diagnostics[0].line()));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message.starts_with("Line "));
    }

    #[test]
    fn test_render_shows_panes() {
        let mut app = app("def f(a):\n    return a\n");
        let text = screen(&mut app);
        assert!(text.contains("test.py"));
        assert!(text.contains("Tokens ("));
        assert!(text.contains("No errors."));
        assert!(text.contains("clean"));

        press(&mut app, KeyCode::Char('3'));
        let text = screen(&mut app);
        assert!(text.contains("func_def"));
    }

    #[test]
    fn test_end_is_clamped_on_render() {
        let source = "x = 1\n".repeat(100);
        let mut app = app(&source);
        press(&mut app, KeyCode::End);
        screen(&mut app);
        assert!(app.source_scroll < 100);
    }
}
