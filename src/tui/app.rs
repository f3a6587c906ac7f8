//! TUI Application - event loop and terminal management
//!
//! This module contains:
//! - Terminal setup and restoration
//! - Key handling for navigation, store commands and inline text input
//! - Layout: filter tabs, the windowed list, a stats footer and a status line

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{prelude::*, widgets::Paragraph};

use super::list_view::ListView;
use crate::models::{Filter, Priority, RecordId};
use crate::storage::Persistence;
use crate::store::{Command, Outcome, TodoStore};

const HELP_LINE: &str = " j/k:Move  PgUp/PgDn:Page  g/G:Top/Bottom  space:Toggle  a:Add  e:Edit  \
                         d:Delete  c:Clear  1/2/3:Filter  q:Quit";

/// What keystrokes currently do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing the text of a new record
    Adding(String),
    /// Typing replacement text for a record
    Editing(RecordId, String),
}

/// TUI Application state
pub struct TuiApp<P: Persistence> {
    store: TodoStore<P>,
    list: ListView,
    /// Priority given to records added from the input line
    default_priority: Option<Priority>,
    mode: Mode,
    status: Option<String>,
    should_quit: bool,
}

impl<P: Persistence> TuiApp<P> {
    pub fn new(store: TodoStore<P>, overscan: usize) -> Self {
        Self {
            store,
            list: ListView::new(overscan),
            default_priority: None,
            mode: Mode::Normal,
            status: None,
            should_quit: false,
        }
    }

    /// Priority for records added in the TUI.
    pub fn with_default_priority(mut self, priority: Option<Priority>) -> Self {
        self.default_priority = priority;
        self
    }

    pub fn store(&self) -> &TodoStore<P> {
        &self.store
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected(&self) -> usize {
        self.list.selected()
    }

    fn view_len(&self) -> usize {
        self.store.filtered_view().len()
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.store
            .filtered_view()
            .get(self.list.selected())
            .map(|record| record.id)
    }

    /// Handle keyboard events
    pub fn handle_key(&mut self, key: KeyCode) {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding(_) | Mode::Editing(..) => self.handle_input_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyCode) {
        let len = self.view_len();
        self.status = None;
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.list.select_next(len),
            KeyCode::Char('k') | KeyCode::Up => self.list.select_previous(len),
            KeyCode::PageDown => self.list.page_down(len),
            KeyCode::PageUp => self.list.page_up(len),
            KeyCode::Char('g') | KeyCode::Home => self.list.select_first(len),
            KeyCode::Char('G') | KeyCode::End => self.list.select_last(len),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_id() {
                    self.apply(Command::Toggle { id });
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.apply(Command::Remove { id });
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    let text = self
                        .store
                        .get(id)
                        .map(|r| r.text.clone())
                        .unwrap_or_default();
                    self.mode = Mode::Editing(id, text);
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Adding(String::new()),
            KeyCode::Char('c') => {
                if let Some(Outcome::Cleared(removed)) = self.apply(Command::ClearCompleted) {
                    self.status = Some(format!("Cleared {} completed", removed));
                }
            }
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Active),
            KeyCode::Char('3') => self.set_filter(Filter::Completed),
            _ => {}
        }
        let len = self.view_len();
        self.list.clamp(len);
    }

    fn handle_input_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = None;
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                if let Mode::Adding(buf) | Mode::Editing(_, buf) = &mut self.mode {
                    buf.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Mode::Adding(buf) | Mode::Editing(_, buf) = &mut self.mode {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }

    /// Run a command that cannot fail validation.
    fn apply(&mut self, command: Command) -> Option<Outcome> {
        self.store.dispatch(command).ok()
    }

    fn set_filter(&mut self, filter: Filter) {
        self.apply(Command::SetFilter { filter });
    }

    fn submit_input(&mut self) {
        let command = match &self.mode {
            Mode::Adding(text) => Command::Add {
                text: text.clone(),
                priority: self.default_priority,
            },
            Mode::Editing(id, text) => Command::Edit {
                id: *id,
                text: text.clone(),
            },
            Mode::Normal => return,
        };
        match self.store.dispatch(command) {
            Ok(_) => {
                if matches!(self.mode, Mode::Adding(_)) {
                    // Show the new record
                    let len = self.view_len();
                    self.list.select_last(len);
                }
                self.mode = Mode::Normal;
                self.status = None;
            }
            // Stay in input mode so the text can be fixed
            Err(e) => self.status = Some(e.to_string()),
        }
        let len = self.view_len();
        self.list.clamp(len);
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Filter tabs
                Constraint::Min(3),    // List
                Constraint::Length(1), // Stats
                Constraint::Length(1), // Status / input
            ])
            .split(frame.area());

        self.render_tabs(frame, chunks[0]);

        let view = self.store.filtered_view();
        self.list.render(frame, chunks[1], &view, "ticklist");

        self.render_stats(frame, chunks[2]);
        self.render_status_line(frame, chunks[3]);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let current = self.store.filter();
        let mut spans = Vec::new();
        for (n, filter) in Filter::all().iter().enumerate() {
            let style = if *filter == current {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" [{}] {} ", n + 1, filter.as_str()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let stats = self.store.stats();
        let text = format!(
            " {} total  {} active  {} completed  {:.1}% done",
            stats.total, stats.active, stats.completed, stats.completion_rate
        );
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Cyan)),
            area,
        );
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let line = match (&self.mode, &self.status) {
            (Mode::Adding(buf), status) => input_line("Add", buf, status.as_deref()),
            (Mode::Editing(_, buf), status) => input_line("Edit", buf, status.as_deref()),
            (Mode::Normal, Some(status)) => Line::from(Span::styled(
                format!(" {}", status),
                Style::default().fg(Color::Yellow),
            )),
            (Mode::Normal, None) => Line::from(Span::styled(
                HELP_LINE,
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn input_line(label: &str, buf: &str, error: Option<&str>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!(" {}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}_", buf)),
    ];
    if let Some(error) = error {
        spans.push(Span::styled(
            format!("  ({})", error),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the event loop until the user quits.
pub fn run_app<P: Persistence>(mut app: TuiApp<P>) -> io::Result<()> {
    let mut terminal = setup_terminal()?;

    let result = (|| -> io::Result<()> {
        while !app.should_quit() {
            terminal.draw(|f| app.render(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }
        }
        Ok(())
    })();

    // Restore even when the loop failed
    restore_terminal()?;
    result
}
