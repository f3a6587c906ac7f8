//! List View - the windowed record list with a selection cursor
//!
//! Rows are one terminal line each. Only the rows the [`VirtualList`] window
//! yields are turned into widgets, so long lists cost the same to draw as
//! short ones.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::models::{Priority, Record};
use crate::window::{ItemRenderer, VirtualList};

/// Height of one row, in terminal lines.
const ROW_HEIGHT: f64 = 1.0;

/// Turns window items into terminal lines.
///
/// Overscan items outside the visible rows come back as `None`.
struct LineRenderer {
    selected: usize,
    top: f64,
    rows: f64,
}

impl ItemRenderer for LineRenderer {
    type Output = Option<Line<'static>>;

    fn render_item(&mut self, index: usize, record: &Record, offset: f64) -> Self::Output {
        if offset < self.top || offset >= self.top + self.rows {
            return None;
        }

        let marker = if index == self.selected { ">" } else { " " };
        let check = if record.completed { "[x]" } else { "[ ]" };
        let text_style = if record.completed {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::raw(format!(" {} {} ", marker, check)),
            Span::styled(record.text.clone(), text_style),
        ];
        if let Some(priority) = record.priority {
            let color = match priority {
                Priority::High => Color::Red,
                Priority::Medium => Color::Yellow,
                Priority::Low => Color::Green,
            };
            spans.push(Span::styled(
                format!("  ({})", priority.as_str()),
                Style::default().fg(color),
            ));
        }

        let mut line = Line::from(spans);
        if index == self.selected {
            line = line.style(Style::default().add_modifier(Modifier::REVERSED));
        }
        Some(line)
    }
}

/// State for the record list
pub struct ListView {
    list: VirtualList,
    selected: usize,
}

impl ListView {
    pub fn new(overscan: usize) -> Self {
        Self {
            list: VirtualList::new(ROW_HEIGHT, 0.0).with_overscan(overscan),
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll_offset(&self) -> f64 {
        self.list.scroll_offset()
    }

    /// Number of rows the viewport shows.
    pub fn viewport_rows(&self) -> usize {
        self.list.viewport_size() as usize
    }

    /// Resize the viewport, keeping the selection visible.
    pub fn set_viewport_rows(&mut self, rows: u16, len: usize) {
        self.list.set_viewport_size(f64::from(rows));
        self.follow(len);
    }

    /// Keep selection valid after the list changed.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.follow(len);
    }

    /// Move selection down
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.follow(len);
    }

    /// Move selection up
    pub fn select_previous(&mut self, len: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.follow(len);
    }

    /// Jump to top
    pub fn select_first(&mut self, len: usize) {
        self.selected = 0;
        self.follow(len);
    }

    /// Jump to bottom
    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
        self.follow(len);
    }

    pub fn page_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.list.page_down(len);
        self.selected = (self.selected + self.viewport_rows().max(1)).min(len - 1);
        self.follow(len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.list.page_up(len);
        self.selected = self.selected.saturating_sub(self.viewport_rows().max(1));
        self.follow(len);
    }

    fn follow(&mut self, len: usize) {
        self.list.scroll_to_index(self.selected, len);
    }

    /// Visible lines for `view`, top to bottom.
    pub fn visible_lines(&mut self, view: &[Record]) -> Vec<Line<'static>> {
        // Clamps the stored offset before it is used as the top row
        self.list.window(view.len());
        let mut renderer = LineRenderer {
            selected: self.selected,
            top: self.list.scroll_offset(),
            rows: self.list.viewport_size(),
        };
        self.list
            .render(view, &mut renderer)
            .into_iter()
            .flatten()
            .collect()
    }

    /// Render the view
    pub fn render(&mut self, frame: &mut Frame, area: Rect, view: &[Record], title: &str) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title));
        let inner = block.inner(area);
        self.set_viewport_rows(inner.height, view.len());

        if view.is_empty() {
            let empty = Paragraph::new("Nothing here. Press a to add a record.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let lines = self.visible_lines(view);
        frame.render_widget(Paragraph::new(lines).block(block), area);

        let extent = self.list.total_extent(view.len()) as usize;
        if extent > inner.height as usize {
            let mut state = ScrollbarState::new(extent)
                .position(self.list.scroll_offset() as usize)
                .viewport_content_length(inner.height as usize);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area,
                &mut state,
            );
        }
    }
}
