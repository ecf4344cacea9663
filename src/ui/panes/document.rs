//! Sheet pane and result column
//!
//! The left pane shows the document with line numbers and light highlighting:
//! comments are dimmed, the `dim` keyword and the declared name are coloured,
//! numbers stand out, and the span of a failing line is underlined in red. The right pane shows each
//! line's result on the same row.

use crate::calc::Span as CharSpan;
use crate::sheet::{classify, declaration::KEYWORD_LEN, parse_declaration, LineKind, LineOutcome};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Width of the `{:4} ` line number gutter
const GUTTER_WIDTH: u16 = 5;

/// Vertical scroll shared by both panes
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentScrollState {
    pub offset: usize,
}

impl DocumentScrollState {
    /// Scroll just enough to keep `row` inside a viewport of `height` rows
    pub fn follow(&mut self, row: usize, height: usize) {
        if row < self.offset {
            self.offset = row;
        } else if height > 0 && row >= self.offset + height {
            self.offset = row + 1 - height;
        }
    }
}

fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
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

/// Character range of the name in a well-formed declaration line
fn declared_name(line: &str, kind: LineKind) -> Option<CharSpan> {
    if kind != LineKind::Declaration {
        return None;
    }
    parse_declaration(line, |_| false)
        .ok()
        .map(|declaration| declaration.name_span)
}

fn base_style(c: char, index: usize, kind: LineKind, name: Option<CharSpan>) -> Style {
    let in_name = name.is_some_and(|span| span.start <= index && index < span.end);
    match kind {
        LineKind::Comment => Style::default().fg(DEFAULT_THEME.comment),
        LineKind::Declaration if index < KEYWORD_LEN => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        LineKind::Declaration if in_name => Style::default().fg(DEFAULT_THEME.declared),
        _ if c.is_ascii_digit() || c == '.' => Style::default().fg(DEFAULT_THEME.number),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Style one line, merging runs of equally styled characters into a span
fn highlight_line(line: &str, outcome: Option<&LineOutcome>) -> Line<'static> {
    let kind = classify(line);
    let name = declared_name(line, kind);
    let error_span = match outcome {
        Some(LineOutcome::Error { start, end, .. }) => Some(*start..*end),
        _ => None,
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();

    for (index, c) in line.chars().enumerate() {
        let mut style = base_style(c, index, kind, name);
        if error_span.as_ref().is_some_and(|span| span.contains(&index)) {
            style = Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::UNDERLINED);
        }

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

fn result_line(outcome: Option<&LineOutcome>) -> Line<'static> {
    let Some(outcome) = outcome else {
        return Line::default();
    };
    let Some(text) = outcome.display() else {
        return Line::default();
    };

    let style = match outcome {
        LineOutcome::Error { .. } => Style::default().fg(DEFAULT_THEME.error),
        LineOutcome::Declared { .. } => Style::default().fg(DEFAULT_THEME.declared),
        _ => Style::default().fg(DEFAULT_THEME.success),
    };
    Line::from(Span::styled(text, style))
}

/// Render the document and result panes side by side.
///
/// The terminal cursor is placed at `cursor` (row, column) in the document.
pub fn render_document_pane(
    frame: &mut Frame,
    document_area: Rect,
    result_area: Rect,
    lines: &[String],
    outcomes: &[LineOutcome],
    cursor: (usize, usize),
    scroll_state: &mut DocumentScrollState,
) {
    let visible_height = document_area.height.saturating_sub(2).max(1) as usize;
    let (cursor_row, cursor_col) = cursor;
    scroll_state.follow(cursor_row, visible_height);

    let mut text_lines = Vec::with_capacity(visible_height);
    let mut result_lines = Vec::with_capacity(visible_height);

    for (idx, line) in lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
    {
        let is_current = idx == cursor_row;
        let num_style = if is_current {
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.comment)
        };

        let mut content = highlight_line(line, outcomes.get(idx));
        if is_current {
            for span in &mut content.spans {
                span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
            }
        }

        let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
        spans.extend(content.spans);
        text_lines.push(Line::from(spans));
        result_lines.push(result_line(outcomes.get(idx)));
    }

    frame.render_widget(
        Paragraph::new(text_lines).block(pane_block(" Sheet ", true)),
        document_area,
    );
    frame.render_widget(
        Paragraph::new(result_lines).block(pane_block(" Results ", false)),
        result_area,
    );

    let row = cursor_row.saturating_sub(scroll_state.offset) as u16;
    let col = cursor_col.min(u16::MAX as usize) as u16;
    frame.set_cursor_position(Position::new(
        document_area.x + 1 + GUTTER_WIDTH + col,
        document_area.y + 1 + row,
    ));
}
