use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::{
    app::{App, AppState},
    cursor::Verdict,
};

pub const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Split the tape into rows no wider than `width` cells, breaking between
/// characters. Returns the tape index range of each row.
pub fn wrap_rows(chars: &[char], width: u16) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = vec![];
    let mut start = 0;
    let mut used = 0u16;

    for (idx, c) in chars.iter().enumerate() {
        let w = char_width(*c);
        if used + w > width && idx > start {
            rows.push(start..idx);
            start = idx;
            used = 0;
        }
        used += w;
    }
    rows.push(start..chars.len());

    rows
}

/// Cell offset of the caret for a cursor at `index`, relative to the top
/// left of a passage laid out by [`wrap_rows`].
pub fn caret_position(chars: &[char], index: usize, width: u16) -> Position {
    let rows = wrap_rows(chars, width);
    let (row, range) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.contains(&index))
        .map(|(i, r)| (i, r.clone()))
        .unwrap_or_else(|| (rows.len() - 1, rows[rows.len() - 1].clone()));

    let col: u16 = chars[range.start..index.min(range.end)]
        .iter()
        .map(|c| char_width(*c))
        .sum();

    if col >= width.max(1) {
        // the caret sits past a full last row
        Position::new(0, row as u16 + 1)
    } else {
        Position::new(col, row as u16)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let chars = session.tape().chars();
    let rows = wrap_rows(chars, width);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height.saturating_sub(rows.len() as u16 + 2) / 2),
            Constraint::Length(2),
            Constraint::Length(rows.len() as u16),
            Constraint::Min(0),
        ])
        .split(area);

    let remaining = if session.has_started() {
        session.clock().remaining()
    } else {
        session.config().session_secs
    };
    Paragraph::new(Span::styled(remaining.to_string(), dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let resolved = session.cursor().resolved();
    let lines: Vec<Line> = rows
        .iter()
        .map(|range| {
            let spans: Vec<Span> = range
                .clone()
                .map(|idx| match resolved.get(idx) {
                    Some(r) if r.verdict == Verdict::Correct => {
                        Span::styled(r.char.to_string(), green_bold_style)
                    }
                    Some(r) => Span::styled(
                        match r.typed {
                            ' ' => "·".to_owned(),
                            c => c.to_string(),
                        },
                        red_bold_style,
                    ),
                    None => Span::styled(chars[idx].to_string(), dim_bold_style),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let passage_area = chunks[2];
    Paragraph::new(lines).render(passage_area, buf);

    let caret = caret_position(chars, session.current_index(), passage_area.width);
    let caret_cell = Position::new(passage_area.x + caret.x, passage_area.y + caret.y);
    if passage_area.contains(caret_cell) {
        if let Some(cell) = buf.cell_mut(caret_cell) {
            cell.set_style(Style::default().add_modifier(Modifier::UNDERLINED));
        }
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // stats
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    if let Some(result) = app.session.result() {
        let stats = Paragraph::new(Span::styled(
            format!(
                "{} words in {}s   {} wpm   {}% acc",
                result.word_count,
                result.elapsed_seconds,
                result.words_per_minute(),
                result.accuracy()
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

        stats.render(chunks[1], buf);
    }

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", italic_style))
        .render(chunks[3], buf);
}
