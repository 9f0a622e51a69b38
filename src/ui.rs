pub mod screen;
pub mod wrap;

use std::ops::Range;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    app::App,
    session::{CharStatus, StatusProjection},
    util::{format_mins, format_secs},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const TITLE: &str = "ago-type!";

pub fn draw(app: &mut App, f: &mut Frame) {
    screen::current_screen(&app.state).render(app, f);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

fn char_style(status: CharStatus, is_caret: bool) -> Style {
    let style = match status {
        CharStatus::Match => bold().fg(Color::Green),
        CharStatus::Mismatch => bold().fg(Color::Red).add_modifier(Modifier::UNDERLINED),
        CharStatus::Pending => dim_bold(),
    };

    if is_caret {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

fn page(area: Rect, constraints: &[Constraint]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(constraints)
        .split(area)
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Span::styled(TITLE, bold())).alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_legend(f: &mut Frame, area: Rect, text: &'static str) {
    f.render_widget(Paragraph::new(Span::styled(text, italic())), area);
}

/// Build one display line, merging runs of equally styled chars into a span
fn styled_line(projection: &StatusProjection, range: Range<usize>) -> Line<'static> {
    let caret = projection.caret;
    let groups = projection.chars[range.clone()]
        .iter()
        .zip(range)
        .chunk_by(|(c, idx)| (c.status, *idx == caret));

    let mut spans = Vec::new();
    for ((status, is_caret), group) in &groups {
        let text: String = group
            .map(|(c, _)| match (c.status, c.ch) {
                (CharStatus::Mismatch, ' ') => '·',
                (_, ch) => ch,
            })
            .collect();
        spans.push(Span::styled(text, char_style(status, is_caret)));
    }

    Line::from(spans)
}

/// Draw the quote and move `app.scroll_offset` just enough to keep the caret visible
fn render_quote(app: &mut App, f: &mut Frame, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let projection = session.derive_per_character_status();

    let chars: Vec<char> = projection.chars.iter().map(|c| c.ch).collect();
    // keep a spare column for a space that closes a full line
    let lines = wrap::wrap_lines(&chars, (area.width as usize).saturating_sub(1));
    let height = area.height as usize;
    let caret_line = wrap::caret_line(&lines, projection.caret);
    app.scroll_offset = wrap::scroll_to_caret(app.scroll_offset, caret_line, height);

    let visible: Vec<Line> = lines
        .iter()
        .skip(app.scroll_offset)
        .take(height)
        .map(|r| styled_line(&projection, r.clone()))
        .collect();

    let alignment = if lines.len() == 1 {
        // a quote that fits on one line reads best centered
        Alignment::Center
    } else {
        Alignment::Left
    };

    f.render_widget(Paragraph::new(visible).alignment(alignment), area);
}

fn render_author(app: &App, f: &mut Frame, area: Rect) {
    if let Some(author) = &app.author {
        let line = Paragraph::new(Span::styled(format!("- {author}"), dim_bold()))
            .alignment(Alignment::Right);
        f.render_widget(line, area);
    }
}

fn status_line(app: &App) -> Span<'static> {
    if let Some(err) = &app.last_error {
        return Span::styled(format!("couldn't fetch a new quote: {err}"), error_style());
    }
    if app.is_fetching() {
        return Span::styled("fetching a new quote…", italic());
    }

    match app.session.as_ref().and_then(|s| s.running_time()) {
        Some(running) if !app.session.as_ref().is_some_and(|s| s.is_completed()) => {
            Span::styled(format!("{:.1}", running.as_secs_f64()), dim_bold())
        }
        Some(_) => Span::raw(""),
        None => Span::styled("start typing…", italic()),
    }
}

pub(crate) fn render_typing(app: &mut App, f: &mut Frame) {
    let chunks = page(
        f.area(),
        &[
            Constraint::Length(1), // title
            Constraint::Length(1), // padding
            Constraint::Min(1),    // quote
            Constraint::Length(1), // author
            Constraint::Length(1), // timer or fetch status
            Constraint::Length(1), // legend
        ],
    );

    render_title(f, chunks[0]);
    render_quote(app, f, chunks[2]);
    render_author(app, f, chunks[3]);
    f.render_widget(
        Paragraph::new(status_line(app)).alignment(Alignment::Center),
        chunks[4],
    );
    render_legend(f, chunks[5], "(ctrl+r) new quote / (ctrl+u) clear / (esc)ape");
}

fn results_lines(app: &App) -> Vec<Line<'static>> {
    let Some(session) = app.session.as_ref() else {
        return Vec::new();
    };
    let highlight = bold().fg(Color::Green);

    let time = match session.elapsed() {
        Some(elapsed) => format!("Time: {}\" - {}'", format_secs(elapsed), format_mins(elapsed)),
        None => "Time: -".to_string(),
    };
    let wpm = session.words_per_minute().unwrap_or(0.0);
    let wps = session.words_per_second().unwrap_or(0.0);

    vec![
        Line::from(format!("Words: {}", session.word_count())),
        Line::from(format!("Characters: {}", session.char_count())),
        Line::from(time),
        Line::from(Span::styled(format!("Words per minute: {wpm:.2}"), highlight))
            .alignment(Alignment::Center),
        Line::from(Span::styled(format!("Words per second: {wps:.3}"), highlight))
            .alignment(Alignment::Center),
    ]
}

pub(crate) fn render_results(app: &mut App, f: &mut Frame) {
    let chunks = page(
        f.area(),
        &[
            Constraint::Length(1), // title
            Constraint::Length(1), // padding
            Constraint::Min(1),    // quote
            Constraint::Length(1), // author
            Constraint::Length(1), // padding
            Constraint::Length(5), // results
            Constraint::Length(1), // fetch status
            Constraint::Length(1), // legend
        ],
    );

    render_title(f, chunks[0]);
    render_quote(app, f, chunks[2]);
    render_author(app, f, chunks[3]);
    f.render_widget(Paragraph::new(results_lines(app)), chunks[5]);
    f.render_widget(
        Paragraph::new(status_line(app)).alignment(Alignment::Center),
        chunks[6],
    );
    render_legend(f, chunks[7], "(r)etry / (esc)ape");
}

pub(crate) fn render_loading(_app: &mut App, f: &mut Frame) {
    let chunks = page(
        f.area(),
        &[Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)],
    );

    render_title(f, chunks[0]);
    let message = Paragraph::new(Span::styled("fetching a quote…", italic()))
        .alignment(Alignment::Center);
    f.render_widget(message, chunks[1]);
    render_legend(f, chunks[2], "(esc)ape");
}

pub(crate) fn render_failed(app: &mut App, f: &mut Frame) {
    let chunks = page(
        f.area(),
        &[Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)],
    );

    render_title(f, chunks[0]);
    let reason = app.last_error.as_deref().unwrap_or("unknown error");
    let message = Paragraph::new(Span::styled(
        format!("couldn't fetch a quote: {reason}"),
        error_style(),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(message, chunks[1]);
    render_legend(f, chunks[2], "(r)etry / (esc)ape");
}
