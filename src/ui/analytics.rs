use keystride::analytics::{keyboard::key_at, Heatmap, TOP_WORDS};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::{ui::charting::heat_level, App};

const KEY_CELL_WIDTH: u16 = 5;

/// Keyboard heatmap of mistyped characters next to the passage word counts
pub struct AnalyticsView<'a> {
    app: &'a App,
}

impl<'a> AnalyticsView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

fn heat_style(count: u64, max: u64) -> Style {
    match heat_level(count, max) {
        0 => Style::default().fg(Color::DarkGray),
        1 => Style::default().fg(Color::Yellow),
        2 => Style::default().fg(Color::LightRed),
        _ => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn heatmap_table(heatmap: &Heatmap) -> Table<'static> {
    let max = heatmap.max();

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(heatmap.col_labels.iter().map(|l| Cell::from(l.clone()))),
    )
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = heatmap.row_labels.iter().enumerate().map(|(row, label)| {
        let cells = heatmap.matrix[row].iter().enumerate().map(|(col, &count)| {
            let text = match (key_at(row, col), count) {
                (None, _) => String::new(),
                (Some(key), 0) => key.to_string(),
                (Some(key), n) => format!("{key} {n}"),
            };
            Cell::from(text).style(heat_style(count, max))
        });
        Row::new(std::iter::once(Cell::from(label.clone())).chain(cells))
    });

    let widths = std::iter::once(Constraint::Length(7)).chain(
        heatmap
            .col_labels
            .iter()
            .map(|_| Constraint::Length(KEY_CELL_WIDTH)),
    );

    Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Mistype heatmap ({} off-grid)", heatmap.unplaced)),
    )
}

impl Widget for AnalyticsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.app.session;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(3), // title
                Constraint::Min(0),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(format!(
            "Error analytics   {} mistakes over {} passages",
            session.histogram().total(),
            session.aggregate().passages
        ))
        .block(Block::default().borders(Borders::ALL).title("Analytics"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);

        heatmap_table(&session.heatmap()).render(body[0], buf);

        let words = session.word_frequency().top(TOP_WORDS);
        let word_rows = words
            .into_iter()
            .map(|(word, count)| Row::new(vec![Cell::from(word), Cell::from(count.to_string())]));
        Table::new(word_rows, [Constraint::Min(8), Constraint::Length(6)])
            .header(
                Row::new(vec!["word", "count"]).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Most common words"),
            )
            .render(body[1], buf);

        Paragraph::new("(a) back / (r)etry / (n)ew / (esc)ape")
            .style(
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
            )
            .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ui::buffer_text, AppState};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use keystride::{
        config::Config,
        passage::{PassagePool, QuoteSelector},
    };
    use std::time::{Duration, SystemTime};
    use tempfile::{tempdir, TempDir};

    fn finished_app(prompt: &str, typed: &str) -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            report_path: Some(dir.path().join("report.json")),
            ..Config::default()
        };
        let mut app = App::with_pool(
            config,
            PassagePool::new(),
            QuoteSelector::seeded(0),
            Some(prompt.to_string()),
        );
        for (i, c) in typed.chars().enumerate() {
            let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 + i as u64);
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), now);
        }
        app.toggle_analytics();
        (app, dir)
    }

    #[test]
    fn test_heat_style_escalates() {
        assert_eq!(heat_style(0, 4), Style::default().fg(Color::DarkGray));
        assert_eq!(heat_style(4, 4).fg, Some(Color::Red));
    }

    #[test]
    fn test_analytics_screen_shows_heatmap_and_words() {
        let (app, _dir) = finished_app("the cat the end", "thx cat the enx");
        assert_eq!(app.state, AppState::Analytics);

        let area = Rect::new(0, 0, 160, 30);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        let rendered = buffer_text(&buffer);

        assert!(rendered.contains("Mistype heatmap (0 off-grid)"));
        assert!(rendered.contains("e 1"));
        assert!(rendered.contains("d 1"));
        assert!(rendered.contains("home"));
        assert!(rendered.contains("Most common words"));
        assert!(rendered.contains("the"));
        assert!(rendered.contains("(a) back"));
    }

    #[test]
    fn test_off_grid_mistakes_are_counted() {
        let (app, _dir) = finished_app("a b", "axb");
        let area = Rect::new(0, 0, 160, 30);
        let mut buffer = Buffer::empty(area);
        AnalyticsView::new(&app).render(area, &mut buffer);

        assert!(buffer_text(&buffer).contains("(1 off-grid)"));
    }

    #[test]
    fn test_analytics_survives_small_area() {
        let (app, _dir) = finished_app("hi", "hx");
        let area = Rect::new(0, 0, 12, 6);
        let mut buffer = Buffer::empty(area);
        AnalyticsView::new(&app).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }
}
