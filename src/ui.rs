pub mod analytics;
pub mod charting;
pub mod screen;

use std::time::SystemTime;

use keystride::{analytics::MistypeHistogram, comparator::Outcome};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, BarChart, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{ui::analytics::AnalyticsView, App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Most-mistyped characters shown on the results screen
const ERROR_BARS: usize = 10;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::Analytics => AnalyticsView::new(self).render(area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    // styles
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);

    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let typing = app.session.typing();
    let target: Vec<char> = typing.target().chars().collect();
    let comparison = typing.comparison();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = typing.target().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        (prompt_width as f64 / max_chars_per_line as f64).ceil() as u16 + 1
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 5) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // status
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(1),
            Constraint::Length(1), // progress
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let status = if typing.has_started() {
        format!(
            "passage {}/{}   {}   {} errors",
            app.session.current_index() + 1,
            app.session.passage_count(),
            app.session.current_passage().difficulty,
            typing.cursor_error_count()
        )
    } else {
        format!(
            "passage {}/{}   {}   start typing when ready",
            app.session.current_index() + 1,
            app.session.passage_count(),
            app.session.current_passage().difficulty
        )
    };
    Paragraph::new(Span::styled(status, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let mut spans = comparison
        .verdicts
        .iter()
        .map(|verdict| match (verdict.outcome, verdict.expected) {
            (Outcome::Correct, Some(expected)) => {
                Span::styled(expected.to_string(), green_bold_style)
            }
            _ => Span::styled(
                match verdict.typed {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
        })
        .collect::<Vec<Span>>();

    if let Some(cursor) = comparison.cursor {
        if let Some(next) = target.get(cursor) {
            spans.push(Span::styled(next.to_string(), underlined_dim_bold_style));
        }
        let rest: String = target.iter().skip(cursor + 1).collect();
        spans.push(Span::styled(rest, dim_bold_style));
    }

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let progress = comparison.progress.clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0))
        .render(chunks[5], buf);

    Paragraph::new(Span::styled("(ctrl+c) finish / (esc)ape", italic_style))
        .render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1),
            Constraint::Length(8), // error bars
            Constraint::Length(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let tuples: Vec<(f64, f64)> = app
        .session
        .speed_history()
        .samples()
        .iter()
        .map(|&s| s.into())
        .collect();
    let (overall_duration, highest_wpm) = charting::compute_chart_params(&tuples);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    let summary = app.session.summary(SystemTime::now());

    Paragraph::new(Span::styled(
        format!(
            "{:.0} wpm   {:.1}% acc   {:.2} sd",
            summary.wpm, summary.accuracy, summary.consistency
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "best {:.0} wpm   avg {:.0} wpm   {} words   {} errors   {} passages",
            summary.highest_speed,
            summary.average_speed,
            summary.total_words,
            summary.total_errors,
            app.session.aggregate().passages
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    render_error_bars(app.session.histogram(), chunks[4], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (a)nalytics / (esc)ape",
        italic_style,
    ))
    .render(chunks[6], buf);
}

fn render_error_bars(histogram: &MistypeHistogram, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("most mistyped");

    if histogram.is_empty() {
        Paragraph::new(Span::styled(
            "no mistakes recorded",
            Style::default().fg(Color::Green),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    let (labels, values) = histogram.bar_chart_data(ERROR_BARS);
    let data: Vec<(&str, u64)> = labels
        .iter()
        .map(String::as_str)
        .zip(values.iter().copied())
        .collect();

    BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
        .render(area, buf);
}

/// Flatten a rendered buffer into one string for assertions
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &Buffer) -> String {
    buffer
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect::<String>()
}
