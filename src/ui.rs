pub mod charting;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::snapshot::RenderState;
use crate::stats::TestResult;
use crate::theme::Theme;
use crate::time_series::TimeSeriesPoint;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn clamp_u16(n: usize) -> u16 {
    n.min(u16::MAX as usize) as u16
}

/// Render one line of text at an absolute position, clipped to the frame.
fn put(frame: &mut Frame, x: u16, y: u16, text: Line, style: Style) {
    let width = clamp_u16(text.width());
    let area = Rect::new(x, y, width, 1).intersection(frame.area());
    if !area.is_empty() {
        frame.render_widget(Paragraph::new(text).style(style), area);
    }
}

/// Draw a session frame: the text block centered, attribution below its right edge, the countdown
/// under its middle and live WPM above it.
pub fn draw_session(frame: &mut Frame, state: &RenderState, theme: &Theme) {
    let area = frame.area();
    let base = theme.base();
    frame.render_widget(Block::default().style(base), area);

    let columns = clamp_u16(state.columns);
    let rows = clamp_u16(state.rows());
    let x = area.width.saturating_sub(columns) / 2;
    let y = area.height.saturating_sub(rows) / 2;

    for (row, cells) in state.lines.iter().enumerate() {
        let spans = cells
            .iter()
            .map(|cell| Span::styled(cell.ch.to_string(), theme.style(cell.class)))
            .collect::<Vec<Span>>();
        put(frame, x, y.saturating_add(clamp_u16(row)), Line::from(spans), base);
    }

    if !state.attribution.is_empty() {
        let width = clamp_u16(state.attribution.width());
        put(
            frame,
            x.saturating_add(columns).saturating_sub(width),
            y.saturating_add(rows.saturating_add(1)),
            Line::from(state.attribution.as_str()),
            base.add_modifier(Modifier::ITALIC),
        );
    }

    if let Some(label) = state.remaining_label() {
        put(
            frame,
            x.saturating_add(columns / 2),
            y.saturating_add(rows.saturating_add(2)),
            Line::from(label),
            base,
        );
    }

    if let (Some(wpm), Some(above)) = (state.live_wpm, y.checked_sub(2)) {
        put(
            frame,
            x.saturating_add(columns / 2).saturating_sub(4),
            above,
            Line::from(format!("WPM: {wpm}")),
            base,
        );
    }

    let (col, row) = state.cursor;
    let cursor = (x.saturating_add(clamp_u16(col)), y.saturating_add(clamp_u16(row)));
    if area.contains(cursor.into()) {
        frame.set_cursor_position(cursor);
    }
}

/// The textual part of the report screen.
pub fn report_text(result: &TestResult, attribution: &str) -> String {
    let mut report = format!(
        "WPM:         {}\nCPM:         {}\nAccuracy:    {:.2}%",
        result.wpm, result.cpm, result.accuracy
    );
    if !result.mistakes.is_empty() {
        report.push_str("\nMistakes:    ");
        report.push_str(&result.mistakes.iter().map(|m| m.word.as_str()).join(", "));
    }
    if !attribution.is_empty() {
        report.push_str("\n\nAttribution: ");
        report.push_str(attribution);
    }
    report
}

/// Draw the results of a completed test, with a WPM chart when there are enough samples.
pub fn draw_report(
    frame: &mut Frame,
    result: &TestResult,
    samples: &[TimeSeriesPoint],
    attribution: &str,
    theme: &Theme,
) {
    let area = frame.area();
    let base = theme.base();
    frame.render_widget(Block::default().style(base), area);

    let mut text = report_text(result, attribution);
    let show_chart = samples.len() >= 2;
    if show_chart {
        text.push_str(&format!("\nConsistency: {:.2} sd", result.consistency));
    }
    let text_rows = clamp_u16(text.lines().count());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(if show_chart { 1 } else { 0 }),
            Constraint::Length(text_rows),
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    if show_chart {
        let bold_style = base.add_modifier(Modifier::BOLD);
        let (overall_duration, highest_wpm) = charting::compute_chart_params(samples);
        let points: Vec<(f64, f64)> = samples.iter().copied().map(Into::into).collect();
        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(base.fg(theme.correct))
            .graph_type(GraphType::Line)
            .data(&points)];

        let chart = Chart::new(datasets)
            .style(base)
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
            );
        frame.render_widget(chart, chunks[0]);
    }

    let report = Paragraph::new(text).style(base).alignment(if show_chart {
        Alignment::Center
    } else {
        Alignment::Left
    });
    let report_area = if show_chart {
        chunks[1]
    } else {
        centered(chunks[1], report_width(result, attribution))
    };
    frame.render_widget(report, report_area);

    let legend = Paragraph::new(Span::styled(
        "(esc) continue / (ctrl+c) quit",
        base.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(legend, chunks[3]);
}

fn report_width(result: &TestResult, attribution: &str) -> u16 {
    let text = report_text(result, attribution);
    clamp_u16(text.lines().map(|l| l.width()).max().unwrap_or(0))
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mistakes::Mistake;
    use crate::reflow::text_dimensions;
    use crate::snapshot::{Cell, CellClass};
    use chrono::Local;
    use ratatui::{backend::TestBackend, buffer::Buffer, layout::Position, Terminal};
    use std::time::Duration;

    fn rendered(buffer: &Buffer) -> String {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .join("\n")
    }

    fn state(text: &str) -> RenderState {
        let chars: Vec<char> = text.chars().collect();
        let typed = vec![None; chars.len()];
        let (lines, cursor) = RenderState::classify(&chars, &typed, 0);
        RenderState {
            columns: text_dimensions(text).0,
            lines,
            cursor,
            attribution: String::new(),
            remaining: None,
            live_wpm: None,
        }
    }

    fn result() -> TestResult {
        TestResult {
            wpm: 42,
            cpm: 210,
            accuracy: 95.0,
            consistency: 2.5,
            duration_secs: 10.0,
            timestamp: Local::now(),
            mistakes: vec![Mistake::new("cat", "cot"), Mistake::new("sat", "sit")],
            wpms: vec![20, 35, 42],
        }
    }

    #[test]
    fn test_cursor_lands_after_wide_chars() {
        let chars: Vec<char> = "日本".chars().collect();
        let typed = vec![Some('日'), None];
        let (lines, cursor) = RenderState::classify(&chars, &typed, 1);
        let state = RenderState {
            lines,
            cursor,
            ..state("日本")
        };
        assert_eq!(state.columns, 4);

        let mut terminal = Terminal::new(TestBackend::new(10, 3)).unwrap();
        terminal
            .draw(|f| draw_session(f, &state, &Theme::plain(false)))
            .unwrap();
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            Position::new(5, 1)
        );
    }

    #[test]
    fn test_session_text_is_centered() {
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let state = state("hello");

        terminal
            .draw(|f| draw_session(f, &state, &Theme::plain(false)))
            .unwrap();

        let out = rendered(terminal.backend().buffer());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "       hello        ");
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            Position::new(7, 2)
        );
    }

    #[test]
    fn test_session_shows_timer_wpm_and_attribution() {
        let backend = TestBackend::new(30, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = state("abcdefghij");
        state.attribution = "me".into();
        state.remaining = Some(Duration::from_millis(2500));
        state.live_wpm = Some(64);

        terminal
            .draw(|f| draw_session(f, &state, &Theme::plain(false)))
            .unwrap();
        let out = rendered(terminal.backend().buffer());
        let lines: Vec<&str> = out.lines().collect();

        // text at row 4, columns 10..20
        assert_eq!(&lines[4][10..20], "abcdefghij");
        assert_eq!(&lines[6][18..20], "me");
        assert_eq!(&lines[7][15..16], "3");
        assert!(lines[2].contains("WPM: 64"));
    }

    #[test]
    fn test_session_in_tiny_terminal_does_not_panic() {
        let backend = TestBackend::new(4, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = state("a much longer line \nthan fits");
        state.attribution = "somebody".into();
        state.remaining = Some(Duration::from_secs(3));
        state.live_wpm = Some(10);
        terminal
            .draw(|f| draw_session(f, &state, &Theme::plain(true)))
            .unwrap();
    }

    #[test]
    fn test_report_text() {
        assert_eq!(
            report_text(&result(), "Seneca"),
            "WPM:         42\nCPM:         210\nAccuracy:    95.00%\nMistakes:    cat, sat\n\nAttribution: Seneca"
        );

        let mut clean = result();
        clean.mistakes.clear();
        assert_eq!(
            report_text(&clean, ""),
            "WPM:         42\nCPM:         210\nAccuracy:    95.00%"
        );
    }

    #[test]
    fn test_report_screen_renders() {
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let samples = [
            TimeSeriesPoint::new(0.5, 20.0),
            TimeSeriesPoint::new(1.0, 35.0),
            TimeSeriesPoint::new(1.5, 42.0),
        ];

        terminal
            .draw(|f| draw_report(f, &result(), &samples, "", &Theme::plain(false)))
            .unwrap();
        let out = rendered(terminal.backend().buffer());
        assert!(out.contains("WPM:         42"));
        assert!(out.contains("Consistency: 2.50 sd"));
        assert!(out.contains("(esc) continue"));
    }

    #[test]
    fn test_report_without_samples_has_no_chart() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| draw_report(f, &result(), &[], "Seneca", &Theme::plain(false)))
            .unwrap();
        let out = rendered(terminal.backend().buffer());
        assert!(out.contains("Attribution: Seneca"));
        assert!(!out.contains("Consistency"));
        assert!(!out.contains("seconds"));
    }

    #[test]
    fn test_incorrect_space_uses_error_background() {
        let theme = Theme::plain(false);
        let state = RenderState {
            lines: vec![vec![
                Cell { ch: 'a', class: CellClass::Correct },
                Cell { ch: ' ', class: CellClass::IncorrectSpace },
            ]],
            cursor: (2, 0),
            columns: 2,
            attribution: String::new(),
            remaining: None,
            live_wpm: None,
        };
        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_session(f, &state, &theme)).unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(5, 1)].bg, theme.error);
        assert_eq!(buffer[(4, 1)].fg, theme.correct);
    }
}
