//! Live monitor rendering: readouts, chart and history scroll bar.

use super::formatters::{format_axis_label, format_field, format_number, format_whole};
use super::ThemeColors;
use crate::app::App;
use crate::config::ChartConfig;
use crate::session::{ChartWindow, RunState};
use crate::telemetry::ScrollControl;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState,
    },
    Frame,
};

/// Draw the monitor into `area`.
pub(super) fn draw_monitor(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Readouts
            Constraint::Min(5),    // Chart
            Constraint::Length(1), // History scroll bar
        ])
        .split(area);

    draw_readouts(f, app, chunks[0], colors);
    draw_chart(f, app, chunks[1], colors);
    draw_history_bar(f, app.session.scroll_control(), chunks[2], colors);
}

fn draw_readouts(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let readouts = app.session.readouts();
    let label = Style::default().fg(colors.readout_label);
    let value = Style::default()
        .fg(colors.readout_value)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled("Field ", label),
        Span::styled(format_field(readouts.magnetic_field), value),
        Span::raw("   "),
        Span::styled("RPM ", label),
        Span::styled(format_whole(readouts.rpm), value),
        Span::raw("   "),
        Span::styled("Peak ", label),
        Span::styled(format_whole(readouts.peak_rpm), value),
    ];

    if readouts.kv.is_some() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("kV ", label));
        spans.push(Span::styled(format_whole(readouts.kv), value));
    }

    let connection = app.session.connection();
    let run_label = match app.session.run_state() {
        RunState::Idle => "IDLE",
        RunState::Running => "LIVE",
        RunState::Paused => "PAUSED",
        RunState::Stopped => "STOPPED",
    };

    let block = Block::default()
        .title(Line::from(vec![
            Span::styled(" fluxview ", Style::default().fg(colors.title)),
            Span::styled(
                format!("[{}] ", connection.label()),
                Style::default().fg(colors.link(connection)),
            ),
            Span::styled(
                format!("{} ", run_label),
                Style::default().fg(colors.title).add_modifier(Modifier::BOLD),
            ),
        ]))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.frame))
        .style(Style::default().bg(colors.panel_bg));

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

/// Y bounds: fixed from config, or fitted around the visible values.
pub(super) fn y_bounds(window: &ChartWindow, chart: &ChartConfig) -> [f64; 2] {
    if !chart.autoscale {
        return [chart.y_min, chart.y_max];
    }

    let (min_val, max_val) = window
        .values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });

    if !min_val.is_finite() {
        return [chart.y_min, chart.y_max];
    }

    let span = max_val - min_val;
    // A flat trace still needs some height.
    let padding = if span > 0.0 {
        span * chart.y_padding_factor
    } else {
        min_val.abs().max(1.0) * chart.y_padding_factor
    };
    [min_val - padding, max_val + padding]
}

/// X bounds span a full window so the trace width is stable.
pub(super) fn x_bounds(window: &ChartWindow, window_size: usize) -> [f64; 2] {
    let first = window.labels.first().copied().unwrap_or(0) as f64;
    let last = first + window_size.saturating_sub(1).max(1) as f64;
    [first, last]
}

fn draw_chart(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let window = app.session.chart_window();
    let (start, end) = app.session.visible_range();

    let title = if window.is_empty() {
        " Magnetic Field vs. Sample ".to_string()
    } else {
        format!(
            " Magnetic Field vs. Sample  [{}-{} of {}] ",
            start,
            end.saturating_sub(1),
            format_number(app.session.store().len())
        )
    };

    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(colors.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.frame))
        .style(Style::default().bg(colors.panel_bg));

    if window.is_empty() {
        let para = Paragraph::new("Waiting for data")
            .style(Style::default().fg(colors.placeholder))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let points = window.points();
    let [x_min, x_max] = x_bounds(&window, app.session.viewport().window());
    let [y_min, y_max] = y_bounds(&window, &app.config.chart);

    let datasets = vec![Dataset::default()
        .name("Magnetic Field (mT)")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(colors.trace))
        .data(&points)];

    let x_axis = Axis::default()
        .title("Sample")
        .style(Style::default().fg(colors.axis))
        .bounds([x_min, x_max])
        .labels(vec![
            format_axis_label(x_min),
            format_axis_label((x_min + x_max) / 2.0),
            format_axis_label(x_max),
        ]);

    let y_axis = Axis::default()
        .title("mT")
        .style(Style::default().fg(colors.axis))
        .bounds([y_min, y_max])
        .labels(vec![
            format_axis_label(y_min),
            format_axis_label((y_min + y_max) / 2.0),
            format_axis_label(y_max),
        ]);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    f.render_widget(chart, area);
}

fn draw_history_bar(f: &mut Frame<'_>, control: ScrollControl, area: Rect, colors: &ThemeColors) {
    if !control.enabled {
        let para = Paragraph::new("no history to scroll")
            .style(Style::default().fg(colors.placeholder).bg(colors.panel_bg))
            .alignment(Alignment::Center);
        f.render_widget(para, area);
        return;
    }

    let mut state = ScrollbarState::new(control.max + 1).position(control.value);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::HorizontalBottom)
        .begin_symbol(Some("◀"))
        .end_symbol(Some("▶"))
        .track_style(Style::default().fg(colors.frame))
        .thumb_style(Style::default().fg(colors.trace));
    f.render_stateful_widget(scrollbar, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: &[f64]) -> ChartWindow {
        ChartWindow {
            labels: (0..values.len() as u64).collect(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn fixed_bounds_by_default() {
        let chart = ChartConfig::default();
        assert_eq!(y_bounds(&window(&[500.0]), &chart), [-50.0, 100.0]);
    }

    #[test]
    fn autoscale_pads_visible_range() {
        let chart = ChartConfig {
            autoscale: true,
            y_padding_factor: 0.1,
            ..ChartConfig::default()
        };
        let [lo, hi] = y_bounds(&window(&[0.0, 10.0, f64::NAN]), &chart);
        assert!((lo + 1.0).abs() < 1e-9);
        assert!((hi - 11.0).abs() < 1e-9);

        let [lo, hi] = y_bounds(&window(&[5.0, 5.0]), &chart);
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn x_bounds_cover_whole_window() {
        let w = ChartWindow {
            labels: vec![70, 71, 72],
            values: vec![0.0; 3],
        };
        assert_eq!(x_bounds(&w, 50), [70.0, 119.0]);
        assert_eq!(x_bounds(&w, 1), [70.0, 71.0]);
    }
}
