//! Top-level layout: view tabs, active view, status line.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, View};
use crate::panels::{GrowthChart, GrowthLine, PriceChart, SummaryTable};

pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], app);
    match app.view {
        View::PriceGrid => draw_price_grid(f, chunks[1], app),
        View::Growth => draw_growth(f, chunks[1], app),
        View::Summary => f.render_widget(SummaryTable::new(&app.report, &app.theme), chunks[1]),
    }
    draw_status(f, chunks[2], app);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = Vec::new();
    for view in View::ALL {
        let label = format!(" {}:{} ", view.index() + 1, view.label());
        let style = if view == app.view {
            Style::default()
                .fg(app.theme.background)
                .bg(app.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted)
        };
        spans.push(Span::styled(label, style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// 2x2 grid of price histories.
fn draw_price_grid(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (symbol, cell) in app.grid_symbols.iter().zip(cells) {
        f.render_widget(
            PriceChart::new(symbol, app.series.get(symbol), &app.theme),
            cell,
        );
    }
}

/// Growth lines for the current group, benchmark first.
fn draw_growth(f: &mut Frame, area: Rect, app: &AppState) {
    let group = app.current_group().unwrap_or_default();
    let lines: Vec<GrowthLine> = app
        .report
        .group_rows_with_benchmark(group)
        .into_iter()
        .filter_map(|row| {
            row.analysis.map(|a| GrowthLine {
                symbol: row.symbol,
                growth: &a.growth,
            })
        })
        .collect();

    let title = match app.report.benchmark() {
        Some(bench) if group != equitylab_core::data::universe::BENCHMARK_GROUP => {
            format!("{group} Cumulative Returns vs {bench}")
        }
        _ => format!("{group} Cumulative Returns"),
    };
    f.render_widget(GrowthChart::new(title, lines, &app.theme), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(
        " 1-3/Tab: view  [ ]: group  q: quit ",
        Style::default().fg(app.theme.muted),
    )];
    if !app.report.failures.is_empty() {
        spans.push(Span::styled(
            format!("| {} symbol(s) failed ", app.report.failures.len()),
            Style::default().fg(app.theme.warning),
        ));
    }
    if app.report.has_synthetic {
        spans.push(Span::styled(
            "| SYNTHETIC DATA ",
            Style::default().fg(app.theme.warning),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
