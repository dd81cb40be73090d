//! Cumulative growth comparison: one line per symbol on a shared date axis.

use chrono::NaiveDate;
use equitylab_core::domain::CumulativeGrowthSeries;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use super::{day_offset, padded_bounds};
use crate::theme::Theme;

pub struct GrowthLine<'a> {
    pub symbol: &'a str,
    pub growth: &'a CumulativeGrowthSeries,
}

pub struct GrowthChart<'a> {
    title: String,
    lines: Vec<GrowthLine<'a>>,
    theme: &'a Theme,
}

impl<'a> GrowthChart<'a> {
    /// The first line is drawn in the benchmark color.
    pub fn new(title: impl Into<String>, lines: Vec<GrowthLine<'a>>, theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            lines,
            theme,
        }
    }

    fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let firsts = self.lines.iter().filter_map(|l| l.growth.points().first());
        let lasts = self.lines.iter().filter_map(|l| l.growth.points().last());
        Some((
            firsts.map(|p| p.date).min()?,
            lasts.map(|p| p.date).max()?,
        ))
    }
}

impl Widget for GrowthChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(true))
            .title(Span::styled(format!(" {} ", self.title), self.theme.title()))
            .style(Style::default().bg(self.theme.background));

        let Some((origin, end)) = self.date_span() else {
            Paragraph::new("no growth series to compare")
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.text_secondary))
                .block(block)
                .render(area, buf);
            return;
        };

        let data: Vec<Vec<(f64, f64)>> = self
            .lines
            .iter()
            .map(|l| {
                l.growth
                    .iter()
                    .map(|p| (day_offset(origin, p.date), p.growth))
                    .collect()
            })
            .collect();

        let [y_lo, y_hi] =
            padded_bounds(data.iter().flat_map(|d| d.iter().map(|&(_, y)| y)));
        let x_max = day_offset(origin, end).max(1.0);

        let datasets: Vec<Dataset> = self
            .lines
            .iter()
            .zip(&data)
            .enumerate()
            .map(|(i, (line, points))| {
                Dataset::default()
                    .name(line.symbol)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(points)
            })
            .collect();

        let axis_style = Style::default().fg(self.theme.muted);
        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(axis_style)
                    .bounds([0.0, x_max])
                    .labels(vec![
                        Span::raw(origin.format("%Y-%m").to_string()),
                        Span::raw(end.format("%Y-%m").to_string()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(
                        "Growth of $1",
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(axis_style)
                    .bounds([y_lo, y_hi])
                    .labels(vec![
                        Span::raw(format!("{y_lo:.2}")),
                        Span::raw(format!("{:.2}", (y_lo + y_hi) / 2.0)),
                        Span::raw(format!("{y_hi:.2}")),
                    ]),
            )
            .render(area, buf);
    }
}
