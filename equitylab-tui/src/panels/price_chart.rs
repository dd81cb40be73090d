//! Price history chart for one symbol.

use equitylab_core::domain::PriceSeries;
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

pub struct PriceChart<'a> {
    symbol: &'a str,
    series: Option<&'a PriceSeries>,
    theme: &'a Theme,
}

impl<'a> PriceChart<'a> {
    pub fn new(symbol: &'a str, series: Option<&'a PriceSeries>, theme: &'a Theme) -> Self {
        Self {
            symbol,
            series,
            theme,
        }
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(false))
            .title(Span::styled(
                format!(" {} Price History ", self.symbol),
                self.theme.title(),
            ))
            .style(Style::default().bg(self.theme.background));

        let bars = self.series.map(|s| s.bars()).unwrap_or_default();
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            Paragraph::new(format!("no data for {}", self.symbol))
                .alignment(Alignment::Center)
                .style(Style::default().fg(self.theme.text_secondary))
                .block(block)
                .render(area, buf);
            return;
        };

        let data: Vec<(f64, f64)> = bars
            .iter()
            .map(|b| (day_offset(first.date, b.date), b.close))
            .collect();
        let x_max = day_offset(first.date, last.date).max(1.0);
        let [y_lo, y_hi] = padded_bounds(bars.iter().map(|b| b.close));

        let dataset = Dataset::default()
            .name(self.symbol)
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.theme.accent))
            .data(&data);

        let axis_style = Style::default().fg(self.theme.muted);
        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(axis_style)
                    .bounds([0.0, x_max])
                    .labels(vec![
                        Span::raw(first.date.format("%Y-%m").to_string()),
                        Span::raw(last.date.format("%Y-%m").to_string()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(
                        "Close ($)",
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(axis_style)
                    .bounds([y_lo, y_hi])
                    .labels(vec![
                        Span::raw(format!("{y_lo:.0}")),
                        Span::raw(format!("{:.0}", (y_lo + y_hi) / 2.0)),
                        Span::raw(format!("{y_hi:.0}")),
                    ]),
            )
            .render(area, buf);
    }
}
