//! Summary table: analysis-year return and max drop per symbol, by group.

use equitylab_runner::{format_percent, StudyReport};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use crate::theme::Theme;

pub struct SummaryTable<'a> {
    report: &'a StudyReport,
    theme: &'a Theme,
}

impl<'a> SummaryTable<'a> {
    pub fn new(report: &'a StudyReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }

    fn rows(&self) -> Vec<Row<'a>> {
        let theme = self.theme;
        let mut rows = Vec::new();
        for group in self.report.group_names() {
            for row in self.report.group_rows(group) {
                let cells = match (row.analysis, row.failure) {
                    (Some(a), _) => {
                        let w = &a.window;
                        vec![
                            Cell::from(group.to_string()),
                            Cell::from(row.symbol.to_string()),
                            Cell::from(format_percent(w.annual_return))
                                .style(Style::default().fg(theme.return_color(w.annual_return))),
                            Cell::from(format!("${:.2}", w.drawdown.max_drop_absolute)),
                            Cell::from(format_percent(w.drawdown.max_drop_percent)).style(
                                Style::default()
                                    .fg(theme.drawdown_color(w.drawdown.max_drop_percent)),
                            ),
                            Cell::from(format_percent(a.total_return))
                                .style(Style::default().fg(theme.return_color(a.total_return))),
                        ]
                    }
                    (None, failure) => vec![
                        Cell::from(group.to_string()),
                        Cell::from(row.symbol.to_string()),
                        Cell::from(failure.unwrap_or("no data").to_string())
                            .style(Style::default().fg(theme.warning)),
                        Cell::from(""),
                        Cell::from(""),
                        Cell::from(""),
                    ],
                };
                rows.push(Row::new(cells));
            }
        }
        rows
    }
}

impl Widget for SummaryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let year = self.report.analysis_year;
        let header = Row::new(vec![
            "Group".to_string(),
            "Symbol".to_string(),
            format!("{year} Return"),
            format!("{year} Max Drop"),
            "Drop %".to_string(),
            "Total".to_string(),
        ])
        .style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );

        let mut title = format!(" {} ", self.report.name);
        if self.report.has_synthetic {
            title.push_str("[SYNTHETIC] ");
        }

        let widths = [
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Min(10),
        ];
        Table::new(self.rows(), widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border(true))
                    .title(Span::styled(title, self.theme.title()))
                    .style(Style::default().bg(self.theme.background)),
            )
            .render(area, buf);
    }
}
