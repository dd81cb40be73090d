//! End-to-end: cache on disk → study → rendered views.

use chrono::{Duration, NaiveDate};
use equitylab_core::data::{cache::ParquetCache, provider::DataSource, provider::RawBar};
use equitylab_runner::{run_study, LoadOptions, StudyConfig};
use equitylab_tui::{input, ui, AppState, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn bars(start: f64, step: f64) -> Vec<RawBar> {
    let origin = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    (0..200)
        .map(|i| {
            let close = start + step * i as f64;
            RawBar {
                date: origin + Duration::days(i),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1,
                adj_close: close,
            }
        })
        .collect()
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            if let Some(cell) = buf.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}

#[test]
fn views_render_from_cached_study() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ParquetCache::new(dir.path());
    for (i, symbol) in ["SPY", "GOOG", "AAPL", "AMZN", "XLP", "XLU", "XLV"].iter().enumerate() {
        cache
            .write(symbol, &bars(50.0 + 10.0 * i as f64, 0.1), DataSource::YahooFinance)
            .unwrap();
    }

    let mut config = StudyConfig::default_study();
    config.study.start_date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    config.study.end_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut load = LoadOptions::from_config(&config);
    load.offline = true;

    let (report, loaded) = run_study(&config, &cache, None, None, &load).unwrap();
    assert!(report.failures.is_empty());

    let mut app = AppState::new(report, loaded.series);
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

    terminal.draw(|f| ui::draw(f, &app)).unwrap();
    assert!(screen(&terminal).contains("AMZN Price History"));

    input::handle_key(&mut app, KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE));
    assert_eq!(app.view, View::Growth);
    terminal.draw(|f| ui::draw(f, &app)).unwrap();
    assert!(screen(&terminal).contains("Big Tech Cumulative Returns vs SPY"));

    input::handle_key(&mut app, KeyEvent::new(KeyCode::Char('3'), KeyModifiers::NONE));
    terminal.draw(|f| ui::draw(f, &app)).unwrap();
    let text = screen(&terminal);
    assert!(text.contains("XLV"));
    assert!(!text.contains("no data"));
}
