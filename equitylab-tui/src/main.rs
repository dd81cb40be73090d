//! EquityLab TUI — price history and cumulative growth comparisons.
//!
//! Usage: `equitylab-tui [STUDY.toml]`
//!
//! Reads the Parquet cache only (set `EQUITYLAB_CACHE`, default `data`).
//! Populate it first with `equitylab download`.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use equitylab_core::data::cache::ParquetCache;
use equitylab_runner::{run_study, LoadOptions, StudyConfig};
use equitylab_tui::{input, ui, AppState};

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => StudyConfig::from_file(&PathBuf::from(&path))
            .with_context(|| format!("failed to load study config {path}"))?,
        None => StudyConfig::default_study(),
    };
    let cache_dir =
        PathBuf::from(std::env::var("EQUITYLAB_CACHE").unwrap_or_else(|_| "data".into()));
    let cache = ParquetCache::new(&cache_dir);

    // Offline: the UI never blocks on the network.
    let mut load = LoadOptions::from_config(&config);
    load.offline = true;
    let (report, loaded) = run_study(&config, &cache, None, None, &load).with_context(|| {
        format!(
            "failed to load study data from {} (run `equitylab download` first)",
            cache_dir.display()
        )
    })?;

    let mut app = AppState::new(report, loaded.series);

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }
    }
    Ok(())
}
