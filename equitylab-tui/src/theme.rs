//! Parrot/neon theme tokens for the EquityLab TUI
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (primary highlights, focus)
//! - **Positive**: Neon green (gains)
//! - **Negative**: Hot pink (losses, drawdowns)
//! - **Warning**: Neon orange (alerts, synthetic data)
//! - **Neutral**: Cool purple (secondary info)
//! - **Muted**: Steel blue (axes, disabled text)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Green for gains (including flat), pink for losses.
    pub fn return_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Drawdown severity: shallow drops stay neutral, deep ones turn pink.
    pub fn drawdown_color(&self, fraction: f64) -> Color {
        match fraction {
            f if f >= 0.30 => self.negative,
            f if f >= 0.15 => self.warning,
            f if f > 0.0 => self.neutral,
            _ => self.muted,
        }
    }

    /// Line color for the `index`-th series on a shared chart.
    ///
    /// Index 0 is reserved for the benchmark.
    pub fn series_color(&self, index: usize) -> Color {
        const PALETTE: [Color; 6] = [
            Color::White,
            Color::Rgb(0, 255, 255),
            Color::Rgb(0, 255, 128),
            Color::Rgb(255, 140, 0),
            Color::Rgb(147, 112, 219),
            Color::Rgb(255, 20, 147),
        ];
        PALETTE[index % PALETTE.len()]
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
