//! Palettes selected by the root `light-theme` flag
//!
//! Provides:
//! - Theme struct with all UI colors
//! - Dark (default) and light palettes
//! - Hex color parsing for overrides

use ratatui::style::Color;
use thiserror::Error;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Page background
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Card background
    pub card_bg: Color,
    /// Background of the focused card or link
    pub selection_bg: Color,
    /// Accent color (borders, current page, headings)
    pub accent: Color,
    /// Secondary text (ids, dates)
    pub dimmed: Color,
    /// Tertiary text (avatar paths, placeholders)
    pub dimmed_alt: Color,
    /// Background behind an open overlay
    pub scrim: Color,
    /// Link text
    pub link: Color,
    /// Theme switcher glyph
    pub icon: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark palette, the system default
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),      // #0d1116
            foreground: Color::Rgb(229, 234, 241),   // #e5eaf1
            card_bg: Color::Rgb(20, 28, 42),         // #141c2a
            selection_bg: Color::Rgb(38, 50, 72),    // #263248
            accent: Color::Rgb(0, 255, 170),         // #00ffaa
            dimmed: Color::Rgb(156, 163, 175),       // #9ca3af
            dimmed_alt: Color::Rgb(107, 114, 128),   // #6b7280
            scrim: Color::Rgb(5, 7, 10),             // #05070a
            link: Color::Rgb(96, 165, 250),          // #60a5fa
            icon: Color::Rgb(250, 204, 21),          // #facc15 (sun)
        }
    }

    /// Light palette
    pub fn light() -> Self {
        Self {
            background: Color::Rgb(239, 241, 245),   // #eff1f5
            foreground: Color::Rgb(76, 79, 105),     // #4c4f69
            card_bg: Color::Rgb(230, 233, 239),      // #e6e9ef
            selection_bg: Color::Rgb(204, 208, 218), // #ccd0da
            accent: Color::Rgb(30, 102, 245),        // #1e66f5
            dimmed: Color::Rgb(108, 111, 133),       // #6c6f85
            dimmed_alt: Color::Rgb(140, 143, 161),   // #8c8fa1
            scrim: Color::Rgb(156, 160, 176),        // #9ca0b0
            link: Color::Rgb(32, 159, 181),          // #209fb5
            icon: Color::Rgb(76, 79, 105),           // #4c4f69 (moon)
        }
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid color length (expected 3, 6, or 8 hex chars)")]
    InvalidLength,
    #[error("invalid hex character")]
    InvalidHex,
}

/// Parse hex color string to Color
/// Supports: #rrggbb, #rgb, #rrggbbaa (alpha ignored), with or without '#'
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or(ColorError::InvalidHex)
    };

    match s.len() {
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        6 | 8 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => Err(ColorError::InvalidLength),
    }
}

/// RGB channels of a palette color, for tinting rasterized glyphs
pub fn rgb(color: Color) -> [u8; 3] {
    match color {
        Color::Rgb(r, g, b) => [r, g, b],
        Color::Black => [0, 0, 0],
        _ => [255, 255, 255],
    }
}
