//! Segment styling configuration.
//!
//! Maps decoration classes to terminal styles: level badges, per-source
//! background hues, and muted line numbers.

use crate::model::{LevelClass, SegmentClass};
use ratatui::style::{Color, Modifier, Style};

/// Saturation of source badges, as in the `hsl(H, 60%, 35%)` markup.
const SOURCE_SATURATION: f32 = 0.60;

/// Lightness of source badges.
const SOURCE_LIGHTNESS: f32 = 0.35;

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Explicit setting, ignoring the environment.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

/// Convert an HSL color (hue in degrees, saturation and lightness in `0..=1`)
/// to RGB.
pub fn hsl_to_rgb(hue: u16, saturation: f32, lightness: f32) -> (u8, u8, u8) {
    let h = f32::from(hue % 360) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}

// ===== SegmentStyles =====

/// Styles for each segment class.
#[derive(Debug, Clone, Copy)]
pub struct SegmentStyles {
    colors: ColorConfig,
}

impl SegmentStyles {
    /// Styles honoring `colors`.
    pub fn with_color_config(colors: ColorConfig) -> Self {
        Self { colors }
    }

    /// Style for one segment.
    ///
    /// With colors disabled, levels stay bold so badges remain visible.
    pub fn style_for(&self, class: SegmentClass) -> Style {
        if !self.colors.colors_enabled() {
            return match class {
                SegmentClass::Level(_) => Style::default().add_modifier(Modifier::BOLD),
                _ => Style::default(),
            };
        }

        match class {
            SegmentClass::Plain => Style::default(),
            SegmentClass::Level(level) => level_style(level),
            SegmentClass::Source { hue } => {
                let (r, g, b) = hsl_to_rgb(hue, SOURCE_SATURATION, SOURCE_LIGHTNESS);
                Style::default().fg(Color::White).bg(Color::Rgb(r, g, b))
            }
            SegmentClass::LineNumber => Style::default().fg(Color::DarkGray),
            SegmentClass::Number => Style::default().fg(Color::LightMagenta),
        }
    }
}

impl Default for SegmentStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}

fn level_style(level: LevelClass) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match level {
        LevelClass::Debug => bold.fg(Color::Gray),
        LevelClass::Info => bold.fg(Color::Cyan),
        LevelClass::Warning => bold.fg(Color::Yellow),
        LevelClass::Error => bold.fg(Color::Red),
        LevelClass::Critical => bold.fg(Color::White).bg(Color::Red),
        LevelClass::Success => bold.fg(Color::Green),
    }
}

// ===== Tests =====
