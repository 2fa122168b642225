//! Line decoration (pure).
//!
//! Turns raw log text into markup with three passes applied in a fixed order:
//!
//! 1. source tagging: `name.ext` tokens become colored bubbles whose hue is
//!    derived from the token itself
//! 2. level tagging: severity words become level badges
//! 3. numeric highlighting: a leading digit run becomes a line number, other
//!    standalone numbers are highlighted
//!
//! Every pass rewrites only text outside existing spans, so attribute values
//! and already-wrapped tokens are never touched and re-decorating decorated
//! markup changes nothing.

pub mod markup;

use crate::model::{DecorateError, DecoratedLine, LevelClass, LogLine};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Extensions recognized as source files.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "sh", "rs", "json", "txt", "log", "conf", "cfg", "ini", "html", "css", "csv",
    "db", "yaml", "yml", "toml",
];

/// Severity words, matched case-insensitively as whole words.
pub const LEVEL_WORDS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "SUCCESS"];

/// Informal severity phrases emitted by the orchestrator. Rendered with the
/// `info` badge.
pub const LEVEL_PHRASES: &[&str] = &["Execution interrupted", "Orchestrator exit signal received"];

static SOURCE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"\b[A-Za-z0-9_-]+\.(?:{})\b", SOURCE_EXTENSIONS.join("|"));
    Regex::new(&pattern).expect("valid source token regex")
});

static LEVEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = LEVEL_WORDS
        .iter()
        .chain(LEVEL_PHRASES)
        .map(|w| regex::escape(w))
        .collect();
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&pattern).expect("valid level regex")
});

static LEADING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\b").expect("valid leading digits regex"));

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number regex"));

/// Deterministic hue (0–359) for a source token.
///
/// A shift-and-subtract string hash over the token's characters. Identical
/// names always get the same hue; collisions between different names are
/// possible and harmless.
pub fn source_hue(name: &str) -> u16 {
    let hash = name.chars().fold(0i32, |hash, c| {
        (c as i32).wrapping_add((hash << 5).wrapping_sub(hash))
    });
    (hash.unsigned_abs() % 360) as u16
}

/// Turns a raw line into its presentation.
///
/// [`LineDecorator`] is the implementation used by the console; the renderer
/// accepts any other.
pub trait Decorate: std::fmt::Debug {
    /// Decorate one line.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` when no presentation can be produced; the
    /// caller renders the raw text instead.
    fn decorate(&self, line: &LogLine) -> Result<DecoratedLine, DecorateError>;
}

/// Stateless line decorator.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDecorator;

impl Decorate for LineDecorator {
    fn decorate(&self, line: &LogLine) -> Result<DecoratedLine, DecorateError> {
        LineDecorator::decorate(self, line)
    }
}

impl LineDecorator {
    /// Create a decorator.
    pub fn new() -> Self {
        Self
    }

    /// Decorate a raw line.
    ///
    /// Escapes the raw text, runs the three passes, and parses the result into
    /// segments.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` if the produced markup cannot be parsed. Callers
    /// render [`DecoratedLine::plain`] instead.
    pub fn decorate(&self, line: &LogLine) -> Result<DecoratedLine, DecorateError> {
        let markup = self.decorate_markup(&markup::escape(line.text()))?;
        let segments = markup::parse(&markup)?;
        Ok(DecoratedLine::new(line.clone(), markup, segments))
    }

    /// Run all three passes over existing markup.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` if `input` is not well-formed markup.
    pub fn decorate_markup(&self, input: &str) -> Result<String, DecorateError> {
        let tagged = self.tag_sources(input)?;
        let leveled = self.tag_levels(&tagged)?;
        self.highlight_numbers(&leveled)
    }

    /// Pass 1: wrap source-file tokens in hue bubbles.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` if `input` is not well-formed markup.
    pub fn tag_sources(&self, input: &str) -> Result<String, DecorateError> {
        markup::map_top_level_text(input, |text, _| {
            SOURCE_TOKEN
                .replace_all(text, |caps: &Captures| {
                    let name = &caps[0];
                    format!(
                        r#"<span class="source" style="background-color: hsl({}, 60%, 35%)">{}</span>"#,
                        source_hue(name),
                        name
                    )
                })
                .into_owned()
        })
    }

    /// Pass 2: wrap severity words and phrases in level badges.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` if `input` is not well-formed markup.
    pub fn tag_levels(&self, input: &str) -> Result<String, DecorateError> {
        markup::map_top_level_text(input, |text, _| {
            LEVEL_TOKEN
                .replace_all(text, |caps: &Captures| {
                    let word = &caps[0];
                    format!(
                        r#"<span class="level level-{}">{}</span>"#,
                        LevelClass::from_word(word).as_str(),
                        word
                    )
                })
                .into_owned()
        })
    }

    /// Pass 3: highlight numbers in text outside existing spans.
    ///
    /// A digit run at the very start of the line is a line number; it only
    /// qualifies when the markup itself starts with bare text.
    ///
    /// # Errors
    ///
    /// Returns `DecorateError` if `input` is not well-formed markup.
    pub fn highlight_numbers(&self, input: &str) -> Result<String, DecorateError> {
        markup::map_top_level_text(input, |text, offset| {
            let (mut out, rest) = match LEADING_DIGITS.find(text) {
                Some(m) if offset == 0 => (
                    format!(r#"<span class="line-number">{}</span>"#, m.as_str()),
                    &text[m.end()..],
                ),
                _ => (String::new(), text),
            };
            out.push_str(&NUMBER.replace_all(rest, r#"<span class="number">$0</span>"#));
            out
        })
    }
}

#[cfg(test)]
#[path = "decorate_tests.rs"]
mod tests;
