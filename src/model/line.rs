//! Log line types.
//!
//! A [`LogLine`] is one raw line pushed by the server. A [`DecoratedLine`] is
//! its derived presentation: the markup string produced by the decorator plus
//! the styled segments parsed back out of that markup.

use chrono::{DateTime, Utc};

/// Arrival sequence number of a line.
///
/// Assigned by the console in the order lines come off the channel, so any
/// two lines can be compared for arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineSeq(u64);

impl LineSeq {
    /// Wrap a raw sequence number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One raw line received from the push channel.
///
/// Immutable once received. Never empty: blank and whitespace-only payloads
/// are rejected by [`LogLine::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    seq: LineSeq,
    text: String,
    received_at: DateTime<Utc>,
}

impl LogLine {
    /// Create a line stamped with the current time.
    ///
    /// Returns `None` when the text is empty after trimming (keep-alive noise).
    pub fn new(seq: LineSeq, text: impl Into<String>) -> Option<Self> {
        Self::with_time(seq, text, Utc::now())
    }

    /// Create a line with an explicit arrival time.
    pub fn with_time(
        seq: LineSeq,
        text: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let text = if trimmed.len() == text.len() {
            text
        } else {
            trimmed.to_string()
        };
        Some(Self {
            seq,
            text,
            received_at,
        })
    }

    /// Arrival sequence number.
    pub fn seq(&self) -> LineSeq {
        self.seq
    }

    /// Raw text, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Wall-clock time (UTC) the line came off the channel.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// Visual class of a level badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelClass {
    /// `DEBUG`
    Debug,
    /// `INFO`, and the fallback for unrecognized severity phrases
    Info,
    /// `WARNING`
    Warning,
    /// `ERROR`
    Error,
    /// `CRITICAL`
    Critical,
    /// `SUCCESS`
    Success,
}

impl LevelClass {
    /// Map a matched word to its class. Anything outside the vocabulary is `Info`.
    pub fn from_word(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "warning" => Self::Warning,
            "error" => Self::Error,
            "critical" => Self::Critical,
            "success" => Self::Success,
            _ => Self::Info,
        }
    }

    /// CSS-style class suffix used in markup (`level-<name>`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Success => "success",
        }
    }

    /// Parse a class suffix back. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            "success" => Some(Self::Success),
            _ => None,
        }
    }
}

/// Visual class of a run of text in a decorated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentClass {
    /// Undecorated text.
    Plain,
    /// Level badge.
    Level(LevelClass),
    /// Source-file bubble with its derived hue (0–359).
    Source {
        /// Hue in degrees.
        hue: u16,
    },
    /// Leading digit run at the start of a line.
    LineNumber,
    /// Any other standalone number.
    Number,
}

/// A run of text with one visual class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Unescaped display text.
    pub text: String,
    /// Visual class.
    pub class: SegmentClass,
}

impl Segment {
    /// Create a segment.
    pub fn new(text: impl Into<String>, class: SegmentClass) -> Self {
        Self {
            text: text.into(),
            class,
        }
    }
}

/// Presentation of a [`LogLine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedLine {
    line: LogLine,
    markup: String,
    segments: Vec<Segment>,
}

impl DecoratedLine {
    /// Assemble a decorated line from its parts.
    pub fn new(line: LogLine, markup: String, segments: Vec<Segment>) -> Self {
        Self {
            line,
            markup,
            segments,
        }
    }

    /// Undecorated fallback: the raw text as a single plain segment.
    pub fn plain(line: LogLine) -> Self {
        let text = line.text().to_string();
        Self {
            markup: text.clone(),
            segments: vec![Segment::new(text, SegmentClass::Plain)],
            line,
        }
    }

    /// Source line.
    pub fn line(&self) -> &LogLine {
        &self.line
    }

    /// Arrival sequence number of the source line.
    pub fn seq(&self) -> LineSeq {
        self.line.seq()
    }

    /// Markup string.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Styled segments in display order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any segment carries the given class.
    pub fn has_class(&self, class: SegmentClass) -> bool {
        self.segments.iter().any(|s| s.class == class)
    }
}
