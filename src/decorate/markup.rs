//! Minimal span markup used by decorated lines.
//!
//! Decorated text is plain text interleaved with `<span ...>` / `</span>` tags.
//! Raw log text is escaped before any tag is inserted, so every `<` in the
//! markup starts a tag. Decoration passes only ever rewrite text at nesting
//! depth zero, which is what keeps attribute values and already-wrapped tokens
//! out of reach of later passes.

use crate::model::{DecorateError, LevelClass, Segment, SegmentClass};
use regex::Regex;
use std::sync::LazyLock;

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z][\w-]*)="([^"]*)""#).expect("valid attribute regex"));

static HUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"hsl\(\s*(\d{1,3})").expect("valid hue regex"));

/// One lexical piece of markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text between tags. `offset` is its byte position in the markup.
    Text {
        /// Escaped text.
        text: &'a str,
        /// Byte offset in the markup.
        offset: usize,
    },
    /// An opening tag; `body` is everything between `<` and `>`.
    Open {
        /// Tag body, e.g. `span class="number"`.
        body: &'a str,
        /// Byte offset of the `<`.
        offset: usize,
    },
    /// A closing tag.
    Close {
        /// Byte offset of the `<`.
        offset: usize,
    },
}

/// Escape raw text so it can be embedded in markup.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape`], also accepting `&quot;`.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Split markup on tag boundaries.
///
/// # Errors
///
/// Returns `DecorateError::UnterminatedTag` when a `<` has no closing `>`.
pub fn tokenize(markup: &str) -> Result<Vec<Token<'_>>, DecorateError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < markup.len() {
        let rest = &markup[pos..];
        match rest.find('<') {
            Some(0) => {
                let end = rest
                    .find('>')
                    .ok_or(DecorateError::UnterminatedTag { offset: pos })?;
                let body = &rest[1..end];
                if body.starts_with('/') {
                    tokens.push(Token::Close { offset: pos });
                } else {
                    tokens.push(Token::Open { body, offset: pos });
                }
                pos += end + 1;
            }
            Some(next) => {
                tokens.push(Token::Text {
                    text: &rest[..next],
                    offset: pos,
                });
                pos += next;
            }
            None => {
                tokens.push(Token::Text {
                    text: rest,
                    offset: pos,
                });
                pos = markup.len();
            }
        }
    }

    Ok(tokens)
}

/// Rebuild markup, rewriting only the text that sits outside every span.
///
/// `rewrite` receives each depth-zero text run and its byte offset in the
/// input; tags and nested text are copied through untouched.
///
/// # Errors
///
/// Returns an error if the markup does not tokenize or closes more spans than
/// it opens.
pub fn map_top_level_text<F>(markup: &str, mut rewrite: F) -> Result<String, DecorateError>
where
    F: FnMut(&str, usize) -> String,
{
    let mut out = String::with_capacity(markup.len() + 32);
    let mut depth = 0usize;

    for token in tokenize(markup)? {
        match token {
            Token::Text { text, offset } => {
                if depth == 0 {
                    out.push_str(&rewrite(text, offset));
                } else {
                    out.push_str(text);
                }
            }
            Token::Open { body, .. } => {
                depth += 1;
                out.push('<');
                out.push_str(body);
                out.push('>');
            }
            Token::Close { offset } => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(DecorateError::UnbalancedClose { offset })?;
                out.push_str("</span>");
            }
        }
    }

    Ok(out)
}

/// Parse markup into display segments.
///
/// Adjacent text with the same class is merged. Nested spans take the class of
/// the innermost span.
///
/// # Errors
///
/// Returns an error for unterminated or unsupported tags and unbalanced spans.
pub fn parse(markup: &str) -> Result<Vec<Segment>, DecorateError> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut stack: Vec<SegmentClass> = Vec::new();

    for token in tokenize(markup)? {
        match token {
            Token::Text { text, .. } => {
                let class = stack.last().copied().unwrap_or(SegmentClass::Plain);
                let text = unescape(text);
                match segments.last_mut() {
                    Some(last) if last.class == class => last.text.push_str(&text),
                    _ => segments.push(Segment::new(text, class)),
                }
            }
            Token::Open { body, .. } => {
                stack.push(class_of(body)?);
            }
            Token::Close { offset } => {
                stack
                    .pop()
                    .ok_or(DecorateError::UnbalancedClose { offset })?;
            }
        }
    }

    if !stack.is_empty() {
        return Err(DecorateError::UnclosedSpan { open: stack.len() });
    }

    Ok(segments)
}

/// Segment class named by a `span` tag body.
fn class_of(body: &str) -> Result<SegmentClass, DecorateError> {
    let name = body.split_whitespace().next().unwrap_or_default();
    if name != "span" {
        return Err(DecorateError::UnsupportedTag(name.to_string()));
    }

    let mut class_attr = "";
    let mut style_attr = "";
    for caps in ATTRIBUTE.captures_iter(body) {
        match &caps[1] {
            "class" => class_attr = caps.get(2).map_or("", |m| m.as_str()),
            "style" => style_attr = caps.get(2).map_or("", |m| m.as_str()),
            _ => {}
        }
    }

    let mut classes = class_attr.split_whitespace();
    let class = match classes.next() {
        Some("source") => SegmentClass::Source {
            hue: HUE
                .captures(style_attr)
                .and_then(|c| c[1].parse::<u16>().ok())
                .map_or(0, |h| h % 360),
        },
        Some("level") => {
            let level = classes
                .find_map(|c| c.strip_prefix("level-"))
                .and_then(LevelClass::parse)
                .unwrap_or(LevelClass::Info);
            SegmentClass::Level(level)
        }
        Some("line-number") => SegmentClass::LineNumber,
        Some("number") => SegmentClass::Number,
        _ => SegmentClass::Plain,
    };
    Ok(class)
}
