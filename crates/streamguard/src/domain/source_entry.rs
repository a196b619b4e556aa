//! Source list entries and the line formats written by the recorder.
//!
//! The recorder's list format grew from `url` to `url,主播: name` to
//! `quality,url,主播: name` without any version marker, so a line is
//! classified purely by its shape.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Literal that marks the rest of the line as the display name.
pub const ANCHOR_TAG: &str = "主播: ";
pub const DEFAULT_DISPLAY_NAME: &str = "未命名主播";
pub const DEFAULT_QUALITY: &str = "原画";
pub const SCHEME_SEPARATOR: &str = "://";
pub const COMMENT_MARKER: char = '#';

const FIELD_SEPARATORS: [char; 2] = [',', '，'];

static URL_RECOVERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s,，]+").unwrap_or_else(|_| unreachable!("static pattern"))
});

// A structured url field is one token: a scheme, the separator, no whitespace.
static URL_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://\S+$")
        .unwrap_or_else(|_| unreachable!("static pattern"))
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceParseError {
    #[error("No stream url found in line '{line}'")]
    NoUrl { line: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    url: String,
    display_name: String,
    quality: String,
}

impl SourceEntry {
    pub fn parse(line: &str) -> Result<Self, SourceParseError> {
        let raw = line.trim();
        let mut display_name = None;
        let mut remainder = raw;

        if let Some((before, after)) = raw.split_once(ANCHOR_TAG) {
            display_name = non_empty(after.trim());
            let before = before.trim();
            remainder = before
                .strip_suffix(FIELD_SEPARATORS)
                .unwrap_or(before)
                .trim_end();
        }

        let fragments: Vec<&str> = remainder
            .split(FIELD_SEPARATORS)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect();

        let mut quality = None;
        let mut url = None;
        match fragments.as_slice() {
            [] => {}
            [only] => {
                if only.contains(SCHEME_SEPARATOR) {
                    url = Some(*only);
                }
            }
            [first, second, ..] => {
                if first.contains(SCHEME_SEPARATOR) {
                    url = Some(*first);
                } else {
                    quality = Some(*first);
                    url = Some(*second);
                }
            }
        }

        let url = match url.filter(|candidate| is_url_field(candidate)) {
            Some(url) => url.to_string(),
            None => recover_url(raw).ok_or_else(|| SourceParseError::NoUrl {
                line: raw.to_string(),
            })?,
        };

        Ok(Self {
            url,
            display_name: display_name.unwrap_or(DEFAULT_DISPLAY_NAME).to_string(),
            quality: quality.unwrap_or(DEFAULT_QUALITY).to_string(),
        })
    }

    /// Render the line appended to the source list for `url` and an optional name.
    pub fn format_line(url: &str, display_name: Option<&str>) -> String {
        let url = url.trim();
        match display_name.map(sanitize_name).as_deref() {
            Some(name) if !name.is_empty() => format!("{url},{ANCHOR_TAG}{name}"),
            _ => url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn has_default_name(&self) -> bool {
        self.display_name == DEFAULT_DISPLAY_NAME
    }
}

impl FromStr for SourceEntry {
    type Err = SourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// True when the line carries no entry at all.
pub fn is_skippable_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
}

fn is_url_field(candidate: &str) -> bool {
    URL_FIELD.is_match(candidate)
}

fn recover_url(raw: &str) -> Option<String> {
    if !raw.contains(SCHEME_SEPARATOR) {
        return None;
    }
    URL_RECOVERY.find(raw).map(|m| m.as_str().to_string())
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

// A name spanning lines would corrupt the list.
fn sanitize_name(name: &str) -> String {
    name.replace(['\r', '\n'], " ").trim().to_string()
}
