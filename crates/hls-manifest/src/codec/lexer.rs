//! Line tokenizer and playlist kind classification.

use tracing::trace;

use super::tags;
use crate::error::{Error, Result};
use crate::model::{AttributeList, ManifestType};

/// One non-blank line of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// `#EXT...` line, split at the first `:`.
    Tag {
        name: &'a str,
        value: Option<&'a str>,
        raw: &'a str,
    },
    /// `#` line that is not a tag.
    Comment(&'a str),
    Uri(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// 1-based line number in the source text.
    pub number: usize,
    pub token: Token<'a>,
}

/// Split the text into tokens, dropping blank lines and a leading BOM.
pub(crate) fn tokenize(text: &str) -> Vec<Line<'_>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    text.lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }

            let token = if raw.starts_with("#EXT") {
                match raw.split_once(':') {
                    Some((name, value)) => Token::Tag {
                        name,
                        value: Some(value),
                        raw,
                    },
                    None => Token::Tag {
                        name: raw,
                        value: None,
                        raw,
                    },
                }
            } else if raw.starts_with('#') {
                Token::Comment(raw)
            } else {
                Token::Uri(raw)
            };

            Some(Line {
                number: idx + 1,
                token,
            })
        })
        .collect()
}

/// Check the header line and return the remaining lines.
pub(crate) fn strip_header<'a, 'b>(lines: &'b [Line<'a>]) -> Result<&'b [Line<'a>]> {
    match lines.split_first() {
        None => Err(Error::EmptyInput),
        Some((first, rest)) => match first.token {
            Token::Tag { name, value: None, .. } if name == tags::EXTM3U => Ok(rest),
            _ => Err(Error::malformed(
                first.number,
                "document does not start with #EXTM3U",
            )),
        },
    }
}

/// Decide master vs media by looking for their marker tags.
///
/// The error carries the offending line number and a reason.
pub(crate) fn classify(lines: &[Line<'_>]) -> std::result::Result<ManifestType, (usize, String)> {
    let mut master_line = None;
    let mut media_line = None;

    for line in lines {
        if let Token::Tag { name, .. } = line.token {
            if master_line.is_none() && tags::MASTER_MARKERS.contains(&name) {
                master_line = Some(line.number);
            } else if media_line.is_none() && tags::MEDIA_MARKERS.contains(&name) {
                media_line = Some(line.number);
            }
        }
    }

    match (master_line, media_line) {
        (Some(_), None) => Ok(ManifestType::Master),
        (None, Some(_)) => Ok(ManifestType::Media),
        (Some(master), Some(media)) => Err((
            master.max(media),
            format!(
                "document mixes variant stream tags (line {master}) with segment tags (line {media})"
            ),
        )),
        (None, None) => Err((
            lines.first().map_or(1, |line| line.number),
            "document has neither variant stream tags nor segment tags".to_string(),
        )),
    }
    .inspect(|kind| trace!(manifest_type = %kind, "Classified manifest"))
}

pub(crate) fn attributes(value: Option<&str>, line: usize) -> Result<AttributeList> {
    AttributeList::parse(value.unwrap_or_default()).map_err(|reason| Error::malformed(line, reason))
}

pub(crate) fn required_value<'a>(name: &str, value: Option<&'a str>, line: usize) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::malformed(line, format!("{name} requires a value")))
}

pub(crate) fn number<T: std::str::FromStr>(name: &str, value: &str, line: usize) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::malformed(line, format!("{name} has a non-numeric value {value:?}")))
}

/// Parse a `YES`/`NO` enumerated attribute.
pub(crate) fn yes_no(name: &str, value: &str, line: usize) -> Result<bool> {
    match value {
        "YES" => Ok(true),
        "NO" => Ok(false),
        other => Err(Error::malformed(
            line,
            format!("{name} must be YES or NO, found {other:?}"),
        )),
    }
}
