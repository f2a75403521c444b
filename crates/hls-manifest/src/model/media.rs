use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeDelta};

use super::OpaqueTag;
use crate::error::Error;

/// `#EXT-X-PLAYLIST-TYPE` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MediaPlaylistType {
    Vod,
    Event,
}

impl MediaPlaylistType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vod => "VOD",
            Self::Event => "EVENT",
        }
    }
}

impl FromStr for MediaPlaylistType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VOD" => Ok(Self::Vod),
            "EVENT" => Ok(Self::Event),
            other => Err(Error::invalid_argument(format!(
                "unknown playlist type {other:?}"
            ))),
        }
    }
}

/// Sub-range of a resource, `<length>[@<offset>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}@{}", self.length, offset),
            None => write!(f, "{}", self.length),
        }
    }
}

impl FromStr for ByteRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_argument(format!("invalid byte range {s:?}"));
        let (length, offset) = match s.trim().split_once('@') {
            Some((length, offset)) => (length, Some(offset)),
            None => (s.trim(), None),
        };

        Ok(Self {
            length: length.parse().map_err(|_| invalid())?,
            offset: offset
                .map(|offset| offset.parse().map_err(|_| invalid()))
                .transpose()?,
        })
    }
}

/// `#EXT-X-START` preferred playback start.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StartOffset {
    /// Seconds from the start of the playlist (negative counts from the end).
    pub time_offset: f64,
    pub precise: bool,
}

/// One media segment, in playback order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub uri: String,
    /// Seconds, always > 0.
    pub duration: f64,
    pub title: Option<String>,
    /// A timeline break immediately precedes this segment.
    pub discontinuity: bool,
    pub byte_range: Option<ByteRange>,
    pub program_date_time: Option<DateTime<FixedOffset>>,
    /// Raw `#EXT-X-KEY` attribute text declared before this segment.
    /// Copied verbatim, never interpreted.
    pub keys: Vec<String>,
    /// Raw `#EXT-X-MAP` attribute text declared before this segment.
    pub map: Option<String>,
    pub opaque_tags: Vec<OpaqueTag>,
}

impl Segment {
    pub fn new(uri: impl Into<String>, duration: f64) -> Self {
        Self {
            uri: uri.into(),
            duration,
            title: None,
            discontinuity: false,
            byte_range: None,
            program_date_time: None,
            keys: Vec::new(),
            map: None,
            opaque_tags: Vec::new(),
        }
    }
}

/// Manifest listing the segments of a single variant stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MediaPlaylist {
    pub version: Option<u32>,
    /// Upper bound on any segment duration, in whole seconds.
    pub target_duration: u64,
    /// Sequence number of the first segment.
    pub media_sequence: u64,
    pub discontinuity_sequence: u64,
    pub playlist_type: Option<MediaPlaylistType>,
    pub independent_segments: bool,
    pub i_frames_only: bool,
    pub start: Option<StartOffset>,
    pub end_list: bool,
    pub header_tags: Vec<OpaqueTag>,
    pub segments: Vec<Segment>,
    pub trailer_tags: Vec<OpaqueTag>,
}

impl MediaPlaylist {
    pub fn new(target_duration: u64) -> Self {
        Self {
            version: None,
            target_duration,
            media_sequence: 0,
            discontinuity_sequence: 0,
            playlist_type: None,
            independent_segments: false,
            i_frames_only: false,
            start: None,
            end_list: false,
            header_tags: Vec::new(),
            segments: Vec::new(),
            trailer_tags: Vec::new(),
        }
    }

    /// Sum of all segment durations.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Cumulative start time of every segment (prefix sums of durations).
    pub fn segment_start_times(&self) -> Vec<f64> {
        let mut elapsed = 0.0;
        self.segments
            .iter()
            .map(|segment| {
                let start = elapsed;
                elapsed += segment.duration;
                start
            })
            .collect()
    }

    /// Key declarations in effect for the segment at `index`.
    pub fn effective_keys_at(&self, index: usize) -> &[String] {
        self.segments_through(index)
            .iter()
            .rev()
            .find(|segment| !segment.keys.is_empty())
            .map(|segment| segment.keys.as_slice())
            .unwrap_or(&[])
    }

    /// Media initialization section in effect for the segment at `index`.
    pub fn effective_map_at(&self, index: usize) -> Option<&str> {
        self.segments_through(index)
            .iter()
            .rev()
            .find_map(|segment| segment.map.as_deref())
    }

    fn segments_through(&self, index: usize) -> &[Segment] {
        let end = index.min(self.segments.len().saturating_sub(1));
        self.segments.get(..=end).unwrap_or(&[])
    }

    /// Wall-clock time of the segment at `index`, extrapolated forward from
    /// the closest earlier `#EXT-X-PROGRAM-DATE-TIME`.
    pub fn program_date_time_at(&self, index: usize) -> Option<DateTime<FixedOffset>> {
        let segments = self.segments.get(..=index)?;
        let anchor = segments
            .iter()
            .rposition(|segment| segment.program_date_time.is_some())?;
        let anchor_time = segments[anchor].program_date_time?;
        let elapsed: f64 = segments[anchor..index].iter().map(|s| s.duration).sum();

        Some(anchor_time + TimeDelta::microseconds((elapsed * 1_000_000.0).round() as i64))
    }

    /// Byte range of the segment at `index` with its offset resolved.
    ///
    /// A range without `@offset` continues where the previous segment's range
    /// ended when both name the same resource, and starts at 0 otherwise.
    pub fn absolute_byte_range_at(&self, index: usize) -> Option<ByteRange> {
        let segments = self.segments.get(..=index)?;
        let mut previous: Option<(&str, u64)> = None;

        for segment in segments {
            let Some(range) = segment.byte_range else {
                previous = None;
                continue;
            };
            let offset = match (range.offset, previous) {
                (Some(offset), _) => offset,
                (None, Some((uri, end))) if uri == segment.uri => end,
                (None, _) => 0,
            };
            previous = Some((segment.uri.as_str(), offset + range.length));
        }

        let range = segments.last()?.byte_range?;
        let (_, end) = previous?;
        Some(ByteRange {
            length: range.length,
            offset: Some(end - range.length),
        })
    }

    /// Smallest valid `#EXT-X-TARGETDURATION` for the current segments.
    pub fn required_target_duration(&self) -> u64 {
        self.segments
            .iter()
            .map(|s| s.duration.round() as u64)
            .max()
            .unwrap_or(0)
    }
}
