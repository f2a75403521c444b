//! Time window clipping.
//!
//! A master playlist is never trimmed itself: the clip request is forwarded as
//! a `clip` query parameter on every playlist URI it references, and each
//! media playlist is trimmed when it is fetched with that parameter.

use std::fmt;
use std::str::FromStr;

use hls_manifest::{
    Error, ManifestType, MasterPlaylist, MediaPlaylist, Playlist, Result, StartOffset,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const CLIP_PARAM: &str = "clip";

/// How a media playlist is trimmed to the clip window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClippingMethod {
    /// Keep whole segments, playback may start and stop up to one segment
    /// outside the window.
    #[default]
    SegmentBoundaries,
    /// Keep whole segments but advertise the exact start offset and shorten
    /// the last segment so players start and stop on the requested seconds.
    Precise,
}

impl ClippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SegmentBoundaries => "SEGMENT_BOUNDARIES",
            Self::Precise => "PRECISE",
        }
    }
}

impl fmt::Display for ClippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClippingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SEGMENT_BOUNDARIES" => Ok(Self::SegmentBoundaries),
            "PRECISE" => Ok(Self::Precise),
            _ => Err(Error::UnsupportedClippingMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for ClippingMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ClippingMethod> for String {
    fn from(method: ClippingMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Requested window in whole seconds from the start of the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub start: u64,
    /// `None` runs to the end of the asset. Always greater than `start`.
    pub end: Option<u64>,
}

impl ClipWindow {
    /// The `<start>[-<end>]` value of the `clip` query parameter.
    pub fn query_value(&self) -> String {
        match self.end {
            Some(end) => format!("{}-{end}", self.start),
            None => self.start.to_string(),
        }
    }
}

impl fmt::Display for ClipWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CLIP_PARAM}={}", self.query_value())
    }
}

/// Parse `clip=<start>[-<end>]`.
///
/// # Errors
///
/// [`Error::InvalidClipInfo`] when the text does not have that shape, a bound
/// is not a non-negative integer, or `end <= start`.
pub fn validate_clip_info(clip_info: &str) -> Result<ClipWindow> {
    let invalid = |reason: &str| {
        Error::invalid_clip_info(format!(
            "{clip_info:?} {reason}, expected clip=<start>[-<end>]"
        ))
    };
    let seconds = |part: &str| -> Result<u64> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("has a bound that is not a whole number of seconds"));
        }
        part.parse().map_err(|_| invalid("has a bound out of range"))
    };

    let value = clip_info
        .trim()
        .strip_prefix("clip=")
        .ok_or_else(|| invalid("is not a clip parameter"))?;

    let window = match value.split_once('-') {
        Some((start, end)) => ClipWindow {
            start: seconds(start)?,
            end: Some(seconds(end)?),
        },
        None => ClipWindow {
            start: seconds(value)?,
            end: None,
        },
    };

    if window.end.is_some_and(|end| end <= window.start) {
        return Err(invalid("ends before it starts"));
    }
    Ok(window)
}

/// Replace or add the `clip` query parameter, keeping every other parameter
/// and any fragment as written.
fn with_clip_param(uri: &str, value: &str) -> String {
    let (rest, fragment) = match uri.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (uri, None),
    };
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    let mut params: Vec<&str> = query
        .split('&')
        .filter(|param| !param.is_empty())
        .filter(|param| param.split('=').next() != Some(CLIP_PARAM))
        .collect();
    let clip = format!("{CLIP_PARAM}={value}");
    params.push(&clip);

    let mut out = format!("{path}?{}", params.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Applies a clip request to master or media playlists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clipper {
    method: ClippingMethod,
}

impl Clipper {
    pub fn new(method: ClippingMethod) -> Self {
        Self { method }
    }

    /// Build a clipper from a method name such as `"PRECISE"`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedClippingMethod`] for an unknown name.
    pub fn with_method_name(method: &str) -> Result<Self> {
        Ok(Self::new(method.parse()?))
    }

    pub fn method(&self) -> ClippingMethod {
        self.method
    }

    /// Clip `playlist` in place and return which kind it was.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidClipInfo`] when `clip_info` is malformed or the window
    /// does not intersect any segment. The playlist is unchanged on error.
    pub fn clip(&self, clip_info: &str, playlist: &mut Playlist) -> Result<ManifestType> {
        let window = validate_clip_info(clip_info)?;
        self.clip_window(window, playlist)
    }

    pub fn clip_window(&self, window: ClipWindow, playlist: &mut Playlist) -> Result<ManifestType> {
        match playlist {
            Playlist::Master(master) => {
                clip_master(window, master);
                Ok(ManifestType::Master)
            }
            Playlist::Media(media) => {
                clip_media(window, self.method, media)?;
                Ok(ManifestType::Media)
            }
        }
    }
}

fn clip_master(window: ClipWindow, master: &mut MasterPlaylist) {
    let value = window.query_value();

    for variant in &mut master.variants {
        variant.uri = with_clip_param(&variant.uri, &value);
    }
    for rendition in &mut master.renditions {
        if let Some(uri) = rendition.uri.as_mut() {
            *uri = with_clip_param(uri, &value);
        }
    }

    debug!(
        clip = %window,
        variants = master.variants.len(),
        renditions = master.renditions.len(),
        "Forwarded clip window to master playlist URIs"
    );
}

/// Move an `#EXT-X-START` onto the clipped timeline, or drop it when the
/// point it named is gone.
fn rebase_start(
    offset: StartOffset,
    dropped_seconds: f64,
    trimmed_tail: bool,
    total_duration: f64,
) -> Option<StartOffset> {
    if offset.time_offset < 0.0 {
        // counted from the end, which moved
        return (!trimmed_tail).then_some(offset);
    }

    let time_offset = offset.time_offset - dropped_seconds;
    (time_offset >= 0.0 && time_offset < total_duration).then_some(StartOffset {
        time_offset,
        ..offset
    })
}

fn clip_media(window: ClipWindow, method: ClippingMethod, media: &mut MediaPlaylist) -> Result<()> {
    let start = window.start as f64;
    let end = window.end.map(|end| end as f64);
    let starts = media.segment_start_times();

    let intersects = |idx: usize| {
        let segment_start = starts[idx];
        let segment_end = segment_start + media.segments[idx].duration;
        segment_end > start && end.is_none_or(|end| segment_start < end)
    };

    let first = (0..starts.len()).find(|idx| intersects(*idx));
    let last = (0..starts.len()).rev().find(|idx| intersects(*idx));
    let (Some(first), Some(last)) = (first, last) else {
        return Err(Error::invalid_clip_info(format!(
            "{window} does not overlap the {:.3}s playlist",
            media.total_duration()
        )));
    };

    // Context that would be lost with the dropped prefix.
    let keys = media.effective_keys_at(first).to_vec();
    let map = media.effective_map_at(first).map(str::to_string);
    let program_date_time = media.program_date_time_at(first);
    let byte_range = media.absolute_byte_range_at(first);
    let trimmed_tail = last + 1 < media.segments.len();
    let dropped_discontinuities = media.segments[..first]
        .iter()
        .filter(|segment| segment.discontinuity)
        .count() as u64;

    media.segments.truncate(last + 1);
    media.segments.drain(..first);

    if let Some(head) = media.segments.first_mut() {
        if head.keys.is_empty() {
            head.keys = keys;
        }
        if head.map.is_none() {
            head.map = map;
        }
        if head.program_date_time.is_none() {
            head.program_date_time = program_date_time;
        }
        // A relative range was only defined by the segment before it.
        if head.byte_range.is_some_and(|range| range.offset.is_none()) {
            head.byte_range = byte_range;
        }
    }

    media.media_sequence += first as u64;
    media.discontinuity_sequence += dropped_discontinuities;
    if end.is_some() {
        media.end_list = true;
    }

    if method == ClippingMethod::SegmentBoundaries {
        let total = media.total_duration();
        media.start = media
            .start
            .and_then(|offset| rebase_start(offset, starts[first], trimmed_tail, total));
    } else {
        media.start = Some(StartOffset {
            time_offset: (start - starts[first]).max(0.0),
            precise: true,
        });
        if let (Some(end), Some(tail)) = (end, media.segments.last_mut()) {
            let tail_start = starts[last];
            if tail_start + tail.duration > end {
                tail.duration = end - tail_start;
            }
        }
    }

    debug!(
        clip = %window,
        %method,
        first,
        last,
        kept = media.segments.len(),
        "Clipped media playlist"
    );
    Ok(())
}
