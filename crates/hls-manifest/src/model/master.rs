use std::fmt;
use std::str::FromStr;

use super::{AttributeList, OpaqueTag, Resolution};
use crate::error::Error;

/// Kind of an alternate rendition (`TYPE` attribute of `#EXT-X-MEDIA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RenditionKind {
    Audio,
    Video,
    Subtitles,
    ClosedCaptions,
}

impl RenditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "AUDIO",
            Self::Video => "VIDEO",
            Self::Subtitles => "SUBTITLES",
            Self::ClosedCaptions => "CLOSED-CAPTIONS",
        }
    }
}

impl fmt::Display for RenditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenditionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUDIO" => Ok(Self::Audio),
            "VIDEO" => Ok(Self::Video),
            "SUBTITLES" => Ok(Self::Subtitles),
            "CLOSED-CAPTIONS" => Ok(Self::ClosedCaptions),
            other => Err(Error::invalid_argument(format!(
                "unknown rendition type {other:?}"
            ))),
        }
    }
}

/// An alternate audio, video, subtitle or caption track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rendition {
    pub kind: RenditionKind,
    pub group_id: String,
    pub name: String,
    /// Language code, compared case-sensitively by the filters.
    pub language: Option<String>,
    /// Absent for closed captions, which are carried in the video stream.
    pub uri: Option<String>,
    pub is_default: bool,
    pub autoselect: bool,
    pub forced: bool,
    pub other_attributes: AttributeList,
    pub opaque_tags: Vec<OpaqueTag>,
}

impl Rendition {
    pub fn new(kind: RenditionKind, group_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            group_id: group_id.into(),
            name: name.into(),
            language: None,
            uri: None,
            is_default: false,
            autoselect: false,
            forced: false,
            other_attributes: AttributeList::new(),
            opaque_tags: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// One entry of the variant stream list.
///
/// Group ids are lookup keys into [`MasterPlaylist::renditions`], never owning
/// references.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Variant {
    pub uri: String,
    /// Peak bits per second.
    pub bandwidth: u64,
    pub average_bandwidth: Option<u64>,
    pub resolution: Option<Resolution>,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
    pub audio_group_id: Option<String>,
    pub subtitle_group_id: Option<String>,
    /// `#EXT-X-I-FRAME-STREAM-INF` entry; the URI lives in the tag itself.
    pub is_i_frame: bool,
    pub other_attributes: AttributeList,
    pub opaque_tags: Vec<OpaqueTag>,
}

impl Variant {
    pub fn new(uri: impl Into<String>, bandwidth: u64) -> Self {
        Self {
            uri: uri.into(),
            bandwidth,
            average_bandwidth: None,
            resolution: None,
            codecs: None,
            frame_rate: None,
            audio_group_id: None,
            subtitle_group_id: None,
            is_i_frame: false,
            other_attributes: AttributeList::new(),
            opaque_tags: Vec::new(),
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some(Resolution::new(width, height));
        self
    }

    pub fn with_audio_group(mut self, group_id: impl Into<String>) -> Self {
        self.audio_group_id = Some(group_id.into());
        self
    }

    pub fn with_subtitle_group(mut self, group_id: impl Into<String>) -> Self {
        self.subtitle_group_id = Some(group_id.into());
        self
    }
}

/// Manifest listing the variant streams and alternate renditions of a title.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MasterPlaylist {
    pub version: Option<u32>,
    pub independent_segments: bool,
    pub header_tags: Vec<OpaqueTag>,
    pub renditions: Vec<Rendition>,
    /// Players generally try variants in list order.
    pub variants: Vec<Variant>,
    pub trailer_tags: Vec<OpaqueTag>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renditions_of(&self, kind: RenditionKind) -> impl Iterator<Item = &Rendition> {
        self.renditions.iter().filter(move |r| r.kind == kind)
    }

    pub fn has_group(&self, kind: RenditionKind, group_id: &str) -> bool {
        self.renditions_of(kind).any(|r| r.group_id == group_id)
    }

    /// Audio and subtitle group ids referenced by a variant but not declared
    /// by any rendition of the matching kind.
    pub fn dangling_group_references(&self) -> Vec<&str> {
        let mut dangling: Vec<&str> = Vec::new();

        for variant in &self.variants {
            let refs = [
                (RenditionKind::Audio, variant.audio_group_id.as_deref()),
                (RenditionKind::Subtitles, variant.subtitle_group_id.as_deref()),
            ];
            for (kind, group_id) in refs {
                if let Some(group_id) = group_id {
                    if !self.has_group(kind, group_id) && !dangling.contains(&group_id) {
                        dangling.push(group_id);
                    }
                }
            }
        }

        dangling
    }
}
