use std::fmt;

use super::{MasterPlaylist, MediaPlaylist};

/// Discriminant of a [`Playlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ManifestType {
    Master,
    Media,
}

impl ManifestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "Master Manifest",
            Self::Media => "Media Manifest",
        }
    }
}

impl fmt::Display for ManifestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed manifest: either a master playlist or a media playlist, never both.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Playlist {
    Master(MasterPlaylist),
    Media(MediaPlaylist),
}

impl Playlist {
    pub fn manifest_type(&self) -> ManifestType {
        match self {
            Self::Master(_) => ManifestType::Master,
            Self::Media(_) => ManifestType::Media,
        }
    }

    pub fn as_master(&self) -> Option<&MasterPlaylist> {
        match self {
            Self::Master(master) => Some(master),
            Self::Media(_) => None,
        }
    }

    pub fn as_master_mut(&mut self) -> Option<&mut MasterPlaylist> {
        match self {
            Self::Master(master) => Some(master),
            Self::Media(_) => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaPlaylist> {
        match self {
            Self::Media(media) => Some(media),
            Self::Master(_) => None,
        }
    }

    pub fn as_media_mut(&mut self) -> Option<&mut MediaPlaylist> {
        match self {
            Self::Media(media) => Some(media),
            Self::Master(_) => None,
        }
    }
}

impl From<MasterPlaylist> for Playlist {
    fn from(master: MasterPlaylist) -> Self {
        Self::Master(master)
    }
}

impl From<MediaPlaylist> for Playlist {
    fn from(media: MediaPlaylist) -> Self {
        Self::Media(media)
    }
}

/// A tag or comment line the model does not understand, kept verbatim.
///
/// `position` counts the recognized lines of the same anchor (header, entity
/// or trailer) that preceded it, so the writer can put it back in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OpaqueTag {
    pub position: usize,
    pub raw: String,
}

impl OpaqueTag {
    pub fn new(position: usize, raw: impl Into<String>) -> Self {
        Self {
            position,
            raw: raw.into(),
        }
    }
}
