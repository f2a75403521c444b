//! # HLS Manifest
//!
//! Object model and lossless text codec for HLS playlists.
//!
//! ## Features
//!
//! - Typed [`MasterPlaylist`] / [`MediaPlaylist`] model behind the [`Playlist`] sum type
//! - Round-trip safe parser and writer: unrecognized tags survive in place
//! - One [`Error`] type shared with every crate that transforms playlists
//! - Optional `serde` feature deriving `Serialize` on the model
//!
//! ## Usage
//!
//! ```
//! use hls_manifest::{ManifestType, Playlist};
//!
//! let text = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4.0,\na.ts\n#EXT-X-ENDLIST\n";
//! let playlist: Playlist = text.parse().unwrap();
//! assert_eq!(playlist.manifest_type(), ManifestType::Media);
//! assert_eq!(playlist.to_string(), "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXT-X-MEDIA-SEQUENCE:0\n#EXTINF:4.0,\na.ts\n#EXT-X-ENDLIST\n");
//! ```
//!
//! ## License
//!
//! MIT License

use std::fmt;
use std::str::FromStr;

pub mod codec;
pub mod error;
pub mod model;
pub mod test_utils;

pub use codec::{
    detect_manifest_type, format_decimal, get_manifest_type, parse_manifest, stringify_manifest,
};
pub use error::{Error, Result};
pub use model::{
    AttributeList, AttributeValue, ByteRange, ManifestType, MasterPlaylist, MediaPlaylist,
    MediaPlaylistType, OpaqueTag, Playlist, Rendition, RenditionKind, Resolution, Segment,
    StartOffset, Variant,
};

impl FromStr for Playlist {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s)
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify_manifest(self))
    }
}
