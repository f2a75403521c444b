//! Typed playlist model shared by the codec and every transformation.
//!
//! All entities are plain owned data. The only cross references are the
//! audio/subtitle group ids on [`Variant`], which are lookup keys into the
//! rendition list.

mod attributes;
mod master;
mod media;
mod playlist;
mod resolution;

pub use attributes::{AttributeList, AttributeValue};
pub use master::{MasterPlaylist, Rendition, RenditionKind, Variant};
pub use media::{ByteRange, MediaPlaylist, MediaPlaylistType, Segment, StartOffset};
pub use playlist::{ManifestType, OpaqueTag, Playlist};
pub use resolution::Resolution;
