//! # Manifest Operator Trait
//!
//! One step of a personalization request. Operators are chained by
//! [`ManifestPipeline`](crate::ManifestPipeline) in the order they are added.
//!
//! ## Usage
//!
//! Implement [`ManifestOperator`] for a custom step and add it with
//! [`ManifestPipeline::add_operator`](crate::ManifestPipeline::add_operator).
//!

use hls_manifest::{Error, ManifestType, MasterPlaylist, MediaPlaylist, Playlist, Result};

/// A transformation applied to a parsed playlist in place.
pub trait ManifestOperator {
    /// Apply the operator.
    ///
    /// # Returns
    ///
    /// `Ok(true)` when the playlist changed. On error the operator must not
    /// have modified the playlist.
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool>;

    /// Get the name of this operator for logging and reports.
    fn name(&self) -> &'static str;

    /// Whether this operator applies to playlists of `kind`. The pipeline skips
    /// operators that do not; calling [`apply`](Self::apply) anyway fails with
    /// [`Error::InvalidPlaylist`].
    fn supports(&self, kind: ManifestType) -> bool {
        let _ = kind;
        true
    }
}

pub(crate) fn require_master<'a>(
    playlist: &'a mut Playlist,
    operator: &str,
) -> Result<&'a mut MasterPlaylist> {
    match playlist {
        Playlist::Master(master) => Ok(master),
        Playlist::Media(_) => Err(Error::invalid_playlist(format!(
            "{operator} expects a master playlist, got a media playlist"
        ))),
    }
}

pub(crate) fn require_media<'a>(
    playlist: &'a mut Playlist,
    operator: &str,
) -> Result<&'a mut MediaPlaylist> {
    match playlist {
        Playlist::Media(media) => Ok(media),
        Playlist::Master(_) => Err(Error::invalid_playlist(format!(
            "{operator} expects a media playlist, got a master playlist"
        ))),
    }
}
