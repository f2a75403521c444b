//! Language based selection of alternate renditions.

use hls_manifest::{Error, MasterPlaylist, RenditionKind, Result};
use tracing::{debug, warn};

/// Keep only the audio renditions whose `LANGUAGE` is one of `languages`.
///
/// Returns `true` when a rendition was removed. See
/// [`preserve_renditions_by_language`].
pub fn preserve_audio_renditions_by_language<S: AsRef<str>>(
    master: &mut MasterPlaylist,
    languages: &[S],
) -> Result<bool> {
    preserve_renditions_by_language(master, RenditionKind::Audio, languages)
}

/// Keep only the subtitle renditions whose `LANGUAGE` is one of `languages`.
pub fn preserve_subtitle_renditions_by_language<S: AsRef<str>>(
    master: &mut MasterPlaylist,
    languages: &[S],
) -> Result<bool> {
    preserve_renditions_by_language(master, RenditionKind::Subtitles, languages)
}

/// Remove renditions of `kind` whose language is not listed.
///
/// Languages compare exactly and case-sensitively; a rendition without a
/// language never matches. Renditions of other kinds are untouched. Variants
/// that pointed at a group that is now gone keep their group id.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `languages` is empty.
pub fn preserve_renditions_by_language<S: AsRef<str>>(
    master: &mut MasterPlaylist,
    kind: RenditionKind,
    languages: &[S],
) -> Result<bool> {
    if languages.is_empty() {
        return Err(Error::invalid_argument(format!(
            "expected at least one language for {kind} renditions"
        )));
    }

    let before = master.renditions.len();
    master.renditions.retain(|rendition| {
        rendition.kind != kind
            || rendition
                .language
                .as_deref()
                .is_some_and(|language| languages.iter().any(|l| l.as_ref() == language))
    });

    let removed = before - master.renditions.len();
    debug!(%kind, removed, "Filtered renditions by language");

    if removed > 0 {
        let dangling = master.dangling_group_references();
        if !dangling.is_empty() {
            warn!(groups = ?dangling, "Variants reference rendition groups that no longer exist");
        }
    }

    Ok(removed > 0)
}
