use hls_manifest::{Playlist, Result};

use crate::clip::{ClipWindow, Clipper, ClippingMethod, validate_clip_info};
use crate::operator::ManifestOperator;

/// Operator for either playlist kind: forwards the window on a master, trims
/// a media playlist
pub struct ClipOperator {
    clipper: Clipper,
    window: ClipWindow,
}

impl ClipOperator {
    /// `clip` is `<start>[-<end>]`, the `clip=` prefix is optional here.
    pub fn new(clip: &str, method: ClippingMethod) -> Result<Self> {
        let clip = clip.trim();
        let window = if clip.starts_with("clip=") {
            validate_clip_info(clip)?
        } else {
            validate_clip_info(&format!("clip={clip}"))?
        };

        Ok(Self {
            clipper: Clipper::new(method),
            window,
        })
    }

    pub fn window(&self) -> ClipWindow {
        self.window
    }
}

impl ManifestOperator for ClipOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let before = playlist.clone();
        self.clipper.clip_window(self.window, playlist)?;
        Ok(*playlist != before)
    }

    fn name(&self) -> &'static str {
        "Clip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_manifest::{Error, parse_manifest, test_utils};

    #[test]
    fn test_prefix_is_optional() {
        assert_eq!(
            ClipOperator::new("5-11", ClippingMethod::Precise).unwrap().window(),
            ClipOperator::new("clip=5-11", ClippingMethod::Precise).unwrap().window()
        );
        assert!(matches!(
            ClipOperator::new("11-5", ClippingMethod::Precise),
            Err(Error::InvalidClipInfo(_))
        ));
    }

    #[test]
    fn test_clips_media() {
        let mut playlist = parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let mut operator = ClipOperator::new("4-8", ClippingMethod::SegmentBoundaries).unwrap();

        assert!(operator.apply(&mut playlist).unwrap());
        let media = playlist.as_media().unwrap();
        assert_eq!(media.segments.len(), 1);
        assert_eq!(media.segments[0].uri, "segment1.ts");
    }

    #[test]
    fn test_window_covering_everything_is_no_change() {
        let mut playlist = parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let before = playlist.clone();
        let mut operator = ClipOperator::new("0-16", ClippingMethod::SegmentBoundaries).unwrap();

        assert!(!operator.apply(&mut playlist).unwrap());
        assert_eq!(playlist, before);
    }
}
