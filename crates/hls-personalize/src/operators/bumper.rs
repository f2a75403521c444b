use hls_manifest::{ManifestType, Playlist, Result};

use crate::operator::{ManifestOperator, require_media};
use crate::splice::{Bumper, insert_auxiliary_content};

/// Media playlist operator: splices bumpers into the primary playlist
pub struct BumperOperator {
    bumpers: Vec<Bumper>,
}

impl BumperOperator {
    pub fn new(bumpers: Vec<Bumper>) -> Self {
        Self { bumpers }
    }
}

impl ManifestOperator for BumperOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let media = require_media(playlist, self.name())?;
        insert_auxiliary_content(media, &self.bumpers)?;
        Ok(!self.bumpers.is_empty())
    }

    fn name(&self) -> &'static str {
        "Bumper"
    }

    fn supports(&self, kind: ManifestType) -> bool {
        kind == ManifestType::Media
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_manifest::test_utils::media_playlist_from_durations;
    use hls_manifest::{Error, parse_manifest, test_utils};

    #[test]
    fn test_splices_media() {
        let mut playlist = parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let mut operator = BumperOperator::new(vec![Bumper::pre_roll(
            media_playlist_from_durations("ad", &[2.0]),
        )]);

        assert!(operator.apply(&mut playlist).unwrap());
        let media = playlist.as_media().unwrap();
        assert_eq!(media.segments.len(), 5);
        assert_eq!(media.segments[0].uri, "ad0.ts");

        assert!(!BumperOperator::new(Vec::new()).apply(&mut playlist).unwrap());
    }

    #[test]
    fn test_rejects_master() {
        let mut playlist = parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let mut operator = BumperOperator::new(Vec::new());
        assert!(matches!(
            operator.apply(&mut playlist),
            Err(Error::InvalidPlaylist(_))
        ));
    }
}
