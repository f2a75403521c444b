use hls_manifest::{ManifestType, Playlist, Result};

use crate::bitrate::{BitrateSpec, parse_bitrate_specs};
use crate::operator::{ManifestOperator, require_master};
use crate::variant::retain_by_bitrate;

/// Master playlist operator: keeps variants matching any bitrate spec
pub struct BitrateFilterOperator {
    specs: Vec<BitrateSpec>,
    tolerance: u64,
}

impl BitrateFilterOperator {
    /// Specs are parsed up front so a bad one fails before any playlist is
    /// touched.
    pub fn new<S: AsRef<str>>(specs: &[S], tolerance: u64) -> Result<Self> {
        Ok(Self {
            specs: parse_bitrate_specs(specs)?,
            tolerance,
        })
    }

    pub fn specs(&self) -> &[BitrateSpec] {
        &self.specs
    }
}

impl ManifestOperator for BitrateFilterOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let master = require_master(playlist, self.name())?;
        Ok(retain_by_bitrate(master, &self.specs, self.tolerance))
    }

    fn name(&self) -> &'static str {
        "BitrateFilter"
    }

    fn supports(&self, kind: ManifestType) -> bool {
        kind == ManifestType::Master
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_manifest::{Error, parse_manifest, test_utils};

    #[test]
    fn test_filters_master() {
        let mut playlist = parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let mut operator = BitrateFilterOperator::new(&["2000000-"], 0).unwrap();

        assert!(operator.apply(&mut playlist).unwrap());
        let bandwidths: Vec<u64> = playlist
            .as_master()
            .unwrap()
            .variants
            .iter()
            .map(|v| v.bandwidth)
            .collect();
        assert_eq!(bandwidths, [2_500_000, 5_000_000]);
        assert!(!operator.apply(&mut playlist).unwrap());
    }

    #[test]
    fn test_rejects_media_and_bad_specs() {
        let mut playlist = parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let mut operator = BitrateFilterOperator::new(&["1"], 0).unwrap();

        assert!(!operator.supports(ManifestType::Media));
        assert!(matches!(
            operator.apply(&mut playlist),
            Err(Error::InvalidPlaylist(_))
        ));
        assert!(BitrateFilterOperator::new(&["x"], 0).is_err());
    }
}
