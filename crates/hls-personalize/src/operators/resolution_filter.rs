use hls_manifest::{ManifestType, Playlist, Resolution, Result};

use crate::operator::{ManifestOperator, require_master};
use crate::variant::retain_by_resolution;

/// Master playlist operator: drops variants larger than a maximum resolution
pub struct ResolutionFilterOperator {
    max: Resolution,
}

impl ResolutionFilterOperator {
    pub fn new(max_resolution: &str) -> Result<Self> {
        Ok(Self {
            max: max_resolution.parse()?,
        })
    }
}

impl ManifestOperator for ResolutionFilterOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let master = require_master(playlist, self.name())?;
        Ok(retain_by_resolution(master, self.max))
    }

    fn name(&self) -> &'static str {
        "ResolutionFilter"
    }

    fn supports(&self, kind: ManifestType) -> bool {
        kind == ManifestType::Master
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_manifest::{parse_manifest, test_utils};

    #[test]
    fn test_caps_resolution() {
        let mut playlist = parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let mut operator = ResolutionFilterOperator::new("1280x720").unwrap();

        assert!(operator.apply(&mut playlist).unwrap());
        let master = playlist.as_master().unwrap();
        assert_eq!(master.variants.len(), 3);
        assert!(master.variants.iter().all(|v| v.uri != "video/1080p.m3u8"));
        assert!(ResolutionFilterOperator::new("720p").is_err());
    }
}
