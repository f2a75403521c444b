use hls_manifest::{ManifestType, Playlist, Resolution, Result};

use crate::operator::{ManifestOperator, require_master};
use crate::variant::apply_resolution_order;

/// Master playlist operator: moves the listed resolutions to the top of the
/// variant list
pub struct ResolutionOrderOperator {
    order: Vec<Resolution>,
}

impl ResolutionOrderOperator {
    pub fn new<S: AsRef<str>>(resolutions: &[S]) -> Result<Self> {
        let order = resolutions
            .iter()
            .map(|r| r.as_ref().parse())
            .collect::<Result<Vec<Resolution>>>()?;
        Ok(Self { order })
    }
}

impl ManifestOperator for ResolutionOrderOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let master = require_master(playlist, self.name())?;
        Ok(apply_resolution_order(master, &self.order))
    }

    fn name(&self) -> &'static str {
        "ResolutionOrder"
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
    fn test_reorders() {
        let mut playlist = parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let mut operator = ResolutionOrderOperator::new(&["1920x1080", "1280x720"]).unwrap();

        assert!(operator.apply(&mut playlist).unwrap());
        let uris: Vec<&str> = playlist
            .as_master()
            .unwrap()
            .variants
            .iter()
            .map(|v| v.uri.as_str())
            .collect();
        assert_eq!(
            uris,
            [
                "video/1080p.m3u8",
                "video/720p.m3u8?token=abc",
                "video/360p.m3u8",
                "video/360p-iframes.m3u8"
            ]
        );
        assert!(!operator.apply(&mut playlist).unwrap());
    }
}
