use hls_manifest::{Error, ManifestType, Playlist, RenditionKind, Result};

use crate::operator::{ManifestOperator, require_master};
use crate::rendition::preserve_renditions_by_language;

/// Master playlist operator: keeps audio or subtitle renditions in the given
/// languages
pub struct LanguageFilterOperator {
    kind: RenditionKind,
    languages: Vec<String>,
}

impl LanguageFilterOperator {
    pub fn audio<S: Into<String>>(languages: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::new(RenditionKind::Audio, languages)
    }

    pub fn subtitles<S: Into<String>>(languages: impl IntoIterator<Item = S>) -> Result<Self> {
        Self::new(RenditionKind::Subtitles, languages)
    }

    fn new<S: Into<String>>(
        kind: RenditionKind,
        languages: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let languages: Vec<String> = languages.into_iter().map(Into::into).collect();
        if languages.is_empty() {
            return Err(Error::invalid_argument(format!(
                "expected at least one language for {kind} renditions"
            )));
        }
        Ok(Self { kind, languages })
    }

    pub fn kind(&self) -> RenditionKind {
        self.kind
    }
}

impl ManifestOperator for LanguageFilterOperator {
    fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
        let master = require_master(playlist, self.name())?;
        preserve_renditions_by_language(master, self.kind, &self.languages)
    }

    fn name(&self) -> &'static str {
        match self.kind {
            RenditionKind::Subtitles => "SubtitleLanguageFilter",
            _ => "AudioLanguageFilter",
        }
    }

    fn supports(&self, kind: ManifestType) -> bool {
        kind == ManifestType::Master
    }
}
