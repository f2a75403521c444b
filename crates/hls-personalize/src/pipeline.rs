//! # Manifest Pipeline
//!
//! Chains [`ManifestOperator`]s over one playlist. The pipeline runs on a copy
//! of the playlist and only writes it back when every operator succeeded, so a
//! failing request never leaves a half-personalized manifest behind.
//!

use hls_manifest::{Playlist, Result, parse_manifest, stringify_manifest};
use tracing::{debug, info, warn};

use crate::config::PersonalizeConfig;
use crate::operator::ManifestOperator;
use crate::operators::{
    BitrateFilterOperator, BumperOperator, ClipOperator, LanguageFilterOperator,
    ResolutionFilterOperator, ResolutionOrderOperator,
};
use crate::splice::Bumper;

/// What a pipeline run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Operators that ran, with whether each changed the playlist.
    pub applied: Vec<(&'static str, bool)>,
    /// Operators skipped because they do not handle this playlist kind.
    pub skipped: Vec<&'static str>,
}

impl PipelineReport {
    pub fn changed(&self) -> bool {
        self.applied.iter().any(|(_, changed)| *changed)
    }

    pub fn changed_operators(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.applied
            .iter()
            .filter(|(_, changed)| *changed)
            .map(|(name, _)| *name)
    }
}

/// Ordered list of operators applied to one playlist.
#[derive(Default)]
pub struct ManifestPipeline {
    operators: Vec<Box<dyn ManifestOperator>>,
}

impl ManifestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operator to the end of the pipeline.
    ///
    /// Returns self for method chaining.
    pub fn add_operator<O: ManifestOperator + 'static>(mut self, operator: O) -> Self {
        self.operators.push(Box::new(operator));
        self
    }

    /// Build the standard request flow from `config`: bitrate filter,
    /// resolution cap, resolution order, audio and subtitle languages, then
    /// clip. Disabled steps are left out.
    ///
    /// Every parameter is validated here, before any playlist is seen.
    pub fn from_config(config: &PersonalizeConfig) -> Result<Self> {
        Self::from_config_with_bumpers(config, Vec::new())
    }

    /// Like [`from_config`](Self::from_config) with a bumper step before the
    /// clip.
    pub fn from_config_with_bumpers(config: &PersonalizeConfig, bumpers: Vec<Bumper>) -> Result<Self> {
        let mut pipeline = Self::new();

        if !config.bitrates.is_empty() {
            pipeline = pipeline.add_operator(BitrateFilterOperator::new(
                &config.bitrates,
                config.bitrate_tolerance,
            )?);
        }
        if let Some(max_resolution) = &config.max_resolution {
            pipeline = pipeline.add_operator(ResolutionFilterOperator::new(max_resolution)?);
        }
        if !config.resolution_order.is_empty() {
            pipeline = pipeline.add_operator(ResolutionOrderOperator::new(&config.resolution_order)?);
        }
        if !config.audio_languages.is_empty() {
            pipeline = pipeline.add_operator(LanguageFilterOperator::audio(
                config.audio_languages.iter().cloned(),
            )?);
        }
        if !config.subtitle_languages.is_empty() {
            pipeline = pipeline.add_operator(LanguageFilterOperator::subtitles(
                config.subtitle_languages.iter().cloned(),
            )?);
        }
        if !bumpers.is_empty() {
            pipeline = pipeline.add_operator(BumperOperator::new(bumpers));
        }
        if let Some(clip) = &config.clip {
            pipeline = pipeline.add_operator(ClipOperator::new(clip, config.clip_method)?);
        }

        debug!(operators = ?pipeline.operator_names(), "Built manifest pipeline");
        Ok(pipeline)
    }

    pub fn operator_names(&self) -> Vec<&'static str> {
        self.operators.iter().map(|op| op.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Run every operator that handles this playlist kind, in order.
    ///
    /// On error `playlist` is left exactly as it was passed in.
    pub fn run(&mut self, playlist: &mut Playlist) -> Result<PipelineReport> {
        let kind = playlist.manifest_type();
        let mut working = playlist.clone();
        let mut report = PipelineReport::default();

        for operator in &mut self.operators {
            let name = operator.name();
            if !operator.supports(kind) {
                debug!(operator = name, %kind, "Skipping operator");
                report.skipped.push(name);
                continue;
            }

            let changed = operator.apply(&mut working).inspect_err(|e| {
                warn!(operator = name, error = %e, "Operator failed, discarding changes");
            })?;
            debug!(operator = name, changed, "Applied operator");
            report.applied.push((name, changed));
        }

        if report.changed() {
            *playlist = working;
        }
        info!(
            %kind,
            changed = ?report.changed_operators().collect::<Vec<_>>(),
            "Personalized manifest"
        );
        Ok(report)
    }
}

/// Parse `text`, run the pipeline described by `config` and serialize the
/// result.
pub fn personalize(text: &str, config: &PersonalizeConfig) -> Result<String> {
    let mut playlist = parse_manifest(text)?;
    ManifestPipeline::from_config(config)?.run(&mut playlist)?;
    Ok(stringify_manifest(&playlist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClippingMethod;
    use hls_manifest::test_utils::media_playlist_from_durations;
    use hls_manifest::{Error, init_test_tracing, test_utils};

    /// Fails on every call, after changing the playlist.
    struct Failing;

    impl ManifestOperator for Failing {
        fn apply(&mut self, playlist: &mut Playlist) -> Result<bool> {
            if let Playlist::Master(master) = playlist {
                master.variants.clear();
            }
            Err(Error::invalid_argument("boom"))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    #[test]
    fn test_from_config_order() {
        let config = PersonalizeConfig::builder()
            .clip("10")
            .audio_languages(["en"])
            .bitrate("1-")
            .max_resolution("1920x1080")
            .build();
        let pipeline = ManifestPipeline::from_config_with_bumpers(
            &config,
            vec![Bumper::pre_roll(media_playlist_from_durations("b", &[2.0]))],
        )
        .unwrap();

        assert_eq!(
            pipeline.operator_names(),
            [
                "BitrateFilter",
                "ResolutionFilter",
                "AudioLanguageFilter",
                "Bumper",
                "Clip"
            ]
        );
    }

    #[test]
    fn test_from_config_validates_early() {
        let bad = [
            PersonalizeConfig::builder().bitrate("x").build(),
            PersonalizeConfig::builder().max_resolution("big").build(),
            PersonalizeConfig::builder().resolution_order(["1x"]).build(),
            PersonalizeConfig::builder().clip("9-3").build(),
        ];
        for config in bad {
            assert!(ManifestPipeline::from_config(&config).is_err(), "{config}");
        }
    }

    #[test]
    fn test_master_request() {
        init_test_tracing!();
        let config = PersonalizeConfig::builder()
            .bitrate("1000000-")
            .resolution_order(["1920x1080"])
            .audio_languages(["en"])
            .clip("clip=60-120")
            .build();

        let mut playlist = hls_manifest::parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let report = ManifestPipeline::from_config(&config)
            .unwrap()
            .run(&mut playlist)
            .unwrap();

        assert!(report.changed());
        assert!(report.skipped.is_empty());
        let master = playlist.as_master().unwrap();
        let uris: Vec<&str> = master.variants.iter().map(|v| v.uri.as_str()).collect();
        assert_eq!(
            uris,
            [
                "video/1080p.m3u8?clip=60-120",
                "video/720p.m3u8?token=abc&clip=60-120"
            ]
        );
        assert_eq!(master.renditions.len(), 3);
    }

    #[test]
    fn test_media_request_skips_master_operators() {
        let config = PersonalizeConfig::builder()
            .bitrate("1000000-")
            .clip("4-12")
            .clip_method(ClippingMethod::Precise)
            .build();

        let mut playlist = hls_manifest::parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let report = ManifestPipeline::from_config(&config)
            .unwrap()
            .run(&mut playlist)
            .unwrap();

        assert_eq!(report.skipped, ["BitrateFilter"]);
        assert_eq!(report.applied, [("Clip", true)]);
        assert_eq!(playlist.as_media().unwrap().segments.len(), 2);
    }

    #[test]
    fn test_failure_rolls_back() {
        let mut playlist = hls_manifest::parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let before = playlist.clone();

        let mut pipeline = ManifestPipeline::new()
            .add_operator(BitrateFilterOperator::new(&["5000000"], 0).unwrap())
            .add_operator(Failing);

        assert!(pipeline.run(&mut playlist).is_err());
        assert_eq!(playlist, before);
    }

    #[test]
    fn test_personalize_text() {
        let config = PersonalizeConfig::builder().clip("0-4").build();
        let output = personalize(test_utils::VOD_MEDIA, &config).unwrap();

        assert_eq!(
            output,
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:4\n#EXT-X-MEDIA-SEQUENCE:0\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXTINF:4.0,\nsegment0.ts\n#EXT-X-ENDLIST\n"
        );

        assert_eq!(
            personalize("", &config),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn test_empty_pipeline_is_a_no_op() {
        let mut playlist = hls_manifest::parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let before = playlist.clone();
        let report = ManifestPipeline::new().run(&mut playlist).unwrap();
        assert!(!report.changed());
        assert_eq!(playlist, before);
    }
}
