use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::clip::ClippingMethod;

/// What to do to one manifest request. Empty lists and `None` disable the
/// corresponding step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizeConfig {
    /// Bitrate specs, see [`BitrateSpec`](crate::BitrateSpec).
    pub bitrates: Vec<String>,

    /// Band around exact bitrate specs, in bits per second
    pub bitrate_tolerance: u64,

    /// Largest resolution to keep, `<width>x<height>`
    pub max_resolution: Option<String>,

    /// Resolutions to bring to the top of the variant list, in order
    pub resolution_order: Vec<String>,

    pub audio_languages: Vec<String>,

    pub subtitle_languages: Vec<String>,

    /// Clip window as `<start>[-<end>]`, with or without the `clip=` prefix
    pub clip: Option<String>,

    pub clip_method: ClippingMethod,
}

impl Display for PersonalizeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = |items: &[String]| {
            if items.is_empty() {
                "any".to_string()
            } else {
                items.join(",")
            }
        };

        write!(
            f,
            "PersonalizeConfig {{ bitrates: {} (±{}), max_resolution: {}, resolution_order: {}, audio: {}, subtitles: {}, clip: {} ({}) }}",
            list(&self.bitrates),
            self.bitrate_tolerance,
            self.max_resolution.as_deref().unwrap_or("unlimited"),
            list(&self.resolution_order),
            list(&self.audio_languages),
            list(&self.subtitle_languages),
            self.clip.as_deref().unwrap_or("none"),
            self.clip_method,
        )
    }
}

impl PersonalizeConfig {
    pub fn builder() -> PersonalizeConfigBuilder {
        PersonalizeConfigBuilder::default()
    }

    /// Whether any step is enabled.
    pub fn is_empty(&self) -> bool {
        self.bitrates.is_empty()
            && self.max_resolution.is_none()
            && self.resolution_order.is_empty()
            && self.audio_languages.is_empty()
            && self.subtitle_languages.is_empty()
            && self.clip.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersonalizeConfigBuilder {
    config: PersonalizeConfig,
}

impl PersonalizeConfigBuilder {
    pub fn bitrate(mut self, spec: impl Into<String>) -> Self {
        self.config.bitrates.push(spec.into());
        self
    }

    pub fn bitrates<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.bitrates.extend(specs.into_iter().map(Into::into));
        self
    }

    pub fn bitrate_tolerance(mut self, tolerance: u64) -> Self {
        self.config.bitrate_tolerance = tolerance;
        self
    }

    pub fn max_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.config.max_resolution = Some(resolution.into());
        self
    }

    pub fn resolution_order<I, S>(mut self, resolutions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.resolution_order = resolutions.into_iter().map(Into::into).collect();
        self
    }

    pub fn audio_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.audio_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn subtitle_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.subtitle_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn clip(mut self, clip: impl Into<String>) -> Self {
        self.config.clip = Some(clip.into());
        self
    }

    pub fn clip_method(mut self, method: ClippingMethod) -> Self {
        self.config.clip_method = method;
        self
    }

    pub fn build(self) -> PersonalizeConfig {
        self.config
    }
}
