use std::path::{Path, PathBuf};

use hls_personalize::{Bumper, PersonalizeConfig};
use serde::{Deserialize, Serialize};

use crate::cli::ApplyArgs;
use crate::error::{AppError, Result};

/// Contents of the `--config` file.
///
/// ```toml
/// [personalize]
/// bitrates = ["800000", "2000000-"]
/// audio_languages = ["en"]
/// clip_method = "PRECISE"
///
/// [[bumpers]]
/// path = "ads/preroll.m3u8"
/// offset = 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub personalize: PersonalizeConfig,
    pub bumpers: Vec<BumperEntry>,
}

/// A `[[bumpers]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumperEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub offset: BumperOffset,
}

/// Seconds into the primary playlist, or a keyword such as `"end"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BumperOffset {
    Seconds(f64),
    Keyword(String),
}

impl Default for BumperOffset {
    fn default() -> Self {
        Self::Seconds(0.0)
    }
}

/// A bumper playlist on disk and where to splice it.
#[derive(Debug, Clone, PartialEq)]
pub struct BumperSource {
    pub path: PathBuf,
    pub after_seconds: f64,
}

/// Parse a bumper offset. `end` and `-1` are the post-roll sentinel.
pub fn parse_offset(value: &str) -> std::result::Result<f64, String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("end") {
        return Ok(Bumper::AT_END);
    }

    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("invalid bumper offset {value:?}"))?;
    offset_from_seconds(seconds)
}

fn offset_from_seconds(seconds: f64) -> std::result::Result<f64, String> {
    if seconds == -1.0 {
        Ok(Bumper::AT_END)
    } else if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(format!("invalid bumper offset {seconds}"))
    }
}

/// Value parser for `--bumper PATH@OFFSET`. The offset follows the last `@`.
pub fn parse_bumper_arg(value: &str) -> std::result::Result<BumperSource, String> {
    let (path, offset) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected PATH@OFFSET, got {value:?}"))?;
    if path.is_empty() {
        return Err(format!("missing bumper path in {value:?}"));
    }

    Ok(BumperSource {
        path: PathBuf::from(path),
        after_seconds: parse_offset(offset)?,
    })
}

impl AppConfig {
    /// Load configuration from `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;

        // Bumper paths are relative to the configuration file.
        if let Some(base) = path.parent() {
            for bumper in &mut config.bumpers {
                if bumper.path.is_relative() {
                    bumper.path = base.join(&bumper.path);
                }
            }
        }

        Ok(config)
    }

    /// Resolve the bumper tables into splice sources.
    pub fn bumper_sources(&self) -> Result<Vec<BumperSource>> {
        self.bumpers
            .iter()
            .map(|entry| {
                let after_seconds = match &entry.offset {
                    BumperOffset::Seconds(seconds) => offset_from_seconds(*seconds),
                    BumperOffset::Keyword(keyword) => parse_offset(keyword),
                }
                .map_err(AppError::InvalidInput)?;

                Ok(BumperSource {
                    path: entry.path.clone(),
                    after_seconds,
                })
            })
            .collect()
    }

    /// Personalization settings with the command line flags laid over the file.
    ///
    /// Lists given on the command line replace the file's lists.
    pub fn personalize_with(&self, args: &ApplyArgs) -> Result<PersonalizeConfig> {
        let mut config = self.personalize.clone();

        if !args.bitrates.is_empty() {
            config.bitrates = args.bitrates.clone();
        }
        if let Some(tolerance) = args.tolerance {
            config.bitrate_tolerance = tolerance;
        }
        if args.max_resolution.is_some() {
            config.max_resolution = args.max_resolution.clone();
        }
        if !args.resolution_order.is_empty() {
            config.resolution_order = args.resolution_order.clone();
        }
        if !args.audio_languages.is_empty() {
            config.audio_languages = args.audio_languages.clone();
        }
        if !args.subtitle_languages.is_empty() {
            config.subtitle_languages = args.subtitle_languages.clone();
        }
        if args.clip.is_some() {
            config.clip = args.clip.clone();
        }
        if let Some(method) = &args.clip_method {
            config.clip_method = method.parse()?;
        }

        Ok(config)
    }

    /// Bumpers from the command line, or from the file when none were given.
    pub fn bumpers_with(&self, args: &ApplyArgs) -> Result<Vec<BumperSource>> {
        if args.bumpers.is_empty() {
            self.bumper_sources()
        } else {
            Ok(args.bumpers.clone())
        }
    }
}
