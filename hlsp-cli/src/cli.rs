use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{BumperSource, parse_bumper_arg};

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    name = "hlsp",
    version,
    about = "Personalize HLS manifests",
    long_about = "Filter variants and renditions, splice bumpers and clip HLS playlists.\n\
                  \n\
                  Input is read from a file, or from stdin when the path is '-'.\n\
                  The result is written to stdout unless --output is given."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply personalization to a manifest
    Apply(ApplyArgs),

    /// Print a summary of a manifest
    Inspect {
        /// Manifest path, or '-' for stdin
        input: String,

        /// Dump the parsed playlist as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Flags of `hlsp apply`. Every flag overrides the matching setting of the
/// configuration file.
#[derive(clap::Args, Debug, Default)]
pub struct ApplyArgs {
    /// Manifest path, or '-' for stdin
    pub input: String,

    /// Write the manifest here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep variants matching a bitrate spec: N, LO-HI, LO- or -HI
    #[arg(short, long = "bitrate", value_name = "SPEC", allow_hyphen_values = true)]
    pub bitrates: Vec<String>,

    /// Tolerance in bits per second for exact bitrate specs
    #[arg(long, value_name = "N")]
    pub tolerance: Option<u64>,

    /// Drop variants larger than this resolution
    #[arg(long, value_name = "WxH")]
    pub max_resolution: Option<String>,

    /// Move variants of these resolutions to the top, in order
    #[arg(long = "order", value_name = "WxH")]
    pub resolution_order: Vec<String>,

    /// Keep audio renditions in these languages
    #[arg(long = "audio-lang", value_name = "LANG")]
    pub audio_languages: Vec<String>,

    /// Keep subtitle renditions in these languages
    #[arg(long = "subtitle-lang", value_name = "LANG")]
    pub subtitle_languages: Vec<String>,

    /// Splice a media playlist at an offset in seconds ('end' or -1 for post-roll)
    #[arg(long = "bumper", value_name = "PATH@OFFSET", value_parser = parse_bumper_arg)]
    pub bumpers: Vec<BumperSource>,

    /// Clip window in seconds: START or START-END
    #[arg(long, value_name = "START[-END]", allow_hyphen_values = true)]
    pub clip: Option<String>,

    /// PRECISE or SEGMENT_BOUNDARIES
    #[arg(long, value_name = "METHOD")]
    pub clip_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let args = Args::parse_from([
            "hlsp",
            "apply",
            "master.m3u8",
            "-o",
            "out.m3u8",
            "--bitrate",
            "800000",
            "--bitrate",
            "2000000-",
            "--order",
            "1920x1080",
            "--audio-lang",
            "en",
            "--bumper",
            "ad.m3u8@end",
            "--clip",
            "10-20",
            "--clip-method",
            "precise",
            "-v",
        ]);

        assert!(args.verbose);
        let Commands::Apply(apply) = args.command else {
            panic!("expected apply");
        };
        assert_eq!(apply.input, "master.m3u8");
        assert_eq!(apply.output, Some(PathBuf::from("out.m3u8")));
        assert_eq!(apply.bitrates, ["800000", "2000000-"]);
        assert_eq!(apply.resolution_order, ["1920x1080"]);
        assert_eq!(apply.audio_languages, ["en"]);
        assert_eq!(apply.bumpers.len(), 1);
        assert_eq!(apply.clip.as_deref(), Some("10-20"));
        assert_eq!(apply.clip_method.as_deref(), Some("precise"));
    }

    #[test]
    fn test_bumper_arg_is_validated() {
        let result = Args::try_parse_from(["hlsp", "apply", "-", "--bumper", "ad.m3u8"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["hlsp", "inspect", "-", "-v", "-q"]);
        assert!(result.is_err());
    }
}
