use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::Path;

use hls_manifest::{
    MasterPlaylist, MediaPlaylist, Playlist, RenditionKind, format_decimal, parse_manifest,
    stringify_manifest,
};
use hls_personalize::{Bumper, ManifestPipeline};
use tracing::{debug, info};

use crate::cli::ApplyArgs;
use crate::config::{AppConfig, BumperSource};
use crate::error::{AppError, Result};

/// Read a manifest from `input`, or from stdin when it is `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    std::fs::read_to_string(input).map_err(|source| AppError::ReadFile {
        path: input.into(),
        source,
    })
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Load a bumper playlist from disk. Bumpers must be media playlists.
pub fn load_bumper(source: &BumperSource) -> Result<Bumper> {
    let text = read_input(&source.path.to_string_lossy())?;
    match parse_manifest(&text)? {
        Playlist::Media(media) => Ok(Bumper::new(media, source.after_seconds)),
        Playlist::Master(_) => Err(AppError::InvalidInput(format!(
            "bumper {} is a master playlist",
            source.path.display()
        ))),
    }
}

/// Personalize one manifest and return the serialized result.
pub fn personalize_text(text: &str, config: &AppConfig, args: &ApplyArgs) -> Result<String> {
    let personalize = config.personalize_with(args)?;
    let bumpers = config
        .bumpers_with(args)?
        .iter()
        .map(load_bumper)
        .collect::<Result<Vec<_>>>()?;
    debug!(config = %personalize, bumpers = bumpers.len(), "Resolved request");

    let mut playlist = parse_manifest(text)?;
    let mut pipeline = ManifestPipeline::from_config_with_bumpers(&personalize, bumpers)?;
    let report = pipeline.run(&mut playlist)?;

    if !report.skipped.is_empty() {
        info!(skipped = ?report.skipped, "Some operators do not apply to a {}", playlist.manifest_type());
    }

    Ok(stringify_manifest(&playlist))
}

/// `hlsp apply`
pub fn apply(config: &AppConfig, args: &ApplyArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let output = personalize_text(&text, config, args)?;
    write_output(args.output.as_deref(), &output)
}

/// `hlsp inspect`
pub fn inspect(input: &str, json: bool) -> Result<()> {
    let playlist = parse_manifest(&read_input(input)?)?;
    let text = if json {
        let mut text = serde_json::to_string_pretty(&playlist)?;
        text.push('\n');
        text
    } else {
        summarize(&playlist)
    };
    write_output(None, &text)
}

/// Human readable overview of a playlist.
pub fn summarize(playlist: &Playlist) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", playlist.manifest_type());
    match playlist {
        Playlist::Master(master) => summarize_master(&mut out, master),
        Playlist::Media(media) => summarize_media(&mut out, media),
    }
    out
}

fn summarize_master(out: &mut String, master: &MasterPlaylist) {
    let i_frames = master.variants.iter().filter(|v| v.is_i_frame).count();
    let _ = writeln!(
        out,
        "  variants: {} ({} I-frame)",
        master.variants.len(),
        i_frames
    );
    let _ = writeln!(
        out,
        "  renditions: {} (audio {}, subtitles {})",
        master.renditions.len(),
        master.renditions_of(RenditionKind::Audio).count(),
        master.renditions_of(RenditionKind::Subtitles).count()
    );

    for variant in &master.variants {
        let resolution = variant
            .resolution
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  - {} bps {} {}",
            variant.bandwidth, resolution, variant.uri
        );
    }

    for rendition in &master.renditions {
        let _ = writeln!(
            out,
            "  - {} {} [{}] {}",
            rendition.kind,
            rendition.group_id,
            rendition.language.as_deref().unwrap_or("-"),
            rendition.name
        );
    }
}

fn summarize_media(out: &mut String, media: &MediaPlaylist) {
    let _ = writeln!(out, "  segments: {}", media.segments.len());
    let _ = writeln!(
        out,
        "  total duration: {}s",
        format_decimal(media.total_duration())
    );
    let _ = writeln!(out, "  target duration: {}s", media.target_duration);
    let _ = writeln!(out, "  media sequence: {}", media.media_sequence);
    let discontinuities = media.segments.iter().filter(|s| s.discontinuity).count();
    if discontinuities > 0 {
        let _ = writeln!(out, "  discontinuities: {discontinuities}");
    }
    let _ = writeln!(
        out,
        "  end list: {}",
        if media.end_list { "yes" } else { "no" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_bumper_arg;
    use hls_manifest::test_utils;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, text: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_apply_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = write_file(&dir, "master.m3u8", test_utils::MASTER_WITH_RENDITIONS);
        let output = dir.path().join("out.m3u8");

        let args = ApplyArgs {
            input,
            output: Some(output.clone()),
            bitrates: vec!["2500000".to_string()],
            subtitle_languages: vec!["de".to_string()],
            ..Default::default()
        };
        apply(&AppConfig::default(), &args).unwrap();

        let playlist = parse_manifest(&std::fs::read_to_string(output).unwrap()).unwrap();
        let master = playlist.as_master().unwrap();
        assert_eq!(master.variants.len(), 1);
        assert_eq!(master.variants[0].uri, "video/720p.m3u8?token=abc");
        assert_eq!(master.renditions_of(RenditionKind::Subtitles).count(), 1);
    }

    #[test]
    fn test_apply_splices_bumper_from_disk() {
        let dir = TempDir::new().unwrap();
        let bumper = write_file(&dir, "ad.m3u8", test_utils::BUMPER_MEDIA);
        let args = ApplyArgs {
            bumpers: vec![parse_bumper_arg(&format!("{bumper}@0")).unwrap()],
            ..Default::default()
        };

        let output = personalize_text(test_utils::VOD_MEDIA, &AppConfig::default(), &args).unwrap();
        let playlist = parse_manifest(&output).unwrap();
        let media = playlist.as_media().unwrap();
        assert_eq!(media.segments.len(), 6);
        assert!(media.segments[2].discontinuity);
    }

    #[test]
    fn test_master_bumper_is_rejected() {
        let dir = TempDir::new().unwrap();
        let bumper = write_file(&dir, "ad.m3u8", test_utils::MASTER_WITH_RENDITIONS);
        let source = parse_bumper_arg(&format!("{bumper}@end")).unwrap();

        assert!(matches!(load_bumper(&source), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_manifest_is_reported() {
        let result = personalize_text("not a manifest", &AppConfig::default(), &ApplyArgs::default());
        assert!(matches!(
            result,
            Err(AppError::Manifest(hls_manifest::Error::MalformedManifest { line: 1, .. }))
        ));
    }

    #[test]
    fn test_missing_input_file() {
        assert!(matches!(
            read_input("/nonexistent/master.m3u8"),
            Err(AppError::ReadFile { .. })
        ));
    }

    #[test]
    fn test_summarize_master() {
        let playlist = parse_manifest(test_utils::MASTER_WITH_RENDITIONS).unwrap();
        let summary = summarize(&playlist);

        assert!(summary.starts_with("Master Manifest\n"));
        assert!(summary.contains("  variants: 4 (1 I-frame)\n"));
        assert!(summary.contains("  renditions: 6 (audio 4, subtitles 2)\n"));
        assert!(summary.contains("  - 800000 bps 640x360 video/360p.m3u8\n"));
    }

    #[test]
    fn test_summarize_media() {
        let playlist = parse_manifest(test_utils::ENCRYPTED_MEDIA).unwrap();
        let summary = summarize(&playlist);

        assert_eq!(
            summary,
            "Media Manifest\n  segments: 5\n  total duration: 30.0s\n  target duration: 6s\n  media sequence: 100\n  end list: yes\n"
        );
    }

    #[test]
    fn test_json_dump() {
        let playlist = parse_manifest(test_utils::VOD_MEDIA).unwrap();
        let value = serde_json::to_value(&playlist).unwrap();

        assert_eq!(value["type"], "media");
        assert_eq!(value["segments"].as_array().unwrap().len(), 4);
    }
}
