//! Manifest text codec.
//!
//! [`parse_manifest`] and [`stringify_manifest`] convert between m3u8 text and
//! the [`Playlist`] model. Tags the model has no field for are kept as
//! [`OpaqueTag`](crate::OpaqueTag) lines and written back in place, so a
//! parse/stringify round trip keeps every tag and its order.

mod lexer;
mod parser;
pub mod tags;
mod writer;

pub use writer::format_decimal;

use crate::error::{Error, Result};
use crate::model::{ManifestType, Playlist};

/// Parse manifest text into a typed playlist.
///
/// # Errors
///
/// [`Error::EmptyInput`] for empty or whitespace-only text,
/// [`Error::MalformedManifest`] for anything that is not a well-formed
/// playlist.
pub fn parse_manifest(text: &str) -> Result<Playlist> {
    parser::parse(text)
}

/// Serialize a playlist to manifest text. Every line ends with `\n`.
pub fn stringify_manifest(playlist: &Playlist) -> String {
    writer::write(playlist)
}

/// Discriminant of an already parsed playlist.
pub fn get_manifest_type(playlist: &Playlist) -> ManifestType {
    playlist.manifest_type()
}

/// Classify raw manifest text without building the model.
///
/// # Errors
///
/// [`Error::EmptyInput`] for empty text and [`Error::InvalidPlaylist`] when the
/// text carries neither variant stream tags nor segment tags, or both.
pub fn detect_manifest_type(text: &str) -> Result<ManifestType> {
    let lines = lexer::tokenize(text);
    if lines.is_empty() {
        return Err(Error::EmptyInput);
    }
    lexer::classify(&lines).map_err(|(_, reason)| Error::invalid_playlist(reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RenditionKind, Resolution};
    use crate::test_utils::{
        BUMPER_MEDIA, BYTE_RANGE_MEDIA, ENCRYPTED_MEDIA, MASTER_WITH_RENDITIONS, VOD_MEDIA,
        init_test_tracing,
    };

    fn round_trip(text: &str) -> (Playlist, String) {
        let parsed = parse_manifest(text).unwrap();
        let written = stringify_manifest(&parsed);
        let reparsed = parse_manifest(&written).unwrap();
        assert_eq!(parsed, reparsed, "round trip changed the model:\n{written}");
        (parsed, written)
    }

    #[test]
    fn test_parse_master() {
        init_test_tracing!();
        let playlist = parse_manifest(MASTER_WITH_RENDITIONS).unwrap();
        let master = playlist.as_master().unwrap();

        assert_eq!(master.version, Some(6));
        assert!(master.independent_segments);
        assert_eq!(master.header_tags.len(), 1);
        assert_eq!(master.header_tags[0].position, 2);
        assert_eq!(master.renditions.len(), 6);
        assert_eq!(master.renditions_of(RenditionKind::Subtitles).count(), 2);
        assert_eq!(master.variants.len(), 4);
        assert_eq!(master.variants[1].uri, "video/720p.m3u8?token=abc");
        assert_eq!(master.variants[1].resolution, Some(Resolution::new(1280, 720)));
        assert!(master.variants[3].is_i_frame);
        assert_eq!(master.variants[3].uri, "video/360p-iframes.m3u8");
        assert!(master.dangling_group_references().is_empty());
    }

    #[test]
    fn test_parse_media() {
        let playlist = parse_manifest(ENCRYPTED_MEDIA).unwrap();
        let media = playlist.as_media().unwrap();

        assert_eq!(media.target_duration, 6);
        assert_eq!(media.media_sequence, 100);
        assert_eq!(media.segments.len(), 5);
        assert_eq!(media.total_duration(), 30.0);
        assert!(media.end_list);
        assert_eq!(media.header_tags[0].raw, "#X-VENDOR-HEADER:1");
        assert_eq!(media.segments[0].map.as_deref(), Some(r#"URI="init.mp4""#));
        assert!(media.segments[0].program_date_time.is_some());
        assert_eq!(media.segments[1].opaque_tags.len(), 1);
        assert_eq!(media.segments[1].opaque_tags[0].position, 0);
        assert!(media.effective_keys_at(2)[0].contains("k1"));
        assert!(media.effective_keys_at(3)[0].contains("k2"));
    }

    #[test]
    fn test_round_trip_fixtures() {
        for fixture in [
            MASTER_WITH_RENDITIONS,
            VOD_MEDIA,
            ENCRYPTED_MEDIA,
            BUMPER_MEDIA,
            BYTE_RANGE_MEDIA,
        ] {
            round_trip(fixture);
        }
    }

    #[test]
    fn test_round_trip_keeps_sub_millisecond_date_times() {
        let text = "#EXTM3U
#EXT-X-TARGETDURATION:4
#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:00.123456Z
#EXTINF:4.0,
a.ts
#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:04.123456789Z
#EXTINF:4.0,
b.ts
";
        let (_, written) = round_trip(text);
        assert!(written.contains("#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:00.123456Z\n"));
        assert!(written.contains("#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:04.123456789Z\n"));

        let (_, written) = round_trip(ENCRYPTED_MEDIA);
        assert!(written.contains("#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:00.000Z\n"));
    }

    #[test]
    fn test_round_trip_keeps_unknown_tag_placement() {
        let text = "#EXTM3U
#EXT-X-TARGETDURATION:10
# generated by packager
#EXTINF:9.009,
#EXT-X-BITRATE:1200
first.ts
#EXT-X-CUE-OUT:30
#EXTINF:10,
second.ts
#EXT-X-CUE-IN
#EXT-X-ENDLIST
# end
";
        let (parsed, written) = round_trip(text);
        let media = parsed.as_media().unwrap();
        assert_eq!(media.header_tags[0].raw, "# generated by packager");
        assert_eq!(media.segments[0].opaque_tags[0].position, 1);
        assert_eq!(media.trailer_tags.len(), 2);

        let lines: Vec<&str> = written.lines().collect();
        let cue_out = lines.iter().position(|l| *l == "#EXT-X-CUE-OUT:30").unwrap();
        assert_eq!(lines[cue_out + 1], "#EXTINF:10.0,");
        let bitrate = lines.iter().position(|l| *l == "#EXT-X-BITRATE:1200").unwrap();
        assert_eq!(lines[bitrate - 1], "#EXTINF:9.009,");
        assert_eq!(lines[bitrate + 1], "first.ts");
        assert_eq!(lines.last(), Some(&"# end"));
        assert_eq!(lines[lines.len() - 2], "#EXT-X-ENDLIST");
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let text = "\u{feff}#EXTM3U\r\n\r\n#EXT-X-TARGETDURATION:4\r\n#EXTINF:4,\r\n\r\na.ts\r\n";
        let playlist = parse_manifest(text).unwrap();
        assert_eq!(playlist.as_media().unwrap().segments[0].uri, "a.ts");
    }

    #[test]
    fn test_media_without_segments() {
        let playlist = parse_manifest("#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXT-X-ENDLIST\n").unwrap();
        let media = playlist.as_media().unwrap();
        assert!(media.segments.is_empty());
        assert!(media.end_list);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_manifest(""), Err(Error::EmptyInput));
        assert_eq!(parse_manifest(" \n\r\n"), Err(Error::EmptyInput));

        let cases = [
            ("#EXT-X-TARGETDURATION:4\n#EXTINF:4,\na.ts", 1),
            ("#EXTM3U\n#EXT-X-VERSION:3", 2),
            ("#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4,", 3),
            ("#EXTM3U\n#EXT-X-TARGETDURATION:4\na.ts", 3),
            ("#EXTM3U\n#EXT-X-TARGETDURATION:x\n#EXTINF:4,\na.ts", 2),
            ("#EXTM3U\n#EXTINF:4,\na.ts", 1),
            ("#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4,\n#EXTINF:4,\na.ts", 4),
            ("#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXT-X-ENDLIST\n#EXTINF:4,\na.ts", 4),
            ("#EXTM3U\n#EXT-X-STREAM-INF:RESOLUTION=1x1\na.m3u8", 2),
            ("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1", 2),
            ("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\na.m3u8\nb.m3u8", 4),
            ("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\na.m3u8\n#EXTINF:4,\nb.ts", 4),
        ];

        for (text, line) in cases {
            match parse_manifest(text) {
                Err(Error::MalformedManifest { line: actual, .. }) => {
                    assert_eq!(actual, line, "wrong line for {text:?}")
                }
                other => panic!("expected malformed manifest for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_detect_manifest_type() {
        assert_eq!(
            detect_manifest_type(MASTER_WITH_RENDITIONS),
            Ok(ManifestType::Master)
        );
        assert_eq!(detect_manifest_type(VOD_MEDIA), Ok(ManifestType::Media));
        assert_eq!(detect_manifest_type(""), Err(Error::EmptyInput));
        assert!(matches!(
            detect_manifest_type("#EXTM3U\n#EXT-X-VERSION:3"),
            Err(Error::InvalidPlaylist(_))
        ));

        let playlist = parse_manifest(VOD_MEDIA).unwrap();
        assert_eq!(get_manifest_type(&playlist), ManifestType::Media);
        assert_eq!(get_manifest_type(&playlist).to_string(), "Media Manifest");
    }

    #[test]
    fn test_output_accepted_by_m3u8_rs() {
        let master = stringify_manifest(&parse_manifest(MASTER_WITH_RENDITIONS).unwrap());
        match m3u8_rs::parse_playlist_res(master.as_bytes()) {
            Ok(m3u8_rs::Playlist::MasterPlaylist(pl)) => {
                assert_eq!(pl.variants.len(), 4);
                assert_eq!(pl.alternatives.len(), 6);
            }
            other => panic!("m3u8-rs rejected master output: {other:?}"),
        }

        let media = stringify_manifest(&parse_manifest(ENCRYPTED_MEDIA).unwrap());
        match m3u8_rs::parse_playlist_res(media.as_bytes()) {
            Ok(m3u8_rs::Playlist::MediaPlaylist(pl)) => {
                assert_eq!(pl.segments.len(), 5);
                assert_eq!(pl.media_sequence, 100);
                assert!(pl.end_list);
            }
            other => panic!("m3u8-rs rejected media output: {other:?}"),
        }
    }
}
