//! Fixture manifests and builders shared by the tests of this workspace.

use crate::model::{MediaPlaylist, Segment};

/// Macro to initialize tracing for tests
///
/// Usage:
/// - `init_test_tracing!()` - uses DEBUG level (default)
/// - `init_test_tracing!(INFO)` - uses specified level
#[macro_export]
macro_rules! init_test_tracing {
    () => {
        init_test_tracing!(DEBUG);
    };
    ($level:ident) => {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::$level)
            .with_test_writer()
            .try_init();
    };
}

// Re-export the macro
pub use crate::init_test_tracing;

/// Master playlist with audio and subtitle renditions, an unknown session tag
/// and an I-frame variant.
pub const MASTER_WITH_RENDITIONS: &str = r#"#EXTM3U
#EXT-X-VERSION:6
#EXT-X-INDEPENDENT-SEGMENTS
#EXT-X-SESSION-DATA:DATA-ID="com.example.title",VALUE="Demo"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",NAME="English",LANGUAGE="en",DEFAULT=YES,AUTOSELECT=YES,URI="audio/en.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",NAME="Francais",LANGUAGE="fre",AUTOSELECT=YES,URI="audio/fre.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",NAME="Francais (AD)",LANGUAGE="fre",URI="audio/fre-ad.m3u8"
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID="aac",NAME="Espanol",LANGUAGE="es",URI="audio/es.m3u8"
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID="subs",NAME="English",LANGUAGE="en",URI="subs/en.m3u8"
#EXT-X-MEDIA:TYPE=SUBTITLES,GROUP-ID="subs",NAME="Deutsch",LANGUAGE="de",URI="subs/de.m3u8"
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360,CODECS="avc1.4d401e,mp4a.40.2",AUDIO="aac",SUBTITLES="subs"
video/360p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720,CODECS="avc1.4d401f,mp4a.40.2",AUDIO="aac",SUBTITLES="subs"
video/720p.m3u8?token=abc
#EXT-X-STREAM-INF:BANDWIDTH=5000000,RESOLUTION=1920x1080,CODECS="avc1.640028,mp4a.40.2",AUDIO="aac",SUBTITLES="subs"
video/1080p.m3u8
#EXT-X-I-FRAME-STREAM-INF:BANDWIDTH=150000,RESOLUTION=640x360,URI="video/360p-iframes.m3u8"
"#;

/// Finished VOD media playlist of four 4 second segments.
pub const VOD_MEDIA: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:4
#EXT-X-MEDIA-SEQUENCE:0
#EXT-X-PLAYLIST-TYPE:VOD
#EXTINF:4.0,
segment0.ts
#EXTINF:4.0,
segment1.ts
#EXTINF:4.0,
segment2.ts
#EXTINF:4.0,
segment3.ts
#EXT-X-ENDLIST
";

/// Encrypted fMP4 media playlist with a program date-time, a date range and
/// a vendor tag.
pub const ENCRYPTED_MEDIA: &str = r#"#EXTM3U
#EXT-X-VERSION:7
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:100
#X-VENDOR-HEADER:1
#EXT-X-KEY:METHOD=AES-128,URI="https://keys.example.com/k1",IV=0x00000000000000000000000000000001
#EXT-X-MAP:URI="init.mp4"
#EXT-X-PROGRAM-DATE-TIME:2024-05-01T12:00:00.000Z
#EXTINF:6.0,
seg100.m4s
#EXT-X-DATERANGE:ID="splice-1",START-DATE="2024-05-01T12:00:06.000Z",DURATION=6.0
#EXTINF:6.0,
seg101.m4s
#EXTINF:6.0,
seg102.m4s
#EXT-X-KEY:METHOD=AES-128,URI="https://keys.example.com/k2",IV=0x00000000000000000000000000000002
#EXTINF:6.0,
seg103.m4s
#EXTINF:6.0,
seg104.m4s
#EXT-X-ENDLIST
"#;

/// Short bumper (two 2 second segments).
pub const BUMPER_MEDIA: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:2
#EXTINF:2.0,
https://ads.example.com/bumper0.ts
#EXTINF:2.0,
https://ads.example.com/bumper1.ts
#EXT-X-ENDLIST
";

/// Three 4 second byte ranges of one file, offsets implied after the first.
pub const BYTE_RANGE_MEDIA: &str = "#EXTM3U
#EXT-X-VERSION:4
#EXT-X-TARGETDURATION:4
#EXT-X-BYTERANGE:1000@0
#EXTINF:4.0,
main.ts
#EXT-X-BYTERANGE:1000
#EXTINF:4.0,
main.ts
#EXT-X-BYTERANGE:1000
#EXTINF:4.0,
main.ts
#EXT-X-ENDLIST
";

/// Build a finished media playlist named `{prefix}{index}.ts` from durations.
pub fn media_playlist_from_durations(prefix: &str, durations: &[f64]) -> MediaPlaylist {
    let mut playlist = MediaPlaylist::new(0);
    playlist.segments = durations
        .iter()
        .enumerate()
        .map(|(idx, duration)| Segment::new(format!("{prefix}{idx}.ts"), *duration))
        .collect();
    playlist.target_duration = playlist.required_target_duration();
    playlist.end_list = true;
    playlist
}

/// Segment URIs of a media playlist, in order.
pub fn segment_uris(playlist: &MediaPlaylist) -> Vec<&str> {
    playlist.segments.iter().map(|s| s.uri.as_str()).collect()
}
