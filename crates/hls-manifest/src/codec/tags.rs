//! Tag names understood by the codec. Anything else is kept as an opaque line.

pub const EXTM3U: &str = "#EXTM3U";
pub const VERSION: &str = "#EXT-X-VERSION";
pub const INDEPENDENT_SEGMENTS: &str = "#EXT-X-INDEPENDENT-SEGMENTS";
pub const START: &str = "#EXT-X-START";

// Master playlist
pub const STREAM_INF: &str = "#EXT-X-STREAM-INF";
pub const I_FRAME_STREAM_INF: &str = "#EXT-X-I-FRAME-STREAM-INF";
pub const MEDIA: &str = "#EXT-X-MEDIA";

// Media playlist header
pub const TARGET_DURATION: &str = "#EXT-X-TARGETDURATION";
pub const MEDIA_SEQUENCE: &str = "#EXT-X-MEDIA-SEQUENCE";
pub const DISCONTINUITY_SEQUENCE: &str = "#EXT-X-DISCONTINUITY-SEQUENCE";
pub const PLAYLIST_TYPE: &str = "#EXT-X-PLAYLIST-TYPE";
pub const I_FRAMES_ONLY: &str = "#EXT-X-I-FRAMES-ONLY";
pub const ENDLIST: &str = "#EXT-X-ENDLIST";

// Media segment
pub const EXTINF: &str = "#EXTINF";
pub const DISCONTINUITY: &str = "#EXT-X-DISCONTINUITY";
pub const KEY: &str = "#EXT-X-KEY";
pub const MAP: &str = "#EXT-X-MAP";
pub const PROGRAM_DATE_TIME: &str = "#EXT-X-PROGRAM-DATE-TIME";
pub const BYTERANGE: &str = "#EXT-X-BYTERANGE";

/// Tags whose presence marks a master playlist.
pub const MASTER_MARKERS: [&str; 3] = [STREAM_INF, I_FRAME_STREAM_INF, MEDIA];

/// Tags whose presence marks a media playlist.
pub const MEDIA_MARKERS: [&str; 2] = [EXTINF, TARGET_DURATION];
