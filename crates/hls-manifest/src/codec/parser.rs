//! Builds the typed model from tokenized lines.

use std::mem;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

use super::lexer::{self, Line, Token, attributes, number, required_value, yes_no};
use super::tags;
use crate::error::{Error, Result};
use crate::model::{
    AttributeList, AttributeValue, ByteRange, ManifestType, MasterPlaylist, MediaPlaylist,
    MediaPlaylistType, OpaqueTag, Playlist, Rendition, RenditionKind, Resolution, Segment,
    StartOffset, Variant,
};

pub(crate) fn parse(text: &str) -> Result<Playlist> {
    let lines = lexer::tokenize(text);
    let body = lexer::strip_header(&lines)?;
    let kind = lexer::classify(body).map_err(|(line, reason)| Error::malformed(line, reason))?;

    let playlist = match kind {
        ManifestType::Master => Playlist::Master(MasterBuilder::default().build(body)?),
        ManifestType::Media => Playlist::Media(MediaBuilder::new().build(body)?),
    };

    debug!(
        manifest_type = %kind,
        lines = lines.len(),
        "Parsed manifest"
    );
    Ok(playlist)
}

fn take_required(attrs: &mut AttributeList, name: &str, tag: &str, line: usize) -> Result<String> {
    attrs
        .take(name)
        .map(AttributeValue::into_string)
        .ok_or_else(|| Error::malformed(line, format!("{tag} is missing the {name} attribute")))
}

fn take_number<T: FromStr>(attrs: &mut AttributeList, name: &str, line: usize) -> Result<Option<T>> {
    attrs
        .take(name)
        .map(|value| number(name, value.as_str(), line))
        .transpose()
}

fn take_flag(attrs: &mut AttributeList, name: &str, line: usize) -> Result<bool> {
    Ok(attrs
        .take(name)
        .map(|value| yes_no(name, value.as_str(), line))
        .transpose()?
        .unwrap_or(false))
}

fn parse_rendition(value: Option<&str>, line: usize) -> Result<Rendition> {
    let mut attrs = attributes(value, line)?;

    let kind_text = take_required(&mut attrs, "TYPE", tags::MEDIA, line)?;
    let kind = kind_text
        .parse::<RenditionKind>()
        .map_err(|_| Error::malformed(line, format!("unknown rendition TYPE {kind_text:?}")))?;
    let group_id = take_required(&mut attrs, "GROUP-ID", tags::MEDIA, line)?;
    let name = take_required(&mut attrs, "NAME", tags::MEDIA, line)?;

    let mut rendition = Rendition::new(kind, group_id, name);
    rendition.language = attrs.take("LANGUAGE").map(AttributeValue::into_string);
    rendition.uri = attrs.take("URI").map(AttributeValue::into_string);
    rendition.is_default = take_flag(&mut attrs, "DEFAULT", line)?;
    rendition.autoselect = take_flag(&mut attrs, "AUTOSELECT", line)?;
    rendition.forced = take_flag(&mut attrs, "FORCED", line)?;
    rendition.other_attributes = attrs;

    Ok(rendition)
}

fn parse_variant(value: Option<&str>, line: usize, is_i_frame: bool) -> Result<Variant> {
    let tag = if is_i_frame {
        tags::I_FRAME_STREAM_INF
    } else {
        tags::STREAM_INF
    };
    let mut attrs = attributes(value, line)?;

    let bandwidth = take_required(&mut attrs, "BANDWIDTH", tag, line)?;
    let bandwidth = number("BANDWIDTH", &bandwidth, line)?;
    let uri = if is_i_frame {
        take_required(&mut attrs, "URI", tag, line)?
    } else {
        String::new()
    };

    let mut variant = Variant::new(uri, bandwidth);
    variant.is_i_frame = is_i_frame;
    variant.average_bandwidth = take_number(&mut attrs, "AVERAGE-BANDWIDTH", line)?;
    variant.resolution = attrs
        .take("RESOLUTION")
        .map(|value| {
            value
                .as_str()
                .parse::<Resolution>()
                .map_err(|_| Error::malformed(line, format!("invalid RESOLUTION {:?}", value.as_str())))
        })
        .transpose()?;
    variant.codecs = attrs.take("CODECS").map(AttributeValue::into_string);
    variant.frame_rate = take_number(&mut attrs, "FRAME-RATE", line)?;
    variant.audio_group_id = attrs.take("AUDIO").map(AttributeValue::into_string);
    variant.subtitle_group_id = attrs.take("SUBTITLES").map(AttributeValue::into_string);
    variant.other_attributes = attrs;

    Ok(variant)
}

#[derive(Default)]
struct MasterBuilder {
    playlist: MasterPlaylist,
    /// Recognized header lines seen so far.
    header_known: usize,
    seen_entity: bool,
    /// Unknown lines waiting for the next rendition or variant.
    pending: Vec<String>,
    /// `#EXT-X-STREAM-INF` waiting for its URI line.
    open_variant: Option<(Variant, usize)>,
}

impl MasterBuilder {
    fn build(mut self, lines: &[Line<'_>]) -> Result<MasterPlaylist> {
        for line in lines {
            match line.token {
                Token::Tag { name, value, raw } => self.tag(name, value, raw, line.number)?,
                Token::Comment(raw) => self.opaque(raw),
                Token::Uri(uri) => self.uri(uri, line.number)?,
            }
        }

        if let Some((_, line)) = self.open_variant {
            return Err(Error::malformed(
                line,
                "#EXT-X-STREAM-INF is not followed by a URI",
            ));
        }

        self.playlist.trailer_tags = self
            .pending
            .into_iter()
            .map(|raw| OpaqueTag::new(0, raw))
            .collect();
        Ok(self.playlist)
    }

    fn tag(&mut self, name: &str, value: Option<&str>, raw: &str, line: usize) -> Result<()> {
        match name {
            tags::VERSION => {
                self.playlist.version = Some(number(name, required_value(name, value, line)?, line)?);
                self.header_line();
            }
            tags::INDEPENDENT_SEGMENTS => {
                self.playlist.independent_segments = true;
                self.header_line();
            }
            tags::MEDIA => {
                self.ensure_no_open_variant()?;
                let mut rendition = parse_rendition(value, line)?;
                rendition.opaque_tags = self.take_pending();
                self.playlist.renditions.push(rendition);
            }
            tags::STREAM_INF => {
                self.ensure_no_open_variant()?;
                let mut variant = parse_variant(value, line, false)?;
                variant.opaque_tags = self.take_pending();
                self.open_variant = Some((variant, line));
            }
            tags::I_FRAME_STREAM_INF => {
                self.ensure_no_open_variant()?;
                let mut variant = parse_variant(value, line, true)?;
                variant.opaque_tags = self.take_pending();
                self.playlist.variants.push(variant);
            }
            _ => self.opaque(raw),
        }
        Ok(())
    }

    fn uri(&mut self, uri: &str, line: usize) -> Result<()> {
        let (mut variant, _) = self.open_variant.take().ok_or_else(|| {
            Error::malformed(line, "URI line without a preceding #EXT-X-STREAM-INF")
        })?;
        variant.uri = uri.to_string();
        self.playlist.variants.push(variant);
        Ok(())
    }

    fn opaque(&mut self, raw: &str) {
        trace!(raw, "Keeping unrecognized master line");
        if let Some((variant, _)) = self.open_variant.as_mut() {
            // between the stream tag and its URI
            variant.opaque_tags.push(OpaqueTag::new(1, raw));
        } else if !self.seen_entity {
            self.playlist
                .header_tags
                .push(OpaqueTag::new(self.header_known, raw));
        } else {
            self.pending.push(raw.to_string());
        }
    }

    fn header_line(&mut self) {
        if !self.seen_entity {
            self.header_known += 1;
        }
    }

    fn take_pending(&mut self) -> Vec<OpaqueTag> {
        self.seen_entity = true;
        mem::take(&mut self.pending)
            .into_iter()
            .map(|raw| OpaqueTag::new(0, raw))
            .collect()
    }

    fn ensure_no_open_variant(&self) -> Result<()> {
        match &self.open_variant {
            Some((_, line)) => Err(Error::malformed(
                *line,
                "#EXT-X-STREAM-INF is not followed by a URI",
            )),
            None => Ok(()),
        }
    }
}

/// Segment tags collected until the URI line closes the segment.
#[derive(Default)]
struct PendingSegment {
    first_line: Option<usize>,
    known_lines: usize,
    inf: Option<(f64, Option<String>, usize)>,
    discontinuity: bool,
    keys: Vec<String>,
    map: Option<String>,
    program_date_time: Option<DateTime<FixedOffset>>,
    byte_range: Option<ByteRange>,
    opaque_tags: Vec<OpaqueTag>,
}

impl PendingSegment {
    fn mark(&mut self, line: usize) {
        self.known_lines += 1;
        self.first_line.get_or_insert(line);
    }
}

struct MediaBuilder {
    playlist: MediaPlaylist,
    target_duration: Option<u64>,
    header_known: usize,
    segment_started: bool,
    after_endlist: bool,
    pending: PendingSegment,
}

impl MediaBuilder {
    fn new() -> Self {
        Self {
            playlist: MediaPlaylist::new(0),
            target_duration: None,
            header_known: 0,
            segment_started: false,
            after_endlist: false,
            pending: PendingSegment::default(),
        }
    }

    fn build(mut self, lines: &[Line<'_>]) -> Result<MediaPlaylist> {
        for line in lines {
            match line.token {
                Token::Tag { name, value, raw } => self.tag(name, value, raw, line.number)?,
                Token::Comment(raw) => self.opaque(raw),
                Token::Uri(uri) => self.uri(uri, line.number)?,
            }
        }

        if let Some((_, _, line)) = self.pending.inf {
            return Err(Error::malformed(line, "#EXTINF is not followed by a URI"));
        }
        if let Some(line) = self.pending.first_line {
            return Err(Error::malformed(
                line,
                "segment tags are not followed by #EXTINF and a URI",
            ));
        }

        let leftover = mem::take(&mut self.pending.opaque_tags);
        self.playlist
            .trailer_tags
            .extend(leftover.into_iter().map(|tag| OpaqueTag::new(0, tag.raw)));

        self.playlist.target_duration = self
            .target_duration
            .ok_or_else(|| Error::malformed(1, "media playlist is missing #EXT-X-TARGETDURATION"))?;
        Ok(self.playlist)
    }

    fn tag(&mut self, name: &str, value: Option<&str>, raw: &str, line: usize) -> Result<()> {
        match name {
            tags::VERSION => {
                self.playlist.version = Some(number(name, required_value(name, value, line)?, line)?);
                self.header_line();
            }
            tags::TARGET_DURATION => {
                self.target_duration = Some(number(name, required_value(name, value, line)?, line)?);
                self.header_line();
            }
            tags::MEDIA_SEQUENCE => {
                self.playlist.media_sequence = number(name, required_value(name, value, line)?, line)?;
                self.header_line();
            }
            tags::DISCONTINUITY_SEQUENCE => {
                self.playlist.discontinuity_sequence =
                    number(name, required_value(name, value, line)?, line)?;
                self.header_line();
            }
            tags::PLAYLIST_TYPE => {
                let value = required_value(name, value, line)?;
                self.playlist.playlist_type = Some(
                    value
                        .parse::<MediaPlaylistType>()
                        .map_err(|_| Error::malformed(line, format!("unknown playlist type {value:?}")))?,
                );
                self.header_line();
            }
            tags::I_FRAMES_ONLY => {
                self.playlist.i_frames_only = true;
                self.header_line();
            }
            tags::INDEPENDENT_SEGMENTS => {
                self.playlist.independent_segments = true;
                self.header_line();
            }
            tags::START => {
                let mut attrs = attributes(value, line)?;
                let offset = take_required(&mut attrs, "TIME-OFFSET", name, line)?;
                self.playlist.start = Some(StartOffset {
                    time_offset: number("TIME-OFFSET", &offset, line)?,
                    precise: take_flag(&mut attrs, "PRECISE", line)?,
                });
                self.header_line();
            }
            tags::EXTINF => {
                self.segment_tag(line)?;
                if self.pending.inf.is_some() {
                    return Err(Error::malformed(line, "second #EXTINF before the segment URI"));
                }
                let (duration, title) = parse_extinf(required_value(name, value, line)?, line)?;
                self.pending.inf = Some((duration, title, line));
                self.pending.mark(line);
            }
            tags::DISCONTINUITY => {
                self.segment_tag(line)?;
                self.pending.discontinuity = true;
                self.pending.mark(line);
            }
            tags::KEY => {
                self.segment_tag(line)?;
                self.pending
                    .keys
                    .push(required_value(name, value, line)?.to_string());
                self.pending.mark(line);
            }
            tags::MAP => {
                self.segment_tag(line)?;
                self.pending.map = Some(required_value(name, value, line)?.to_string());
                self.pending.mark(line);
            }
            tags::PROGRAM_DATE_TIME => {
                self.segment_tag(line)?;
                self.pending.program_date_time =
                    Some(parse_date_time(required_value(name, value, line)?, line)?);
                self.pending.mark(line);
            }
            tags::BYTERANGE => {
                self.segment_tag(line)?;
                let value = required_value(name, value, line)?;
                self.pending.byte_range = Some(
                    value
                        .parse()
                        .map_err(|_| Error::malformed(line, format!("invalid byte range {value:?}")))?,
                );
                self.pending.mark(line);
            }
            tags::ENDLIST => self.end_list(line)?,
            _ => self.opaque(raw),
        }
        Ok(())
    }

    fn uri(&mut self, uri: &str, line: usize) -> Result<()> {
        if self.after_endlist {
            return Err(Error::malformed(line, "segment after #EXT-X-ENDLIST"));
        }
        let pending = mem::take(&mut self.pending);
        let (duration, title, _) = pending
            .inf
            .ok_or_else(|| Error::malformed(line, "URI line without a preceding #EXTINF"))?;

        self.playlist.segments.push(Segment {
            uri: uri.to_string(),
            duration,
            title,
            discontinuity: pending.discontinuity,
            byte_range: pending.byte_range,
            program_date_time: pending.program_date_time,
            keys: pending.keys,
            map: pending.map,
            opaque_tags: pending.opaque_tags,
        });
        Ok(())
    }

    fn end_list(&mut self, line: usize) -> Result<()> {
        if let Some(first) = self.pending.first_line {
            return Err(Error::malformed(
                first,
                format!("segment tags are not followed by a URI before #EXT-X-ENDLIST (line {line})"),
            ));
        }
        let pending = mem::take(&mut self.pending.opaque_tags);
        self.playlist
            .trailer_tags
            .extend(pending.into_iter().map(|tag| OpaqueTag::new(0, tag.raw)));
        self.playlist.end_list = true;
        self.after_endlist = true;
        Ok(())
    }

    fn opaque(&mut self, raw: &str) {
        trace!(raw, "Keeping unrecognized media line");
        if self.after_endlist {
            self.playlist.trailer_tags.push(OpaqueTag::new(1, raw));
        } else if !self.segment_started {
            self.playlist
                .header_tags
                .push(OpaqueTag::new(self.header_known, raw));
        } else {
            let position = self.pending.known_lines;
            self.pending.opaque_tags.push(OpaqueTag::new(position, raw));
        }
    }

    fn segment_tag(&mut self, line: usize) -> Result<()> {
        if self.after_endlist {
            return Err(Error::malformed(line, "segment after #EXT-X-ENDLIST"));
        }
        self.segment_started = true;
        Ok(())
    }

    fn header_line(&mut self) {
        if !self.segment_started && !self.after_endlist {
            self.header_known += 1;
        }
    }
}

/// `<duration>,[<title>]`
fn parse_extinf(value: &str, line: usize) -> Result<(f64, Option<String>)> {
    let (duration, title) = match value.split_once(',') {
        Some((duration, title)) => (duration, Some(title.trim())),
        None => (value, None),
    };

    let duration: f64 = number(tags::EXTINF, duration, line)?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(Error::malformed(
            line,
            format!("segment duration must be positive, found {duration}"),
        ));
    }

    Ok((
        duration,
        title.filter(|title| !title.is_empty()).map(str::to_string),
    ))
}

fn parse_date_time(value: &str, line: usize) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|_| Error::malformed(line, format!("invalid program date-time {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extinf() {
        assert_eq!(parse_extinf("4.004,", 1).unwrap(), (4.004, None));
        assert_eq!(
            parse_extinf("10,Intro", 1).unwrap(),
            (10.0, Some("Intro".to_string()))
        );
        assert_eq!(parse_extinf("6", 1).unwrap(), (6.0, None));
        assert!(parse_extinf("0,", 3).is_err());
        assert!(parse_extinf("-1,", 3).is_err());
        assert!(parse_extinf("inf,", 3).is_err());
        assert!(matches!(
            parse_extinf("abc,", 7),
            Err(Error::MalformedManifest { line: 7, .. })
        ));
    }

    #[test]
    fn test_parse_date_time_accepts_compact_offset() {
        let rfc = parse_date_time("2024-03-01T10:00:00.500Z", 1).unwrap();
        let compact = parse_date_time("2024-03-01T10:00:00.500+0000", 1).unwrap();
        assert_eq!(rfc, compact);
        assert!(parse_date_time("yesterday", 1).is_err());
    }

    #[test]
    fn test_rendition_attributes() {
        let rendition = parse_rendition(
            Some(r#"TYPE=AUDIO,GROUP-ID="aac",NAME="English",LANGUAGE="en",DEFAULT=YES,AUTOSELECT=NO,CHANNELS="2",URI="en.m3u8""#),
            2,
        )
        .unwrap();

        assert_eq!(rendition.kind, RenditionKind::Audio);
        assert_eq!(rendition.group_id, "aac");
        assert_eq!(rendition.language.as_deref(), Some("en"));
        assert_eq!(rendition.uri.as_deref(), Some("en.m3u8"));
        assert!(rendition.is_default);
        assert!(!rendition.autoselect);
        assert_eq!(rendition.other_attributes.to_string(), r#"CHANNELS="2""#);

        let missing_name = parse_rendition(Some(r#"TYPE=AUDIO,GROUP-ID="aac""#), 4);
        assert!(matches!(
            missing_name,
            Err(Error::MalformedManifest { line: 4, .. })
        ));
        assert!(parse_rendition(Some(r#"TYPE=AUDIO,GROUP-ID="a",NAME="b",DEFAULT=maybe"#), 1).is_err());
    }

    #[test]
    fn test_variant_attributes() {
        let variant = parse_variant(
            Some(r#"BANDWIDTH=2000000,AVERAGE-BANDWIDTH=1800000,RESOLUTION=1280x720,FRAME-RATE=29.970,CODECS="avc1.64001f,mp4a.40.2",AUDIO="aac",HDCP-LEVEL=NONE"#),
            3,
            false,
        )
        .unwrap();

        assert_eq!(variant.bandwidth, 2_000_000);
        assert_eq!(variant.average_bandwidth, Some(1_800_000));
        assert_eq!(variant.resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(variant.frame_rate, Some(29.97));
        assert_eq!(variant.audio_group_id.as_deref(), Some("aac"));
        assert_eq!(variant.other_attributes.to_string(), "HDCP-LEVEL=NONE");

        assert!(parse_variant(Some("RESOLUTION=1x1"), 3, false).is_err());
        assert!(parse_variant(Some("BANDWIDTH=1"), 3, true).is_err());
        assert_eq!(
            parse_variant(Some(r#"BANDWIDTH=1,URI="i.m3u8""#), 3, true)
                .unwrap()
                .uri,
            "i.m3u8"
        );
    }
}
