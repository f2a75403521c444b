//! Serializes the model back to manifest text in canonical order.

use chrono::{DateTime, FixedOffset, SecondsFormat, Timelike};

use super::tags;
use crate::model::{
    AttributeList, AttributeValue, MasterPlaylist, MediaPlaylist, OpaqueTag, Playlist, Rendition,
    Segment, Variant,
};

pub(crate) fn write(playlist: &Playlist) -> String {
    let mut out = String::with_capacity(estimate_len(playlist));
    push_line(&mut out, tags::EXTM3U);

    match playlist {
        Playlist::Master(master) => write_master(&mut out, master),
        Playlist::Media(media) => write_media(&mut out, media),
    }

    out
}

fn estimate_len(playlist: &Playlist) -> usize {
    match playlist {
        Playlist::Master(master) => 128 + master.variants.len() * 160 + master.renditions.len() * 120,
        Playlist::Media(media) => 128 + media.segments.len() * 48,
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Emit the recognized lines of one anchor with its opaque lines re-inserted
/// at their recorded positions.
fn write_anchor(out: &mut String, known: &[String], opaque: &[OpaqueTag]) {
    let mut ordered: Vec<&OpaqueTag> = opaque.iter().collect();
    ordered.sort_by_key(|tag| tag.position);
    let mut opaque = ordered.into_iter().peekable();

    for (idx, line) in known.iter().enumerate() {
        while let Some(tag) = opaque.next_if(|tag| tag.position <= idx) {
            push_line(out, &tag.raw);
        }
        push_line(out, line);
    }
    for tag in opaque {
        push_line(out, &tag.raw);
    }
}

/// Milliseconds unless the value carries finer digits, which are kept.
fn date_time_precision(date_time: &DateTime<FixedOffset>) -> SecondsFormat {
    match date_time.nanosecond() % 1_000_000_000 {
        nanos if nanos % 1_000_000 == 0 => SecondsFormat::Millis,
        nanos if nanos % 1_000 == 0 => SecondsFormat::Micros,
        _ => SecondsFormat::Nanos,
    }
}

/// Shortest decimal that parses back to the same value. Integral values keep
/// one fractional digit so they still read as decimal-floating-point.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn write_master(out: &mut String, master: &MasterPlaylist) {
    let mut header = Vec::new();
    if let Some(version) = master.version {
        header.push(format!("{}:{version}", tags::VERSION));
    }
    if master.independent_segments {
        header.push(tags::INDEPENDENT_SEGMENTS.to_string());
    }
    write_anchor(out, &header, &master.header_tags);

    for rendition in &master.renditions {
        let line = format!("{}:{}", tags::MEDIA, rendition_attributes(rendition));
        write_anchor(out, &[line], &rendition.opaque_tags);
    }

    for variant in &master.variants {
        let attrs = variant_attributes(variant);
        if variant.is_i_frame {
            let line = format!("{}:{attrs}", tags::I_FRAME_STREAM_INF);
            write_anchor(out, &[line], &variant.opaque_tags);
        } else {
            let lines = [format!("{}:{attrs}", tags::STREAM_INF), variant.uri.clone()];
            write_anchor(out, &lines, &variant.opaque_tags);
        }
    }

    write_anchor(out, &[], &master.trailer_tags);
}

fn rendition_attributes(rendition: &Rendition) -> AttributeList {
    let mut attrs = AttributeList::new();
    attrs.push("TYPE", AttributeValue::unquoted(rendition.kind.as_str()));
    attrs.push("GROUP-ID", AttributeValue::quoted(&rendition.group_id));
    attrs.push("NAME", AttributeValue::quoted(&rendition.name));
    if let Some(language) = &rendition.language {
        attrs.push("LANGUAGE", AttributeValue::quoted(language));
    }
    for (name, set) in [
        ("DEFAULT", rendition.is_default),
        ("AUTOSELECT", rendition.autoselect),
        ("FORCED", rendition.forced),
    ] {
        if set {
            attrs.push(name, AttributeValue::unquoted("YES"));
        }
    }
    if let Some(uri) = &rendition.uri {
        attrs.push("URI", AttributeValue::quoted(uri));
    }
    attrs.extend(&rendition.other_attributes);
    attrs
}

fn variant_attributes(variant: &Variant) -> AttributeList {
    let mut attrs = AttributeList::new();
    attrs.push("BANDWIDTH", AttributeValue::unquoted(variant.bandwidth.to_string()));
    if let Some(average) = variant.average_bandwidth {
        attrs.push("AVERAGE-BANDWIDTH", AttributeValue::unquoted(average.to_string()));
    }
    if let Some(resolution) = variant.resolution {
        attrs.push("RESOLUTION", AttributeValue::unquoted(resolution.to_string()));
    }
    if let Some(frame_rate) = variant.frame_rate {
        attrs.push("FRAME-RATE", AttributeValue::unquoted(format!("{frame_rate:.3}")));
    }
    if let Some(codecs) = &variant.codecs {
        attrs.push("CODECS", AttributeValue::quoted(codecs));
    }
    if let Some(audio) = &variant.audio_group_id {
        attrs.push("AUDIO", AttributeValue::quoted(audio));
    }
    if let Some(subtitles) = &variant.subtitle_group_id {
        attrs.push("SUBTITLES", AttributeValue::quoted(subtitles));
    }
    attrs.extend(&variant.other_attributes);
    if variant.is_i_frame {
        attrs.push("URI", AttributeValue::quoted(&variant.uri));
    }
    attrs
}

fn write_media(out: &mut String, media: &MediaPlaylist) {
    let mut header = Vec::new();
    if let Some(version) = media.version {
        header.push(format!("{}:{version}", tags::VERSION));
    }
    header.push(format!("{}:{}", tags::TARGET_DURATION, media.target_duration));
    header.push(format!("{}:{}", tags::MEDIA_SEQUENCE, media.media_sequence));
    if media.discontinuity_sequence > 0 {
        header.push(format!(
            "{}:{}",
            tags::DISCONTINUITY_SEQUENCE,
            media.discontinuity_sequence
        ));
    }
    if let Some(playlist_type) = media.playlist_type {
        header.push(format!("{}:{}", tags::PLAYLIST_TYPE, playlist_type.as_str()));
    }
    if media.i_frames_only {
        header.push(tags::I_FRAMES_ONLY.to_string());
    }
    if media.independent_segments {
        header.push(tags::INDEPENDENT_SEGMENTS.to_string());
    }
    if let Some(start) = media.start {
        let mut line = format!(
            "{}:TIME-OFFSET={}",
            tags::START,
            format_decimal(start.time_offset)
        );
        if start.precise {
            line.push_str(",PRECISE=YES");
        }
        header.push(line);
    }
    write_anchor(out, &header, &media.header_tags);

    for segment in &media.segments {
        write_anchor(out, &segment_lines(segment), &segment.opaque_tags);
    }

    let trailer = if media.end_list {
        vec![tags::ENDLIST.to_string()]
    } else {
        Vec::new()
    };
    write_anchor(out, &trailer, &media.trailer_tags);
}

fn segment_lines(segment: &Segment) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    if segment.discontinuity {
        lines.push(tags::DISCONTINUITY.to_string());
    }
    for key in &segment.keys {
        lines.push(format!("{}:{key}", tags::KEY));
    }
    if let Some(map) = &segment.map {
        lines.push(format!("{}:{map}", tags::MAP));
    }
    if let Some(date_time) = segment.program_date_time {
        lines.push(format!(
            "{}:{}",
            tags::PROGRAM_DATE_TIME,
            date_time.to_rfc3339_opts(date_time_precision(&date_time), true)
        ));
    }
    if let Some(byte_range) = segment.byte_range {
        lines.push(format!("{}:{byte_range}", tags::BYTERANGE));
    }
    lines.push(format!(
        "{}:{},{}",
        tags::EXTINF,
        format_decimal(segment.duration),
        segment.title.as_deref().unwrap_or_default()
    ));
    lines.push(segment.uri.clone());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(4.0), "4.0");
        assert_eq!(format_decimal(4.004), "4.004");
        assert_eq!(format_decimal(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_decimal(-2.5), "-2.5");
    }

    #[test]
    fn test_write_anchor_positions() {
        let mut out = String::new();
        let known = ["A".to_string(), "B".to_string()];
        let opaque = [
            OpaqueTag::new(2, "#after"),
            OpaqueTag::new(0, "#before"),
            OpaqueTag::new(1, "#between"),
        ];
        write_anchor(&mut out, &known, &opaque);
        assert_eq!(out, "#before\nA\n#between\nB\n#after\n");
    }

    #[test]
    fn test_segment_lines_order() {
        let mut segment = Segment::new("seg.ts", 6.0);
        segment.discontinuity = true;
        segment.keys = vec!["METHOD=NONE".to_string()];
        segment.title = Some("ad".to_string());

        assert_eq!(
            segment_lines(&segment),
            vec![
                "#EXT-X-DISCONTINUITY",
                "#EXT-X-KEY:METHOD=NONE",
                "#EXTINF:6.0,ad",
                "seg.ts"
            ]
        );
    }
}
