//! Auxiliary content ("bumper") insertion into a primary media playlist.
//!
//! Insertion points are computed on the primary timeline as it was before any
//! bumper went in, then all bumpers are applied in one pass in ascending
//! offset order. Segments are never split: a bumper lands on the first segment
//! boundary at or after its offset.

use std::mem;

use hls_manifest::{ByteRange, Error, MediaPlaylist, Result, Segment};
use tracing::debug;

/// Slack when comparing an offset with accumulated segment start times.
const BOUNDARY_EPSILON: f64 = 1e-6;

const METHOD_NONE: &str = "METHOD=NONE";

/// Auxiliary media playlist to splice in at `after_seconds`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bumper {
    /// Read only; its segments are copied into the primary.
    pub auxiliary_playlist: MediaPlaylist,
    /// Offset on the primary timeline. `0.0` is a pre-roll,
    /// [`Bumper::AT_END`] a post-roll.
    pub after_seconds: f64,
}

impl Bumper {
    /// Offset sentinel meaning "after the last primary segment".
    pub const AT_END: f64 = f64::MAX;

    pub fn new(auxiliary_playlist: MediaPlaylist, after_seconds: f64) -> Self {
        Self {
            auxiliary_playlist,
            after_seconds,
        }
    }

    pub fn pre_roll(auxiliary_playlist: MediaPlaylist) -> Self {
        Self::new(auxiliary_playlist, 0.0)
    }

    pub fn post_roll(auxiliary_playlist: MediaPlaylist) -> Self {
        Self::new(auxiliary_playlist, Self::AT_END)
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.after_seconds.is_nan() || self.after_seconds < 0.0 {
            return Err(Error::invalid_argument(format!(
                "bumper {index} has an invalid offset {}",
                self.after_seconds
            )));
        }
        if self.auxiliary_playlist.segments.is_empty() {
            return Err(Error::invalid_argument(format!(
                "bumper {index} has no segments"
            )));
        }
        Ok(())
    }
}

/// Index of the first primary segment starting at or after `after_seconds`,
/// or `starts.len()` when there is none.
fn insertion_index(starts: &[f64], after_seconds: f64) -> usize {
    starts
        .iter()
        .position(|start| *start + BOUNDARY_EPSILON >= after_seconds)
        .unwrap_or(starts.len())
}

/// Encryption and initialization section in effect at some point of a
/// segment sequence. No key is stored as an empty list.
#[derive(Debug, Default, Clone, PartialEq)]
struct SegmentContext {
    keys: Vec<String>,
    map: Option<String>,
}

impl SegmentContext {
    fn observe(&mut self, segment: &Segment) {
        if !segment.keys.is_empty() {
            self.keys = if segment.keys.iter().all(|key| key.trim() == METHOD_NONE) {
                Vec::new()
            } else {
                segment.keys.clone()
            };
        }
        if let Some(map) = &segment.map {
            self.map = Some(map.clone());
        }
    }
}

/// Output segment list that re-declares key and map whenever the source of
/// the segments changes.
struct Splice {
    segments: Vec<Segment>,
    emitted: SegmentContext,
}

impl Splice {
    /// `source` is the context the segment had in its own playlist, already
    /// including the segment itself. With `redeclare`, key and map are
    /// repeated even if the output context already matches.
    fn push(&mut self, mut segment: Segment, source: &SegmentContext, redeclare: bool) {
        if segment.keys.is_empty() && (redeclare || self.emitted.keys != source.keys) {
            if !source.keys.is_empty() {
                segment.keys = source.keys.clone();
            } else if !self.emitted.keys.is_empty() {
                segment.keys = vec![METHOD_NONE.to_string()];
            }
        }
        if segment.map.is_none()
            && source.map.is_some()
            && (redeclare || self.emitted.map != source.map)
        {
            segment.map = source.map.clone();
        }

        self.emitted.observe(&segment);
        self.segments.push(segment);
    }

    fn push_bumper(&mut self, bumper: &Bumper) {
        let mut source = SegmentContext::default();
        for (idx, segment) in bumper.auxiliary_playlist.segments.iter().enumerate() {
            let mut segment = segment.clone();
            source.observe(&segment);
            if idx == 0 {
                let first_range = bumper.auxiliary_playlist.absolute_byte_range_at(0);
                resolve_byte_offset(&mut segment, first_range);
                if !self.segments.is_empty() {
                    segment.discontinuity = true;
                }
            }
            self.push(segment, &source, false);
        }
    }
}

/// Pin a relative byte range to `absolute`. The segment it was relative to
/// no longer precedes it.
fn resolve_byte_offset(segment: &mut Segment, absolute: Option<ByteRange>) {
    if segment.byte_range.is_some_and(|range| range.offset.is_none()) {
        segment.byte_range = absolute;
    }
}

/// Splice every bumper into `primary`.
///
/// Offsets are measured on the original primary timeline; an offset past the
/// total duration behaves like [`Bumper::AT_END`]. Bumper segments are marked
/// as discontinuous with what precedes them, the primary segment resuming
/// after a bumper is marked as well and re-declares the primary key and map.
/// `target_duration` grows if a bumper segment needs it; `media_sequence` is
/// not touched.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when a bumper has no segments or a negative or
/// NaN offset. Every bumper is checked before the primary is modified.
pub fn insert_auxiliary_content(primary: &mut MediaPlaylist, bumpers: &[Bumper]) -> Result<()> {
    for (idx, bumper) in bumpers.iter().enumerate() {
        bumper.validate(idx)?;
    }
    if bumpers.is_empty() {
        return Ok(());
    }

    let starts = primary.segment_start_times();
    let mut plan: Vec<(usize, &Bumper, Option<ByteRange>)> = bumpers
        .iter()
        .map(|bumper| {
            let at = insertion_index(&starts, bumper.after_seconds);
            (at, bumper, primary.absolute_byte_range_at(at))
        })
        .collect();
    // stable: bumpers sharing a boundary keep the caller's order
    plan.sort_by_key(|(at, _, _)| *at);

    let original = mem::take(&mut primary.segments);
    let inserted: usize = bumpers
        .iter()
        .map(|b| b.auxiliary_playlist.segments.len())
        .sum();
    let mut splice = Splice {
        segments: Vec::with_capacity(original.len() + inserted),
        emitted: SegmentContext::default(),
    };
    let mut source = SegmentContext::default();
    let mut plan = plan.into_iter().peekable();

    for (idx, mut segment) in original.into_iter().enumerate() {
        let mut resumed = None;
        while let Some((at, bumper, byte_range)) = plan.next_if(|(at, _, _)| *at == idx) {
            debug!(
                at,
                after_seconds = bumper.after_seconds,
                segments = bumper.auxiliary_playlist.segments.len(),
                "Inserting bumper"
            );
            splice.push_bumper(bumper);
            resumed = Some(byte_range);
        }

        source.observe(&segment);
        if let Some(byte_range) = resumed {
            segment.discontinuity = true;
            resolve_byte_offset(&mut segment, byte_range);
        }
        splice.push(segment, &source, resumed.is_some());
    }

    for (at, bumper, _) in plan {
        debug!(
            at,
            segments = bumper.auxiliary_playlist.segments.len(),
            "Appending bumper"
        );
        splice.push_bumper(bumper);
    }

    primary.segments = splice.segments;
    primary.target_duration = primary
        .target_duration
        .max(primary.required_target_duration());
    Ok(())
}
