//! Bitrate and resolution selection over the variant list of a master playlist.
//!
//! The string-taking functions validate every argument before touching the
//! playlist, so a failed call leaves it unchanged.

use std::mem;

use hls_manifest::{Error, MasterPlaylist, Resolution, Result, Variant};
use tracing::debug;

use crate::bitrate::{BitrateSpec, parse_bitrate_specs};

/// Keep only variants whose bandwidth matches at least one spec.
///
/// Returns `true` when a variant was removed. Removing every variant is not an
/// error.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `specs` is empty or a spec does not parse.
pub fn preserve_variants_by_bitrate<S: AsRef<str>>(
    master: &mut MasterPlaylist,
    specs: &[S],
    tolerance: u64,
) -> Result<bool> {
    let specs = parse_bitrate_specs(specs)?;
    Ok(retain_by_bitrate(master, &specs, tolerance))
}

pub fn retain_by_bitrate(
    master: &mut MasterPlaylist,
    specs: &[BitrateSpec],
    tolerance: u64,
) -> bool {
    let before = master.variants.len();
    master.variants.retain(|variant| {
        specs
            .iter()
            .any(|spec| spec.matches(variant.bandwidth, tolerance))
    });

    let removed = before - master.variants.len();
    debug!(removed, kept = master.variants.len(), "Filtered variants by bitrate");
    removed > 0
}

/// Drop variants whose pixel area exceeds `max_resolution`. Variants without a
/// resolution are kept.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `max_resolution` is not `<width>x<height>`.
pub fn preserve_variants_by_resolution(
    master: &mut MasterPlaylist,
    max_resolution: &str,
) -> Result<bool> {
    let max: Resolution = max_resolution.parse()?;
    Ok(retain_by_resolution(master, max))
}

pub fn retain_by_resolution(master: &mut MasterPlaylist, max: Resolution) -> bool {
    let before = master.variants.len();
    master
        .variants
        .retain(|variant| variant.resolution.is_none_or(|r| r.area() <= max.area()));

    let removed = before - master.variants.len();
    debug!(removed, max = %max, "Filtered variants by resolution");
    removed > 0
}

/// Move every variant with `resolution` into one run starting at `position`.
///
/// Matched variants keep their relative order, and so do the others. A
/// `position` past the remaining variants is clamped to their end. Returns the
/// index just after the moved run, or `position` unchanged when nothing
/// matched, so calls can be chained.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when `resolution` is not `<width>x<height>`.
pub fn move_variant_to_index(
    master: &mut MasterPlaylist,
    resolution: &str,
    position: usize,
) -> Result<usize> {
    let resolution: Resolution = resolution.parse()?;
    Ok(move_resolution_to(&mut master.variants, resolution, position))
}

fn move_resolution_to(variants: &mut Vec<Variant>, resolution: Resolution, position: usize) -> usize {
    let (matched, mut others): (Vec<Variant>, Vec<Variant>) = mem::take(variants)
        .into_iter()
        .partition(|variant| variant.resolution == Some(resolution));

    if matched.is_empty() {
        *variants = others;
        return position;
    }

    let at = position.min(others.len());
    let moved = matched.len();
    let tail = others.split_off(at);
    others.extend(matched);
    others.extend(tail);
    *variants = others;

    debug!(resolution = %resolution, at, moved, "Moved variants");
    at + moved
}

/// Bring the variants of each resolution to the top, in list order.
///
/// Duplicate entries are ignored after their first occurrence. Returns `true`
/// when the variant order changed.
///
/// # Errors
///
/// [`Error::InvalidArgument`] when any entry is not `<width>x<height>`; the
/// playlist is left untouched.
pub fn update_resolution_order<S: AsRef<str>>(
    master: &mut MasterPlaylist,
    resolutions: &[S],
) -> Result<bool> {
    let resolutions = resolutions
        .iter()
        .map(|r| r.as_ref().parse())
        .collect::<Result<Vec<Resolution>>>()?;
    Ok(apply_resolution_order(master, &resolutions))
}

pub fn apply_resolution_order(master: &mut MasterPlaylist, resolutions: &[Resolution]) -> bool {
    let original = master.variants.clone();

    let mut seen: Vec<Resolution> = Vec::with_capacity(resolutions.len());
    let mut position = 0;
    for resolution in resolutions {
        if seen.contains(resolution) {
            continue;
        }
        seen.push(*resolution);
        position = move_resolution_to(&mut master.variants, *resolution, position);
    }

    master.variants != original
}

#[cfg(test)]
mod tests {
    use super::*;
    use hls_manifest::init_test_tracing;

    fn master_with(variants: &[(u64, Option<(u32, u32)>)]) -> MasterPlaylist {
        let mut master = MasterPlaylist::new();
        for (idx, (bandwidth, resolution)) in variants.iter().enumerate() {
            let mut variant = Variant::new(format!("v{idx}.m3u8"), *bandwidth);
            if let Some((w, h)) = resolution {
                variant = variant.with_resolution(*w, *h);
            }
            master.variants.push(variant);
        }
        master
    }

    fn uris(master: &MasterPlaylist) -> Vec<&str> {
        master.variants.iter().map(|v| v.uri.as_str()).collect()
    }

    #[test]
    fn test_bitrate_range_keeps_matching_only() {
        init_test_tracing!();
        let mut master = master_with(&[(50, None), (150, None), (250, None)]);

        assert!(preserve_variants_by_bitrate(&mut master, &["100-200"], 0).unwrap());
        assert_eq!(uris(&master), ["v1.m3u8"]);

        // Applying the same criteria again removes nothing.
        assert!(!preserve_variants_by_bitrate(&mut master, &["100-200"], 0).unwrap());
    }

    #[test]
    fn test_bitrate_multiple_specs_and_tolerance() {
        let mut master = master_with(&[(800, None), (1_000, None), (2_950, None), (9_000, None)]);

        let changed =
            preserve_variants_by_bitrate(&mut master, &["1000", "3000", "-800"], 50).unwrap();
        assert!(changed);
        assert_eq!(uris(&master), ["v0.m3u8", "v1.m3u8", "v2.m3u8"]);
    }

    #[test]
    fn test_bitrate_can_remove_everything() {
        let mut master = master_with(&[(50, None)]);
        assert!(preserve_variants_by_bitrate(&mut master, &["1000-"], 0).unwrap());
        assert!(master.variants.is_empty());
    }

    #[test]
    fn test_bitrate_invalid_spec_leaves_playlist_untouched() {
        let mut master = master_with(&[(50, None), (150, None)]);
        let before = master.clone();

        assert!(matches!(
            preserve_variants_by_bitrate(&mut master, &["100", "fast"], 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(preserve_variants_by_bitrate::<&str>(&mut master, &[], 0).is_err());
        assert_eq!(master, before);
    }

    #[test]
    fn test_resolution_cap() {
        let mut master = master_with(&[
            (1, Some((640, 360))),
            (2, Some((1280, 720))),
            (3, None),
            (4, Some((960, 540))),
        ]);

        assert!(preserve_variants_by_resolution(&mut master, "960x540").unwrap());
        assert_eq!(uris(&master), ["v0.m3u8", "v2.m3u8", "v3.m3u8"]);
        assert!(!preserve_variants_by_resolution(&mut master, "960x540").unwrap());
        assert!(preserve_variants_by_resolution(&mut master, "960by540").is_err());
    }

    #[test]
    fn test_move_variant_to_index() {
        let mut master = master_with(&[
            (1, Some((640, 360))),
            (2, Some((1280, 720))),
            (3, Some((1920, 1080))),
            (4, Some((1280, 720))),
        ]);

        let next = move_variant_to_index(&mut master, "1280x720", 0).unwrap();
        assert_eq!(next, 2);
        assert_eq!(uris(&master), ["v1.m3u8", "v3.m3u8", "v0.m3u8", "v2.m3u8"]);

        let once = master.clone();
        move_variant_to_index(&mut master, "1280x720", 0).unwrap();
        assert_eq!(master, once);
    }

    #[test]
    fn test_move_variant_clamps_and_ignores_missing() {
        let mut master = master_with(&[(1, Some((640, 360))), (2, Some((1280, 720)))]);

        assert_eq!(move_variant_to_index(&mut master, "640x360", 10).unwrap(), 2);
        assert_eq!(uris(&master), ["v1.m3u8", "v0.m3u8"]);

        assert_eq!(move_variant_to_index(&mut master, "320x240", 1).unwrap(), 1);
        assert_eq!(uris(&master), ["v1.m3u8", "v0.m3u8"]);
    }

    #[test]
    fn test_update_resolution_order() {
        let mut master = master_with(&[
            (1, Some((640, 360))),
            (2, Some((1280, 720))),
            (3, Some((1920, 1080))),
            (4, None),
        ]);

        let changed =
            update_resolution_order(&mut master, &["1920x1080", "1280x720", "1920x1080"]).unwrap();
        assert!(changed);
        assert_eq!(uris(&master), ["v2.m3u8", "v1.m3u8", "v0.m3u8", "v3.m3u8"]);

        assert!(!update_resolution_order(&mut master, &["1920x1080", "1280x720"]).unwrap());
        assert!(update_resolution_order(&mut master, &["1920x1080", "huge"]).is_err());
    }
}
