//! # HLS Personalize
//!
//! Per-request transformations of parsed HLS playlists:
//!
//! - variant selection by bitrate and resolution, and variant reordering
//! - audio and subtitle rendition selection by language
//! - splicing auxiliary content ("bumpers") into media playlists
//! - clipping to a time window
//!
//! Every operation takes the playlist by exclusive reference and either
//! succeeds or leaves it untouched. [`ManifestPipeline`] chains them into one
//! request with the same all-or-nothing guarantee.
//!
//! ## License
//!
//! MIT License
//!

pub mod bitrate;
pub mod clip;
pub mod config;
pub mod operator;
pub mod operators;
pub mod pipeline;
pub mod rendition;
pub mod splice;
pub mod variant;

pub use bitrate::BitrateSpec;
pub use clip::{ClipWindow, Clipper, ClippingMethod, validate_clip_info};
pub use config::{PersonalizeConfig, PersonalizeConfigBuilder};
pub use operator::ManifestOperator;
pub use pipeline::{ManifestPipeline, PipelineReport, personalize};
pub use rendition::{
    preserve_audio_renditions_by_language, preserve_renditions_by_language,
    preserve_subtitle_renditions_by_language,
};
pub use splice::{Bumper, insert_auxiliary_content};
pub use variant::{
    move_variant_to_index, preserve_variants_by_bitrate, preserve_variants_by_resolution,
    update_resolution_order,
};

pub use hls_manifest::{Error, Result};
