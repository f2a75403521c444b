mod bitrate_filter;
mod bumper;
mod clip;
mod language_filter;
mod resolution_filter;
mod resolution_order;

pub use bitrate_filter::BitrateFilterOperator;
pub use bumper::BumperOperator;
pub use clip::ClipOperator;
pub use language_filter::LanguageFilterOperator;
pub use resolution_filter::ResolutionFilterOperator;
pub use resolution_order::ResolutionOrderOperator;
