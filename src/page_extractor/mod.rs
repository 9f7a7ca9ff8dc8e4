//! Photo extraction from the viewer page.

pub mod js_scripts;
pub mod photo_extractor;

pub use photo_extractor::{ExtractPolicy, ExtractedPhoto, PhotoExtractor};
