//! Inbound alert messages: field extraction and outbound analysis links.

pub mod extract;
pub mod link;

pub use extract::{extract, strip_marker, ExtractedAlert};
pub use link::{analysis_url, slugify};
