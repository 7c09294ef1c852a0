//! Scan resolution: token -> tape -> media item -> playback target.

pub mod resolver;

pub use resolver::{ScanError, ScanOutcome, ScanRequest, ScanResolver, SessionRef};
