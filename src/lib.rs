pub mod config;
pub mod errors;
pub mod matcher;
pub mod metrics;
pub mod stream;

pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use matcher::{match_file, ContentMatcher, IndeterminateReason, MatchOutcome, MatchPrimitive};
pub use metrics::{ScanMetrics, ScanStats};
pub use stream::{BatchReader, DirEntryKind, DirEntryRecord, DirectoryCursor};
