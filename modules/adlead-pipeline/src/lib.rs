pub mod clean;
pub mod dedup;
pub mod enrich;
pub mod extract;
pub mod metadata;
pub mod quality;
pub mod runner;
pub mod search;
pub mod stats;
pub mod storage;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use clean::{clean, CleanOutcome, SkipReason, Skipped};
pub use dedup::Deduplicator;
pub use enrich::{enrich, EnrichOptions, EnrichOutcome, EnrichSkip};
pub use search::AdSearchQuery;
pub use stats::PhaseStats;
pub use traits::{AdSearch, PageMetadataSource};
