//! Logger file ingestion.
//!
//! - [`logger`]: Latin-1 decoding, preamble skipping and `;`-delimited parsing of one file
//! - [`classify`]: per-column numeric/text classification with comma-decimal conversion
//! - [`observability`]: observer hooks reported by [`crate::merge::merge_logger_files`]

pub mod classify;
pub mod logger;
pub mod observability;

pub use logger::{decode_latin1, parse_logger_file, LogTable, RawLogFile};
pub use observability::{
    CompositeObserver, FileStats, MergeContext, MergeObserver, MergeSeverity, MergeStats,
    TracingObserver,
};
