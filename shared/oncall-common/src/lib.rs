//! Shared types for the on-call contributor sync step
//!
//! Pure domain logic only: contributor extraction, expiry merging and the
//! monitor message codec. All network I/O lives in the provider crate.

pub mod contributors;
pub mod error;
pub mod message;
pub mod types;

pub use contributors::{
    expiry_after, extract_contributors, extract_mentions, merge_contributors,
    MILLISECONDS_IN_MINUTE,
};
pub use error::SyncError;
pub use message::{mentions_line, MonitorMessage, SEGMENT_DELIMITER};
pub use types::{ContributorMap, Monitor, Release};

// Re-export Result type for convenience
pub type Result<T> = std::result::Result<T, SyncError>;
