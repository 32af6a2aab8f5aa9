//! Orchestration layer for collection publishing
//!
//! Target discovery, the per-collection pipeline and the batch run loop.

pub mod batch_publisher;
pub mod collection_publisher;
pub mod target;

// Re-export main types for convenience
pub use batch_publisher::{BatchPublisher, EXIT_TARGET_FAILURES, RunReport};
pub use collection_publisher::{CollectionPublisher, Stage, TargetOutcome, TargetReport};
pub use target::{Selection, Target, discover};
