//! Galaxy server interaction: building, URL resolution and publishing

pub mod builder;
pub mod cli;
pub mod publisher;
pub mod resolver;

pub use builder::{PackageBuilder, select_artifact};
pub use cli::AnsibleGalaxyCli;
pub use publisher::{PublishOutcome, Publisher, classify};
pub use resolver::{normalize_server_base, resolve};
