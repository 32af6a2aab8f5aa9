pub mod core;
pub mod galaxy;
pub mod manifest;
pub mod orchestration;
pub mod security;
pub mod validation;

pub use crate::core::{
    CollectionTool, ConfigLoadOptions, ConfigLoader, ConfigOverrides, PublishError,
    PublisherConfig, ToolOutput,
};
pub use galaxy::{AnsibleGalaxyCli, PackageBuilder, PublishOutcome, Publisher};
pub use manifest::{ManifestTransformer, MetadataFile};
pub use orchestration::{
    BatchPublisher, CollectionPublisher, RunReport, Selection, Target, TargetOutcome,
    TargetReport,
};
pub use security::{CommandError, Credentials, SafeCommandExecutor, SecureTokenManager};
