//! Collection Publisher - runs the pipeline for a single target
//!
//! Transformer -> Builder -> Resolver -> Publisher. Every error is caught
//! here and turned into a [`TargetOutcome`] naming the stage it came from,
//! so one broken collection never stops the rest of the run.

use crate::core::config::PublisherConfig;
use crate::core::error::PublishError;
use crate::core::traits::CollectionTool;
use crate::galaxy::builder::PackageBuilder;
use crate::galaxy::publisher::{PublishOutcome, Publisher};
use crate::galaxy::resolver;
use crate::manifest::ManifestTransformer;
use crate::orchestration::target::Target;
use crate::security::token_manager::Credentials;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Instrument;

/// Pipeline stage a target failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transform,
    Build,
    Resolve,
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Build => "build",
            Self::Resolve => "resolve",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final state of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Skipped {
        reason: String,
    },
    Built {
        artifact: PathBuf,
    },
    Published {
        artifact: PathBuf,
        url: String,
    },
    AlreadyPublished {
        artifact: PathBuf,
        url: String,
        notice: String,
    },
    Failed {
        stage: Stage,
        code: &'static str,
        message: String,
    },
}

impl TargetOutcome {
    /// Report label: `skipped`, `built`, `published`, `already-published`
    /// or `failed-at-<stage>`
    pub fn label(&self) -> String {
        match self {
            Self::Skipped { .. } => "skipped".to_string(),
            Self::Built { .. } => "built".to_string(),
            Self::Published { .. } => "published".to_string(),
            Self::AlreadyPublished { .. } => "already-published".to_string(),
            Self::Failed { stage, .. } => format!("failed-at-{}", stage),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of processing one target
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub outcome: TargetOutcome,
    pub duration_ms: u64,
}

/// A stage failure on its way to becoming a report
struct StageError {
    stage: Stage,
    error: PublishError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageError>;
}

impl<T> AtStage<T> for Result<T, PublishError> {
    fn at(self, stage: Stage) -> Result<T, StageError> {
        self.map_err(|error| StageError { stage, error })
    }
}

/// Processes targets one at a time with shared configuration and credentials
pub struct CollectionPublisher<'a> {
    config: &'a PublisherConfig,
    credentials: &'a Credentials,
    tool: &'a dyn CollectionTool,
    transformer: ManifestTransformer,
}

impl<'a> CollectionPublisher<'a> {
    pub fn new(
        config: &'a PublisherConfig,
        credentials: &'a Credentials,
        tool: &'a dyn CollectionTool,
    ) -> Self {
        Self {
            config,
            credentials,
            tool,
            transformer: ManifestTransformer::new(),
        }
    }

    /// Run the whole pipeline for `target`
    pub async fn process(&self, target: &Target) -> TargetReport {
        let start_time = Instant::now();
        let span = tracing::info_span!("target", collection = %target);

        let outcome = match self.run_pipeline(target).instrument(span.clone()).await {
            Ok(outcome) => outcome,
            Err(StageError {
                error: PublishError::ManifestNotFound { path },
                stage: Stage::Transform,
            }) => {
                span.in_scope(|| tracing::info!(path = %path.display(), "no manifest, skipping"));
                TargetOutcome::Skipped {
                    reason: format!("no manifest at {}", path.display()),
                }
            }
            Err(StageError { stage, error }) => {
                let message = self.credentials.mask(&error.to_string());
                span.in_scope(|| {
                    tracing::error!(stage = %stage, code = error.code(), "{}", message);
                });
                TargetOutcome::Failed {
                    stage,
                    code: error.code(),
                    message,
                }
            }
        };

        TargetReport {
            target: target.clone(),
            outcome,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Report a soft error as a non-failing outcome
    fn soft_outcome(error: PublishError, artifact: PathBuf, url: String) -> TargetOutcome {
        tracing::info!(code = error.code(), soft = error.is_soft(), "{}", error);
        TargetOutcome::AlreadyPublished {
            artifact,
            url,
            notice: error.to_string(),
        }
    }

    async fn run_pipeline(&self, target: &Target) -> Result<TargetOutcome, StageError> {
        let root: &Path = &self.config.collections_root;

        // 1. Derive galaxy.yml
        let written = self
            .transformer
            .transform(&target.manifest_path(root))
            .await
            .at(Stage::Transform)?;
        for warning in &written.warnings {
            tracing::warn!("{}", warning);
        }

        // 2. Build the artifact
        let artifact = PackageBuilder::new(self.tool, &self.config.output_dir)
            .with_credentials(self.credentials)
            .build(root, target, Some(written.metadata.version.as_str()))
            .await
            .at(Stage::Build)?;

        if self.config.build_only {
            return Ok(TargetOutcome::Built { artifact });
        }

        // 3. Resolve the upload URL
        let url = resolver::resolve(&written.path, &self.credentials.server_url)
            .await
            .at(Stage::Resolve)?;

        // 4. Publish
        let outcome = Publisher::new(self.tool, self.credentials)
            .publish(&artifact, &url)
            .await
            .at(Stage::Publish)?;

        let artifact_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match outcome {
            PublishOutcome::Published => Ok(TargetOutcome::Published { artifact, url }),
            PublishOutcome::AlreadyPublished => Ok(Self::soft_outcome(
                PublishError::AlreadyPublished {
                    artifact: artifact_name,
                },
                artifact,
                url,
            )),
            PublishOutcome::NamespaceMissing { message } => Err(StageError {
                stage: Stage::Publish,
                error: PublishError::NamespaceMissing {
                    namespace: target.namespace.clone(),
                    message,
                },
            }),
            PublishOutcome::Rejected { message } => Err(StageError {
                stage: Stage::Publish,
                error: PublishError::PublishFailed {
                    artifact: artifact_name,
                    message,
                },
            }),
        }
    }
}
