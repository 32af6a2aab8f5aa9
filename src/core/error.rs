//! Error handling for collection publishing
//!
//! This module provides the error taxonomy shared by every pipeline stage,
//! with recovery guidance, using the thiserror crate for ergonomic error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for collection publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Manifest errors
    #[error("manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("failed to parse {}: {message}", path.display())]
    ManifestParseError { path: PathBuf, message: String },

    #[error("failed to write {}: {message}", path.display())]
    MetadataWriteFailed { path: PathBuf, message: String },

    // Build errors
    #[error("[{collection}] build failed: {stderr}")]
    BuildFailed { collection: String, stderr: String },

    #[error("no artifact matching '{pattern}' in {}", dir.display())]
    ArtifactNotFound { pattern: String, dir: PathBuf },

    #[error("failed to list {}: {message}", dir.display())]
    ArtifactScanFailed { dir: PathBuf, message: String },

    // URL resolution errors
    #[error("{} is missing required field '{field}'", path.display())]
    MetadataMissingField { path: PathBuf, field: String },

    #[error("unsupported server URL '{url}': expected http:// or https://")]
    InvalidServerUrl { url: String },

    // Publishing errors
    #[error("[{artifact}] already exists on the server")]
    AlreadyPublished { artifact: String },

    #[error("[{namespace}] namespace does not exist on the server: {message}")]
    NamespaceMissing { namespace: String, message: String },

    #[error("[{artifact}] publishing failed: {message}")]
    PublishFailed { artifact: String, message: String },

    // Command execution errors
    #[error("[{command}] command failed: {message}")]
    CommandFailed { command: String, message: String },

    // Run-level errors
    #[error("not found: {}", path.display())]
    TargetNotFound { path: PathBuf },

    #[error("the following required environment variables are missing: {}", variables.join(", "))]
    EnvironmentMissing { variables: Vec<String> },

    #[error("{0}")]
    UsageError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl PublishError {
    /// Build a `CommandFailed` error from a timeout
    pub fn timeout(command: &str, timeout: Duration) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            message: format!("timed out after {}s", timeout.as_secs()),
        }
    }

    /// Check if this error aborts the whole run rather than a single target
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound { .. }
                | Self::EnvironmentMissing { .. }
                | Self::UsageError(_)
                | Self::ConfigError(_)
        )
    }

    /// Check if this error is a no-op rather than a failure
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::AlreadyPublished { .. })
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ManifestNotFound { .. } => {
                vec!["Check that the collection was installed with its MANIFEST.json"]
            }
            Self::ManifestParseError { .. } => vec![
                "Check that MANIFEST.json is valid JSON",
                "Check that collection_info has namespace, name and version",
            ],
            Self::MetadataWriteFailed { .. } => {
                vec!["Check write permissions on the collection directory"]
            }
            Self::BuildFailed { .. } => vec![
                "Run 'ansible-galaxy collection build' manually to see the full output",
                "Check the generated galaxy.yml",
            ],
            Self::ArtifactNotFound { .. } => vec![
                "Check the output directory",
                "Check that the namespace and name in MANIFEST.json match the directory layout",
            ],
            Self::ArtifactScanFailed { .. } => {
                vec!["Check read permissions on the output directory"]
            }
            Self::MetadataMissingField { .. } => {
                vec!["Delete galaxy.yml and re-run to regenerate it"]
            }
            Self::InvalidServerUrl { .. } => {
                vec!["Set GALAXY_SERVER_URL to an http:// or https:// address or a bare host"]
            }
            Self::AlreadyPublished { .. } => {
                vec!["Bump the collection version to publish a new release"]
            }
            Self::NamespaceMissing { .. } => {
                vec!["Create the namespace on the Galaxy server, then re-run"]
            }
            Self::PublishFailed { .. } => vec![
                "Check the error message",
                "Check the API token and server URL",
            ],
            Self::CommandFailed { .. } => vec![
                "Check that ansible-galaxy is installed and on PATH",
                "Raise the timeout with --timeout",
            ],
            Self::TargetNotFound { .. } => {
                vec!["Check the collections root with --collections-root"]
            }
            Self::EnvironmentMissing { .. } => {
                vec!["Export GALAXY_SERVER_URL and GALAXY_SERVER_TOKEN"]
            }
            Self::UsageError(_) => vec!["Run with --help for usage"],
            Self::ConfigError(_) => vec!["Check .collection-publisher.yaml"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestNotFound { .. } => "MANIFEST_NOT_FOUND",
            Self::ManifestParseError { .. } => "MANIFEST_PARSE_ERROR",
            Self::MetadataWriteFailed { .. } => "METADATA_WRITE_FAILED",
            Self::BuildFailed { .. } => "BUILD_FAILED",
            Self::ArtifactNotFound { .. } => "ARTIFACT_NOT_FOUND",
            Self::ArtifactScanFailed { .. } => "ARTIFACT_SCAN_FAILED",
            Self::MetadataMissingField { .. } => "METADATA_MISSING_FIELD",
            Self::InvalidServerUrl { .. } => "INVALID_SERVER_URL",
            Self::AlreadyPublished { .. } => "ALREADY_PUBLISHED",
            Self::NamespaceMissing { .. } => "NAMESPACE_MISSING",
            Self::PublishFailed { .. } => "PUBLISH_FAILED",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            Self::EnvironmentMissing { .. } => "ENVIRONMENT_MISSING",
            Self::UsageError(_) => "USAGE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}
