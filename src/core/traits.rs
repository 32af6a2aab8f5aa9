//! Core traits and types for collection publishing
//!
//! This module defines the seam between the pipeline and the external
//! packaging tool, so the pipeline can be driven without `ansible-galaxy`.

use crate::core::error::PublishError;
use async_trait::async_trait;
use secrecy::SecretString;
use std::path::Path;

/// Captured result of one packaging-tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful invocation with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stderr followed by stdout, trimmed
    pub fn combined(&self) -> String {
        let mut text = self.stderr.trim().to_string();
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout);
        }
        text
    }
}

/// Packaging tool used to build and upload collection artifacts
///
/// Implementations return `Ok` for any invocation that ran to completion,
/// including non-zero exits; `Err` is reserved for spawn failures and timeouts.
#[async_trait]
pub trait CollectionTool: Send + Sync {
    /// Tool name for diagnostics
    fn name(&self) -> &str;

    /// Build the collection in `collection_dir`, writing the artifact into `output_dir`
    async fn build(
        &self,
        collection_dir: &Path,
        output_dir: &Path,
    ) -> Result<ToolOutput, PublishError>;

    /// Upload `artifact` to `server_url`
    async fn publish(
        &self,
        artifact: &Path,
        server_url: &str,
        api_key: &SecretString,
    ) -> Result<ToolOutput, PublishError>;
}
