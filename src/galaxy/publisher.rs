//! Publisher - uploads a built artifact and classifies the server's answer
//!
//! `ansible-galaxy collection publish` reports most outcomes only as text.
//! The output is matched case-insensitively:
//! - "already exists" anywhere in stderr or stdout means the version is
//!   already on the server;
//! - "namespace" in stderr (checked second) means the namespace is not there
//!   yet. Stdout echoes the artifact path, which may contain the word;
//! - any other non-zero exit is a plain rejection.

use crate::core::error::PublishError;
use crate::core::traits::{CollectionTool, ToolOutput};
use crate::security::token_manager::Credentials;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref ALREADY_EXISTS: Regex = Regex::new(r"(?i)already\s+exists").unwrap();
    static ref NAMESPACE: Regex = Regex::new(r"(?i)namespace").unwrap();
}

/// How the server answered an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    AlreadyPublished,
    NamespaceMissing { message: String },
    Rejected { message: String },
}

impl PublishOutcome {
    /// Published or already present
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published | Self::AlreadyPublished)
    }
}

/// Classify the output of one publish invocation
pub fn classify(output: &ToolOutput) -> PublishOutcome {
    let text = output.combined();

    if output.success {
        // ansible-galaxy exits 0 on some "already exists" answers
        if ALREADY_EXISTS.is_match(&text) {
            return PublishOutcome::AlreadyPublished;
        }
        return PublishOutcome::Published;
    }

    if ALREADY_EXISTS.is_match(&text) {
        PublishOutcome::AlreadyPublished
    } else if NAMESPACE.is_match(&output.stderr) {
        PublishOutcome::NamespaceMissing { message: text }
    } else {
        PublishOutcome::Rejected { message: text }
    }
}

/// Uploads artifacts with the run's credentials
pub struct Publisher<'a> {
    tool: &'a dyn CollectionTool,
    credentials: &'a Credentials,
}

impl<'a> Publisher<'a> {
    pub fn new(tool: &'a dyn CollectionTool, credentials: &'a Credentials) -> Self {
        Self { tool, credentials }
    }

    /// Upload `artifact` to `publish_url`
    ///
    /// Server-side refusals come back as a [`PublishOutcome`]; `Err` means
    /// the tool itself could not run. Messages never contain the token.
    pub async fn publish(
        &self,
        artifact: &Path,
        publish_url: &str,
    ) -> Result<PublishOutcome, PublishError> {
        tracing::info!(
            artifact = %artifact.display(),
            url = %publish_url,
            "publishing artifact"
        );

        let output = self
            .tool
            .publish(artifact, publish_url, &self.credentials.token)
            .await
            .map_err(|e| self.mask_error(e))?;

        let outcome = match classify(&output) {
            PublishOutcome::NamespaceMissing { message } => PublishOutcome::NamespaceMissing {
                message: self.credentials.mask(&message),
            },
            PublishOutcome::Rejected { message } => PublishOutcome::Rejected {
                message: self.credentials.mask(&message),
            },
            other => other,
        };

        tracing::debug!(?outcome, "publish finished");
        Ok(outcome)
    }

    fn mask_error(&self, error: PublishError) -> PublishError {
        match error {
            PublishError::CommandFailed { command, message } => PublishError::CommandFailed {
                command,
                message: self.credentials.mask(&message),
            },
            other => other,
        }
    }
}
