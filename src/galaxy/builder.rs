//! Package Builder - runs the packaging tool and locates the artifact it produced
//!
//! The tool writes `<namespace>-<name>-<version>.tar.gz` into its working
//! directory. When more than one file matches `<namespace>-<name>-*.tar.gz`
//! (stale builds of older versions, for instance) the pick is deterministic:
//! 1. the file for the expected version, if present;
//! 2. otherwise the highest SemVer version, unparseable versions ranking lowest;
//! 3. remaining ties go to the lexicographically greatest file name.

use crate::core::error::PublishError;
use crate::core::traits::CollectionTool;
use crate::orchestration::target::Target;
use crate::security::token_manager::Credentials;
use glob::Pattern;
use std::path::{Path, PathBuf};

/// Archive extension produced by `ansible-galaxy collection build`
pub const ARTIFACT_EXTENSION: &str = "tar.gz";

/// Builds collections into `output_dir`
pub struct PackageBuilder<'a> {
    tool: &'a dyn CollectionTool,
    output_dir: PathBuf,
    credentials: Option<&'a Credentials>,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(tool: &'a dyn CollectionTool, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            output_dir: output_dir.into(),
            credentials: None,
        }
    }

    /// Mask the API token in any reported build output
    pub fn with_credentials(mut self, credentials: &'a Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    fn mask(&self, text: String) -> String {
        match self.credentials {
            Some(credentials) => credentials.mask(&text),
            None => text,
        }
    }

    /// Build `target` from `collections_root` and return the artifact path
    ///
    /// # Errors
    ///
    /// - `PublishError::BuildFailed` - the tool exited non-zero
    /// - `PublishError::ArtifactNotFound` - no matching archive afterwards
    /// - `PublishError::ArtifactScanFailed` - the output directory could not be listed
    /// - `PublishError::CommandFailed` - the tool could not run or timed out
    pub async fn build(
        &self,
        collections_root: &Path,
        target: &Target,
        expected_version: Option<&str>,
    ) -> Result<PathBuf, PublishError> {
        let collection_dir = collections_root.join(target.relative_path());

        tracing::info!(collection = %collection_dir.display(), "building collection");

        let output = self.tool.build(&collection_dir, &self.output_dir).await?;
        let text = self.mask(output.combined());
        tracing::debug!(tool = self.tool.name(), output = %text, "build finished");

        if !output.success {
            return Err(PublishError::BuildFailed {
                collection: target.to_string(),
                stderr: text,
            });
        }

        self.find_artifact(target, expected_version).await
    }

    /// Glob pattern matching every artifact of `target`
    pub fn artifact_pattern(target: &Target) -> String {
        format!(
            "{}-{}-*.{}",
            Pattern::escape(&target.namespace),
            Pattern::escape(&target.name),
            ARTIFACT_EXTENSION
        )
    }

    /// Locate the artifact for `target` in the output directory
    pub async fn find_artifact(
        &self,
        target: &Target,
        expected_version: Option<&str>,
    ) -> Result<PathBuf, PublishError> {
        let pattern_text = Self::artifact_pattern(target);
        let not_found = || PublishError::ArtifactNotFound {
            pattern: pattern_text.clone(),
            dir: self.output_dir.clone(),
        };

        let scan_failed = |e: std::io::Error| PublishError::ArtifactScanFailed {
            dir: self.output_dir.clone(),
            message: e.to_string(),
        };

        let pattern = Pattern::new(&pattern_text).map_err(|_| not_found())?;

        let mut candidates = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.output_dir)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => not_found(),
                _ => scan_failed(e),
            })?;
        while let Some(entry) = entries.next_entry().await.map_err(scan_failed)? {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            let file_name = entry.file_name().to_string_lossy().to_string();
            if is_file && pattern.matches(&file_name) {
                candidates.push(file_name);
            }
        }

        let chosen = select_artifact(target, &candidates, expected_version).ok_or_else(not_found)?;

        if candidates.len() > 1 {
            let ignored: Vec<&String> = candidates.iter().filter(|c| **c != chosen).collect();
            tracing::warn!(
                collection = %target,
                chosen = %chosen,
                ignored = ?ignored,
                "multiple artifacts matched"
            );
        }

        Ok(self.output_dir.join(chosen))
    }
}

/// Pick one artifact file name out of `candidates`
pub fn select_artifact(
    target: &Target,
    candidates: &[String],
    expected_version: Option<&str>,
) -> Option<String> {
    if let Some(version) = expected_version {
        let exact = format!(
            "{}-{}-{}.{}",
            target.namespace, target.name, version, ARTIFACT_EXTENSION
        );
        if candidates.contains(&exact) {
            return Some(exact);
        }
    }

    let prefix = format!("{}-{}-", target.namespace, target.name);
    let suffix = format!(".{}", ARTIFACT_EXTENSION);

    candidates
        .iter()
        .max_by(|a, b| {
            let version_of = |file_name: &str| {
                file_name
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(&suffix))
                    .and_then(|v| semver::Version::parse(v).ok())
            };
            version_of(a)
                .cmp(&version_of(b))
                .then_with(|| a.cmp(b))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FakeTool, collection_info, write_manifest};
    use crate::manifest::ManifestTransformer;
    use tempfile::TempDir;

    fn target() -> Target {
        Target::new("acme", "tool")
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_artifact_pattern() {
        assert_eq!(PackageBuilder::artifact_pattern(&target()), "acme-tool-*.tar.gz");
    }

    #[test]
    fn test_select_prefers_expected_version() {
        let candidates = names(&["acme-tool-2.0.0.tar.gz", "acme-tool-1.0.0.tar.gz"]);

        assert_eq!(
            select_artifact(&target(), &candidates, Some("1.0.0")),
            Some("acme-tool-1.0.0.tar.gz".to_string())
        );
    }

    #[test]
    fn test_select_highest_semver_not_lexicographic() {
        let candidates = names(&[
            "acme-tool-1.9.0.tar.gz",
            "acme-tool-1.10.0.tar.gz",
            "acme-tool-nightly.tar.gz",
        ]);

        assert_eq!(
            select_artifact(&target(), &candidates, Some("3.0.0")),
            Some("acme-tool-1.10.0.tar.gz".to_string())
        );
    }

    #[test]
    fn test_select_unparseable_ties_by_name() {
        let candidates = names(&["acme-tool-b.tar.gz", "acme-tool-a.tar.gz"]);

        assert_eq!(
            select_artifact(&target(), &candidates, None),
            Some("acme-tool-b.tar.gz".to_string())
        );
    }

    #[test]
    fn test_select_empty() {
        assert_eq!(select_artifact(&target(), &[], Some("1.0.0")), None);
    }

    #[tokio::test]
    async fn test_build_returns_artifact_path() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let manifest = write_manifest(root.path(), "acme", "tool", collection_info("acme", "tool", "1.0.0"));
        ManifestTransformer::new().transform(&manifest).await.unwrap();
        let tool = FakeTool::new();

        let artifact = PackageBuilder::new(&tool, out.path())
            .build(root.path(), &target(), Some("1.0.0"))
            .await
            .unwrap();

        assert_eq!(artifact, out.path().join("acme-tool-1.0.0.tar.gz"));
        assert_eq!(tool.build_count(), 1);
    }

    #[tokio::test]
    async fn test_build_failure_carries_output() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let tool = FakeTool::new().fail_build("acme.tool");

        let result = PackageBuilder::new(&tool, out.path())
            .build(root.path(), &target(), None)
            .await;

        match result {
            Err(PublishError::BuildFailed { collection, stderr }) => {
                assert_eq!(collection, "acme.tool");
                assert!(stderr.contains("scripted build failure"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_artifacts_is_not_found() {
        let root = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("acme-other-1.0.0.tar.gz"), b"").unwrap();
        let tool = FakeTool::new().build_without_artifact("acme.tool");

        let result = PackageBuilder::new(&tool, out.path())
            .build(root.path(), &target(), Some("1.0.0"))
            .await;

        match result {
            Err(PublishError::ArtifactNotFound { pattern, dir }) => {
                assert_eq!(pattern, "acme-tool-*.tar.gz");
                assert_eq!(dir, out.path());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_artifacts_do_not_win() {
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("acme-tool-9.0.0.tar.gz"), b"").unwrap();
        std::fs::write(out.path().join("acme-tool-1.0.0.tar.gz"), b"").unwrap();
        std::fs::create_dir(out.path().join("acme-tool-5.0.0.tar.gz")).unwrap();
        let tool = FakeTool::new();

        let artifact = PackageBuilder::new(&tool, out.path())
            .find_artifact(&target(), Some("1.0.0"))
            .await
            .unwrap();

        assert_eq!(artifact, out.path().join("acme-tool-1.0.0.tar.gz"));
    }

    #[tokio::test]
    async fn test_unlistable_output_dir_is_scan_failure() {
        let dir = TempDir::new().unwrap();
        let not_a_dir = dir.path().join("dist");
        std::fs::write(&not_a_dir, b"").unwrap();
        let tool = FakeTool::new();

        let result = PackageBuilder::new(&tool, &not_a_dir)
            .find_artifact(&target(), Some("1.0.0"))
            .await;

        match result {
            Err(PublishError::ArtifactScanFailed { dir, .. }) => assert_eq!(dir, not_a_dir),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
