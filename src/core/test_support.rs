//! Scripted in-memory packaging tool for pipeline tests

use crate::core::error::PublishError;
use crate::core::traits::{CollectionTool, ToolOutput};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A recorded publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    pub artifact: PathBuf,
    pub server_url: String,
    pub api_key: String,
}

/// Fake `ansible-galaxy`
///
/// `build` reads the generated `galaxy.yml` and drops an empty
/// `<namespace>-<name>-<version>.tar.gz` into the output directory.
/// Behaviour is scripted per `namespace.name`.
#[derive(Default)]
pub struct FakeTool {
    failing_builds: HashSet<String>,
    silent_builds: HashSet<String>,
    publish_responses: HashMap<String, ToolOutput>,
    pub builds: Mutex<Vec<PathBuf>>,
    pub publishes: Mutex<Vec<PublishCall>>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the build of `target` exit non-zero
    pub fn fail_build(mut self, target: &str) -> Self {
        self.failing_builds.insert(target.to_string());
        self
    }

    /// Make the build of `target` succeed without producing an artifact
    pub fn build_without_artifact(mut self, target: &str) -> Self {
        self.silent_builds.insert(target.to_string());
        self
    }

    /// Script the publish response for `target`
    pub fn publish_response(mut self, target: &str, output: ToolOutput) -> Self {
        self.publish_responses.insert(target.to_string(), output);
        self
    }

    pub fn build_count(&self) -> usize {
        self.builds.lock().unwrap().len()
    }

    pub fn publish_calls(&self) -> Vec<PublishCall> {
        self.publishes.lock().unwrap().clone()
    }

    fn key_for_dir(collection_dir: &Path) -> String {
        let name = collection_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let namespace = collection_dir
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}.{}", namespace, name)
    }

    fn key_for_artifact(artifact: &Path) -> String {
        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut parts = file_name.splitn(3, '-');
        let namespace = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        format!("{}.{}", namespace, name)
    }
}

#[async_trait]
impl CollectionTool for FakeTool {
    fn name(&self) -> &str {
        "fake-galaxy"
    }

    async fn build(
        &self,
        collection_dir: &Path,
        output_dir: &Path,
    ) -> Result<ToolOutput, PublishError> {
        self.builds.lock().unwrap().push(collection_dir.to_path_buf());
        let key = Self::key_for_dir(collection_dir);

        if self.failing_builds.contains(&key) {
            return Ok(ToolOutput::failed("ERROR! scripted build failure"));
        }
        if self.silent_builds.contains(&key) {
            return Ok(ToolOutput::ok(""));
        }

        let galaxy = std::fs::read_to_string(collection_dir.join("galaxy.yml")).unwrap();
        let metadata: serde_yaml::Value = serde_yaml::from_str(&galaxy).unwrap();
        let file_name = format!(
            "{}-{}-{}.tar.gz",
            metadata["namespace"].as_str().unwrap(),
            metadata["name"].as_str().unwrap(),
            metadata["version"].as_str().unwrap()
        );
        std::fs::write(output_dir.join(&file_name), b"").unwrap();

        Ok(ToolOutput::ok(format!("Created collection at {}", file_name)))
    }

    async fn publish(
        &self,
        artifact: &Path,
        server_url: &str,
        api_key: &SecretString,
    ) -> Result<ToolOutput, PublishError> {
        self.publishes.lock().unwrap().push(PublishCall {
            artifact: artifact.to_path_buf(),
            server_url: server_url.to_string(),
            api_key: api_key.expose_secret().to_string(),
        });

        Ok(self
            .publish_responses
            .get(&Self::key_for_artifact(artifact))
            .cloned()
            .unwrap_or_else(|| ToolOutput::ok("Collection has been published")))
    }
}

/// Write `<root>/<namespace>/<name>/MANIFEST.json` with the given collection_info
pub fn write_manifest(root: &Path, namespace: &str, name: &str, info: serde_json::Value) -> PathBuf {
    let dir = root.join(namespace).join(name);
    std::fs::create_dir_all(&dir).unwrap();
    let manifest = serde_json::json!({
        "collection_info": info,
        "file_manifest_file": { "name": "FILES.json", "ftype": "file" },
        "format": 1
    });
    let path = dir.join("MANIFEST.json");
    std::fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    path
}

/// Minimal valid collection_info for `namespace.name`
pub fn collection_info(namespace: &str, name: &str, version: &str) -> serde_json::Value {
    serde_json::json!({
        "namespace": namespace,
        "name": name,
        "version": version,
        "authors": ["Ops Team <ops@example.com>"],
        "readme": "README.md",
        "tags": ["tools"],
        "description": "Test collection",
        "license": ["GPL-3.0-or-later"],
        "license_file": null,
        "dependencies": {},
        "repository": null,
        "documentation": null,
        "homepage": null,
        "issues": null
    })
}
