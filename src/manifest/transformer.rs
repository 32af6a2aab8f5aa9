//! Manifest Transformer - derives `galaxy.yml` from an installed `MANIFEST.json`
//!
//! Two policies are applied on the way:
//! - routing: collections tagged `aacertified` publish to the certified
//!   endpoint, everything else to the validated endpoint;
//! - licensing: a non-empty `license_file` wins over `license`, otherwise
//!   `license` is kept and `license_file` dropped.
//!
//! The metadata file is regenerated on every run and replaced atomically.

use super::model::{CollectionInfo, GALAXY_FILE, GalaxyMetadata, Manifest};
use crate::core::error::PublishError;
use crate::validation::ManifestValidator;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Tag marking a collection for the certified endpoint
pub const CERTIFIED_TAG: &str = "aacertified";

/// Upload path for certified collections
pub const CERTIFIED_PUBLISH_PATH: &str = "/api/galaxy/content/aa-certified/";

/// Upload path for everything else
pub const VALIDATED_PUBLISH_PATH: &str = "/api/galaxy/content/validated/";

/// Keys this transformer always writes itself; copies in `extra` are dropped
const RESERVED_KEYS: &[&str] = &["publish_url"];

/// Upload path segment for a collection with the given tags
pub fn publish_path_for(tags: &[String]) -> &'static str {
    if tags.iter().any(|tag| tag == CERTIFIED_TAG) {
        CERTIFIED_PUBLISH_PATH
    } else {
        VALIDATED_PUBLISH_PATH
    }
}

/// A written `galaxy.yml`
#[derive(Debug, Clone)]
pub struct MetadataFile {
    pub path: PathBuf,
    pub metadata: GalaxyMetadata,
    /// Validator warnings for the source manifest
    pub warnings: Vec<String>,
}

/// Converts `MANIFEST.json` into `galaxy.yml`
#[derive(Debug, Default)]
pub struct ManifestTransformer {
    validator: ManifestValidator,
}

impl ManifestTransformer {
    pub fn new() -> Self {
        Self {
            validator: ManifestValidator::new(),
        }
    }

    /// Read `manifest_path` and write `galaxy.yml` next to it
    ///
    /// # Errors
    ///
    /// - `PublishError::ManifestNotFound` - no manifest at `manifest_path`
    /// - `PublishError::ManifestParseError` - unreadable, malformed, or missing required fields
    /// - `PublishError::MetadataWriteFailed` - `galaxy.yml` could not be replaced
    pub async fn transform(&self, manifest_path: &Path) -> Result<MetadataFile, PublishError> {
        let content = fs::read_to_string(manifest_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PublishError::ManifestNotFound {
                    path: manifest_path.to_path_buf(),
                },
                _ => PublishError::ManifestParseError {
                    path: manifest_path.to_path_buf(),
                    message: e.to_string(),
                },
            })?;

        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|e| PublishError::ManifestParseError {
                path: manifest_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let validation = self.validator.validate(&manifest.collection_info);
        if !validation.is_valid {
            return Err(PublishError::ManifestParseError {
                path: manifest_path.to_path_buf(),
                message: validation.errors.join("; "),
            });
        }

        let metadata = Self::derive(manifest.collection_info).ok_or_else(|| {
            PublishError::ManifestParseError {
                path: manifest_path.to_path_buf(),
                message: "namespace, name and version are required".to_string(),
            }
        })?;

        let galaxy_path = manifest_path.with_file_name(GALAXY_FILE);
        Self::write_atomically(&galaxy_path, &metadata).await?;

        tracing::debug!(
            path = %galaxy_path.display(),
            publish_url = %metadata.publish_url,
            "wrote publish metadata"
        );

        Ok(MetadataFile {
            path: galaxy_path,
            metadata,
            warnings: validation.warnings,
        })
    }

    /// Apply routing and license policy to a manifest's collection info
    ///
    /// Returns `None` when namespace, name or version is missing.
    pub fn derive(info: CollectionInfo) -> Option<GalaxyMetadata> {
        let publish_url = publish_path_for(&info.tags).to_string();

        let mut extra = info.extra;
        for key in RESERVED_KEYS {
            if extra.remove(*key).is_some() {
                tracing::debug!(key = *key, "ignoring manifest value for derived key");
            }
        }

        let license_file = info
            .license_file
            .filter(|file| !file.trim().is_empty());
        let license = if license_file.is_some() {
            None
        } else {
            info.license
        };

        Some(GalaxyMetadata {
            namespace: info.namespace?,
            name: info.name?,
            version: info.version?,
            readme: info.readme,
            authors: info.authors,
            description: info.description,
            license,
            license_file,
            tags: info.tags,
            dependencies: info.dependencies,
            repository: info.repository,
            documentation: info.documentation,
            homepage: info.homepage,
            issues: info.issues,
            publish_url,
            extra,
        })
    }

    /// Write to a temporary sibling, then rename over the destination
    async fn write_atomically(path: &Path, metadata: &GalaxyMetadata) -> Result<(), PublishError> {
        let write_failed = |message: String| PublishError::MetadataWriteFailed {
            path: path.to_path_buf(),
            message,
        };

        let yaml = serde_yaml::to_string(metadata).map_err(|e| write_failed(e.to_string()))?;

        let temp_file = path.with_extension("yml.tmp");
        if let Err(e) = fs::write(&temp_file, yaml).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(write_failed(e.to_string()));
        }
        if let Err(e) = fs::rename(&temp_file, path).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(write_failed(e.to_string()));
        }

        Ok(())
    }
}
