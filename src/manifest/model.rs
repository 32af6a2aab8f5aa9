//! Data model for `MANIFEST.json` and the derived `galaxy.yml`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest file shipped inside an installed collection
pub const MANIFEST_FILE: &str = "MANIFEST.json";

/// Publish metadata file written next to the manifest
pub const GALAXY_FILE: &str = "galaxy.yml";

/// `MANIFEST.json` as written by `ansible-galaxy collection install`
///
/// Only `collection_info` is used; `file_manifest_file` and `format` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub collection_info: CollectionInfo,
}

/// License field: a single SPDX identifier or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum License {
    One(String),
    Many(Vec<String>),
}

impl License {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(id) => id.trim().is_empty(),
            Self::Many(ids) => ids.iter().all(|id| id.trim().is_empty()),
        }
    }
}

/// The `collection_info` object of a manifest
///
/// Keys not modelled here are kept in `extra` and carried into `galaxy.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionInfo {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub authors: Vec<String>,
    pub readme: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub license: Option<License>,
    pub license_file: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub repository: Option<String>,
    pub documentation: Option<String>,
    pub homepage: Option<String>,
    pub issues: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Contents of `galaxy.yml`
///
/// Exactly one of `license` and `license_file` is set after derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyMetadata {
    pub namespace: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_file: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    pub publish_url: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
