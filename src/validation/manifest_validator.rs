//! Manifest Validator - Checks the collection_info fields the pipeline depends on
//!
//! Errors stop a target before anything is written; warnings are logged and
//! left for `ansible-galaxy` to judge.
//!
//! # Example
//!
//! ```
//! use collection_publisher::manifest::CollectionInfo;
//! use collection_publisher::validation::ManifestValidator;
//!
//! let info = CollectionInfo {
//!     namespace: Some("acme".to_string()),
//!     name: Some("tool".to_string()),
//!     version: Some("1.0.0".to_string()),
//!     ..Default::default()
//! };
//!
//! let result = ManifestValidator::new().validate(&info);
//! assert!(result.is_valid);
//! ```

use crate::manifest::CollectionInfo;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that may appear in an artifact file name segment
    static ref SAFE_SEGMENT: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    /// Galaxy naming rule for namespaces and collection names
    static ref GALAXY_NAME: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").unwrap();
}

/// Result of manifest validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the manifest is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings
    pub warnings: Vec<String>,
}

/// Validator for collection manifests
#[derive(Debug, Default)]
pub struct ManifestValidator;

impl ManifestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a parsed `collection_info`
    pub fn validate(&self, info: &CollectionInfo) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.validate_segment("namespace", info.namespace.as_deref(), &mut errors, &mut warnings);
        self.validate_segment("name", info.name.as_deref(), &mut errors, &mut warnings);

        match info.version.as_deref().map(str::trim) {
            None | Some("") => errors.push("version is required".to_string()),
            Some(version) => {
                if semver::Version::parse(version).is_err() {
                    warnings.push(format!("version '{}' is not valid SemVer", version));
                }
            }
        }

        if info.authors.is_empty() {
            warnings.push("authors is empty".to_string());
        }

        let has_license_file = info
            .license_file
            .as_deref()
            .is_some_and(|f| !f.trim().is_empty());
        let has_license = info.license.as_ref().is_some_and(|l| !l.is_empty());
        if !has_license_file && !has_license {
            warnings.push("neither license nor license_file is set".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Namespace and name end up in the artifact file name and its glob pattern
    fn validate_segment(
        &self,
        field: &str,
        value: Option<&str>,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) {
        match value.map(str::trim) {
            None | Some("") => errors.push(format!("{} is required", field)),
            Some(value) if !SAFE_SEGMENT.is_match(value) => errors.push(format!(
                "{} '{}' may only contain letters, digits and underscores",
                field, value
            )),
            Some(value) if !GALAXY_NAME.is_match(value) => warnings.push(format!(
                "{} '{}' should be lowercase and start with a letter",
                field, value
            )),
            Some(_) => {}
        }
    }
}
