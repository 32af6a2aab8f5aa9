//! Publish-URL Resolver
//!
//! Joins the server base URL with the upload path recorded in `galaxy.yml`.

use crate::core::error::PublishError;
use serde::Deserialize;
use std::path::Path;

/// The only field the resolver reads from `galaxy.yml`
#[derive(Debug, Deserialize)]
struct RoutingField {
    #[serde(default)]
    publish_url: Option<String>,
}

/// Normalize a server base URL
///
/// `http://` and `https://` are kept, a bare host gets `https://`, any other
/// scheme is rejected. Trailing slashes are removed.
///
/// # Examples
///
/// ```
/// use collection_publisher::galaxy::resolver::normalize_server_base;
///
/// assert_eq!(
///     normalize_server_base("galaxy.example.com").unwrap(),
///     "https://galaxy.example.com"
/// );
/// assert_eq!(
///     normalize_server_base("http://localhost:8080/").unwrap(),
///     "http://localhost:8080"
/// );
/// assert!(normalize_server_base("ftp://galaxy.example.com").is_err());
/// ```
pub fn normalize_server_base(server_base: &str) -> Result<String, PublishError> {
    let trimmed = server_base.trim();
    let invalid = || PublishError::InvalidServerUrl {
        url: trimmed.to_string(),
    };

    let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        ("http", rest)
    } else if trimmed.contains("://") {
        return Err(invalid());
    } else {
        ("https", trimmed)
    };

    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return Err(invalid());
    }

    Ok(format!("{}://{}", scheme, host))
}

/// Resolve the upload URL for the collection described by `metadata_path`
///
/// # Errors
///
/// - `PublishError::ManifestParseError` - metadata unreadable or not YAML
/// - `PublishError::MetadataMissingField` - no `publish_url` in the metadata
/// - `PublishError::InvalidServerUrl` - unsupported scheme in `server_base`
pub async fn resolve(metadata_path: &Path, server_base: &str) -> Result<String, PublishError> {
    let content = tokio::fs::read_to_string(metadata_path).await.map_err(|e| {
        PublishError::ManifestParseError {
            path: metadata_path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let routing: RoutingField =
        serde_yaml::from_str(&content).map_err(|e| PublishError::ManifestParseError {
            path: metadata_path.to_path_buf(),
            message: e.to_string(),
        })?;

    let segment = routing
        .publish_url
        .filter(|segment| !segment.trim().is_empty())
        .ok_or_else(|| PublishError::MetadataMissingField {
            path: metadata_path.to_path_buf(),
            field: "publish_url".to_string(),
        })?;

    let base = normalize_server_base(server_base)?;
    if segment.starts_with('/') {
        Ok(format!("{}{}", base, segment))
    } else {
        Ok(format!("{}/{}", base, segment))
    }
}
