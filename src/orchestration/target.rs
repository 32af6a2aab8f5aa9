//! Collection targets and their discovery under the collections root

use crate::core::error::PublishError;
use crate::manifest::MANIFEST_FILE;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// One collection, addressed as `namespace.name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target {
    pub namespace: String,
    pub name: String,
}

impl Target {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// `namespace/name`, relative to the collections root
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.namespace).join(&self.name)
    }

    pub fn dir(&self, collections_root: &Path) -> PathBuf {
        collections_root.join(self.relative_path())
    }

    pub fn manifest_path(&self, collections_root: &Path) -> PathBuf {
        self.dir(collections_root).join(MANIFEST_FILE)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

fn is_path_segment(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
}

impl FromStr for Target {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        match parts.as_slice() {
            [namespace, name] if is_path_segment(namespace) && is_path_segment(name) => {
                Ok(Self::new(*namespace, *name))
            }
            _ => Err(PublishError::UsageError(format!(
                "invalid target '{}': expected <namespace>.<name>",
                s
            ))),
        }
    }
}

/// Which collections a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(Target),
    Namespace(String),
    All,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(target) => write!(f, "{}", target),
            Self::Namespace(namespace) => write!(f, "namespace {}", namespace),
            Self::All => write!(f, "all collections"),
        }
    }
}

/// Expand a selection into targets, sorted by namespace then name
///
/// A selected directory that does not exist is a `TargetNotFound` error.
/// Whether each target actually carries a manifest is left to the pipeline.
pub fn discover(collections_root: &Path, selection: &Selection) -> Result<Vec<Target>, PublishError> {
    match selection {
        Selection::Single(target) => {
            let dir = target.dir(collections_root);
            if !dir.is_dir() {
                return Err(PublishError::TargetNotFound { path: dir });
            }
            Ok(vec![target.clone()])
        }
        Selection::Namespace(namespace) => {
            if !is_path_segment(namespace) {
                return Err(PublishError::UsageError(format!(
                    "invalid namespace '{}'",
                    namespace
                )));
            }
            let dir = collections_root.join(namespace);
            if !dir.is_dir() {
                return Err(PublishError::TargetNotFound { path: dir });
            }
            Ok(child_dirs(&dir)
                .into_iter()
                .map(|name| Target::new(namespace.as_str(), name))
                .collect())
        }
        Selection::All => {
            if !collections_root.is_dir() {
                return Err(PublishError::TargetNotFound {
                    path: collections_root.to_path_buf(),
                });
            }
            let mut targets = Vec::new();
            for namespace in child_dirs(collections_root) {
                // `<ns>.<name>-<version>.info` directories hold install metadata
                if namespace.ends_with(".info") {
                    continue;
                }
                for name in child_dirs(&collections_root.join(&namespace)) {
                    targets.push(Target::new(namespace.as_str(), name));
                }
            }
            Ok(targets)
        }
    }
}

/// Names of the immediate subdirectories of `dir`, sorted
fn child_dirs(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect()
}
