//! Configuration structures and types for collection-publisher
//!
//! This module provides type-safe configuration management with serde support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of installed collections
pub const DEFAULT_COLLECTIONS_ROOT: &str = "/usr/share/ansible/collections/ansible_collections";

/// Default packaging tool
pub const DEFAULT_GALAXY_COMMAND: &str = "ansible-galaxy";

/// Default timeout for a single build or publish invocation
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Effective configuration for a run
///
/// Built once at startup by [`ConfigLoader`](crate::core::config_loader::ConfigLoader)
/// and passed by reference to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Root of the `<namespace>/<name>` collections tree
    pub collections_root: PathBuf,

    /// Directory the packaging tool runs in and writes artifacts to
    pub output_dir: PathBuf,

    /// Packaging tool executable
    pub galaxy_command: String,

    /// Timeout for each subprocess, in seconds
    pub command_timeout_secs: u64,

    /// Pass `--ignore-certs` to the publish command
    pub ignore_certs: bool,

    /// Pass `--force` to the build command
    pub force_rebuild: bool,

    /// Exit non-zero when any target fails
    pub strict: bool,

    /// Stop after building
    pub build_only: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            collections_root: PathBuf::from(DEFAULT_COLLECTIONS_ROOT),
            output_dir: PathBuf::from("."),
            galaxy_command: DEFAULT_GALAXY_COMMAND.to_string(),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            ignore_certs: true,
            force_rebuild: true,
            strict: false,
            build_only: false,
        }
    }
}

impl PublisherConfig {
    /// Subprocess timeout as a [`Duration`]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Apply every field set in `overrides` on top of this configuration
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(root) = overrides.collections_root {
            self.collections_root = root;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(command) = overrides.galaxy_command {
            self.galaxy_command = command;
        }
        if let Some(secs) = overrides.command_timeout_secs {
            self.command_timeout_secs = secs;
        }
        if let Some(ignore_certs) = overrides.ignore_certs {
            self.ignore_certs = ignore_certs;
        }
        if let Some(force) = overrides.force_rebuild {
            self.force_rebuild = force;
        }
        if let Some(strict) = overrides.strict {
            self.strict = strict;
        }
        if let Some(build_only) = overrides.build_only {
            self.build_only = build_only;
        }
    }
}

/// A partial configuration layer
///
/// Used for the YAML config files, the environment and CLI flags alike;
/// unset fields leave the lower layer untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub galaxy_command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_certs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_rebuild: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_only: Option<bool>,
}

impl ConfigOverrides {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
