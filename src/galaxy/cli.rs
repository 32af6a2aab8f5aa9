//! `ansible-galaxy` command-line driver

use crate::core::config::PublisherConfig;
use crate::core::error::PublishError;
use crate::core::traits::{CollectionTool, ToolOutput};
use crate::security::command_executor::{CommandError, SafeCommandExecutor};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runs `ansible-galaxy collection build|publish`
#[derive(Debug, Clone)]
pub struct AnsibleGalaxyCli {
    command: String,
    timeout: Duration,
    ignore_certs: bool,
    force_rebuild: bool,
}

impl AnsibleGalaxyCli {
    pub fn new(config: &PublisherConfig) -> Self {
        Self {
            command: config.galaxy_command.clone(),
            timeout: config.command_timeout(),
            ignore_certs: config.ignore_certs,
            force_rebuild: config.force_rebuild,
        }
    }

    /// `collection build -c <dir> [--force]`
    pub fn build_args(&self, collection_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "collection".into(),
            "build".into(),
            "-c".into(),
            collection_dir.as_os_str().to_owned(),
        ];
        if self.force_rebuild {
            args.push("--force".into());
        }
        args
    }

    /// `collection publish <artifact> --server <url> --api-key <token> [--ignore-certs]`
    pub fn publish_args(
        &self,
        artifact: &Path,
        server_url: &str,
        api_key: &SecretString,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "collection".into(),
            "publish".into(),
            artifact.as_os_str().to_owned(),
            "--server".into(),
            server_url.into(),
            "--api-key".into(),
            api_key.expose_secret().into(),
        ];
        if self.ignore_certs {
            args.push("--ignore-certs".into());
        }
        args
    }

    async fn run(&self, working_dir: &Path, args: &[OsString]) -> Result<ToolOutput, PublishError> {
        let mut executor =
            SafeCommandExecutor::new(working_dir).map_err(|e| self.command_failed(e))?;
        executor.set_timeout(self.timeout);

        executor
            .execute(&self.command, args)
            .await
            .map_err(|e| self.command_failed(e))
    }

    fn command_failed(&self, error: CommandError) -> PublishError {
        match error {
            CommandError::Timeout(timeout) => PublishError::timeout(&self.command, timeout),
            other => PublishError::CommandFailed {
                command: self.command.clone(),
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl CollectionTool for AnsibleGalaxyCli {
    fn name(&self) -> &str {
        &self.command
    }

    async fn build(
        &self,
        collection_dir: &Path,
        output_dir: &Path,
    ) -> Result<ToolOutput, PublishError> {
        // The tool runs inside output_dir, so relative paths must not leak through
        let collection_dir = absolute(collection_dir);
        self.run(output_dir, &self.build_args(&collection_dir)).await
    }

    async fn publish(
        &self,
        artifact: &Path,
        server_url: &str,
        api_key: &SecretString,
    ) -> Result<ToolOutput, PublishError> {
        let artifact = absolute(artifact);
        let working_dir = artifact.parent().unwrap_or_else(|| Path::new("."));
        self.run(working_dir, &self.publish_args(&artifact, server_url, api_key))
            .await
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_build_args_with_force() {
        let cli = AnsibleGalaxyCli::new(&PublisherConfig::default());

        assert_eq!(
            strings(&cli.build_args(Path::new("/c/acme/tool"))),
            vec!["collection", "build", "-c", "/c/acme/tool", "--force"]
        );
    }

    #[test]
    fn test_build_args_without_force() {
        let config = PublisherConfig {
            force_rebuild: false,
            ..Default::default()
        };
        let cli = AnsibleGalaxyCli::new(&config);

        assert!(!strings(&cli.build_args(Path::new("/c"))).contains(&"--force".to_string()));
    }

    #[test]
    fn test_publish_args() {
        let cli = AnsibleGalaxyCli::new(&PublisherConfig::default());
        let token = SecretString::new("secret-token-12345".into());

        assert_eq!(
            strings(&cli.publish_args(
                Path::new("/out/acme-tool-1.0.0.tar.gz"),
                "https://galaxy.example.com/api/galaxy/content/validated/",
                &token
            )),
            vec![
                "collection",
                "publish",
                "/out/acme-tool-1.0.0.tar.gz",
                "--server",
                "https://galaxy.example.com/api/galaxy/content/validated/",
                "--api-key",
                "secret-token-12345",
                "--ignore-certs"
            ]
        );
    }

    #[tokio::test]
    async fn test_disallowed_command_is_command_failure() {
        let config = PublisherConfig {
            galaxy_command: "rm".to_string(),
            ..Default::default()
        };
        let cli = AnsibleGalaxyCli::new(&config);

        let result = cli.build(Path::new("/c/acme/tool"), &std::env::temp_dir()).await;

        match result {
            Err(PublishError::CommandFailed { command, message }) => {
                assert_eq!(command, "rm");
                assert!(message.contains("not in the allowed list"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_command_failure() {
        let cli = AnsibleGalaxyCli::new(&PublisherConfig::default());

        let result = cli
            .build(Path::new("/c/acme/tool"), Path::new("/nonexistent/output/dir"))
            .await;

        assert!(matches!(result, Err(PublishError::CommandFailed { .. })));
    }
}
