//! Collection Publisher CLI
//!
//! Builds installed Ansible collections and publishes them to a Galaxy server

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use collection_publisher::{
    AnsibleGalaxyCli, BatchPublisher, ConfigLoadOptions, ConfigLoader, ConfigOverrides,
    PublishError, SecureTokenManager, Selection, Target,
};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Build installed Ansible collections and publish them to a Galaxy server
#[derive(Parser)]
#[command(name = "collection-publisher")]
#[command(version)]
#[command(about = "Build installed Ansible collections and publish them to a Galaxy server", long_about = None)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .multiple(false)
        .args(["target", "namespace", "all"])
))]
struct Cli {
    /// Single collection as <namespace>.<name>
    #[arg(long, visible_alias = "collection", value_name = "NAMESPACE.NAME")]
    target: Option<Target>,

    /// Every collection in a namespace
    #[arg(long, value_name = "NAMESPACE")]
    namespace: Option<String>,

    /// Every collection under the collections root
    #[arg(long)]
    all: bool,

    /// Root of the <namespace>/<name> collections tree
    #[arg(long, value_name = "DIR")]
    collections_root: Option<PathBuf>,

    /// Directory to build artifacts into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Timeout for each ansible-galaxy invocation, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Build artifacts without publishing them
    #[arg(long)]
    build_only: bool,

    /// Exit with status 2 when any collection fails
    #[arg(long)]
    strict: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn selection(&self) -> Selection {
        if let Some(target) = &self.target {
            Selection::Single(target.clone())
        } else if let Some(namespace) = &self.namespace {
            Selection::Namespace(namespace.clone())
        } else {
            Selection::All
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            collections_root: self.collections_root.clone(),
            output_dir: self.output_dir.clone(),
            command_timeout_secs: self.timeout,
            strict: self.strict.then_some(true),
            build_only: self.build_only.then_some(true),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{}", e.render());
                process::exit(0);
            }
            _ => {
                // Usage problems go to stdout, like the rest of the report
                println!("{}", e.render());
                process::exit(1);
            }
        },
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            if let Some(error) = e.downcast_ref::<PublishError>() {
                for action in error.suggested_actions() {
                    eprintln!("  → {}", action);
                }
            }
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    // Credentials are checked before any collection is touched
    let credentials = SecureTokenManager::from_process_env().credentials()?;

    let config = ConfigLoader::load(ConfigLoadOptions {
        project_path: std::env::current_dir()?,
        cli_args: Some(cli.overrides()),
        env: std::env::vars().collect(),
    })
    .await?;

    let strict = config.strict;
    let tool = Arc::new(AnsibleGalaxyCli::new(&config));
    let publisher = BatchPublisher::new(config, credentials, tool);

    let report = publisher.run(&cli.selection()).await?;

    Ok(report.exit_code(strict))
}
