//! Batch Publisher - runs the pipeline over every selected collection
//!
//! Features:
//! - Sequential processing with per-target failure isolation
//! - One report line per target plus a summary block
//! - Run id and start timestamp for log correlation
//! - Exit code policy (lenient by default, `strict` on request)

use crate::core::config::PublisherConfig;
use crate::core::error::PublishError;
use crate::core::traits::CollectionTool;
use crate::orchestration::collection_publisher::{CollectionPublisher, TargetOutcome, TargetReport};
use crate::orchestration::target::{self, Selection};
use crate::security::token_manager::Credentials;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Exit code when `strict` is set and at least one target failed
pub const EXIT_TARGET_FAILURES: i32 = 2;

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub selection: String,
    pub reports: Vec<TargetReport>,
    pub duration_ms: u64,
}

impl RunReport {
    /// Targets whose report label equals `label`
    pub fn count(&self, label: &str) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.reports.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Process exit code for this run
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.has_failures() {
            EXIT_TARGET_FAILURES
        } else {
            0
        }
    }
}

/// BatchPublisher - processes a selection of collections one after another
pub struct BatchPublisher {
    config: PublisherConfig,
    credentials: Credentials,
    tool: Arc<dyn CollectionTool>,
}

impl BatchPublisher {
    /// Create a new BatchPublisher
    ///
    /// # Arguments
    ///
    /// * `config` - Effective configuration for the run
    /// * `credentials` - Server URL and API token, already validated
    /// * `tool` - Packaging tool used to build and publish
    pub fn new(config: PublisherConfig, credentials: Credentials, tool: Arc<dyn CollectionTool>) -> Self {
        Self {
            config,
            credentials,
            tool,
        }
    }

    /// Process every target in `selection`
    ///
    /// # Errors
    ///
    /// Only run-level problems are returned: an unknown target or namespace,
    /// or an output directory that cannot be created. Per-target failures
    /// are part of the [`RunReport`].
    pub async fn run(&self, selection: &Selection) -> Result<RunReport, PublishError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start_time = Instant::now();
        let span = tracing::info_span!("run", run_id = %run_id);

        let targets = target::discover(&self.config.collections_root, selection)?;

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| {
                PublishError::ConfigError(format!(
                    "cannot create output directory {}: {}",
                    self.config.output_dir.display(),
                    e
                ))
            })?;

        span.in_scope(|| {
            tracing::info!(
                started_at = %started_at.to_rfc3339(),
                selection = %selection,
                targets = targets.len(),
                "starting run"
            );
        });

        println!(
            "\n📦 Publishing {} ({} collections)",
            selection,
            targets.len()
        );
        println!("Run: {} ({})\n", run_id, started_at.to_rfc3339());

        let publisher = CollectionPublisher::new(&self.config, &self.credentials, self.tool.as_ref());
        let mut reports = Vec::with_capacity(targets.len());

        for target in &targets {
            let report = publisher.process(target).instrument(span.clone()).await;
            Self::print_target_line(&report);
            reports.push(report);
        }

        let result = RunReport {
            run_id,
            started_at,
            selection: selection.to_string(),
            reports,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        Self::print_summary(&result);

        Ok(result)
    }

    fn print_target_line(report: &TargetReport) {
        let label = report.outcome.label();
        match &report.outcome {
            TargetOutcome::Skipped { reason } => {
                println!("⏭️  {}: {} - {}", report.target, label, reason);
            }
            TargetOutcome::Built { artifact } => {
                println!(
                    "📦 {}: {} {} ({}ms)",
                    report.target,
                    label,
                    artifact.display(),
                    report.duration_ms
                );
            }
            TargetOutcome::Published { url, .. } => {
                println!(
                    "✅ {}: {} to {} ({}ms)",
                    report.target, label, url, report.duration_ms
                );
            }
            TargetOutcome::AlreadyPublished { notice, .. } => {
                println!("♻️  {}: {} - {}", report.target, label, notice);
            }
            TargetOutcome::Failed { message, .. } => {
                println!("❌ {}: {} - {}", report.target, label, message);
            }
        }
    }

    /// Print run summary
    fn print_summary(result: &RunReport) {
        println!("\n{}", "=".repeat(60));
        println!("📊 Publish Summary");
        println!("{}", "=".repeat(60));

        println!("\n✅ Published: {}", result.count("published"));
        println!("♻️  Already published: {}", result.count("already-published"));
        println!("📦 Built only: {}", result.count("built"));
        println!("⏭️  Skipped: {}", result.count("skipped"));

        let failures: Vec<&TargetReport> = result.failures().collect();
        println!("\n❌ Failed: {}", failures.len());
        for report in &failures {
            if let TargetOutcome::Failed { stage, code, .. } = &report.outcome {
                println!("   - {} at {} [{}] ({}ms)", report.target, stage, code, report.duration_ms);
            }
        }

        println!("\n{}", "=".repeat(60));
        println!(
            "Overall Status: {} ({}ms)",
            if result.has_failures() { "❌ FAILED" } else { "✅ SUCCESS" },
            result.duration_ms
        );
        println!("{}\n", "=".repeat(60));
    }
}
