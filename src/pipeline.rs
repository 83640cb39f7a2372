//! Batch pipeline: load both sources concurrently, join, project, emit.

use crate::config::Config;
use crate::contacts::{self, ContactScan};
use crate::directory;
use crate::error::Result;
use crate::matrix;
use crate::roster::{self, Roster};
use crate::types::ReportSink;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Which report artifacts a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Flat role report only.
    Extract,
    /// Per-identity matrices only.
    Matrices,
    /// Everything.
    Full,
}

impl RunMode {
    fn wants_flat_report(&self) -> bool {
        matches!(self, RunMode::Extract | RunMode::Full)
    }

    fn wants_matrices(&self) -> bool {
        matches!(self, RunMode::Matrices | RunMode::Full)
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub countries: usize,
    pub contact_groups: usize,
    pub assignments: usize,
    pub identities: usize,
    pub flat_report: Option<String>,
    pub matrix_files: Vec<String>,
    pub unique_emails_file: Option<String>,
    pub errors: Vec<String>,
}

/// Run the full pipeline against the configured sources.
///
/// The roster load and the contacts-folder scan are independent and run
/// concurrently; the join starts only once both have completed, since it
/// needs the complete roster and the complete group set to resolve
/// references.
#[instrument(skip(config, sink), fields(mode = ?mode))]
pub async fn run(config: &Config, mode: RunMode, sink: Arc<dyn ReportSink>) -> Result<RunSummary> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    info!(%run_id, "starting directory pipeline");

    let (roster, scan) = load_sources(config).await?;
    info!(
        countries = roster.len(),
        groups = scan.groups.len(),
        skipped_files = scan.skipped_files.len(),
        "sources loaded"
    );
    println!(
        "📥 Loaded {} countries and {} contact groups",
        roster.len(),
        scan.groups.len()
    );

    let mut errors: Vec<String> = scan
        .skipped_files
        .iter()
        .map(|path| format!("skipped contact file: {path}"))
        .collect();

    let assignments = directory::build_directory(&roster, &scan.groups);
    directory::warn_species_coverage(&assignments);
    info!(assignments = assignments.len(), "directory join complete");
    println!("🔧 Resolved {} role assignments", assignments.len());

    let identities = matrix::distinct_identities(&assignments);

    let flat_report = if mode.wants_flat_report() {
        let path = sink.write_flat_report(&assignments).await?;
        println!("💾 Flat report written to {path}");
        Some(path)
    } else {
        None
    };

    let mut matrix_files = Vec::new();
    if mode.wants_matrices() {
        let matrices = matrix::project_matrices(&assignments, &scan.groups);

        // Each matrix targets its own file, so the writes are independent
        let mut writes = JoinSet::new();
        for m in matrices {
            let sink = Arc::clone(&sink);
            writes.spawn(async move {
                let email = m.email.clone();
                sink.write_identity_matrix(&m).await.map_err(|e| (email, e))
            });
        }
        while let Some(joined) = writes.join_next().await {
            match joined? {
                Ok(path) => matrix_files.push(path),
                Err((email, e)) => {
                    error!(identity = %email, error = %e, "failed to write identity matrix");
                    errors.push(format!("matrix write failed for {email}: {e}"));
                }
            }
        }
        matrix_files.sort();
        println!("💾 Wrote {} identity matrices", matrix_files.len());
    }

    let unique_emails_file = Some(sink.write_unique_emails(&identities).await?);

    let summary = RunSummary {
        run_id,
        started_at,
        completed_at: Utc::now(),
        countries: roster.len(),
        contact_groups: scan.groups.len(),
        assignments: assignments.len(),
        identities: identities.len(),
        flat_report,
        matrix_files,
        unique_emails_file,
        errors,
    };

    if let Err(e) = persist_summary(&summary, config) {
        warn!(error = %e, "failed to persist run summary");
    }

    info!(
        assignments = summary.assignments,
        identities = summary.identities,
        errors = summary.errors.len(),
        "pipeline finished"
    );
    Ok(summary)
}

async fn load_sources(config: &Config) -> Result<(Roster, ContactScan)> {
    let roster_path = config.inputs.roster_file.clone();
    let contacts_dir = config.inputs.contacts_dir.clone();

    let (roster, scan) = tokio::join!(
        tokio::task::spawn_blocking(move || roster::load_roster(&roster_path)),
        tokio::task::spawn_blocking(move || contacts::gather_contact_groups(&contacts_dir)),
    );
    Ok((roster??, scan??))
}

/// Persist the run summary to a timestamped JSON file in the output folder.
fn persist_summary(summary: &RunSummary, config: &Config) -> Result<String> {
    fs::create_dir_all(&config.outputs.output_dir)?;
    let timestamp = summary.started_at.format("%Y%m%d_%H%M%S");
    let path = config
        .outputs
        .output_dir
        .join(format!("run_{timestamp}.json"));

    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json)?;
    Ok(path.to_string_lossy().to_string())
}
