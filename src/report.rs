//! Report Emitter: serializes the flat role report and the per-identity
//! matrices. No derivation logic lives here; everything is already computed.

use crate::error::Result;
use crate::matrix::IdentityMatrix;
use crate::types::{ReportSink, ResolvedAssignment};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const FLAT_REPORT_FILENAME: &str = "invader_info.csv";
pub const UNIQUE_EMAILS_FILENAME: &str = "unique_emails.txt";

/// Reduce an identity's local-part to a safe matrix filename: keep
/// alphanumerics, spaces, dots, and underscores; strip the rest; trim
/// trailing whitespace.
pub fn sanitize_filename(local_part: &str) -> String {
    local_part
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Filesystem-backed `ReportSink`. Output directories are created on demand;
/// creation is recursive and idempotent, so concurrent matrix writes need no
/// coordination beyond distinct target paths.
pub struct FsReportSink {
    output_dir: PathBuf,
    matrix_dir: PathBuf,
}

impl FsReportSink {
    pub fn new(output_dir: &Path, matrix_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            matrix_dir: matrix_dir.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl ReportSink for FsReportSink {
    async fn write_flat_report(&self, assignments: &[ResolvedAssignment]) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(FLAT_REPORT_FILENAME);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(["Country_Code", "Invader_Species", "Role", "Email"])?;
        for assignment in assignments {
            writer.write_record([
                assignment.country_code.as_str(),
                assignment.invader_species.as_str(),
                assignment.role.report_label(),
                assignment.email.as_str(),
            ])?;
        }
        writer.flush()?;

        info!(path = %path.display(), rows = assignments.len(), "wrote flat role report");
        Ok(path.to_string_lossy().to_string())
    }

    async fn write_identity_matrix(&self, matrix: &IdentityMatrix) -> Result<String> {
        fs::create_dir_all(&self.matrix_dir)?;
        let filename = format!("{}.csv", sanitize_filename(&matrix.local_part));
        let path = self.matrix_dir.join(filename);

        let mut writer = csv::Writer::from_path(&path)?;
        let mut header = vec![matrix.local_part.clone()];
        header.extend(matrix.invader_keys.iter().cloned());
        writer.write_record(&header)?;

        for (group_idx, group_name) in matrix.group_names.iter().enumerate() {
            let mut row = vec![group_name.clone()];
            for invader_idx in 0..matrix.invader_keys.len() {
                row.push(matrix.cell_text(group_idx, invader_idx));
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), identity = %matrix.email, "wrote identity matrix");
        Ok(path.to_string_lossy().to_string())
    }

    async fn write_unique_emails(&self, emails: &[String]) -> Result<String> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(UNIQUE_EMAILS_FILENAME);

        let mut sorted: Vec<&str> = emails.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let mut body = sorted.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&path, body)?;

        info!(path = %path.display(), emails = emails.len(), "wrote unique email list");
        Ok(path.to_string_lossy().to_string())
    }
}
