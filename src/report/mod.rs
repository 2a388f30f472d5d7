//! Report generator.
//!
//! Turns a fetched JSON result into a CSV document on disk and offers it to
//! the OS file handler. The flow is strictly linear:
//! request → fetch → transform → write → share. Nothing is retried; a failed
//! attempt leaves no partial file behind because the full document is built
//! in memory before the write.

pub mod csv;
pub mod months;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

/// The three report kinds the backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// All consultations of one patient.
    Consultations,
    /// Monthly totals for the practice.
    Monthly,
    /// Monthly totals broken down by consultation type.
    Detailed,
}

impl ReportKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Consultations => "consultations",
            Self::Monthly => "monthly",
            Self::Detailed => "detailed",
        }
    }
}

/// Failure taxonomy for report generation.
///
/// `MissingSelection` aborts before any network call; `EmptyResult` is the
/// distinct "nothing to report" case rather than a hard failure.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Missing selection: {0}")]
    MissingSelection(String),

    #[error("The backend returned nothing to report")]
    EmptyResult,

    #[error("Detail row {row} does not match the first row's columns")]
    SchemaMismatch { row: usize },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to write report file: {0}")]
    Io(#[from] std::io::Error),
}

/// Options common to all report commands.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Where to place the generated file; documents dir (temp dir fallback)
    /// when unset.
    pub out_dir: Option<PathBuf>,
    /// Skip handing the file to the OS opener.
    pub no_share: bool,
}

/// Resolve the directory a report is written to.
pub fn output_dir(requested: Option<&Path>) -> PathBuf {
    match requested {
        Some(dir) => dir.to_path_buf(),
        None => dirs::document_dir().unwrap_or_else(std::env::temp_dir),
    }
}

fn write_and_share(dir: &Path, filename: &str, content: &str, no_share: bool) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, content)?;
    info!(path = %path.display(), bytes = content.len(), "Report written");

    if !no_share {
        // Sharing is best-effort; a missing handler leaves the file in place.
        if let Err(e) = opener::open(&path) {
            warn!("Could not open report with the system handler: {}", e);
        }
    }

    Ok(path)
}

/// Generate the per-patient consultation report.
///
/// Fetches the patient's consultations, projects them onto the fixed field
/// list and writes `historial_consultas_{patient}.csv`.
pub async fn generate_consultations(
    client: &ApiClient,
    patient: &str,
    opts: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    if patient.trim().is_empty() {
        return Err(ReportError::MissingSelection("select a patient".into()));
    }

    let rows: Vec<Value> = client.consultations_raw(patient).await?;
    let content = csv::build_consultations(&rows)?;

    let filename = format!("historial_consultas_{}.csv", patient.trim());
    write_and_share(&output_dir(opts.out_dir.as_deref()), &filename, &content, opts.no_share)
}

/// Generate a monthly or detailed report.
///
/// The month is given by its Spanish name and resolved through the fixed
/// table before anything touches the network; the output filename takes year
/// and month from the aggregate the backend actually returned.
pub async fn generate_monthly(
    client: &ApiClient,
    kind: ReportKind,
    year: &str,
    month: &str,
    opts: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    if year.trim().is_empty() {
        return Err(ReportError::MissingSelection("enter a year".into()));
    }
    let month_num = months::month_number(month).ok_or_else(|| {
        ReportError::MissingSelection(format!("'{}' is not a valid month name", month))
    })?;

    let detailed = matches!(kind, ReportKind::Detailed);
    let payload = client.monthly_report(year.trim(), month_num, detailed).await?;

    let content = csv::build_monthly(&payload)?;
    let aggregate = csv::unwrap_aggregate(&payload)?;
    let anio = csv::cell_text(aggregate.get("anio"));
    let mes = csv::cell_text(aggregate.get("mes"));

    let filename = format!("reporte_{}_{}_{}.csv", kind.slug(), anio, mes);
    write_and_share(&output_dir(opts.out_dir.as_deref()), &filename, &content, opts.no_share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_slug() {
        assert_eq!(ReportKind::Consultations.slug(), "consultations");
        assert_eq!(ReportKind::Monthly.slug(), "monthly");
        assert_eq!(ReportKind::Detailed.slug(), "detailed");
    }

    #[test]
    fn test_output_dir_prefers_request() {
        let dir = PathBuf::from("/tmp/reports");
        assert_eq!(output_dir(Some(&dir)), dir);
    }

    #[test]
    fn test_output_dir_default_exists() {
        // Falls back to documents dir or the temp dir; either way non-empty.
        assert!(!output_dir(None).as_os_str().is_empty());
    }

    #[test]
    fn test_write_and_share_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_and_share(dir.path(), "out.csv", "a,b\n1,2", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2");
    }

    #[test]
    fn test_write_is_idempotent_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_and_share(dir.path(), "out.csv", "first", true).unwrap();
        let path = write_and_share(dir.path(), "out.csv", "second", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_monthly_filename_fields_come_from_payload() {
        let payload = json!([{ "anio": 2024, "mes": 3, "total_consultas": 1, "monto_total_mensual": "10" }]);
        let aggregate = csv::unwrap_aggregate(&payload).unwrap();
        let name = format!(
            "reporte_{}_{}_{}.csv",
            ReportKind::Monthly.slug(),
            csv::cell_text(aggregate.get("anio")),
            csv::cell_text(aggregate.get("mes"))
        );
        assert_eq!(name, "reporte_monthly_2024_3.csv");
    }
}
