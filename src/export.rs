//! Export flow: send the filtered view to `/export_csv` and save the returned CSV.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::backend::types::AnalysisResult;
use crate::backend::{AnalysisBackend, BackendError};

pub const NOTHING_TO_EXPORT: &str = "Nenhum resultado para exportar.";
pub const EXPORT_SUCCESS: &str = "Arquivo CSV exportado com sucesso!";
pub const EXPORT_FAILURE: &str = "Erro ao exportar arquivo.";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{}", NOTHING_TO_EXPORT)]
    Empty,

    #[error("export request failed: {0}")]
    Backend(#[from] BackendError),

    #[error("could not save CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// `analise_tributos_YYYY-MM-DD.csv`
pub fn download_name(date: NaiveDate) -> String {
    format!("analise_tributos_{}.csv", date.format("%Y-%m-%d"))
}

pub async fn export(
    backend: &impl AnalysisBackend,
    results: &[AnalysisResult],
    output_dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }

    let csv = backend.export_csv(results).await?;
    let target = output_dir.join(download_name(date));
    tokio::fs::write(&target, &csv).await?;
    info!(path = %target.display(), rows = results.len(), "CSV exported");
    Ok(target)
}
