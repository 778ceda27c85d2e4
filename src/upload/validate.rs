use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::PDF_MIME;

/// Client-side upload limit; the server enforces its own.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Apenas arquivos PDF são permitidos.")]
    NotPdf,

    #[error("O arquivo é muito grande. Tamanho máximo: 50MB.")]
    TooLarge,

    #[error("Selecione um arquivo PDF.")]
    NoFile,

    #[error("Digite os tributos para buscar.")]
    NoTerms,
}

/// A file picked by the user, described the way a browser `File` would be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: Option<&'static str>,
    pub size: u64,
}

impl SelectedFile {
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::describe(path, metadata.len()))
    }

    pub fn describe(path: &Path, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            name,
            mime: mime_for(path),
            size,
        }
    }

    /// Size in MiB with two decimals, e.g. `1.50`.
    pub fn size_mb(&self) -> String {
        format!("{:.2}", self.size as f64 / (1024.0 * 1024.0))
    }
}

fn mime_for(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.eq_ignore_ascii_case("pdf"))
        .map(|_| PDF_MIME)
}

pub fn validate_file(file: &SelectedFile) -> Result<(), ValidationError> {
    if file.mime != Some(PDF_MIME) {
        return Err(ValidationError::NotPdf);
    }
    if file.size > MAX_FILE_BYTES {
        debug!(name = %file.name, size = file.size, "file over upload limit");
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}

/// Preconditions for submitting the form. Checked before any network call.
pub fn check_submission<'a>(
    file: Option<&'a SelectedFile>,
    tributos: &str,
) -> Result<&'a SelectedFile, ValidationError> {
    let file = file.ok_or(ValidationError::NoFile)?;
    if tributos.trim().is_empty() {
        return Err(ValidationError::NoTerms);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: u64) -> SelectedFile {
        SelectedFile::describe(Path::new(name), size)
    }

    #[test]
    fn accepts_pdf_under_limit() {
        assert!(validate_file(&file("relatorio.pdf", 1024)).is_ok());
        assert!(validate_file(&file("RELATORIO.PDF", 1024)).is_ok());
    }

    #[test]
    fn accepts_pdf_exactly_at_limit() {
        assert!(validate_file(&file("a.pdf", MAX_FILE_BYTES)).is_ok());
    }

    #[test]
    fn rejects_non_pdf() {
        assert_eq!(validate_file(&file("planilha.xlsx", 10)), Err(ValidationError::NotPdf));
        assert_eq!(validate_file(&file("sem_extensao", 10)), Err(ValidationError::NotPdf));
    }

    #[test]
    fn rejects_oversized_pdf() {
        assert_eq!(
            validate_file(&file("grande.pdf", MAX_FILE_BYTES + 1)),
            Err(ValidationError::TooLarge)
        );
    }

    #[test]
    fn size_mb_has_two_decimals() {
        assert_eq!(file("a.pdf", 1_572_864).size_mb(), "1.50");
        assert_eq!(file("a.pdf", 0).size_mb(), "0.00");
    }

    #[test]
    fn submission_requires_file_then_terms() {
        let pdf = file("a.pdf", 10);
        assert_eq!(check_submission(None, "ICMS"), Err(ValidationError::NoFile));
        assert_eq!(check_submission(Some(&pdf), "  \n"), Err(ValidationError::NoTerms));
        assert_eq!(check_submission(Some(&pdf), "ICMS"), Ok(&pdf));
    }

    #[tokio::test]
    async fn from_path_reads_size_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nota.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let selected = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(selected.name, "nota.pdf");
        assert_eq!(selected.size, 8);
        assert_eq!(selected.mime, Some(PDF_MIME));
    }
}
