//! Upload flow: validate the selected PDF, send it with the search terms, report the outcome.

pub mod progress;
pub mod validate;

use crate::backend::{BackendError, UploadRequest};

pub use validate::{SelectedFile, ValidationError, check_submission, validate_file};

pub const GENERIC_FAILURE: &str = "Erro ao processar o arquivo.";
pub const CONNECTION_FAILURE: &str = "Erro de conexão. Tente novamente.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Validating,
    Uploading,
    Succeeded {
        total: usize,
    },
    Failed,
}

/// Message shown for a failed upload: the server's own text when it sent one.
pub fn failure_message(error: &BackendError) -> String {
    match error {
        BackendError::Server(message) if !message.trim().is_empty() => message.clone(),
        BackendError::Server(_) | BackendError::Rejected { .. } => GENERIC_FAILURE.to_string(),
        BackendError::Malformed(_) | BackendError::Network(_) => CONNECTION_FAILURE.to_string(),
    }
}

pub fn success_message(total: usize) -> String {
    format!("Análise concluída! {total} trechos encontrados.")
}

pub fn selected_message(file: &SelectedFile) -> String {
    format!("Arquivo selecionado: {} ({} MB)", file.name, file.size_mb())
}

pub async fn read_request(file: &SelectedFile, tributos: &str) -> std::io::Result<UploadRequest> {
    let bytes = tokio::fs::read(&file.path).await?;
    Ok(UploadRequest {
        file_name: file.name.clone(),
        bytes,
        tributos: tributos.to_string(),
    })
}
