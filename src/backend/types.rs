use serde::{Deserialize, Serialize};

/// One tax-term match reported by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tributo: String,
    pub linha_encontrada: String,
    pub linha_numero: u32,
    #[serde(default)]
    pub empresas_identificadas: Vec<String>,
    pub contexto: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<AnalysisResult>,
    #[serde(default)]
    pub total_encontrados: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
    pub results: &'a [AnalysisResult],
}

/// Outcome of a successful `/upload` call.
#[derive(Debug)]
pub struct Analysis {
    pub results: Vec<AnalysisResult>,
    pub total: usize,
}
