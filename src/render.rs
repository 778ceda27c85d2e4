//! Presentation seam. `App` calls a `Presenter` after every state change;
//! `TerminalPresenter` renders to any `io::Write`.

use std::io::{self, Write};

use tracing::warn;

use crate::backend::types::AnalysisResult;
use crate::notice::Notice;
use crate::upload::progress::ProgressStep;

pub const ALL_TRIBUTOS: &str = "Todos os tributos";
pub const NO_COMPANY: &str = "Nenhuma identificada";
const LINE_PREVIEW_CHARS: usize = 100;

pub trait Presenter {
    fn results(&mut self, results: &[AnalysisResult]);
    /// Distinct tributos, without the "all" entry.
    fn tributo_options(&mut self, options: &[String]);
    fn progress(&mut self, step: ProgressStep);
    fn progress_hidden(&mut self);
    fn form_enabled(&mut self, enabled: bool);
    fn notice(&mut self, notice: &Notice);
    fn context(&mut self, result: &AnalysisResult);
    /// Free-form text such as help or command feedback.
    fn message(&mut self, text: &str);
}

pub fn empresas_label(result: &AnalysisResult) -> String {
    if result.empresas_identificadas.is_empty() {
        NO_COMPANY.to_string()
    } else {
        result.empresas_identificadas.join(", ")
    }
}

pub fn line_preview(line: &str) -> String {
    if line.chars().count() > LINE_PREVIEW_CHARS {
        let head: String = line.chars().take(LINE_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}

pub fn format_row(index: usize, result: &AnalysisResult) -> String {
    format!(
        "{index:>3}  [{}]  {}  | linha {} | {}",
        result.tributo,
        line_preview(&result.linha_encontrada),
        result.linha_numero,
        empresas_label(result)
    )
}

pub struct TerminalPresenter<W> {
    out: W,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    #[cfg(test)]
    pub fn written(&self) -> String
    where
        W: AsRef<[u8]>,
    {
        String::from_utf8_lossy(self.out.as_ref()).into_owned()
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn results(&mut self, results: &[AnalysisResult]) {
        let mut text = format!("{} resultados", results.len());
        for (index, result) in results.iter().enumerate() {
            text.push('\n');
            text.push_str(&format_row(index, result));
        }
        self.emit(&text);
    }

    fn tributo_options(&mut self, options: &[String]) {
        let mut entries = vec![ALL_TRIBUTOS.to_string()];
        entries.extend(options.iter().cloned());
        self.emit(&format!("Filtro de tributo: {}", entries.join(" | ")));
    }

    fn progress(&mut self, step: ProgressStep) {
        self.emit(&format!("[{:>3}%] {}", step.percent, step.label));
    }

    fn progress_hidden(&mut self) {}

    fn form_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.emit("Analisando...");
        }
    }

    fn notice(&mut self, notice: &Notice) {
        self.emit(&notice.to_string());
    }

    fn context(&mut self, result: &AnalysisResult) {
        self.emit(&format!(
            "Tributo: {}\nLinha: {}\nEmpresas: {}\n---\n{}\n---",
            result.tributo,
            result.linha_numero,
            empresas_label(result),
            result.contexto
        ));
    }

    fn message(&mut self, text: &str) {
        self.emit(text);
    }
}
