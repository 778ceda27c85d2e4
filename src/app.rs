//! Application state and one handler per user action.
//!
//! Handlers take `&mut self`, so an export can never overlap an upload: each
//! action runs to completion before the next one starts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::backend::AnalysisBackend;
use crate::backend::types::AnalysisResult;
use crate::export::{self, EXPORT_FAILURE, EXPORT_SUCCESS, ExportError};
use crate::notice::{Notice, NoticeBoard, NoticeKind};
use crate::render::Presenter;
use crate::store::ResultStore;
use crate::upload::progress::Ticker;
use crate::upload::{self, SelectedFile, UploadState, check_submission, validate_file};

pub const UNEXPECTED_ERROR: &str = "Ocorreu um erro inesperado. Recarregue a página.";
pub const UNREADABLE_FILE: &str = "Não foi possível ler o arquivo selecionado.";

pub struct App<B, P> {
    backend: B,
    presenter: P,
    store: ResultStore,
    notices: NoticeBoard,
    upload_state: UploadState,
    selected: Option<SelectedFile>,
    tributos: String,
    output_dir: PathBuf,
}

impl<B: AnalysisBackend, P: Presenter> App<B, P> {
    pub fn new(backend: B, presenter: P, output_dir: PathBuf) -> Self {
        Self {
            backend,
            presenter,
            store: ResultStore::new(),
            notices: NoticeBoard::default(),
            upload_state: UploadState::Idle,
            selected: None,
            tributos: String::new(),
            output_dir,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &ResultStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn upload_state(&self) -> UploadState {
        self.upload_state
    }

    #[cfg(test)]
    pub(crate) fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn presenter(&self) -> &P {
        &self.presenter
    }

    fn transition(&mut self, next: UploadState) {
        debug!(from = ?self.upload_state, to = ?next, "upload state");
        self.upload_state = next;
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.prune(Instant::now());
        let notice = self.notices.push(kind, message);
        self.presenter.notice(notice);
    }

    pub fn say(&mut self, text: &str) {
        self.presenter.message(text);
    }

    /// Notices still on screen; expired ones are dropped first.
    pub fn visible_notices(&mut self) -> &[Notice] {
        self.notices.prune(Instant::now());
        self.notices.visible()
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    /// Picks a file. Invalid files are rejected and the selection cleared.
    pub async fn select_file(&mut self, path: &Path) -> bool {
        self.notices.clear();
        self.transition(UploadState::Validating);

        let outcome = match SelectedFile::from_path(path).await {
            Ok(file) => match validate_file(&file) {
                Ok(()) => Ok(file),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat selected file");
                Err(UNREADABLE_FILE.to_string())
            }
        };
        self.transition(UploadState::Idle);

        match outcome {
            Ok(file) => {
                debug!(name = %file.name, size = file.size, "file selected");
                self.notify(NoticeKind::Info, upload::selected_message(&file));
                self.selected = Some(file);
                true
            }
            Err(message) => {
                self.selected = None;
                self.notify(NoticeKind::Danger, message);
                false
            }
        }
    }

    pub fn set_terms(&mut self, tributos: &str) {
        self.tributos = tributos.to_string();
    }

    /// Runs the upload and returns how it ended. The state is back to `Idle` afterwards.
    pub async fn submit_upload(&mut self) -> UploadState {
        let request = match check_submission(self.selected.as_ref(), &self.tributos) {
            Ok(file) => upload::read_request(file, &self.tributos).await,
            Err(e) => {
                self.notify(NoticeKind::Danger, e.to_string());
                return UploadState::Idle;
            }
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "cannot read selected file");
                self.notify(NoticeKind::Danger, UNREADABLE_FILE);
                return UploadState::Idle;
            }
        };

        info!(file = %request.file_name, "uploading for analysis");
        self.transition(UploadState::Uploading);
        self.presenter.form_enabled(false);

        let outcome = {
            let upload = self.backend.upload(request);
            tokio::pin!(upload);
            let mut ticker = Ticker::new();
            loop {
                tokio::select! {
                    outcome = &mut upload => break outcome,
                    Some(step) = ticker.tick(), if !ticker.is_finished() => {
                        self.presenter.progress(step);
                    }
                }
            }
        };
        self.presenter.progress_hidden();

        let finished = match outcome {
            Ok(analysis) => {
                info!(total = analysis.total, "analysis complete");
                self.store.set_results(analysis.results);
                self.presenter.results(self.store.filtered());
                self.presenter.tributo_options(&self.store.tributo_options());
                self.notify(NoticeKind::Success, upload::success_message(analysis.total));
                UploadState::Succeeded {
                    total: analysis.total,
                }
            }
            Err(e) => {
                warn!(error = %e, "analysis failed");
                self.notify(NoticeKind::Danger, upload::failure_message(&e));
                UploadState::Failed
            }
        };

        self.presenter.form_enabled(true);
        self.transition(finished);
        self.transition(UploadState::Idle);
        finished
    }

    /// Recomputes the filtered view from both criteria and re-renders the table.
    pub fn apply_filters(&mut self, tributo: Option<&str>, empresa: &str) {
        self.store.apply_filters(tributo, empresa);
        debug!(
            shown = self.store.filtered().len(),
            total = self.store.results().len(),
            "filters applied"
        );
        self.presenter.results(self.store.filtered());
    }

    pub fn change_tributo_filter(&mut self, tributo: Option<&str>) {
        let empresa = self.store.filters().empresa.clone();
        self.apply_filters(tributo, &empresa);
    }

    pub fn change_empresa_filter(&mut self, empresa: &str) {
        let tributo = self.store.filters().tributo.clone();
        self.apply_filters(tributo.as_deref(), empresa);
    }

    /// Shows the detail view for a row of the filtered table.
    pub fn show_context(&mut self, index: usize) -> Option<&AnalysisResult> {
        if index >= self.store.filtered().len() {
            self.notify(NoticeKind::Warning, format!("Resultado {index} não encontrado."));
            return None;
        }
        let result = self.store.get(index)?;
        self.presenter.context(result);
        Some(result)
    }

    /// Exports the filtered view. Returns where the CSV was saved.
    pub async fn export(&mut self) -> Option<PathBuf> {
        let today = chrono::Utc::now().date_naive();
        match export::export(&self.backend, self.store.filtered(), &self.output_dir, today).await {
            Ok(path) => {
                self.notify(NoticeKind::Success, EXPORT_SUCCESS);
                Some(path)
            }
            Err(ExportError::Empty) => {
                self.notify(NoticeKind::Warning, ExportError::Empty.to_string());
                None
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.notify(NoticeKind::Danger, EXPORT_FAILURE);
                None
            }
        }
    }

    /// Last-resort handler for errors no flow anticipated. The session stays usable.
    pub fn report_unexpected(&mut self, err: &dyn std::error::Error) {
        error!(error = %err, "unexpected error");
        self.notify(NoticeKind::Danger, UNEXPECTED_ERROR);
    }
}
