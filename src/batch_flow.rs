//! Batch workflow: upload → train/predict → results → export.
//!
//! All remote work is preconditioned on a staged file and a model selection;
//! missing either fails locally with no request sent. Response rows are
//! decoded defensively: a missing star id becomes a positional placeholder,
//! a missing confidence defaults to 0.5. The service favors degraded display
//! over hard failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{BatchResponse, ClassifierBackend};
use crate::dialog::ModelDialog;
use crate::domain::{BatchLabel, ExoplanetResult, ModelConfig, ModelType, PerformanceMetrics, StagedFile};
use crate::logging::{json_log, log, obj, v_bool, v_num, v_str, Domain, Level};
use crate::session::SessionStore;

pub const EXPORT_HEADER: &str = "Star ID,Prediction,Confidence";

/// Navigation requested by a flow, consumed by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("only .csv files are accepted")]
    NotCsv,
    #[error("please upload a CSV file first")]
    MissingFile,
    #[error("please select a model first")]
    MissingModel,
    #[error("request failed: {0}")]
    Request(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no results to download; run prediction first")]
    NoResults,
    #[error("could not write export: {0}")]
    Io(#[from] std::io::Error),
}

pub struct BatchWorkflow {
    session: Arc<SessionStore>,
    backend: Arc<dyn ClassifierBackend>,
    pub dialog: ModelDialog,
    prediction_results: Vec<ExoplanetResult>,
    has_predicted: bool,
    training_status: String,
    predicting: bool,
    training: bool,
    pending_navigation: Option<Route>,
}

impl BatchWorkflow {
    pub fn new(session: Arc<SessionStore>, backend: Arc<dyn ClassifierBackend>) -> Self {
        Self {
            session,
            backend,
            dialog: ModelDialog::new(),
            prediction_results: Vec::new(),
            has_predicted: false,
            training_status: String::new(),
            predicting: false,
            training: false,
            pending_navigation: None,
        }
    }

    /// Entering the workflow always starts from a clean selection; whatever
    /// the single-record flow staged is discarded. Metrics survive.
    pub fn on_enter(&mut self) {
        self.session.clear_all();
        self.prediction_results.clear();
        self.has_predicted = false;
        self.training_status.clear();
        self.pending_navigation = None;
        json_log(Domain::Batch, "entered", obj(&[]));
    }

    pub fn results(&self) -> &[ExoplanetResult] {
        &self.prediction_results
    }

    pub fn has_predicted(&self) -> bool {
        self.has_predicted
    }

    pub fn training_status(&self) -> &str {
        &self.training_status
    }

    pub fn is_predicting(&self) -> bool {
        self.predicting
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    pub fn take_navigation(&mut self) -> Option<Route> {
        self.pending_navigation.take()
    }

    /// Stages a local file. Only the name is checked here (`.csv` suffix,
    /// any case); content validation is the service's job. A new file
    /// invalidates prior results even when the model is unchanged.
    pub fn upload_file(&mut self, path: &Path) -> Result<(), BatchError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if !name.to_ascii_lowercase().ends_with(".csv") {
            log(
                Level::Warn,
                Domain::Batch,
                "upload_rejected",
                obj(&[("name", v_str(&name))]),
            );
            return Err(BatchError::NotCsv);
        }
        self.session.set_staged_file(Some(StagedFile {
            name,
            path: PathBuf::from(path),
            uploaded: true,
        }));
        self.prediction_results.clear();
        self.has_predicted = false;
        Ok(())
    }

    /// Fixed policy: batch selections always train dynamically.
    pub fn select_model(&mut self, model: ModelType) {
        self.session
            .set_selected_model(Some(ModelConfig::dynamic(model)));
        self.dialog.close();
    }

    fn require_inputs(&self) -> Result<(StagedFile, ModelConfig), BatchError> {
        let file = self.session.staged_file().ok_or_else(|| {
            log(
                Level::Warn,
                Domain::Batch,
                "alert",
                obj(&[("reason", v_str("missing_file"))]),
            );
            BatchError::MissingFile
        })?;
        let model = self.session.selected_model().ok_or_else(|| {
            log(
                Level::Warn,
                Domain::Batch,
                "alert",
                obj(&[("reason", v_str("missing_model"))]),
            );
            BatchError::MissingModel
        })?;
        Ok((file, model))
    }

    /// Runs batch prediction over the staged file. `has_predicted` latches
    /// true on success and failure alike — the results view distinguishes
    /// "no predictions yet" from "predicted, nothing to show". On failure the
    /// previous result set is preserved.
    pub async fn predict(&mut self) -> Result<usize, BatchError> {
        let (file, model) = self.require_inputs()?;

        self.predicting = true;
        let outcome = self
            .backend
            .predict_batch(&file, model.model_type, model.training_mode)
            .await;
        self.predicting = false;
        self.has_predicted = true;

        match outcome {
            Ok(resp) => {
                self.prediction_results = map_batch_response(resp);
                let detected = self
                    .prediction_results
                    .iter()
                    .filter(|r| r.prediction == BatchLabel::Exoplanet)
                    .count();
                json_log(
                    Domain::Batch,
                    "predicted",
                    obj(&[
                        ("rows", v_num(self.prediction_results.len() as f64)),
                        ("exoplanets", v_num(detected as f64)),
                    ]),
                );
                Ok(self.prediction_results.len())
            }
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Batch,
                    "alert",
                    obj(&[
                        ("reason", v_str("predict_failed")),
                        ("error", v_str(&e.to_string())),
                    ]),
                );
                Err(BatchError::Request(e))
            }
        }
    }

    /// Trains on the staged file (always dynamic mode). A metrics payload in
    /// the response replaces the session snapshot atomically, best-effort:
    /// a malformed payload is dropped without failing the training outcome.
    /// Success requests navigation to the dashboard; failure does not — the
    /// original's fall-through to a simulated "completed (demo)" is a defect
    /// and is not reproduced.
    pub async fn train(&mut self) -> Result<(), BatchError> {
        let (file, model) = self.require_inputs()?;

        self.training = true;
        self.training_status = "Training model...".to_string();
        let outcome = self
            .backend
            .train(&file, model.model_type, model.hyperparameters.as_deref())
            .await;
        self.training = false;

        match outcome {
            Ok(resp) => {
                self.training_status = "Training completed successfully!".to_string();
                if let Some(raw) = resp.metrics {
                    match serde_json::from_value::<PerformanceMetrics>(raw) {
                        Ok(metrics) => self.session.set_metrics(Some(metrics)),
                        Err(e) => log(
                            Level::Warn,
                            Domain::Batch,
                            "metrics_ignored",
                            obj(&[("error", v_str(&e.to_string()))]),
                        ),
                    }
                }
                json_log(
                    Domain::Batch,
                    "trained",
                    obj(&[
                        ("model", v_str(model.model_type.as_str())),
                        ("metrics_applied", v_bool(self.session.metrics().is_some())),
                    ]),
                );
                self.pending_navigation = Some(Route::Dashboard);
                Ok(())
            }
            Err(e) => {
                self.training_status = "Training failed. Please try again.".to_string();
                log(
                    Level::Warn,
                    Domain::Batch,
                    "alert",
                    obj(&[
                        ("reason", v_str("train_failed")),
                        ("error", v_str(&e.to_string())),
                    ]),
                );
                Err(BatchError::Request(e))
            }
        }
    }

    /// Writes the current results as CSV. Purely local and deterministic.
    pub fn export_results(&self, path: &Path) -> Result<(), ExportError> {
        if self.prediction_results.is_empty() {
            log(
                Level::Warn,
                Domain::Batch,
                "alert",
                obj(&[("reason", v_str("nothing_to_export"))]),
            );
            return Err(ExportError::NoResults);
        }
        std::fs::write(path, render_csv(&self.prediction_results))?;
        json_log(
            Domain::Batch,
            "exported",
            obj(&[
                ("path", v_str(&path.display().to_string())),
                ("rows", v_num(self.prediction_results.len() as f64)),
            ]),
        );
        Ok(())
    }
}

/// Maps service rows into display rows, applying the documented default
/// substitutions. The label mapping is binary and exhaustive: anything the
/// service does not call CONFIRMED is "No Exoplanet".
pub fn map_batch_response(resp: BatchResponse) -> Vec<ExoplanetResult> {
    resp.predictions
        .into_iter()
        .enumerate()
        .map(|(index, pred)| ExoplanetResult {
            star_id: pred
                .star_id
                .unwrap_or_else(|| format!("Star_{}", index + 1)),
            prediction: if pred.prediction == "CONFIRMED" {
                BatchLabel::Exoplanet
            } else {
                BatchLabel::NoExoplanet
            },
            confidence: (pred.confidence.unwrap_or(0.5) * 100.0).round() as u32,
        })
        .collect()
}

pub fn render_csv(results: &[ExoplanetResult]) -> String {
    let mut lines = vec![EXPORT_HEADER.to_string()];
    lines.extend(
        results
            .iter()
            .map(|r| format!("{},{},{}", r.star_id, r.prediction, r.confidence)),
    );
    lines.join("\n")
}
