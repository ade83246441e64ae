//! Shared session store.
//!
//! One instance is created at startup and handed to each flow as an
//! `Arc<SessionStore>`; a flow that was never given the store cannot read it,
//! which replaces the original's runtime "used outside provider" error with a
//! compile-time guarantee. Mutation is serialized by the shell's event loop;
//! the mutexes only make the sharing explicit, each lock spans a single
//! accessor.

use std::sync::Mutex;

use crate::domain::{ModelConfig, PerformanceMetrics, StagedFile};
use crate::logging::{json_log, obj, v_str, Domain};

#[derive(Default)]
pub struct SessionStore {
    selected_model: Mutex<Option<ModelConfig>>,
    staged_file: Mutex<Option<StagedFile>>,
    metrics: Mutex<Option<PerformanceMetrics>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_model(&self) -> Option<ModelConfig> {
        self.selected_model.lock().expect("session lock").clone()
    }

    pub fn set_selected_model(&self, model: Option<ModelConfig>) {
        let label = model
            .as_ref()
            .map(|m| m.model_type.as_str())
            .unwrap_or("none");
        json_log(Domain::Session, "model_selected", obj(&[("model", v_str(label))]));
        *self.selected_model.lock().expect("session lock") = model;
    }

    pub fn staged_file(&self) -> Option<StagedFile> {
        self.staged_file.lock().expect("session lock").clone()
    }

    pub fn set_staged_file(&self, file: Option<StagedFile>) {
        let name = file.as_ref().map(|f| f.name.as_str()).unwrap_or("none");
        json_log(Domain::Session, "file_staged", obj(&[("name", v_str(name))]));
        *self.staged_file.lock().expect("session lock") = file;
    }

    pub fn metrics(&self) -> Option<PerformanceMetrics> {
        self.metrics.lock().expect("session lock").clone()
    }

    /// Replaces the whole metric snapshot. There is deliberately no per-field
    /// setter: accuracy/precision/recall/f1 always describe one training run.
    pub fn set_metrics(&self, metrics: Option<PerformanceMetrics>) {
        json_log(Domain::Session, "metrics_updated", obj(&[]));
        *self.metrics.lock().expect("session lock") = metrics;
    }

    /// Drops the pending model selection and staged file. Metrics survive:
    /// they describe the last *trained* model, not the pending selection.
    pub fn clear_all(&self) {
        json_log(Domain::Session, "clear_all", obj(&[]));
        *self.selected_model.lock().expect("session lock") = None;
        *self.staged_file.lock().expect("session lock") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricData, ModelType};
    use std::path::PathBuf;

    fn sample_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            accuracy: MetricData::flat(92.5),
            precision: MetricData::flat(88.2),
            recall: MetricData::flat(90.1),
            f1_score: MetricData::flat(89.1),
        }
    }

    #[test]
    fn clear_all_retains_metrics() {
        let store = SessionStore::new();
        store.set_selected_model(Some(ModelConfig::dynamic(ModelType::Knn)));
        store.set_staged_file(Some(StagedFile {
            name: "stars.csv".to_string(),
            path: PathBuf::from("/tmp/stars.csv"),
            uploaded: true,
        }));
        store.set_metrics(Some(sample_metrics()));

        store.clear_all();

        assert!(store.selected_model().is_none());
        assert!(store.staged_file().is_none());
        assert_eq!(store.metrics(), Some(sample_metrics()));
    }

    #[test]
    fn model_is_replaced_wholesale() {
        let store = SessionStore::new();
        let mut first = ModelConfig::dynamic(ModelType::LogisticRegression);
        first.hyperparameters = Some("{\"C\": 0.5}".to_string());
        store.set_selected_model(Some(first));

        store.set_selected_model(Some(ModelConfig::dynamic(ModelType::Knn)));
        let current = store.selected_model().unwrap();
        assert_eq!(current.model_type, ModelType::Knn);
        assert!(current.hyperparameters.is_none());
    }
}
