//! Data model shared across the workflows.
//!
//! Wire names follow the classification service exactly: model ids and
//! training modes travel as snake_case strings, metric fields as the
//! service's camelCase (`f1Score`, `isIncrease`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LogisticRegression,
    Knn,
    LinearRegression,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression => "logistic_regression",
            ModelType::Knn => "knn",
            ModelType::LinearRegression => "linear_regression",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "logistic_regression" => Some(ModelType::LogisticRegression),
            "knn" => Some(ModelType::Knn),
            "linear_regression" => Some(ModelType::LinearRegression),
            _ => None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    Dynamic,
    Static,
}

impl TrainingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Dynamic => "dynamic",
            TrainingMode::Static => "static",
        }
    }
}

/// The user's model selection. Immutable once constructed; re-selection
/// replaces the whole value in the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_type: ModelType,
    pub training_mode: TrainingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<String>,
}

impl ModelConfig {
    pub fn dynamic(model_type: ModelType) -> Self {
        Self {
            model_type,
            training_mode: TrainingMode::Dynamic,
            hyperparameters: None,
        }
    }
}

/// A locally chosen tabular file, not yet sent to any endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    pub uploaded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricData {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(
        default,
        rename = "isIncrease",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_increase: Option<bool>,
}

impl MetricData {
    pub fn flat(value: f64) -> Self {
        Self {
            value,
            change: Some(0.0),
            is_increase: Some(true),
        }
    }
}

/// The four headline metrics, always replaced as one snapshot — partial
/// updates would let a stale recall sit next to a fresh accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub accuracy: MetricData,
    pub precision: MetricData,
    pub recall: MetricData,
    #[serde(rename = "f1Score")]
    pub f1_score: MetricData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "FALSE POSITIVE")]
    FalsePositive,
}

/// Single-record outcome, held only by the flow that produced it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResult {
    pub prediction: PredictionLabel,
    pub confidence: f64,
    pub model_type: String,
    pub training_mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchLabel {
    Exoplanet,
    NoExoplanet,
}

impl BatchLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchLabel::Exoplanet => "Exoplanet",
            BatchLabel::NoExoplanet => "No Exoplanet",
        }
    }
}

impl fmt::Display for BatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of batch prediction output. Duplicate star ids are permitted; the
/// service echoes whatever identifiers the uploaded table carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ExoplanetResult {
    pub star_id: String,
    pub prediction: BatchLabel,
    /// Integer percent, already rounded from the service's [0,1] confidence.
    pub confidence: u32,
}

/// The eight KOI features of a complete single-record submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturePayload {
    pub koi_period: f64,
    pub koi_duration: f64,
    pub koi_depth: f64,
    pub koi_model_snr: f64,
    pub koi_steff: f64,
    pub koi_slogg: f64,
    pub koi_srad: f64,
    pub koi_kepmag: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ModelType::LogisticRegression).unwrap(),
            json!("logistic_regression")
        );
        assert_eq!(ModelType::from_id("knn"), Some(ModelType::Knn));
        assert_eq!(ModelType::from_id("svm"), None);
    }

    #[test]
    fn model_config_omits_absent_hyperparameters() {
        let cfg = ModelConfig::dynamic(ModelType::LogisticRegression);
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(v["model_type"], json!("logistic_regression"));
        assert_eq!(v["training_mode"], json!("dynamic"));
        assert!(v.get("hyperparameters").is_none());
    }

    #[test]
    fn prediction_label_decodes_service_strings() {
        let r: PredictionResult = serde_json::from_value(json!({
            "prediction": "FALSE POSITIVE",
            "confidence": 0.42,
            "model_type": "knn",
            "training_mode": "dynamic"
        }))
        .unwrap();
        assert_eq!(r.prediction, PredictionLabel::FalsePositive);
    }

    #[test]
    fn metrics_round_trip_camel_case_fields() {
        let m = PerformanceMetrics {
            accuracy: MetricData::flat(92.5),
            precision: MetricData::flat(88.2),
            recall: MetricData::flat(90.1),
            f1_score: MetricData::flat(89.1),
        };
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("f1Score").is_some());
        assert_eq!(v["accuracy"]["isIncrease"], json!(true));
        let back: PerformanceMetrics = serde_json::from_value(v).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn batch_label_display_strings() {
        assert_eq!(BatchLabel::Exoplanet.to_string(), "Exoplanet");
        assert_eq!(BatchLabel::NoExoplanet.to_string(), "No Exoplanet");
    }
}
