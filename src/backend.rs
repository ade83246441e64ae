//! Remote classification service client.
//!
//! The flows talk to a `ClassifierBackend` trait object so tests can swap in
//! a stub; `HttpBackend` is the real thing, `NullBackend` answers offline
//! with canned responses (BACKEND=null).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::domain::{
    FeaturePayload, ModelType, PredictionLabel, PredictionResult, StagedFile, TrainingMode,
};
use crate::logging::{json_log, obj, v_num, v_str, Domain};

/// One row of the batch response. Every field except the label is optional
/// in practice; substitution rules live in the batch workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBatchPrediction {
    #[serde(default)]
    pub star_id: Option<String>,
    #[serde(default)]
    pub prediction: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub predictions: Vec<RawBatchPrediction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Left as raw JSON: a malformed metrics payload must not fail the
    /// training call, so the shape check happens best-effort at the caller.
    #[serde(default)]
    pub metrics: Option<serde_json::Value>,
}

#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn predict_single(
        &self,
        model_type: ModelType,
        training_mode: TrainingMode,
        data: FeaturePayload,
    ) -> Result<PredictionResult>;

    async fn predict_batch(
        &self,
        file: &StagedFile,
        model_type: ModelType,
        training_mode: TrainingMode,
    ) -> Result<BatchResponse>;

    async fn train(
        &self,
        file: &StagedFile,
        model_type: ModelType,
        hyperparameters: Option<&str>,
    ) -> Result<TrainResponse>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Http,
    Null,
}

impl BackendKind {
    pub fn from_env() -> Self {
        match std::env::var("BACKEND").unwrap_or_else(|_| "http".to_string()).as_str() {
            "null" => BackendKind::Null,
            _ => BackendKind::Http,
        }
    }

    pub fn build(self, cfg: &Config) -> Result<Box<dyn ClassifierBackend>> {
        match self {
            BackendKind::Http => Ok(Box::new(HttpBackend::new(cfg)?)),
            BackendKind::Null => Ok(Box::new(NullBackend)),
        }
    }
}

pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base: cfg.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn file_part(file: &StagedFile) -> Result<Part> {
        let bytes = std::fs::read(&file.path)
            .map_err(|e| anyhow!("cannot read {}: {}", file.path.display(), e))?;
        Ok(Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str("text/csv")?)
    }
}

#[async_trait]
impl ClassifierBackend for HttpBackend {
    async fn predict_single(
        &self,
        model_type: ModelType,
        training_mode: TrainingMode,
        data: FeaturePayload,
    ) -> Result<PredictionResult> {
        let url = format!("{}/predict", self.base);
        json_log(Domain::Http, "request", obj(&[("url", v_str(&url))]));
        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "model_type": model_type,
                "training_mode": training_mode,
                "data": data,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("prediction failed: {}", status));
        }
        Ok(resp.json().await?)
    }

    async fn predict_batch(
        &self,
        file: &StagedFile,
        model_type: ModelType,
        training_mode: TrainingMode,
    ) -> Result<BatchResponse> {
        let url = format!("{}/predict/batch", self.base);
        json_log(
            Domain::Http,
            "request",
            obj(&[("url", v_str(&url)), ("file", v_str(&file.name))]),
        );
        let form = Form::new()
            .part("file", Self::file_part(file)?)
            .text("model_type", model_type.as_str())
            .text("training_mode", training_mode.as_str());

        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("batch prediction failed: {}", status));
        }
        Ok(resp.json().await?)
    }

    async fn train(
        &self,
        file: &StagedFile,
        model_type: ModelType,
        hyperparameters: Option<&str>,
    ) -> Result<TrainResponse> {
        let url = format!("{}/train", self.base);
        json_log(
            Domain::Http,
            "request",
            obj(&[("url", v_str(&url)), ("file", v_str(&file.name))]),
        );
        // Training always runs in dynamic mode regardless of the stored
        // selection.
        let mut form = Form::new()
            .part("file", Self::file_part(file)?)
            .text("model_type", model_type.as_str())
            .text("training_mode", TrainingMode::Dynamic.as_str());
        if let Some(hp) = hyperparameters {
            form = form.text("hyperparameters", hp.to_string());
        }

        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("training failed: {}", status));
        }
        Ok(resp.json().await?)
    }
}

/// Offline stub, the integration seam made explicit.
pub struct NullBackend;

#[async_trait]
impl ClassifierBackend for NullBackend {
    async fn predict_single(
        &self,
        model_type: ModelType,
        training_mode: TrainingMode,
        _data: FeaturePayload,
    ) -> Result<PredictionResult> {
        json_log(Domain::Http, "stub_predict", obj(&[("confidence", v_num(0.5))]));
        Ok(PredictionResult {
            prediction: PredictionLabel::FalsePositive,
            confidence: 0.5,
            model_type: model_type.as_str().to_string(),
            training_mode: training_mode.as_str().to_string(),
        })
    }

    async fn predict_batch(
        &self,
        _file: &StagedFile,
        _model_type: ModelType,
        _training_mode: TrainingMode,
    ) -> Result<BatchResponse> {
        Ok(BatchResponse::default())
    }

    async fn train(
        &self,
        _file: &StagedFile,
        _model_type: ModelType,
        _hyperparameters: Option<&str>,
    ) -> Result<TrainResponse> {
        Ok(TrainResponse {
            message: Some("stub training complete".to_string()),
            metrics: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_response_defaults_missing_fields() {
        let resp: BatchResponse = serde_json::from_str(
            r#"{"predictions":[{"prediction":"CONFIRMED"},{"star_id":"K2-18b","prediction":"FALSE POSITIVE","confidence":0.91}]}"#,
        )
        .unwrap();
        assert_eq!(resp.predictions.len(), 2);
        assert!(resp.predictions[0].star_id.is_none());
        assert!(resp.predictions[0].confidence.is_none());
        assert_eq!(resp.predictions[1].star_id.as_deref(), Some("K2-18b"));
    }

    #[test]
    fn batch_response_tolerates_missing_predictions_key() {
        let resp: BatchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.predictions.is_empty());
    }

    #[test]
    fn train_response_metrics_stay_raw() {
        let resp: TrainResponse = serde_json::from_str(
            r#"{"message":"ok","metrics":{"accuracy":{"value":95.0}}}"#,
        )
        .unwrap();
        assert!(resp.metrics.is_some());
    }
}
