//! Single-record prediction flow.
//!
//! Eight scalar features, lenient per-keystroke parsing, strict submit-time
//! validation. Field text that does not parse is stored as NaN rather than
//! rejected at entry; the form simply refuses to submit until every field
//! holds a finite number.

use std::sync::Arc;

use crate::backend::ClassifierBackend;
use crate::dialog::ModelDialog;
use crate::domain::{FeaturePayload, ModelType, PredictionResult, TrainingMode};
use crate::logging::{json_log, log, obj, v_num, v_str, Domain, Level};

pub const FEATURE_FIELDS: [&str; 8] = [
    "koi_period",
    "koi_duration",
    "koi_depth",
    "koi_model_snr",
    "koi_steff",
    "koi_slogg",
    "koi_srad",
    "koi_kepmag",
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureInput {
    pub koi_period: Option<f64>,
    pub koi_duration: Option<f64>,
    pub koi_depth: Option<f64>,
    pub koi_model_snr: Option<f64>,
    pub koi_steff: Option<f64>,
    pub koi_slogg: Option<f64>,
    pub koi_srad: Option<f64>,
    pub koi_kepmag: Option<f64>,
}

impl FeatureInput {
    fn slot(&mut self, name: &str) -> Option<&mut Option<f64>> {
        match name {
            "koi_period" => Some(&mut self.koi_period),
            "koi_duration" => Some(&mut self.koi_duration),
            "koi_depth" => Some(&mut self.koi_depth),
            "koi_model_snr" => Some(&mut self.koi_model_snr),
            "koi_steff" => Some(&mut self.koi_steff),
            "koi_slogg" => Some(&mut self.koi_slogg),
            "koi_srad" => Some(&mut self.koi_srad),
            "koi_kepmag" => Some(&mut self.koi_kepmag),
            _ => None,
        }
    }

    fn values(&self) -> [Option<f64>; 8] {
        [
            self.koi_period,
            self.koi_duration,
            self.koi_depth,
            self.koi_model_snr,
            self.koi_steff,
            self.koi_slogg,
            self.koi_srad,
            self.koi_kepmag,
        ]
    }

    /// Empty text clears the field; unparseable text is kept as NaN so the
    /// form shows an invalid entry instead of silently dropping it.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FlowError> {
        let slot = self
            .slot(name)
            .ok_or_else(|| FlowError::UnknownField(name.to_string()))?;
        let trimmed = raw.trim();
        *slot = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
        };
        Ok(())
    }

    /// True iff all eight fields are present and finite.
    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| matches!(v, Some(x) if x.is_finite()))
    }

    pub fn payload(&self) -> Option<FeaturePayload> {
        if !self.is_complete() {
            return None;
        }
        Some(FeaturePayload {
            koi_period: self.koi_period?,
            koi_duration: self.koi_duration?,
            koi_depth: self.koi_depth?,
            koi_model_snr: self.koi_model_snr?,
            koi_steff: self.koi_steff?,
            koi_slogg: self.koi_slogg?,
            koi_srad: self.koi_srad?,
            koi_kepmag: self.koi_kepmag?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("no field named {0}")]
    UnknownField(String),
    #[error("please fill in all eight features before predicting")]
    IncompleteForm,
    #[error("prediction failed: {0}")]
    Request(#[from] anyhow::Error),
}

pub struct PredictFlow {
    backend: Arc<dyn ClassifierBackend>,
    pub features: FeatureInput,
    pub dialog: ModelDialog,
    busy: bool,
    last_result: Option<PredictionResult>,
}

impl PredictFlow {
    pub fn new(backend: Arc<dyn ClassifierBackend>) -> Self {
        Self {
            backend,
            features: FeatureInput::default(),
            dialog: ModelDialog::new(),
            busy: false,
            last_result: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_result(&self) -> Option<&PredictionResult> {
        self.last_result.as_ref()
    }

    /// One record, one request. Incomplete forms fail locally with no call
    /// made; request failures leave the previous result untouched. The busy
    /// flag is released on every exit path past the precondition.
    pub async fn submit(&mut self, model: ModelType) -> Result<PredictionResult, FlowError> {
        let Some(payload) = self.features.payload() else {
            log(
                Level::Warn,
                Domain::Predict,
                "alert",
                obj(&[("reason", v_str("incomplete_form"))]),
            );
            return Err(FlowError::IncompleteForm);
        };

        self.busy = true;
        self.dialog.set_busy(true);
        let outcome = self
            .backend
            .predict_single(model, TrainingMode::Dynamic, payload)
            .await;
        // Single release point: whatever the request did, the form unlocks.
        self.busy = false;
        self.dialog.set_busy(false);

        match outcome {
            Ok(result) => {
                json_log(
                    Domain::Predict,
                    "result",
                    obj(&[
                        ("prediction", v_str(&format!("{:?}", result.prediction))),
                        ("confidence", v_num(result.confidence)),
                    ]),
                );
                self.last_result = Some(result.clone());
                self.dialog.close();
                Ok(result)
            }
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Predict,
                    "alert",
                    obj(&[("reason", v_str("request_failed")), ("error", v_str(&e.to_string()))]),
                );
                Err(FlowError::Request(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FeatureInput {
        let mut f = FeatureInput::default();
        for name in FEATURE_FIELDS {
            f.set_field(name, "1.5").unwrap();
        }
        f
    }

    #[test]
    fn complete_when_all_fields_finite() {
        assert!(filled().is_complete());
    }

    #[test]
    fn empty_text_clears_a_field() {
        let mut f = filled();
        f.set_field("koi_depth", "").unwrap();
        assert!(!f.is_complete());
        assert_eq!(f.koi_depth, None);
    }

    #[test]
    fn garbage_text_becomes_nan_and_blocks_submit() {
        let mut f = filled();
        f.set_field("koi_steff", "warm-ish").unwrap();
        assert!(f.koi_steff.unwrap().is_nan());
        assert!(!f.is_complete());
        assert!(f.payload().is_none());
    }

    #[test]
    fn infinity_is_not_a_valid_feature() {
        let mut f = filled();
        f.set_field("koi_period", "inf").unwrap();
        assert!(!f.is_complete());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut f = FeatureInput::default();
        assert!(f.set_field("koi_impact", "1.0").is_err());
    }

    #[test]
    fn payload_carries_the_parsed_values() {
        let mut f = filled();
        f.set_field("koi_kepmag", "14.2").unwrap();
        let p = f.payload().unwrap();
        assert_eq!(p.koi_kepmag, 14.2);
        assert_eq!(p.koi_period, 1.5);
    }
}
