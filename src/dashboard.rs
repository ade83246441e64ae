//! Metrics dashboard with simulated retraining.
//!
//! The "what-if" controls perturb the session metrics locally, no remote
//! call involved: accuracy, precision and F1 rise a flat 3 points (capped at
//! 99) while recall drops 3 (floored at 70). The asymmetry is the point — it
//! tells the precision/recall trade-off story, so `is_increase` is fixed per
//! field instead of derived from the delta's sign.

use rand::Rng;
use std::sync::Arc;

use crate::domain::{MetricData, PerformanceMetrics};
use crate::logging::{json_log, obj, v_num, Domain};
use crate::progress::{CancelToken, ProgressPlan, Sleeper};
use crate::session::SessionStore;

pub const REGULARIZATION_RANGE: (f64, f64) = (0.0, 1.0);
pub const MAX_ITERATIONS_RANGE: (f64, f64) = (0.0, 1000.0);

/// One point of the trend line; the history is append-only within a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub iteration: u32,
    pub f1_score: f64,
}

/// Baseline shown before any training has happened.
pub fn baseline_metrics() -> PerformanceMetrics {
    PerformanceMetrics {
        accuracy: MetricData::flat(92.5),
        precision: MetricData::flat(88.2),
        recall: MetricData::flat(90.1),
        f1_score: MetricData::flat(89.1),
    }
}

pub struct Dashboard {
    session: Arc<SessionStore>,
    regularization_strength: f64,
    max_iterations: f64,
    history: Vec<HistoryPoint>,
}

impl Dashboard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            regularization_strength: 0.01,
            max_iterations: 1000.0,
            history: Vec::new(),
        }
    }

    /// Invoked by the navigation layer. Seeds the metrics slice and the trend
    /// line when nothing has been trained yet.
    pub fn on_enter(&mut self) {
        if self.session.metrics().is_none() {
            self.session.set_metrics(Some(baseline_metrics()));
        }
        if self.history.is_empty() {
            let f1 = self
                .session
                .metrics()
                .map(|m| m.f1_score.value)
                .unwrap_or(0.0);
            self.history.push(HistoryPoint {
                iteration: 1,
                f1_score: f1,
            });
        }
    }

    pub fn regularization_strength(&self) -> f64 {
        self.regularization_strength
    }

    pub fn max_iterations(&self) -> f64 {
        self.max_iterations
    }

    pub fn history(&self) -> &[HistoryPoint] {
        &self.history
    }

    /// Slider movement: clamped to the control's range.
    pub fn set_regularization(&mut self, value: f64) {
        self.regularization_strength = value.clamp(REGULARIZATION_RANGE.0, REGULARIZATION_RANGE.1);
    }

    pub fn set_max_iterations(&mut self, value: f64) {
        self.max_iterations = value.clamp(MAX_ITERATIONS_RANGE.0, MAX_ITERATIONS_RANGE.1);
    }

    /// Direct numeric entry: applied only when it parses and sits inside the
    /// range, otherwise the control reverts to its last valid value. Returns
    /// whether the entry was accepted.
    pub fn set_regularization_text(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(v) if (REGULARIZATION_RANGE.0..=REGULARIZATION_RANGE.1).contains(&v) => {
                self.regularization_strength = v;
                true
            }
            _ => false,
        }
    }

    pub fn set_max_iterations_text(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(v) if (MAX_ITERATIONS_RANGE.0..=MAX_ITERATIONS_RANGE.1).contains(&v) => {
                self.max_iterations = v;
                true
            }
            _ => false,
        }
    }

    /// "Default" is literal zero for both controls, not a recommended value.
    pub fn reset_to_default(&mut self) {
        self.regularization_strength = 0.0;
        self.max_iterations = 0.0;
        json_log(Domain::Dashboard, "reset_to_default", obj(&[]));
    }

    /// Simulated retraining: runs the progress animation, then derives the
    /// next metric snapshot from the current one and appends one history
    /// point. A cancelled run changes nothing. Returns the applied snapshot.
    pub async fn apply_changes<S: Sleeper>(
        &mut self,
        sleeper: &S,
        cancel: &CancelToken,
        rng: &mut (impl Rng + Send),
    ) -> Option<PerformanceMetrics> {
        let plan = ProgressPlan::generate(rng);
        let completed = plan
            .drive(sleeper, cancel, |pct| {
                json_log(Domain::Dashboard, "progress", obj(&[("pct", v_num(pct as f64))]));
            })
            .await;
        if !completed {
            json_log(Domain::Dashboard, "apply_cancelled", obj(&[]));
            return None;
        }

        let prev = self.session.metrics().unwrap_or_else(baseline_metrics);
        let next = perturb(&prev);
        self.session.set_metrics(Some(next.clone()));
        self.history.push(HistoryPoint {
            iteration: self.history.len() as u32 + 1,
            f1_score: next.f1_score.value,
        });
        json_log(
            Domain::Dashboard,
            "apply_complete",
            obj(&[
                ("f1", v_num(next.f1_score.value)),
                ("recall", v_num(next.recall.value)),
                ("iterations", v_num(self.history.len() as f64)),
            ]),
        );
        Some(next)
    }
}

fn pct_change(old: f64, new: f64) -> f64 {
    if old != 0.0 {
        (new - old) / old * 100.0
    } else {
        0.0
    }
}

/// Fixed perturbation policy for a simulated training run.
fn perturb(prev: &PerformanceMetrics) -> PerformanceMetrics {
    let up = |m: &MetricData| {
        let value = (m.value + 3.0).min(99.0);
        MetricData {
            value,
            change: Some(pct_change(m.value, value)),
            is_increase: Some(true),
        }
    };
    let recall_value = (prev.recall.value - 3.0).max(70.0);
    PerformanceMetrics {
        accuracy: up(&prev.accuracy),
        precision: up(&prev.precision),
        recall: MetricData {
            value: recall_value,
            change: Some(pct_change(prev.recall.value, recall_value)),
            is_increase: Some(false),
        },
        f1_score: up(&prev.f1_score),
    }
}
