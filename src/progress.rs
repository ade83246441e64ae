//! Simulated training progress.
//!
//! The dashboard's retraining animation is a pre-generated plan of timed
//! percentage steps: large ragged jumps up to 90%, small ones to the finish,
//! then a short hold before completion. Generating the plan up front (instead
//! of recursive timer scheduling) keeps it cancellable and lets tests drive
//! it without touching the wall clock.

use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStep {
    pub delay: Duration,
    /// Displayed percentage after this step, 0..=100.
    pub percentage: u32,
}

#[derive(Debug, Clone)]
pub struct ProgressPlan {
    pub steps: Vec<ProgressStep>,
}

impl ProgressPlan {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut steps = Vec::new();
        let mut current = 0.0_f64;
        while current < 100.0 {
            let (jump, delay_ms) = if current < 90.0 {
                (rng.gen_range(1.0..=9.0), rng.gen_range(200..=600))
            } else {
                (rng.gen_range(0.5..=2.5), rng.gen_range(50..=150))
            };
            current = (current + jump).min(100.0);
            steps.push(ProgressStep {
                delay: Duration::from_millis(delay_ms),
                percentage: current.floor() as u32,
            });
        }
        // Completion hold so 100% is visible before the overlay clears.
        steps.push(ProgressStep {
            delay: Duration::from_millis(500),
            percentage: 100,
        });
        Self { steps }
    }

    /// Walks the plan, sleeping between ticks. Returns false if cancelled
    /// before reaching 100%.
    pub async fn drive<S: Sleeper>(
        &self,
        sleeper: &S,
        cancel: &CancelToken,
        mut on_tick: impl FnMut(u32) + Send,
    ) -> bool {
        for step in &self.steps {
            if cancel.is_cancelled() {
                return false;
            }
            sleeper.sleep(step.delay).await;
            on_tick(step.percentage);
        }
        !cancel.is_cancelled()
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, d: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

/// Fake clock: returns immediately.
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _d: Duration) {}
}

#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plan_is_monotone_and_reaches_100() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = ProgressPlan::generate(&mut rng);
            let mut last = 0;
            for step in &plan.steps {
                assert!(step.percentage >= last, "regressed at seed {}", seed);
                assert!(step.percentage <= 100);
                last = step.percentage;
            }
            assert_eq!(last, 100);
        }
    }

    #[test]
    fn plan_duration_is_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = ProgressPlan::generate(&mut rng);
        let total: Duration = plan.steps.iter().map(|s| s.delay).sum();
        // Worst case: 100 one-point jumps at 600ms plus the hold.
        assert!(total <= Duration::from_millis(100 * 600 + 500));
    }

    #[tokio::test]
    async fn drive_reports_every_tick() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = ProgressPlan::generate(&mut rng);
        let mut seen = Vec::new();
        let done = plan
            .drive(&NoopSleeper, &CancelToken::new(), |p| seen.push(p))
            .await;
        assert!(done);
        assert_eq!(seen.len(), plan.steps.len());
        assert_eq!(*seen.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn cancelled_drive_stops_early() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = ProgressPlan::generate(&mut rng);
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut seen = Vec::new();
        let done = plan.drive(&NoopSleeper, &cancel, |p| seen.push(p)).await;
        assert!(!done);
        assert!(seen.is_empty());
    }
}
