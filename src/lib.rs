//! Client-side workflow orchestration for a remote exoplanet classification
//! service: a shared session store, a model-selection dialog, a single-record
//! prediction flow, a batch upload/predict/train workflow, and a metrics
//! dashboard with locally simulated retraining.

pub mod backend;
pub mod batch_flow;
pub mod config;
pub mod dashboard;
pub mod dialog;
pub mod domain;
pub mod logging;
pub mod predict_flow;
pub mod progress;
pub mod session;
