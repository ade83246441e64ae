//! Model selection dialog, headless.
//!
//! Purely modal: the dialog yields the confirmed model to its caller and
//! never touches the session store. The caller decides what a selection
//! means (the batch workflow wraps it into a dynamic-mode config).

use crate::domain::ModelType;
use crate::logging::{json_log, obj, v_str, Domain};

pub struct CatalogEntry {
    pub model: ModelType,
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed model catalog presented to the user.
pub const MODEL_CATALOG: [CatalogEntry; 3] = [
    CatalogEntry {
        model: ModelType::LogisticRegression,
        name: "Logistic Regression",
        description: "Great for classification tasks — predicts if an exoplanet is likely a planet or not.",
    },
    CatalogEntry {
        model: ModelType::Knn,
        name: "K-Nearest Neighbors",
        description: "Compares input with similar past data to classify exoplanets.",
    },
    CatalogEntry {
        model: ModelType::LinearRegression,
        name: "Linear Regression",
        description: "Predicts continuous outcomes, such as estimating planetary size or brightness.",
    },
];

#[derive(Default)]
pub struct ModelDialog {
    open: bool,
    busy: bool,
    chosen: Option<ModelType>,
}

impl ModelDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn chosen(&self) -> Option<ModelType> {
        self.chosen
    }

    /// Opening always starts from a clean choice.
    pub fn open(&mut self) {
        self.open = true;
        self.chosen = None;
        json_log(Domain::Dialog, "opened", obj(&[]));
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Explicit cancel, backdrop click, or Escape. Yields nothing and must
    /// not mutate caller state; the local choice is discarded on next open.
    pub fn cancel(&mut self) {
        if self.busy {
            return;
        }
        self.open = false;
        json_log(Domain::Dialog, "cancelled", obj(&[]));
    }

    /// While a request is in flight the dialog ignores interaction.
    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn choose(&mut self, model: ModelType) {
        if !self.open || self.busy {
            return;
        }
        self.chosen = Some(model);
        json_log(
            Domain::Dialog,
            "choice",
            obj(&[("model", v_str(model.as_str()))]),
        );
    }

    /// Reachable only with the dialog open, not busy, and exactly one entry
    /// chosen; otherwise a no-op returning `None`.
    pub fn confirm(&mut self) -> Option<ModelType> {
        if !self.open || self.busy {
            return None;
        }
        let model = self.chosen?;
        json_log(
            Domain::Dialog,
            "confirmed",
            obj(&[("model", v_str(model.as_str()))]),
        );
        Some(model)
    }
}
