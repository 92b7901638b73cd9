//! The prediction service shared by the TUI and the headless CLI.
//!
//! Built once at startup and handed to whichever front-end runs. There is no
//! lazy global: if the artifact cannot be loaded the service is never
//! constructed and the process exits before drawing anything.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::domain::{IncomeClass, PredictionRequest};
use crate::error::PredictError;
use crate::model::{Classifier, OnnxPipeline};

/// Read-only handle to the loaded classifier. Cheap to clone.
#[derive(Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("classifier", &self.classifier.describe())
            .finish()
    }
}

impl PredictionService {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Load the ONNX artifact and wrap it.
    pub fn from_artifact(path: &Path) -> Result<Self, PredictError> {
        let pipeline = OnnxPipeline::load(path)?;
        Ok(Self::new(Arc::new(pipeline)))
    }

    pub fn describe(&self) -> String {
        self.classifier.describe()
    }

    /// Run one prediction.
    pub fn predict(&self, request: &PredictionRequest) -> Result<IncomeClass, PredictError> {
        let start = Instant::now();
        let result = self.classifier.predict(request);
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(class) => info!(label = class.label(), elapsed_us, "prediction"),
            Err(err) => warn!(error = %err, elapsed_us, "prediction failed"),
        }
        result
    }
}
