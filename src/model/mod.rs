//! Pretrained income classifier.
//!
//! The artifact is treated as a black box: one row in, one label out. The
//! [`Classifier`] trait is the seam the prediction service is built on, and
//! [`OnnxPipeline`] is the production implementation.

use crate::domain::{IncomeClass, PredictionRequest};
use crate::error::PredictError;

pub mod onnx;

pub use onnx::OnnxPipeline;

/// A fitted binary classifier over [`PredictionRequest`] rows.
///
/// Implementations are immutable after construction and may be shared across
/// threads without locking.
pub trait Classifier: Send + Sync {
    /// Return exactly one label for the request.
    fn predict(&self, request: &PredictionRequest) -> Result<IncomeClass, PredictError>;

    /// Short description, shown in the page header.
    fn describe(&self) -> String;
}
