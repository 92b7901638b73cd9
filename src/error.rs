use std::path::{Path, PathBuf};

use thiserror::Error;

/// Process exit codes used by [`AppError`].
pub mod exit {
    pub const USAGE: u8 = 2;
    pub const ARTIFACT: u8 = 3;
    pub const TERMINAL: u8 = 4;
    pub const SCHEMA: u8 = 5;
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the prediction path.
///
/// Both kinds are static configuration defects. Neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// The artifact is missing, corrupt, or not loadable by the inference runtime.
    #[error("failed to load model artifact {}: {reason}", path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    /// The request does not match what the artifact was fit against.
    #[error("request does not match the pipeline schema: {0}")]
    InferenceSchema(String),
}

impl PredictError {
    pub fn artifact(path: &Path, reason: impl Into<String>) -> Self {
        PredictError::ArtifactLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn schema(reason: impl Into<String>) -> Self {
        PredictError::InferenceSchema(reason.into())
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let code = match err {
            PredictError::ArtifactLoad { .. } => exit::ARTIFACT,
            PredictError::InferenceSchema(_) => exit::SCHEMA,
        };
        AppError::new(code, err.to_string())
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("{column}: {value} is outside {min}..={max}")]
    OutOfRange { column: &'static str, value: i64, min: i64, max: i64 },

    #[error("{column}: '{value}' is not one of the allowed options")]
    UnknownOption { column: &'static str, value: String },

    #[error("{column}: expected a whole number, got '{raw}'")]
    NotANumber { column: &'static str, raw: String },
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::new(exit::USAGE, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_errors_map_to_distinct_exit_codes() {
        let load: AppError = PredictError::artifact(Path::new("m.onnx"), "file not found").into();
        assert_eq!(load.exit_code(), exit::ARTIFACT);
        assert!(load.to_string().contains("m.onnx"));

        let schema: AppError = PredictError::schema("input 3 is 'education_num'").into();
        assert_eq!(schema.exit_code(), exit::SCHEMA);
    }
}
