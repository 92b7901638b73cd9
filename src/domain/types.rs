//! Shared domain types.
//!
//! A [`PredictionRequest`] lives for exactly one prediction: it is assembled from
//! the current form values, handed to the classifier once, then dropped.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::schema::{FIELD_COUNT, SCHEMA};

/// A single cell value.
///
/// Categorical values borrow from the schema vocabulary, so a label that is not
/// part of a column's closed list cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Category(&'static str),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Category(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Category(label) => f.write_str(label),
        }
    }
}

/// One named cell of a request row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestCell {
    pub column: &'static str,
    pub value: FieldValue,
}

/// The single-row record handed to the pipeline.
///
/// Always holds exactly [`FIELD_COUNT`] cells, named and ordered as in
/// [`SCHEMA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    cells: [RequestCell; FIELD_COUNT],
}

impl PredictionRequest {
    /// Pair values with the schema columns, position by position.
    pub fn from_values(values: [FieldValue; FIELD_COUNT]) -> Self {
        let cells = std::array::from_fn(|i| RequestCell {
            column: SCHEMA[i].column,
            value: values[i],
        });
        Self { cells }
    }

    pub fn cells(&self) -> &[RequestCell] {
        &self.cells
    }

    pub fn get(&self, column: &str) -> Option<FieldValue> {
        self.cells.iter().find(|c| c.column == column).map(|c| c.value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The binary income label produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeClass {
    /// Label `0`.
    AtOrBelowThreshold,
    /// Label `1`.
    AboveThreshold,
}

impl IncomeClass {
    /// Map a raw pipeline label. Anything other than `0`/`1` is not a valid outcome.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(IncomeClass::AtOrBelowThreshold),
            1 => Some(IncomeClass::AboveThreshold),
            _ => None,
        }
    }

    pub fn label(self) -> u8 {
        match self {
            IncomeClass::AtOrBelowThreshold => 0,
            IncomeClass::AboveThreshold => 1,
        }
    }
}

/// Page styling. Both variants render the same form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    /// Dark header band, blue action button.
    #[default]
    Gradient,
    /// Terminal default colors.
    Plain,
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub theme: ThemeName,
    pub log_file: Option<PathBuf>,
}

/// Artifact file name used when neither `--model` nor `INCOME_MODEL_PATH` is set.
pub const DEFAULT_MODEL_PATH: &str = "gradient_boosting_v1.onnx";
