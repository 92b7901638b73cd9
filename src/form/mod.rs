//! Form state: one widget per schema column.
//!
//! `FormState::render_inputs` snapshots the widgets into [`FormValues`], and
//! [`build_request`] turns those into a [`PredictionRequest`]. Neither step
//! validates: the widgets cannot hold anything outside the schema domains.

use crate::domain::{FieldValue, PredictionRequest};
use crate::error::FormError;
use crate::schema::{self, FIELD_COUNT, SCHEMA};

pub mod widgets;

pub use widgets::{FieldInput, Selector, Stepper};

/// Current field values, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormValues([FieldValue; FIELD_COUNT]);

impl FormValues {
    pub fn get(&self, column: &str) -> Option<FieldValue> {
        schema::position(column).map(|ix| self.0[ix])
    }
}

/// Assemble the pipeline row from the current values.
pub fn build_request(values: &FormValues) -> PredictionRequest {
    PredictionRequest::from_values(values.0)
}

#[derive(Debug, Clone)]
pub struct FormState {
    inputs: [FieldInput; FIELD_COUNT],
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Every widget at its schema default.
    pub fn new() -> Self {
        Self {
            inputs: std::array::from_fn(|i| FieldInput::for_field(&SCHEMA[i])),
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn input(&self, row: usize) -> Option<&FieldInput> {
        self.inputs.get(row)
    }

    pub fn input_mut(&mut self, row: usize) -> Option<&mut FieldInput> {
        self.inputs.get_mut(row)
    }

    pub fn render_inputs(&self) -> FormValues {
        FormValues(std::array::from_fn(|i| self.inputs[i].value()))
    }

    /// Set a column to an exact value, rejecting anything outside its domain.
    pub fn try_set(&mut self, column: &str, value: FieldValue) -> Result<(), FormError> {
        let ix = schema::position(column).ok_or_else(|| FormError::UnknownColumn(column.to_string()))?;
        match (&mut self.inputs[ix], value) {
            (FieldInput::Stepper(s), FieldValue::Integer(v)) => s.try_set(v),
            (FieldInput::Selector(s), FieldValue::Category(label)) => s.try_select(label),
            (FieldInput::Stepper(_), FieldValue::Category(label)) => Err(FormError::NotANumber {
                column: SCHEMA[ix].column,
                raw: label.to_string(),
            }),
            (FieldInput::Selector(_), FieldValue::Integer(v)) => Err(FormError::UnknownOption {
                column: SCHEMA[ix].column,
                value: v.to_string(),
            }),
        }
    }

    /// Parse and apply typed text (numeric entry mode, CLI flags).
    pub fn try_set_raw(&mut self, column: &str, raw: &str) -> Result<(), FormError> {
        let spec = schema::field(column).ok_or_else(|| FormError::UnknownColumn(column.to_string()))?;
        let raw = raw.trim();
        let value = if spec.is_categorical() {
            let label = spec.lookup_option(raw).ok_or_else(|| FormError::UnknownOption {
                column: spec.column,
                value: raw.to_string(),
            })?;
            FieldValue::Category(label)
        } else {
            let v = raw.parse::<i64>().map_err(|_| FormError::NotANumber {
                column: spec.column,
                raw: raw.to_string(),
            })?;
            FieldValue::Integer(v)
        };
        self.try_set(column, value)
    }
}
