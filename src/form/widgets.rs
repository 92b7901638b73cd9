//! Input widgets that can only hold in-domain values.
//!
//! A [`Stepper`] saturates at its bounds and a [`Selector`] cycles through a
//! closed list, so there is no key sequence that produces an out-of-range
//! number or an unknown label.

use crate::domain::FieldValue;
use crate::error::FormError;
use crate::schema::{FieldDomain, FieldSpec};

/// Bounded integer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepper {
    column: &'static str,
    value: i64,
    min: i64,
    max: i64,
    coarse_step: i64,
}

impl Stepper {
    pub fn new(column: &'static str, min: i64, max: i64, default: i64, coarse_step: i64) -> Self {
        Self {
            column,
            value: default.clamp(min, max),
            min,
            max,
            coarse_step: coarse_step.max(1),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    /// Move by `delta`, saturating at the bounds.
    pub fn nudge(&mut self, delta: i64) {
        self.value = self.value.saturating_add(delta).clamp(self.min, self.max);
    }

    pub fn increment(&mut self) {
        self.nudge(1);
    }

    pub fn decrement(&mut self) {
        self.nudge(-1);
    }

    pub fn step_up(&mut self) {
        self.nudge(self.coarse_step);
    }

    pub fn step_down(&mut self) {
        self.nudge(-self.coarse_step);
    }

    pub fn to_min(&mut self) {
        self.value = self.min;
    }

    pub fn to_max(&mut self) {
        self.value = self.max;
    }

    /// Set an exact value. Out-of-range values are rejected and the stepper is unchanged.
    pub fn try_set(&mut self, value: i64) -> Result<(), FormError> {
        if !(self.min..=self.max).contains(&value) {
            return Err(FormError::OutOfRange {
                column: self.column,
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.value = value;
        Ok(())
    }
}

/// Closed-choice input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    column: &'static str,
    options: &'static [&'static str],
    index: usize,
}

impl Selector {
    pub fn new(column: &'static str, options: &'static [&'static str]) -> Self {
        Self {
            column,
            options,
            index: 0,
        }
    }

    pub fn selected(&self) -> &'static str {
        self.options[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.options
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.options.len();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.options.len() - 1) % self.options.len();
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self) {
        self.index = self.options.len() - 1;
    }

    pub fn try_select(&mut self, label: &str) -> Result<(), FormError> {
        match self.options.iter().position(|o| *o == label) {
            Some(ix) => {
                self.index = ix;
                Ok(())
            }
            None => Err(FormError::UnknownOption {
                column: self.column,
                value: label.to_string(),
            }),
        }
    }
}

/// One row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Stepper(Stepper),
    Selector(Selector),
}

impl FieldInput {
    /// Build the widget for a schema column, initialized to its default.
    pub fn for_field(spec: &'static FieldSpec) -> Self {
        match spec.domain {
            FieldDomain::Integer {
                min,
                max,
                default,
                coarse_step,
            } => FieldInput::Stepper(Stepper::new(spec.column, min, max, default, coarse_step)),
            FieldDomain::Categorical { options } => FieldInput::Selector(Selector::new(spec.column, options)),
        }
    }

    pub fn value(&self) -> FieldValue {
        match self {
            FieldInput::Stepper(s) => FieldValue::Integer(s.value()),
            FieldInput::Selector(s) => FieldValue::Category(s.selected()),
        }
    }

    /// ←/→: one unit for steppers, one option for selectors.
    pub fn adjust(&mut self, forward: bool) {
        match self {
            FieldInput::Stepper(s) if forward => s.increment(),
            FieldInput::Stepper(s) => s.decrement(),
            FieldInput::Selector(s) if forward => s.next(),
            FieldInput::Selector(s) => s.prev(),
        }
    }

    /// PgUp/PgDn. Selectors move one option.
    pub fn coarse_adjust(&mut self, forward: bool) {
        match self {
            FieldInput::Stepper(s) if forward => s.step_up(),
            FieldInput::Stepper(s) => s.step_down(),
            FieldInput::Selector(_) => self.adjust(forward),
        }
    }

    /// Home/End.
    pub fn jump(&mut self, to_end: bool) {
        match self {
            FieldInput::Stepper(s) if to_end => s.to_max(),
            FieldInput::Stepper(s) => s.to_min(),
            FieldInput::Selector(s) if to_end => s.last(),
            FieldInput::Selector(s) => s.first(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldInput::Stepper(_))
    }
}
