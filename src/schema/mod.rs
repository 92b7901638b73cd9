//! Ordered column schema for the income pipeline.
//!
//! The pretrained pipeline resolves its preprocessing by column name *and*
//! position, so [`SCHEMA`] is part of the artifact contract. It is the single
//! source for:
//!
//! - the rows drawn by the TUI (labels, bounds, option lists)
//! - the headless `income predict` flags
//! - the request builder and the ONNX input binding
//!
//! Column names keep the dotted spelling the pipeline was fit against
//! (`education.num`, not `education_num`).

use serde::Serialize;

use crate::domain::FieldValue;

mod vocab;

pub use vocab::*;

/// Number of columns the pipeline expects.
pub const FIELD_COUNT: usize = 13;

/// Allowed values for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldDomain {
    /// Bounded integer entered through a stepper.
    Integer {
        min: i64,
        max: i64,
        default: i64,
        /// Step used by PgUp/PgDn.
        coarse_step: i64,
    },
    /// Closed list of labels chosen through a selector. The first option is the default.
    Categorical { options: &'static [&'static str] },
}

impl FieldDomain {
    pub fn contains(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldDomain::Integer { min, max, .. }, FieldValue::Integer(v)) => (*min..=*max).contains(v),
            (FieldDomain::Categorical { options }, FieldValue::Category(label)) => options.contains(label),
            _ => false,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldDomain::Integer { default, .. } => FieldValue::Integer(*default),
            FieldDomain::Categorical { options } => FieldValue::Category(options[0]),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldDomain::Integer { .. } => "integer",
            FieldDomain::Categorical { .. } => "categorical",
        }
    }

    /// Short human-readable summary, e.g. `17..=90 (default 30)`.
    pub fn describe(&self) -> String {
        match self {
            FieldDomain::Integer { min, max, default, .. } => {
                format!("{min}..={max} (default {default})")
            }
            FieldDomain::Categorical { options } => {
                format!("{} options: {}", options.len(), options.join(", "))
            }
        }
    }
}

/// One column of the pipeline input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Column name exactly as the pipeline was fit.
    pub column: &'static str,
    /// Label shown next to the input.
    pub label: &'static str,
    pub domain: FieldDomain,
}

impl FieldSpec {
    pub fn is_categorical(&self) -> bool {
        matches!(self.domain, FieldDomain::Categorical { .. })
    }

    /// Resolve a raw label against this column's vocabulary.
    ///
    /// Returns the interned `'static` label so callers never hold
    /// out-of-vocabulary strings.
    pub fn lookup_option(&self, raw: &str) -> Option<&'static str> {
        match self.domain {
            FieldDomain::Categorical { options } => options.iter().copied().find(|o| *o == raw),
            FieldDomain::Integer { .. } => None,
        }
    }
}

const fn integer(
    column: &'static str,
    label: &'static str,
    min: i64,
    max: i64,
    default: i64,
    coarse_step: i64,
) -> FieldSpec {
    FieldSpec {
        column,
        label,
        domain: FieldDomain::Integer {
            min,
            max,
            default,
            coarse_step,
        },
    }
}

const fn categorical(column: &'static str, label: &'static str, options: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        column,
        label,
        domain: FieldDomain::Categorical { options },
    }
}

/// The pipeline's input columns, in fit order.
pub static SCHEMA: [FieldSpec; FIELD_COUNT] = [
    integer("age", "Age", 17, 90, 30, 5),
    categorical("workclass", "Workclass", WORKCLASS),
    categorical("education", "Education", EDUCATION),
    integer("education.num", "Education Number", 1, 16, 13, 4),
    categorical("marital.status", "Marital Status", MARITAL_STATUS),
    categorical("occupation", "Occupation", OCCUPATION),
    categorical("relationship", "Relationship", RELATIONSHIP),
    categorical("race", "Race", RACE),
    categorical("sex", "Sex", SEX),
    integer("capital.gain", "Capital Gain", 0, 99_999, 0, 1_000),
    integer("capital.loss", "Capital Loss", 0, 4_356, 0, 100),
    integer("hours.per.week", "Hours per Week", 1, 99, 40, 5),
    categorical("native.country", "Native Country", NATIVE_COUNTRY),
];

/// Look up a column by its pipeline name.
pub fn field(column: &str) -> Option<&'static FieldSpec> {
    SCHEMA.iter().find(|f| f.column == column)
}

/// Position of a column in [`SCHEMA`].
pub fn position(column: &str) -> Option<usize> {
    SCHEMA.iter().position(|f| f.column == column)
}

/// Column names in fit order.
pub fn columns() -> impl Iterator<Item = &'static str> {
    SCHEMA.iter().map(|f| f.column)
}
