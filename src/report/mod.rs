//! Outcome messages and formatted terminal output.
//!
//! Formatting lives here so the TUI and the headless CLI print identical text.

use serde::Serialize;

use crate::domain::{IncomeClass, PredictionRequest};
use crate::schema::SCHEMA;

/// Income threshold the pipeline's positive class stands for.
pub const INCOME_THRESHOLD: &str = "₹50,000";

/// Banner style for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Warning,
}

/// The message shown for a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub class: IncomeClass,
    pub kind: OutcomeKind,
    pub message: String,
}

/// Map a label to its banner: `1` is a success, `0` a warning.
pub fn render_result(class: IncomeClass) -> Outcome {
    match class {
        IncomeClass::AboveThreshold => Outcome {
            class,
            kind: OutcomeKind::Success,
            message: format!("💰 Income > {INCOME_THRESHOLD}"),
        },
        IncomeClass::AtOrBelowThreshold => Outcome {
            class,
            kind: OutcomeKind::Warning,
            message: format!("📉 Income ≤ {INCOME_THRESHOLD}"),
        },
    }
}

/// Plain-text table of the schema, one column per line.
pub fn format_schema() -> String {
    let width = SCHEMA.iter().map(|f| f.column.len()).max().unwrap_or(0);
    let mut out = String::new();
    out.push_str("=== income - pipeline input schema ===\n");
    for (ix, spec) in SCHEMA.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}  {:<width$}  {:<11}  {}\n",
            ix + 1,
            spec.column,
            spec.domain.kind_name(),
            spec.domain.describe(),
        ));
    }
    out
}

/// Request row plus outcome, as printed by `income predict`.
pub fn format_prediction(request: &PredictionRequest, outcome: &Outcome) -> String {
    let width = request.cells().iter().map(|c| c.column.len()).max().unwrap_or(0);
    let mut out = String::new();
    for cell in request.cells() {
        out.push_str(&format!("{:<width$}  {}\n", cell.column, cell.value));
    }
    out.push('\n');
    out.push_str(&format!("{} (label {})\n", outcome.message, outcome.class.label()));
    out
}

#[derive(Serialize)]
struct PredictionReport<'a> {
    request: &'a PredictionRequest,
    label: u8,
    outcome: &'a Outcome,
}

/// JSON form of [`format_prediction`].
pub fn prediction_json(request: &PredictionRequest, outcome: &Outcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&PredictionReport {
        request,
        label: outcome.class.label(),
        outcome,
    })
}

pub fn schema_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SCHEMA[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[test]
    fn label_one_is_success_and_zero_is_warning() {
        let above = render_result(IncomeClass::AboveThreshold);
        assert_eq!(above.kind, OutcomeKind::Success);
        assert_eq!(above.message, "💰 Income > ₹50,000");

        let below = render_result(IncomeClass::AtOrBelowThreshold);
        assert_eq!(below.kind, OutcomeKind::Warning);
        assert_eq!(below.message, "📉 Income ≤ ₹50,000");
    }

    #[test]
    fn schema_table_lists_every_column() {
        let text = format_schema();
        for spec in &SCHEMA {
            assert!(text.contains(spec.column));
        }
        assert!(text.contains("17..=90 (default 30)"));
        assert!(text.contains("2 options: Male, Female"));
    }

    #[test]
    fn schema_json_keeps_dotted_names() {
        let json = schema_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let cols: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["column"].as_str().unwrap())
            .collect();
        assert_eq!(cols[3], "education.num");
        assert_eq!(parsed[0]["domain"]["kind"], "integer");
        assert_eq!(parsed[0]["domain"]["max"], 90);
        assert_eq!(parsed[12]["domain"]["options"][0], "United-States");
    }

    #[test]
    fn prediction_json_carries_label_and_row() {
        let req = PredictionRequest::from_values(std::array::from_fn(|i| SCHEMA[i].domain.default_value()));
        let outcome = render_result(IncomeClass::AtOrBelowThreshold);
        let parsed: serde_json::Value = serde_json::from_str(&prediction_json(&req, &outcome).unwrap()).unwrap();
        assert_eq!(parsed["label"], 0);
        assert_eq!(parsed["outcome"]["kind"], "warning");
        assert_eq!(parsed["request"]["cells"][0]["column"], "age");
        assert_eq!(parsed["request"]["cells"][0]["value"], 30);
        assert_eq!(parsed["request"]["cells"][1]["value"], "Private");

        let text = format_prediction(&req, &outcome);
        assert!(text.contains("(label 0)"));
        assert_eq!(req.get("sex"), Some(FieldValue::Category("Male")));
    }
}
