//! Command-line parsing for the income prediction form.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! form and inference code. Every per-column flag is checked against the
//! schema descriptor, so the headless path accepts exactly what the form does.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_MODEL_PATH, FieldValue, ThemeName};
use crate::schema;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "income", version, about = "Adult income prediction form")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// ONNX export of the fitted preprocessing + classifier pipeline.
    #[arg(long, global = true, env = "INCOME_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Page styling.
    #[arg(long, global = true, env = "INCOME_THEME", value_enum, default_value_t = ThemeName::Gradient)]
    pub theme: ThemeName,

    /// Append logs to this file (the form never logs to the terminal).
    #[arg(long, global = true, env = "INCOME_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive form (default).
    Ui,
    /// Run a single prediction without the form. Omitted columns take their form default.
    Predict(PredictArgs),
    /// Print the pipeline input schema (column order and domains).
    Schema(SchemaArgs),
}

/// One flag per pipeline column.
#[derive(Debug, Args, Clone, Default)]
pub struct PredictArgs {
    /// Age in years.
    #[arg(long, value_parser = integer_column("age"))]
    pub age: Option<i64>,

    #[arg(long, value_parser = category_column("workclass"))]
    pub workclass: Option<&'static str>,

    #[arg(long, value_parser = category_column("education"))]
    pub education: Option<&'static str>,

    /// Years of education, as encoded by the dataset.
    #[arg(long, value_parser = integer_column("education.num"))]
    pub education_num: Option<i64>,

    #[arg(long, value_parser = category_column("marital.status"))]
    pub marital_status: Option<&'static str>,

    #[arg(long, value_parser = category_column("occupation"))]
    pub occupation: Option<&'static str>,

    #[arg(long, value_parser = category_column("relationship"))]
    pub relationship: Option<&'static str>,

    #[arg(long, value_parser = category_column("race"))]
    pub race: Option<&'static str>,

    #[arg(long, value_parser = category_column("sex"))]
    pub sex: Option<&'static str>,

    #[arg(long, value_parser = integer_column("capital.gain"))]
    pub capital_gain: Option<i64>,

    #[arg(long, value_parser = integer_column("capital.loss"))]
    pub capital_loss: Option<i64>,

    #[arg(long, value_parser = integer_column("hours.per.week"))]
    pub hours_per_week: Option<i64>,

    #[arg(long, value_parser = category_column("native.country"))]
    pub native_country: Option<&'static str>,

    /// Print the request and outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// Columns given on the command line, in schema order.
    pub fn assignments(&self) -> Vec<(&'static str, FieldValue)> {
        let ints = [
            ("age", self.age),
            ("education.num", self.education_num),
            ("capital.gain", self.capital_gain),
            ("capital.loss", self.capital_loss),
            ("hours.per.week", self.hours_per_week),
        ];
        let cats = [
            ("workclass", self.workclass),
            ("education", self.education),
            ("marital.status", self.marital_status),
            ("occupation", self.occupation),
            ("relationship", self.relationship),
            ("race", self.race),
            ("sex", self.sex),
            ("native.country", self.native_country),
        ];

        let mut out: Vec<(&'static str, FieldValue)> = ints
            .into_iter()
            .filter_map(|(c, v)| v.map(|v| (c, FieldValue::Integer(v))))
            .chain(cats.into_iter().filter_map(|(c, v)| v.map(|v| (c, FieldValue::Category(v)))))
            .collect();
        out.sort_by_key(|(c, _)| schema::position(c));
        out
    }
}

/// Options for `income schema`.
#[derive(Debug, Args, Clone, Default)]
pub struct SchemaArgs {
    /// Print the schema as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse an integer flag and check it against the column's bounds.
fn integer_column(column: &'static str) -> impl Fn(&str) -> Result<i64, String> + Clone + Send + Sync + 'static {
    move |raw: &str| {
        let spec = schema::field(column).ok_or_else(|| format!("unknown column '{column}'"))?;
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected a whole number, got '{raw}'"))?;
        if !spec.domain.contains(&FieldValue::Integer(value)) {
            return Err(format!("{value} is outside {}", spec.domain.describe()));
        }
        Ok(value)
    }
}

/// Parse a categorical flag against the column's closed vocabulary.
fn category_column(column: &'static str) -> impl Fn(&str) -> Result<&'static str, String> + Clone + Send + Sync + 'static {
    move |raw: &str| {
        let spec = schema::field(column).ok_or_else(|| format!("unknown column '{column}'"))?;
        spec.lookup_option(raw.trim())
            .ok_or_else(|| format!("'{raw}' is not one of: {}", spec.domain.describe()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("income").chain(args.iter().copied()))
    }

    #[test]
    fn predict_flags_use_schema_domains() {
        let cli = parse(&[
            "predict",
            "--age",
            "39",
            "--education",
            "Bachelors",
            "--education-num",
            "13",
            "--marital-status",
            "Never-married",
            "--native-country",
            "United-States",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.age, Some(39));
        assert_eq!(args.marital_status, Some("Never-married"));
        assert_eq!(
            args.assignments(),
            vec![
                ("age", FieldValue::Integer(39)),
                ("education", FieldValue::Category("Bachelors")),
                ("education.num", FieldValue::Integer(13)),
                ("marital.status", FieldValue::Category("Never-married")),
                ("native.country", FieldValue::Category("United-States")),
            ]
        );
    }

    #[test]
    fn out_of_range_flags_are_rejected() {
        assert!(parse(&["predict", "--age", "16"]).is_err());
        assert!(parse(&["predict", "--age", "91"]).is_err());
        assert!(parse(&["predict", "--capital-loss", "4357"]).is_err());
        assert!(parse(&["predict", "--capital-gain", "99999"]).is_ok());
        assert!(parse(&["predict", "--age", "17"]).is_ok());
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!(parse(&["predict", "--sex", "Unknown"]).is_err());
        assert!(parse(&["predict", "--native-country", "Atlantis"]).is_err());
        assert!(parse(&["predict", "--workclass", "Never-worked"]).is_ok());
    }

    #[test]
    fn global_options_work_after_the_subcommand() {
        let cli = parse(&["predict", "--model", "m.onnx", "--theme", "plain", "--json"]).unwrap();
        assert_eq!(cli.options.model, PathBuf::from("m.onnx"));
        assert_eq!(cli.options.theme, ThemeName::Plain);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert!(args.json);
        assert!(args.assignments().is_empty());
    }

    #[test]
    fn schema_subcommand_parses() {
        let cli = parse(&["schema", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Schema(SchemaArgs { json: true })));
    }
}
