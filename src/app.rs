//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - installs the log subscriber
//! - loads the pipeline artifact once, before anything is drawn
//! - hands the service to the form or the headless subcommands

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Command, GlobalArgs, PredictArgs, SchemaArgs};
use crate::domain::{AppConfig, PredictionRequest};
use crate::error::{AppError, exit};
use crate::form::{FormState, build_request};
use crate::logging::{self, LogTarget};
use crate::report::{format_prediction, format_schema, prediction_json, render_result, schema_json};
use crate::service::PredictionService;
use crate::tui::Theme;

/// Entry point for the `income` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `income` and `income --model x.onnx` behave like `income ui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let config = app_config_from_args(&cli.options);

    match cli.command {
        Command::Ui => handle_ui(&config),
        Command::Predict(args) => handle_predict(&config, &args),
        Command::Schema(args) => handle_schema(&args),
    }
}

pub fn app_config_from_args(args: &GlobalArgs) -> AppConfig {
    AppConfig {
        model_path: args.model.clone(),
        theme: args.theme,
        log_file: args.log_file.clone(),
    }
}

fn handle_ui(config: &AppConfig) -> Result<(), AppError> {
    logging::init(&LogTarget::for_ui(config.log_file.clone()))?;
    let service = load_service(config)?;
    crate::tui::run(service, Theme::from_name(config.theme))
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<(), AppError> {
    logging::init(&LogTarget::for_headless(config.log_file.clone()))?;
    let service = load_service(config)?;

    let request = request_from_args(args)?;
    let outcome = render_result(service.predict(&request)?);

    if args.json {
        let json = prediction_json(&request, &outcome)
            .map_err(|e| AppError::new(exit::USAGE, format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", format_prediction(&request, &outcome));
    }
    Ok(())
}

fn handle_schema(args: &SchemaArgs) -> Result<(), AppError> {
    if args.json {
        let json = schema_json().map_err(|e| AppError::new(exit::USAGE, format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", format_schema());
    }
    Ok(())
}

/// Load the artifact. Any failure ends the process before the form is shown.
fn load_service(config: &AppConfig) -> Result<PredictionService, AppError> {
    info!(model = %config.model_path.display(), "loading pipeline artifact");
    PredictionService::from_artifact(&config.model_path).map_err(|e| {
        error!(error = %e, "startup failed");
        AppError::from(e)
    })
}

/// Start from the form defaults and apply the given flags.
pub fn request_from_args(args: &PredictArgs) -> Result<PredictionRequest, AppError> {
    let mut form = FormState::new();
    for (column, value) in args.assignments() {
        form.try_set(column, value)?;
    }
    Ok(build_request(&form.render_inputs()))
}

/// Rewrite argv so `income` defaults to `income ui`.
///
/// Rules:
/// - `income`                      -> `income ui`
/// - `income --model m.onnx ...`   -> `income ui --model m.onnx ...`
/// - `income --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("ui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "ui" | "predict" | "schema");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "ui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "ui".to_string());
        return argv;
    }

    argv
}
