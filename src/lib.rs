//! `income-form` library crate.
//!
//! The binary (`income`) is a thin wrapper around this library so that:
//!
//! - form, schema, and inference logic are testable without a terminal
//! - the same prediction service backs both the TUI and the headless CLI

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod form;
pub mod logging;
pub mod model;
pub mod report;
pub mod schema;
pub mod service;
pub mod tui;
