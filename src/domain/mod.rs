//! Domain types used throughout the app.
//!
//! This module defines:
//!
//! - request cells and values (`FieldValue`, `PredictionRequest`)
//! - the binary outcome (`IncomeClass`)
//! - resolved configuration (`AppConfig`, `ThemeName`)

pub mod types;

pub use types::*;
