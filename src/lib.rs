//! Insight Hub: load a CSV or spreadsheet, summarise it, fill missing values,
//! and turn value counts or groupby aggregations into charts.
//!
//! The pipeline (`data`, `chart`, `session`) is UI-independent; `app`,
//! `state` and `ui` are the eframe front-end built on top of it.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod session;
pub mod state;
pub mod ui;

pub use error::{InsightError, Result};
