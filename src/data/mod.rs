//! Data layer: core types, loading, summaries, imputation and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx bytes
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse upload → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐      ┌──────────┐
//!   │  Dataset  │ ───▶ │  summary  │  shape, missing, describe, dtypes
//!   └──────────┘      └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  impute   │  FillPolicy → new Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  value counts / groupby → tables for charting
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  Dataset → CSV bytes
//!   └──────────┘
//! ```

pub mod aggregate;
pub mod export;
pub mod impute;
pub mod loader;
pub mod model;
pub mod summary;
