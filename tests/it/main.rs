//! Single test binary entry point.
//!
//! - pipeline: the load → fill → count/groupby → chart scenario end to end
//! - properties: invariants checked over a handful of generated datasets
//! - files: loading from disk and exporting back

mod files;
mod helpers;
mod pipeline;
mod properties;
