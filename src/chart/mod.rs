//! Charting: result table → [`Chart`] → raster.
//!
//! `build` validates field selections and lays the data out (series, pie
//! slices, sunburst sectors); `render` rasterises a built chart for export
//! and for the pie/sunburst preview.

pub mod build;
pub mod render;

pub use build::{build_chart, Chart, ChartBody, ChartKind, ChartRequest, XyFields};
pub use render::{render_png, render_rgb};
