//! Chart specifications for developer activity tables.
//!
//! Builders are pure functions from filtered or aggregated tables to a
//! renderer-neutral [`ChartSpec`]: one trace per colour group, plus layout
//! hints (log axis, grouped bars, facet rows). [`ChartSpec`] renders itself
//! as a plain-text or Markdown pivot table; anything graphical consumes the
//! JSON form.

pub mod builders;
mod render;
mod spec;

pub use builders::{aggregate_chart, area_chart, faceted_bar_chart, line_chart, ChartOptions};
pub use spec::{BarMode, ChartKind, ChartSpec, Layout, Trace};
