use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A renderer-neutral chart: a title, a list of traces, and layout hints.
///
/// # Examples
///
/// ```
/// use devtrack_charts::{ChartKind, ChartSpec, Layout};
///
/// let chart = ChartSpec {
///     kind: ChartKind::Line,
///     title: "Monthly Developer Count".into(),
///     traces: vec![],
///     layout: Layout::default(),
/// };
/// assert!(chart.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Mark type.
    pub kind: ChartKind,
    /// Chart heading.
    pub title: String,
    /// One trace per colour group (and facet, for faceted charts).
    pub traces: Vec<Trace>,
    /// Axis and arrangement hints.
    pub layout: Layout,
}

impl ChartSpec {
    /// `true` if the chart has no data points, so a renderer should draw a
    /// placeholder.
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.x.is_empty())
    }

    /// Total number of points across all traces.
    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|t| t.x.len()).sum()
    }
}

/// Mark type of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Lines connecting points in date order.
    Line,
    /// Stacked filled areas without outlines.
    Area,
    /// Bars.
    Bar,
}

/// One series of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Legend label (project title or event type); `None` for single-series
    /// charts.
    pub name: Option<String>,
    /// Facet row this trace is drawn in, for faceted charts.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub facet: Option<String>,
    /// Months, ascending.
    pub x: Vec<NaiveDate>,
    /// Values, parallel to `x`.
    pub y: Vec<u64>,
    /// Outline width override; area charts use `0.0`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line_width: Option<f64>,
}

impl Trace {
    /// Label used for a table column: `facet / name`, `name`, or `value`.
    pub fn label(&self) -> String {
        match (&self.facet, &self.name) {
            (Some(facet), Some(name)) => format!("{facet} / {name}"),
            (Some(facet), None) => facet.clone(),
            (None, Some(name)) => name.clone(),
            (None, None) => "value".into(),
        }
    }
}

/// How bars sharing an x value are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    /// Side by side.
    Group,
}

/// Layout hints for a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Logarithmic y axis.
    pub log_y: bool,
    /// Bar arrangement, for bar charts.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bar_mode: Option<BarMode>,
    /// Facet row labels, top to bottom. Empty for unfaceted charts.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub facet_rows: Vec<String>,
}
