//! The output of one render pass.

use std::fmt;

use devtrack_charts::ChartSpec;
use devtrack_core::{ContributorRecord, EventRecord, SeriesPoint};
use serde::Serialize;

use crate::context::Selection;

/// The four charts of the dashboard, top to bottom.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    /// Contributor count per selected project.
    pub contributors: ChartSpec,
    /// Event counts faceted by selected project.
    pub events: ChartSpec,
    /// Total contributor count across tagged projects.
    pub tagged_total: ChartSpec,
    /// Contributor count per tagged project, stacked.
    pub tagged_area: ChartSpec,
}

impl DashboardCharts {
    /// Charts in page order.
    pub fn iter(&self) -> impl Iterator<Item = &ChartSpec> {
        [
            &self.contributors,
            &self.events,
            &self.tagged_total,
            &self.tagged_area,
        ]
        .into_iter()
    }
}

/// Filtered tables, the aggregate series, and the charts built from them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// The selection this pass rendered.
    pub selection: Selection,
    /// Contributor rows of the selected projects.
    pub project_contributors: Vec<ContributorRecord>,
    /// Event rows of the selected projects, by date.
    pub project_events: Vec<EventRecord>,
    /// Titles of projects matching any selected tag, in metadata order.
    pub tagged_projects: Vec<String>,
    /// Contributor rows of the tagged projects.
    pub tagged_contributors: Vec<ContributorRecord>,
    /// Monthly contributor totals across the tagged projects.
    pub tagged_total: Vec<SeriesPoint>,
    /// The four charts built from the tables above.
    pub charts: DashboardCharts,
}

fn listing(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Projects: {}", listing(&self.selection.projects))?;
        writeln!(f)?;
        writeln!(f, "{}", self.charts.contributors)?;
        writeln!(f, "{}", self.charts.events)?;

        writeln!(
            f,
            "Tags: {} ({} projects)",
            listing(&self.selection.tags),
            self.tagged_projects.len()
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.charts.tagged_total)?;
        write!(f, "{}", self.charts.tagged_area)
    }
}

impl DashboardView {
    /// Render the whole dashboard as a Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Crypto Developer Tracker\n\n");

        out.push_str("## Projects\n\n");
        out.push_str(&format!(
            "**Selected:** {}\n\n",
            listing(&self.selection.projects)
        ));
        out.push_str(&self.charts.contributors.to_markdown());
        out.push('\n');
        out.push_str(&self.charts.events.to_markdown());
        out.push('\n');

        out.push_str("## Tags\n\n");
        out.push_str(&format!(
            "**Selected:** {}\n\n",
            listing(&self.selection.tags)
        ));
        if !self.tagged_projects.is_empty() {
            out.push_str(&format!(
                "**Matching projects ({}):** {}\n\n",
                self.tagged_projects.len(),
                self.tagged_projects.join(", ")
            ));
        }
        out.push_str(&self.charts.tagged_total.to_markdown());
        out.push('\n');
        out.push_str(&self.charts.tagged_area.to_markdown());
        out
    }
}
