//! Pure builders from tables to [`ChartSpec`]s.
//!
//! Traces are emitted in order of first appearance of their colour group, the
//! same order a plotting library assigns colours in. Points inside a trace are
//! sorted by date.

use chrono::NaiveDate;
use devtrack_core::{ContributorRecord, EventKind, EventRecord, SeriesPoint};
use devtrack_pulse::filter::filter_by_title_set;

use crate::spec::{BarMode, ChartKind, ChartSpec, Layout, Trace};

/// Options shared by every builder.
///
/// # Examples
///
/// ```
/// use devtrack_charts::ChartOptions;
///
/// assert!(!ChartOptions::default().log_y);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartOptions {
    /// Logarithmic y axis.
    pub log_y: bool,
}

/// Monthly contributor count, one line per project.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_charts::{line_chart, ChartKind, ChartOptions};
/// use devtrack_core::ContributorRecord;
///
/// let month = |m| NaiveDate::from_ymd_opt(2022, m, 1).unwrap();
/// let rows = vec![
///     ContributorRecord { title: "Ethereum".into(), date: month(2), contributor_count: 398 },
///     ContributorRecord { title: "Ethereum".into(), date: month(1), contributor_count: 412 },
/// ];
/// let chart = line_chart(&rows, "Monthly Developer Count", ChartOptions::default());
/// assert_eq!(chart.kind, ChartKind::Line);
/// assert_eq!(chart.traces[0].y, vec![412, 398]);
/// ```
pub fn line_chart(rows: &[ContributorRecord], title: &str, options: ChartOptions) -> ChartSpec {
    ChartSpec {
        kind: ChartKind::Line,
        title: title.to_string(),
        traces: contributor_traces(rows),
        layout: Layout {
            log_y: options.log_y,
            ..Layout::default()
        },
    }
}

/// Monthly contributor count, one filled area per project with outlines
/// removed.
pub fn area_chart(rows: &[ContributorRecord], title: &str, options: ChartOptions) -> ChartSpec {
    let traces = contributor_traces(rows)
        .into_iter()
        .map(|trace| Trace {
            line_width: Some(0.0),
            ..trace
        })
        .collect();
    ChartSpec {
        kind: ChartKind::Area,
        title: title.to_string(),
        traces,
        layout: Layout {
            log_y: options.log_y,
            ..Layout::default()
        },
    }
}

/// Monthly event counts for the projects in `filter_vals`, one facet row per
/// project and one grouped bar per event type.
///
/// `filter_vals` is matched exactly against event titles.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_charts::{faceted_bar_chart, ChartOptions};
/// use devtrack_core::{EventKind, EventRecord};
///
/// let jan = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// let rows = vec![
///     EventRecord { title: "Ethereum".into(), date: jan, kind: EventKind::Push, event_count: 1200 },
///     EventRecord { title: "Ethereum".into(), date: jan, kind: EventKind::Fork, event_count: 40 },
///     EventRecord { title: "Bitcoin".into(), date: jan, kind: EventKind::Push, event_count: 300 },
/// ];
/// let chart = faceted_bar_chart(&rows, &["Ethereum"], "Monthly GitHub Event Counts", ChartOptions::default());
/// assert_eq!(chart.layout.facet_rows, vec!["Ethereum"]);
/// assert_eq!(chart.traces.len(), 2);
/// ```
pub fn faceted_bar_chart<S: AsRef<str>>(
    rows: &[EventRecord],
    filter_vals: &[S],
    title: &str,
    options: ChartOptions,
) -> ChartSpec {
    let mut subset = filter_by_title_set(rows, filter_vals);
    subset.sort_by_key(|r| r.date);

    let mut facets: Vec<String> = Vec::new();
    let mut groups: Vec<((String, EventKind), Vec<(NaiveDate, u64)>)> = Vec::new();
    for row in &subset {
        if !facets.contains(&row.title) {
            facets.push(row.title.clone());
        }
        let key = (row.title.clone(), row.kind);
        let point = (row.date, row.event_count);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, points)) => points.push(point),
            None => groups.push((key, vec![point])),
        }
    }

    let traces = groups
        .into_iter()
        .map(|((facet, kind), points)| {
            let (x, y) = points.into_iter().unzip();
            Trace {
                name: Some(kind.to_string()),
                facet: Some(facet),
                x,
                y,
                line_width: None,
            }
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        title: title.to_string(),
        traces,
        layout: Layout {
            log_y: options.log_y,
            bar_mode: Some(BarMode::Group),
            facet_rows: facets,
        },
    }
}

/// A single aggregated series drawn as one line.
///
/// # Examples
///
/// ```
/// use devtrack_charts::{aggregate_chart, ChartOptions};
///
/// let chart = aggregate_chart(&[], "Total Monthly Developer Count", ChartOptions::default());
/// assert!(chart.is_empty());
/// ```
pub fn aggregate_chart(series: &[SeriesPoint], title: &str, options: ChartOptions) -> ChartSpec {
    let traces = if series.is_empty() {
        Vec::new()
    } else {
        vec![Trace {
            name: None,
            facet: None,
            x: series.iter().map(|p| p.date).collect(),
            y: series.iter().map(|p| p.value).collect(),
            line_width: None,
        }]
    };
    ChartSpec {
        kind: ChartKind::Line,
        title: title.to_string(),
        traces,
        layout: Layout {
            log_y: options.log_y,
            ..Layout::default()
        },
    }
}

fn contributor_traces(rows: &[ContributorRecord]) -> Vec<Trace> {
    let mut groups: Vec<(String, Vec<(NaiveDate, u64)>)> = Vec::new();
    for row in rows {
        let point = (row.date, row.contributor_count);
        match groups.iter_mut().find(|(title, _)| *title == row.title) {
            Some((_, points)) => points.push(point),
            None => groups.push((row.title.clone(), vec![point])),
        }
    }

    groups
        .into_iter()
        .map(|(title, mut points)| {
            points.sort_by_key(|(date, _)| *date);
            let (x, y) = points.into_iter().unzip();
            Trace {
                name: Some(title),
                facet: None,
                x,
                y,
                line_width: None,
            }
        })
        .collect()
}
