//! Tabular rendering of chart specs: one row per month, one column per trace.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use crate::spec::ChartSpec;

const EMPTY_CELL: &str = "-";

struct Pivot {
    columns: Vec<String>,
    rows: Vec<(NaiveDate, Vec<Option<u64>>)>,
}

impl Pivot {
    fn from_chart(chart: &ChartSpec) -> Self {
        let traces: Vec<_> = chart.traces.iter().filter(|t| !t.x.is_empty()).collect();
        let dates: BTreeSet<NaiveDate> = traces.iter().flat_map(|t| t.x.iter().copied()).collect();

        let lookups: Vec<BTreeMap<NaiveDate, u64>> = traces
            .iter()
            .map(|t| {
                let mut by_date = BTreeMap::new();
                for (date, value) in t.x.iter().zip(&t.y) {
                    let cell: &mut u64 = by_date.entry(*date).or_default();
                    *cell = cell.saturating_add(*value);
                }
                by_date
            })
            .collect();

        let rows = dates
            .into_iter()
            .map(|date| {
                let cells: Vec<Option<u64>> = lookups.iter().map(|l| l.get(&date).copied()).collect();
                (date, cells)
            })
            .collect();

        Self {
            columns: traces.iter().map(|t| t.label()).collect(),
            rows,
        }
    }
}

fn cell(value: Option<u64>) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), |v| v.to_string())
}

impl fmt::Display for ChartSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count().max(3)))?;

        if self.is_empty() {
            return writeln!(f, "(no data for this selection)");
        }
        if self.layout.log_y {
            writeln!(f, "(log scale)")?;
        }

        let pivot = Pivot::from_chart(self);
        let widths: Vec<usize> = pivot
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                pivot
                    .rows
                    .iter()
                    .map(|(_, cells)| cell(cells[i]).len())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(1)
            })
            .collect();

        write!(f, "{:<10}", "Date")?;
        for (name, &width) in pivot.columns.iter().zip(&widths) {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;
        write!(f, "{}", "-".repeat(10))?;
        for width in &widths {
            write!(f, "  {}", "-".repeat(*width))?;
        }
        writeln!(f)?;

        for (date, cells) in &pivot.rows {
            write!(f, "{date:<10}")?;
            for (value, &width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell(*value))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl ChartSpec {
    /// Render the chart as a Markdown section with a pivot table.
    ///
    /// # Examples
    ///
    /// ```
    /// use devtrack_charts::{aggregate_chart, ChartOptions};
    ///
    /// let md = aggregate_chart(&[], "Total", ChartOptions::default()).to_markdown();
    /// assert!(md.starts_with("### Total"));
    /// assert!(md.contains("No data"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = format!("### {}\n\n", self.title);
        if self.is_empty() {
            out.push_str("_No data for this selection._\n");
            return out;
        }
        if self.layout.log_y {
            out.push_str("_Log scale._\n\n");
        }

        let pivot = Pivot::from_chart(self);
        out.push_str("| Date |");
        for name in &pivot.columns {
            out.push_str(&format!(" {} |", name.replace('|', "\\|")));
        }
        out.push_str("\n|------|");
        for _ in &pivot.columns {
            out.push_str("---:|");
        }
        out.push('\n');

        for (date, cells) in &pivot.rows {
            out.push_str(&format!("| {date} |"));
            for value in cells {
                out.push_str(&format!(" {} |", cell(*value)));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::builders::{line_chart, ChartOptions};
    use crate::spec::{ChartKind, ChartSpec, Layout, Trace};
    use chrono::NaiveDate;
    use devtrack_core::ContributorRecord;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, 1).unwrap()
    }

    fn sample() -> ChartSpec {
        let rows = vec![
            ContributorRecord {
                title: "Ethereum".into(),
                date: month(1),
                contributor_count: 412,
            },
            ContributorRecord {
                title: "Ethereum".into(),
                date: month(2),
                contributor_count: 398,
            },
            ContributorRecord {
                title: "Bitcoin".into(),
                date: month(2),
                contributor_count: 61,
            },
        ];
        line_chart(&rows, "Monthly Developer Count", ChartOptions::default())
    }

    #[test]
    fn text_table_has_one_row_per_month() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Monthly Developer Count");
        assert!(lines[2].starts_with("Date"));
        assert!(lines[2].contains("Ethereum"));
        assert!(lines[2].contains("Bitcoin"));
        assert!(lines[4].starts_with("2022-01-01"));
        assert!(lines[4].contains("412"));
        assert!(lines[4].trim_end().ends_with('-'));
        assert!(lines[5].starts_with("2022-02-01"));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let chart = ChartSpec {
            kind: ChartKind::Line,
            title: "Nothing".into(),
            traces: vec![],
            layout: Layout::default(),
        };
        assert!(chart.to_string().contains("(no data for this selection)"));
        assert!(chart.to_markdown().contains("_No data for this selection._"));
    }

    #[test]
    fn markdown_table_shape() {
        let md = sample().to_markdown();
        assert!(md.starts_with("### Monthly Developer Count\n\n"));
        assert!(md.contains("| Date | Ethereum | Bitcoin |"));
        assert!(md.contains("| 2022-01-01 | 412 | - |"));
        assert!(md.contains("| 2022-02-01 | 398 | 61 |"));
    }

    #[test]
    fn duplicate_dates_in_a_trace_are_summed() {
        let chart = ChartSpec {
            kind: ChartKind::Bar,
            title: "dup".into(),
            traces: vec![Trace {
                name: Some("PushEvent".into()),
                facet: None,
                x: vec![month(1), month(1)],
                y: vec![2, 3],
                line_width: None,
            }],
            layout: Layout::default(),
        };
        assert!(chart.to_markdown().contains("| 2022-01-01 | 5 |"));
    }
}
