//! Per-month aggregation across projects.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use devtrack_core::{ContributorRecord, Dated, SeriesPoint};

/// Sum `value` per date over `rows`, ordered by date ascending.
///
/// Only dates present in `rows` appear in the output; months with no rows are
/// not zero-filled. Sums saturate at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_core::EventRecord;
/// use devtrack_core::EventKind;
/// use devtrack_pulse::aggregate::aggregate;
///
/// let jan = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// let rows = vec![
///     EventRecord { title: "A".into(), date: jan, kind: EventKind::Push, event_count: 10 },
///     EventRecord { title: "B".into(), date: jan, kind: EventKind::Fork, event_count: 2 },
/// ];
/// let series = aggregate(&rows, |r| r.event_count);
/// assert_eq!(series.len(), 1);
/// assert_eq!(series[0].value, 12);
/// ```
pub fn aggregate<T, F>(rows: &[T], value: F) -> Vec<SeriesPoint>
where
    T: Dated,
    F: Fn(&T) -> u64,
{
    let mut sums: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for row in rows {
        let sum = sums.entry(row.date()).or_default();
        *sum = sum.saturating_add(value(row));
    }
    sums.into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

/// Total monthly contributor count across all `rows`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_core::ContributorRecord;
/// use devtrack_pulse::aggregate::aggregate_contributors;
///
/// let jan = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// let rows = vec![
///     ContributorRecord { title: "A".into(), date: jan, contributor_count: 5 },
///     ContributorRecord { title: "A".into(), date: jan, contributor_count: 3 },
///     ContributorRecord { title: "B".into(), date: jan, contributor_count: 2 },
/// ];
/// let series = aggregate_contributors(&rows);
/// assert_eq!(series.len(), 1);
/// assert_eq!(series[0].value, 10);
/// ```
pub fn aggregate_contributors(rows: &[ContributorRecord]) -> Vec<SeriesPoint> {
    aggregate(rows, |r| r.contributor_count)
}
