//! Property-based tests for selection and aggregation.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use devtrack_core::ContributorRecord;
    use proptest::prelude::*;

    use crate::aggregate::aggregate_contributors;
    use crate::filter::filter_by_projects;

    const TITLES: &[&str] = &[
        "Ethereum",
        "Ethereum Classic",
        "ethereum",
        "Bitcoin",
        "Bitcoin Cash",
        "C++ (Core)",
        "dYdX.v4",
        "Solana",
    ];

    fn record() -> impl Strategy<Value = ContributorRecord> {
        (0..TITLES.len(), 1u32..=12, 0u64..10_000).prop_map(|(t, m, count)| ContributorRecord {
            title: TITLES[t].to_string(),
            date: NaiveDate::from_ymd_opt(2022, m, 1).unwrap(),
            contributor_count: count,
        })
    }

    proptest! {
        #[test]
        fn project_filter_is_exact_case_insensitive_match(
            rows in proptest::collection::vec(record(), 0..40),
            picks in proptest::collection::vec(0..TITLES.len(), 1..4),
        ) {
            let selected: Vec<&str> = picks.iter().map(|&i| TITLES[i]).collect();
            let picked = filter_by_projects(&rows, &selected).unwrap();

            let expected: Vec<&ContributorRecord> = rows
                .iter()
                .filter(|r| selected.iter().any(|s| s.to_lowercase() == r.title.to_lowercase()))
                .collect();
            prop_assert_eq!(picked.len(), expected.len());
            for (got, want) in picked.iter().zip(expected) {
                prop_assert_eq!(got, want);
            }
        }

        #[test]
        fn aggregate_dates_ascend_and_sums_match(
            rows in proptest::collection::vec(record(), 0..60),
        ) {
            let series = aggregate_contributors(&rows);

            for pair in series.windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }

            let mut expected: HashMap<NaiveDate, u64> = HashMap::new();
            for r in &rows {
                *expected.entry(r.date).or_default() += r.contributor_count;
            }
            prop_assert_eq!(series.len(), expected.len());
            for point in &series {
                prop_assert_eq!(Some(&point.value), expected.get(&point.date));
            }
        }
    }
}
