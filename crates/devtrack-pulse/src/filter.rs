//! Row selection by project title and by tag.
//!
//! Selections are compiled into case-insensitive regex alternations. Every
//! alternative is escaped with [`regex::escape`], so titles such as
//! `C++ (Core)` match literally. An empty selection compiles to no pattern
//! and selects nothing.

use std::collections::HashSet;

use devtrack_core::{DevtrackError, ProjectMeta, TagMatch, Titled};
use regex::{Regex, RegexBuilder};

/// Build the exact-title pattern for a project selection.
///
/// Each title becomes an anchored alternative (`^title$`); matching ignores
/// case. Returns `Ok(None)` for an empty selection.
///
/// # Errors
///
/// Returns [`DevtrackError::Pattern`] if the alternation exceeds the regex
/// size limit.
///
/// # Examples
///
/// ```
/// use devtrack_pulse::filter::project_pattern;
///
/// let pat = project_pattern(&["Ethereum", "C++ (Core)"]).unwrap().unwrap();
/// assert!(pat.is_match("ethereum"));
/// assert!(pat.is_match("C++ (Core)"));
/// assert!(!pat.is_match("Ethereum Classic"));
///
/// assert!(project_pattern::<&str>(&[]).unwrap().is_none());
/// ```
pub fn project_pattern<S: AsRef<str>>(titles: &[S]) -> Result<Option<Regex>, DevtrackError> {
    if titles.is_empty() {
        return Ok(None);
    }
    let alternation = titles
        .iter()
        .map(|t| format!("^{}$", regex::escape(t.as_ref())))
        .collect::<Vec<_>>()
        .join("|");
    compile(&alternation).map(Some)
}

/// Build the tag pattern for a tag selection.
///
/// With [`TagMatch::Substring`] the alternatives are unanchored, so `DEFI`
/// also matches `GAMEDEFI`. [`TagMatch::Word`] anchors the alternation to one
/// comma-separated piece of the tag field, surrounding whitespace allowed, so
/// tags that begin or end with punctuation still match. Blank tags are
/// ignored; returns `Ok(None)` when nothing is left.
///
/// # Errors
///
/// Returns [`DevtrackError::Pattern`] if the alternation exceeds the regex
/// size limit.
///
/// # Examples
///
/// ```
/// use devtrack_core::TagMatch;
/// use devtrack_pulse::filter::tag_pattern;
///
/// let substring = tag_pattern(&["DEFI"], TagMatch::Substring).unwrap().unwrap();
/// assert!(substring.is_match("GameDeFi, NFT"));
///
/// let word = tag_pattern(&["DEFI"], TagMatch::Word).unwrap().unwrap();
/// assert!(!word.is_match("GameDeFi, NFT"));
/// assert!(word.is_match("Gaming, DeFi"));
/// assert!(!word.is_match("DeFi Lending"));
/// ```
pub fn tag_pattern<S: AsRef<str>>(
    tags: &[S],
    mode: TagMatch,
) -> Result<Option<Regex>, DevtrackError> {
    let alternatives: Vec<String> = tags
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    let alternation = alternatives.join("|");
    let pattern = match mode {
        TagMatch::Substring => alternation,
        TagMatch::Word => format!(r"(?:^|,)\s*(?:{alternation})\s*(?:,|$)"),
    };
    compile(&pattern).map(Some)
}

/// Select the rows whose title case-insensitively equals one of `titles`.
///
/// Returns a new vector; `rows` is untouched. An empty selection yields an
/// empty result.
///
/// # Errors
///
/// Propagates [`project_pattern`] errors.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_core::ContributorRecord;
/// use devtrack_pulse::filter::filter_by_projects;
///
/// let date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// let rows = vec![
///     ContributorRecord { title: "Ethereum".into(), date, contributor_count: 400 },
///     ContributorRecord { title: "Ethereum Classic".into(), date, contributor_count: 12 },
/// ];
/// let picked = filter_by_projects(&rows, &["ethereum"]).unwrap();
/// assert_eq!(picked.len(), 1);
/// assert_eq!(picked[0].title, "Ethereum");
/// ```
pub fn filter_by_projects<T, S>(rows: &[T], titles: &[S]) -> Result<Vec<T>, DevtrackError>
where
    T: Titled + Clone,
    S: AsRef<str>,
{
    let Some(pattern) = project_pattern(titles)? else {
        return Ok(Vec::new());
    };
    let picked: Vec<T> = rows
        .iter()
        .filter(|row| pattern.is_match(row.title()))
        .cloned()
        .collect();
    tracing::debug!(
        selected = titles.len(),
        rows = picked.len(),
        "filtered rows by project"
    );
    Ok(picked)
}

/// Return the titles of metadata rows whose tag field matches any selected
/// tag, in metadata order.
///
/// Rows without tags never match. An empty selection yields an empty result.
///
/// # Errors
///
/// Propagates [`tag_pattern`] errors.
///
/// # Examples
///
/// ```
/// use devtrack_core::{ProjectMeta, TagMatch};
/// use devtrack_pulse::filter::filter_by_tags;
///
/// let meta = vec![
///     ProjectMeta { title: "Aave".into(), tags: Some("DeFi, Lending".into()) },
///     ProjectMeta { title: "Axie".into(), tags: Some("GameDeFi".into()) },
///     ProjectMeta { title: "Bitcoin".into(), tags: None },
/// ];
/// let titles = filter_by_tags(&meta, &["DEFI"], TagMatch::Substring).unwrap();
/// assert_eq!(titles, vec!["Aave", "Axie"]);
/// ```
pub fn filter_by_tags<S: AsRef<str>>(
    metadata: &[ProjectMeta],
    tags: &[S],
    mode: TagMatch,
) -> Result<Vec<String>, DevtrackError> {
    let Some(pattern) = tag_pattern(tags, mode)? else {
        return Ok(Vec::new());
    };
    let titles: Vec<String> = metadata
        .iter()
        .filter(|row| row.tags.as_deref().is_some_and(|t| pattern.is_match(t)))
        .map(|row| row.title.clone())
        .collect();
    tracing::debug!(
        selected = tags.len(),
        projects = titles.len(),
        ?mode,
        "filtered projects by tag"
    );
    Ok(titles)
}

/// Select the rows whose title is exactly (case-sensitively) one of
/// `titles`.
///
/// Used where the selection already holds canonical titles, such as the
/// output of [`filter_by_tags`].
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use devtrack_core::ContributorRecord;
/// use devtrack_pulse::filter::filter_by_title_set;
///
/// let date = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// let rows = vec![
///     ContributorRecord { title: "Aave".into(), date, contributor_count: 30 },
///     ContributorRecord { title: "aave".into(), date, contributor_count: 1 },
/// ];
/// let picked = filter_by_title_set(&rows, &["Aave"]);
/// assert_eq!(picked.len(), 1);
/// ```
pub fn filter_by_title_set<T, S>(rows: &[T], titles: &[S]) -> Vec<T>
where
    T: Titled + Clone,
    S: AsRef<str>,
{
    let wanted: HashSet<&str> = titles.iter().map(|t| t.as_ref()).collect();
    rows.iter()
        .filter(|row| wanted.contains(row.title()))
        .cloned()
        .collect()
}

fn compile(pattern: &str) -> Result<Regex, DevtrackError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| DevtrackError::Pattern(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use devtrack_core::{ContributorRecord, EventKind, EventRecord};

    fn contrib(title: &str, count: u64) -> ContributorRecord {
        ContributorRecord {
            title: title.into(),
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            contributor_count: count,
        }
    }

    fn meta(title: &str, tags: Option<&str>) -> ProjectMeta {
        ProjectMeta {
            title: title.into(),
            tags: tags.map(String::from),
        }
    }

    #[test]
    fn anchored_match_excludes_longer_titles() {
        let rows = vec![
            contrib("Ethereum", 400),
            contrib("Ethereum Classic", 12),
            contrib("Not Ethereum", 1),
        ];
        let picked = filter_by_projects(&rows, &["Ethereum"]).unwrap();
        let titles: Vec<&str> = picked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Ethereum"]);
    }

    #[test]
    fn project_match_ignores_case() {
        let rows = vec![contrib("Polkadot", 90), contrib("Solana", 80)];
        let picked = filter_by_projects(&rows, &["POLKADOT", "solana"]).unwrap();
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn empty_project_selection_selects_nothing() {
        let rows = vec![contrib("Ethereum", 400)];
        let picked = filter_by_projects::<_, &str>(&rows, &[]).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn metacharacters_in_titles_are_literal() {
        let rows = vec![
            contrib("C++ (Core)", 5),
            contrib("CCC (Core)", 6),
            contrib("dYdX.v4", 7),
            contrib("dYdXav4", 8),
        ];
        let picked = filter_by_projects(&rows, &["C++ (Core)", "dYdX.v4"]).unwrap();
        let titles: Vec<&str> = picked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["C++ (Core)", "dYdX.v4"]);
    }

    #[test]
    fn project_filter_leaves_input_untouched() {
        let rows = vec![contrib("Ethereum", 400), contrib("Bitcoin", 60)];
        let before = rows.clone();
        let _ = filter_by_projects(&rows, &["Bitcoin"]).unwrap();
        assert_eq!(rows, before);
    }

    #[test]
    fn project_filter_works_on_event_rows() {
        let rows = vec![EventRecord {
            title: "Cosmos".into(),
            date: NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
            kind: EventKind::Fork,
            event_count: 4,
        }];
        assert_eq!(filter_by_projects(&rows, &["cosmos"]).unwrap().len(), 1);
    }

    #[test]
    fn tag_substring_over_matches_by_default() {
        let rows = vec![
            meta("Axie Infinity", Some("GAMEDEFI")),
            meta("Aave", Some("DeFi, Lending")),
            meta("Bitcoin", Some("Layer 1")),
        ];
        let titles = filter_by_tags(&rows, &["DEFI"], TagMatch::Substring).unwrap();
        assert_eq!(titles, vec!["Axie Infinity", "Aave"]);
    }

    #[test]
    fn tag_word_mode_requires_whole_words() {
        let rows = vec![
            meta("Axie Infinity", Some("GAMEDEFI")),
            meta("Aave", Some("DeFi, Lending")),
        ];
        let titles = filter_by_tags(&rows, &["DEFI"], TagMatch::Word).unwrap();
        assert_eq!(titles, vec!["Aave"]);
    }

    #[test]
    fn tag_word_mode_matches_punctuated_tags() {
        let rows = vec![
            meta("Relay", Some("Layer-2 (ZK)")),
            meta("Bridge", Some("Bridges,  Layer-2 (ZK) ")),
            meta("Other", Some("Layer-2 (ZK) Rollup")),
        ];
        let titles = filter_by_tags(&rows, &["LAYER-2 (ZK)"], TagMatch::Word).unwrap();
        assert_eq!(titles, vec!["Relay", "Bridge"]);
    }

    #[test]
    fn tag_alternation_matches_any() {
        let rows = vec![
            meta("Aave", Some("DeFi")),
            meta("OpenSea", Some("NFT, Marketplace")),
            meta("Bitcoin", Some("Layer 1")),
        ];
        let titles = filter_by_tags(&rows, &["NFT", "DEFI"], TagMatch::Substring).unwrap();
        assert_eq!(titles, vec!["Aave", "OpenSea"]);
    }

    #[test]
    fn untagged_rows_never_match() {
        let rows = vec![meta("Mystery", None)];
        let titles = filter_by_tags(&rows, &["NONE"], TagMatch::Substring).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn empty_or_blank_tag_selection_selects_nothing() {
        let rows = vec![meta("Aave", Some("DeFi"))];
        assert!(filter_by_tags::<&str>(&rows, &[], TagMatch::Substring)
            .unwrap()
            .is_empty());
        assert!(filter_by_tags(&rows, &["", "  "], TagMatch::Substring)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn tag_metacharacters_are_literal() {
        let rows = vec![meta("Relay", Some("Layer-2 (ZK)")), meta("Other", Some("Layer-22 ZK"))];
        let titles = filter_by_tags(&rows, &["LAYER-2 (ZK)"], TagMatch::Substring).unwrap();
        assert_eq!(titles, vec!["Relay"]);
    }

    #[test]
    fn title_set_is_case_sensitive_and_exact() {
        let rows = vec![contrib("Aave", 30), contrib("aave", 1), contrib("Aave V3", 2)];
        let picked = filter_by_title_set(&rows, &["Aave".to_string()]);
        assert_eq!(picked, vec![contrib("Aave", 30)]);
        assert!(filter_by_title_set::<_, String>(&rows, &[]).is_empty());
    }
}
