//! Tag extraction from the metadata table's free-text tag column.

use std::collections::BTreeSet;

/// Extract the distinct tags from a column of comma-delimited tag fields.
///
/// Each `Some` field is split on `,`, every piece is trimmed, empty pieces
/// are dropped, and the remainder is deduplicated and sorted ascending
/// (codepoint order). A `None` field contributes no tags. Case is preserved;
/// see [`normalize_tags`] for the upper-cased selector form.
///
/// # Examples
///
/// ```
/// use devtrack_data::tags::extract_tags;
///
/// let column = [Some("DeFi, NFT"), Some(""), None, Some("NFT ,Gaming,")];
/// assert_eq!(extract_tags(column), vec!["DeFi", "Gaming", "NFT"]);
/// ```
pub fn extract_tags<'a, I>(column: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let set: BTreeSet<&str> = column
        .into_iter()
        .flatten()
        .flat_map(|field| field.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect();
    set.into_iter().map(String::from).collect()
}

/// Upper-case, deduplicate and sort a tag listing.
///
/// Deduplication runs after case folding, so `DeFi` and `DEFI` collapse into
/// one entry.
///
/// # Examples
///
/// ```
/// use devtrack_data::tags::normalize_tags;
///
/// let tags = vec!["DeFi".to_string(), "DEFI".into(), "nft".into()];
/// assert_eq!(normalize_tags(tags), vec!["DEFI", "NFT"]);
/// ```
pub fn normalize_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let set: BTreeSet<String> = tags.into_iter().map(|t| t.to_uppercase()).collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_from_mixed_rows() {
        let column = [Some("DeFi, NFT"), Some("")];
        let tags = extract_tags(column);
        assert_eq!(tags, vec!["DeFi", "NFT"]);
        assert_eq!(normalize_tags(tags), vec!["DEFI", "NFT"]);
    }

    #[test]
    fn missing_fields_contribute_nothing() {
        let column: [Option<&str>; 3] = [None, None, Some("Layer 1")];
        assert_eq!(extract_tags(column), vec!["Layer 1"]);
        assert!(extract_tags([None, None]).is_empty());
    }

    #[test]
    fn no_none_token_is_invented() {
        let tags = normalize_tags(extract_tags([None, Some("DAO")]));
        assert!(!tags.iter().any(|t| t == "NONE"));
    }

    #[test]
    fn whitespace_only_pieces_are_dropped() {
        let column = [Some(" , ,\t,"), Some("  Oracle  ")];
        assert_eq!(extract_tags(column), vec!["Oracle"]);
    }

    #[test]
    fn sort_is_codepoint_order() {
        let column = [Some("b, B, a, A")];
        assert_eq!(extract_tags(column), vec!["A", "B", "a", "b"]);
    }

    proptest! {
        #[test]
        fn extracted_tags_are_trimmed_and_non_empty(
            fields in proptest::collection::vec(proptest::option::of("[ a-zA-Z,]{0,24}"), 0..12)
        ) {
            let column = fields.iter().map(|f| f.as_deref());
            for tag in extract_tags(column) {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
            }
        }

        #[test]
        fn extraction_is_idempotent(
            fields in proptest::collection::vec(proptest::option::of("[ a-zA-Z,]{0,24}"), 0..12)
        ) {
            let first = extract_tags(fields.iter().map(|f| f.as_deref()));
            let second = extract_tags(fields.iter().map(|f| f.as_deref()));
            prop_assert_eq!(&first, &second);

            let mut resorted = first.clone();
            resorted.sort();
            resorted.dedup();
            prop_assert_eq!(first, resorted);
        }
    }
}
