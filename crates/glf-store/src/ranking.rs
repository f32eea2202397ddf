//! Hashtag frequency ranking.

use std::collections::HashMap;

use glf_types::TokenRecord;

/// Rank every distinct hashtag by descending number of occurrences.
///
/// Records are scanned in the given order (newest-first for a collection).
/// Tags with equal counts keep the order in which they were first seen.
pub fn rank_hashtags<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TokenRecord>,
{
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for record in records {
        for tag in &record.hashtags {
            match position.get(tag.as_str()) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    position.insert(tag.as_str(), counts.len());
                    counts.push((tag.as_str(), 1));
                }
            }
        }
    }

    // `sort_by` is stable, so first-seen order survives among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(tag, _)| tag.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use glf_types::{NewToken, TokenId};
    use proptest::prelude::*;

    fn record(id: u64, tags: &[&str]) -> TokenRecord {
        let mut new = NewToken::new(TokenId::new(id));
        new.hashtags = tags.iter().map(|t| t.to_string()).collect();
        new.into_record(Utc::now())
    }

    #[test]
    fn empty_collection_has_no_tags() {
        assert!(rank_hashtags(&Vec::<TokenRecord>::new()).is_empty());
    }

    #[test]
    fn higher_count_ranks_first() {
        // Newest first: ["sun"] was added after ["sun", "art"].
        let records = vec![record(2, &["sun"]), record(1, &["sun", "art"])];
        assert_eq!(rank_hashtags(&records), vec!["sun", "art"]);
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        let records = vec![record(1, &["art", "new"])];
        assert_eq!(rank_hashtags(&records), vec!["art", "new"]);

        let records = vec![record(2, &["b"]), record(1, &["a", "c", "a2"]), record(0, &["a"])];
        assert_eq!(rank_hashtags(&records), vec!["a", "b", "c", "a2"]);
    }

    proptest! {
        #[test]
        fn ranking_is_distinct_and_descending(
            tag_sets in proptest::collection::vec(
                proptest::collection::btree_set("[a-e]", 0..4), 0..12)
        ) {
            let records: Vec<TokenRecord> = tag_sets
                .iter()
                .enumerate()
                .map(|(i, set)| {
                    let tags: Vec<&str> = set.iter().map(String::as_str).collect();
                    record(i as u64, &tags)
                })
                .collect();

            let ranking = rank_hashtags(&records);

            let mut expected: Vec<&String> = tag_sets.iter().flatten().collect();
            expected.sort();
            expected.dedup();
            let mut got: Vec<&String> = ranking.iter().collect();
            got.sort();
            prop_assert_eq!(got, expected);

            let count = |tag: &str| records.iter().filter(|r| r.hashtags.iter().any(|t| t == tag)).count();
            for pair in ranking.windows(2) {
                prop_assert!(count(&pair[0]) >= count(&pair[1]));
            }
        }
    }
}
