use std::collections::BTreeSet;

use super::{VocabGroup, MAX_VOCAB_GROUPS};

/// Derives the vocab groups for one generation cycle from the distinct
/// chapters present in the store: the 5 most recent distinct chapters become
/// cumulative windows `1..=chapter`, ordered ascending by endpoint with ids
/// assigned 1..N in that order. An empty chapter set yields no groups.
pub fn build_groups(chapters: &[i32]) -> Vec<VocabGroup> {
    let distinct: BTreeSet<i32> = chapters.iter().copied().collect();

    let mut recent: Vec<i32> = distinct.into_iter().rev().take(MAX_VOCAB_GROUPS).collect();
    recent.reverse();

    recent
        .into_iter()
        .enumerate()
        .map(|(rank, chapter)| VocabGroup {
            id: rank as i32 + 1,
            chapter_start: 1,
            chapter_endpoint: chapter,
        })
        .collect()
}
