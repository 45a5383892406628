use std::collections::BTreeSet;

use tracing::debug;

/// Selector meaning "every category of the project".
pub const ALL_CATEGORIES: i64 = 0;

/// Turns a selector list into the category ids to generate, ascending.
///
/// `0` pulls in every available id, `-k` excludes `k` even when `k` is also
/// requested, and ids missing from `available` are dropped silently.
pub fn resolve_category_ids(selectors: &[i64], available: &BTreeSet<i64>) -> Vec<i64> {
    let mut wanted: BTreeSet<i64> = selectors.iter().copied().collect();
    if wanted.contains(&ALL_CATEGORIES) {
        wanted.extend(available.iter().copied());
    }
    let excluded: BTreeSet<i64> = selectors
        .iter()
        .filter(|id| **id < 0)
        .map(|id| id.abs())
        .collect();

    let resolved: Vec<i64> = wanted
        .into_iter()
        .filter(|id| !excluded.contains(&id.abs()))
        .filter(|id| available.contains(id))
        .collect();

    debug!(?selectors, ?resolved, "Resolved category selectors");
    resolved
}
