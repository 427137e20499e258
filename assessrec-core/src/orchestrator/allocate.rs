//! Category-balanced selection from a fused candidate pool.
//!
//! The allocator never rescores. It walks the fused list twice:
//!
//! 1. **Quota pass**: accept candidates of each required category until that
//!    category holds `floor(top_k / |categories|)` slots.
//! 2. **Backfill pass**: fill any remaining slots with the best candidates not
//!    yet accepted, regardless of category.
//!
//! Slots lost to integer division are absorbed by the backfill pass.

use std::collections::{HashMap, HashSet};

use crate::types::{Category, FusedCandidate, RequiredCategories};

/// Per-category slot count for the quota pass.
///
/// Returns `None` when there are no required categories.
pub fn quota(top_k: usize, categories: &RequiredCategories) -> Option<usize> {
    if categories.is_empty() {
        None
    } else {
        Some(top_k / categories.len())
    }
}

/// Select at most `top_k` candidates from `fused`, balancing `categories`.
///
/// With an empty category set the first `top_k` fused candidates are
/// returned unchanged. The result never contains an item twice and holds
/// `min(top_k, |fused|)` items whenever `fused` has no duplicates.
pub fn allocate<'a>(
    fused: &[FusedCandidate<'a>],
    categories: &RequiredCategories,
    top_k: usize,
) -> Vec<FusedCandidate<'a>> {
    if top_k == 0 || fused.is_empty() {
        return Vec::new();
    }
    let Some(quota) = quota(top_k, categories) else {
        return fused.iter().take(top_k).copied().collect();
    };

    let mut selected: Vec<FusedCandidate<'a>> = Vec::with_capacity(top_k.min(fused.len()));
    let mut accepted: HashSet<&'a str> = HashSet::with_capacity(top_k);
    let mut counts: HashMap<Category, usize> = categories.iter().map(|c| (*c, 0)).collect();

    for candidate in fused {
        if selected.len() >= top_k {
            break;
        }
        let Some(count) = counts.get_mut(&candidate.category()) else {
            continue;
        };
        if *count < quota && accepted.insert(candidate.item.url.as_str()) {
            *count += 1;
            selected.push(*candidate);
        }
    }

    let by_quota = selected.len();

    for candidate in fused {
        if selected.len() >= top_k {
            break;
        }
        if accepted.insert(candidate.item.url.as_str()) {
            selected.push(*candidate);
        }
    }

    tracing::trace!(
        top_k,
        quota,
        by_quota,
        backfilled = selected.len() - by_quota,
        "allocated result slots"
    );

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CatalogItem;

    fn item(url: &str, category: Category) -> CatalogItem {
        CatalogItem {
            url: url.into(),
            name: url.into(),
            description: String::new(),
            category,
            section: String::new(),
            duration: None,
            skills: vec![],
            search_text: String::new(),
        }
    }

    fn fused_from(items: &[CatalogItem]) -> Vec<FusedCandidate<'_>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| FusedCandidate {
                item,
                score: 1.0 - i as f64 * 0.01,
            })
            .collect()
    }

    fn urls<'a>(selected: &'a [FusedCandidate<'a>]) -> Vec<&'a str> {
        selected.iter().map(|c| c.item.url.as_str()).collect()
    }

    use Category::{Cognitive as C, Knowledge as K, Personality as P};

    #[test]
    fn quota_fills_each_category_in_fused_order() {
        let items = vec![
            item("a", K),
            item("b", P),
            item("c", K),
            item("d", K),
            item("e", P),
        ];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K, P]), 4);
        assert_eq!(urls(&selected), vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn missing_category_slot_is_backfilled() {
        let items = vec![
            item("k1", K),
            item("k2", K),
            item("p1", P),
            item("k3", K),
        ];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K, P, C]), 3);
        // quota = 1: k1 and p1 by quota, then k2 as the best unaccepted item.
        assert_eq!(urls(&selected), vec!["k1", "p1", "k2"]);
    }

    #[test]
    fn empty_categories_pass_through() {
        let items = vec![item("a", P), item("b", K), item("c", C)];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::default(), 2);
        assert_eq!(urls(&selected), vec!["a", "b"]);
    }

    #[test]
    fn zero_top_k_returns_empty() {
        let items = vec![item("a", K)];
        let fused = fused_from(&items);
        assert!(allocate(&fused, &RequiredCategories::fallback(), 0).is_empty());
    }

    #[test]
    fn empty_pool_returns_empty() {
        assert!(allocate(&[], &RequiredCategories::fallback(), 5).is_empty());
    }

    #[test]
    fn under_fill_when_pool_is_small() {
        let items = vec![item("a", K), item("b", C)];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K, P]), 10);
        assert_eq!(urls(&selected), vec!["a", "b"]);
    }

    #[test]
    fn quota_of_zero_backfills_everything() {
        // top_k smaller than the category count: quota = 0.
        let items = vec![item("c", C), item("k", K), item("p", P)];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K, P, C]), 2);
        assert_eq!(urls(&selected), vec!["c", "k"]);
    }

    #[test]
    fn non_required_categories_only_enter_through_backfill() {
        let items = vec![
            item("c1", C),
            item("c2", C),
            item("k1", K),
            item("c3", C),
            item("k2", K),
        ];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K]), 3);
        assert_eq!(urls(&selected), vec!["k1", "k2", "c1"]);
    }

    #[test]
    fn scores_are_carried_unchanged() {
        let items = vec![item("a", P), item("b", K)];
        let fused = fused_from(&items);
        let selected = allocate(&fused, &RequiredCategories::new([K, P]), 2);
        assert_eq!(urls(&selected), vec!["a", "b"]);
        assert!((selected[0].score - fused[0].score).abs() < f64::EPSILON);
        assert!((selected[1].score - fused[1].score).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_pool_entries_selected_once() {
        let items = vec![item("a", K), item("b", P)];
        let mut fused = fused_from(&items);
        fused.push(fused[0]);
        let selected = allocate(&fused, &RequiredCategories::new([K, P]), 4);
        assert_eq!(urls(&selected), vec!["a", "b"]);
    }

    #[test]
    fn quota_helper() {
        assert_eq!(quota(10, &RequiredCategories::new([K, P, C])), Some(3));
        assert_eq!(quota(10, &RequiredCategories::default()), None);
        assert_eq!(quota(1, &RequiredCategories::new([K, P])), Some(0));
    }
}
