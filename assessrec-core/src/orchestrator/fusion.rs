//! Weighted score fusion of semantic and lexical candidate lists.
//!
//! Lexical scores are divided by the batch maximum so they land in `[0, 1]`;
//! semantic scores are already bounded and are used as-is.
//!
//! ```text
//! fused = semantic_weight * semantic + lexical_weight * (lexical / max_lexical)
//! ```
//!
//! An item missing from one list contributes 0 for that list. Results are
//! sorted by fused score descending, with exact ties broken by the item's
//! position in the semantic list and then in the lexical list.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{CatalogItem, FusedCandidate, ScoredCandidate};

/// Clamp a raw score into `[0, +inf)`, mapping NaN and infinities to 0.
fn sanitize(score: f64) -> f64 {
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

/// Divisor used to bring lexical scores into `[0, 1]`.
///
/// Returns 1 when the batch is empty or its maximum is not positive, so that
/// all-zero batches normalize to zero instead of dividing by zero.
pub fn lexical_divisor(lexical: &[ScoredCandidate<'_>]) -> f64 {
    let max = lexical
        .iter()
        .map(|c| sanitize(c.score))
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max } else { 1.0 }
}

struct Accumulator<'a> {
    item: &'a CatalogItem,
    semantic_rank: Option<usize>,
    lexical_rank: Option<usize>,
    score: f64,
}

/// Fuse two ranked candidate lists into one list of at most `pool_size` items.
///
/// Weights are applied as given; they are not required to sum to 1 and are
/// not renormalized. If an item occurs more than once in the same input
/// list, only its first occurrence counts.
pub fn fuse<'a>(
    semantic: &[ScoredCandidate<'a>],
    lexical: &[ScoredCandidate<'a>],
    semantic_weight: f64,
    lexical_weight: f64,
    pool_size: usize,
) -> Vec<FusedCandidate<'a>> {
    let divisor = lexical_divisor(lexical);
    let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(semantic.len() + lexical.len());
    let mut entries: Vec<Accumulator<'a>> = Vec::with_capacity(semantic.len() + lexical.len());

    for (rank, candidate) in semantic.iter().enumerate() {
        let url = candidate.item.url.as_str();
        if index.contains_key(url) {
            continue;
        }
        index.insert(url, entries.len());
        entries.push(Accumulator {
            item: candidate.item,
            semantic_rank: Some(rank),
            lexical_rank: None,
            score: semantic_weight * sanitize(candidate.score),
        });
    }

    for (rank, candidate) in lexical.iter().enumerate() {
        let url = candidate.item.url.as_str();
        let contribution = lexical_weight * (sanitize(candidate.score) / divisor);
        match index.get(url) {
            Some(&i) => {
                let entry = &mut entries[i];
                if entry.lexical_rank.is_none() {
                    entry.lexical_rank = Some(rank);
                    entry.score += contribution;
                }
            }
            None => {
                index.insert(url, entries.len());
                entries.push(Accumulator {
                    item: candidate.item,
                    semantic_rank: None,
                    lexical_rank: Some(rank),
                    score: contribution,
                });
            }
        }
    }

    for entry in &mut entries {
        entry.score = sanitize(entry.score);
    }

    entries.sort_by(compare);
    entries.truncate(pool_size);

    entries
        .into_iter()
        .map(|e| FusedCandidate {
            item: e.item,
            score: e.score,
        })
        .collect()
}

/// Total order: score descending, then semantic rank, then lexical rank.
/// A missing rank sorts after any present one.
fn compare(a: &Accumulator<'_>, b: &Accumulator<'_>) -> Ordering {
    let rank = |r: Option<usize>| r.unwrap_or(usize::MAX);
    b.score
        .total_cmp(&a.score)
        .then_with(|| rank(a.semantic_rank).cmp(&rank(b.semantic_rank)))
        .then_with(|| rank(a.lexical_rank).cmp(&rank(b.lexical_rank)))
}
