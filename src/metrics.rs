use std::collections::HashMap;

use crate::data::Record;
use crate::facets::{Facet, FacetValue};

/// How records of a slice are spread over the values of one facet.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetDistribution {
    pub facet: Facet,
    /// Records considered.
    pub total: usize,
    /// Records lacking the facet.
    pub missing: usize,
    pub distinct: usize,
    /// Share of the most common value among records carrying the facet.
    pub max_share: f64,
    pub per_value: Vec<ValueShare>,
}

/// Count and share of one facet value.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueShare {
    pub value: FacetValue,
    pub count: usize,
    pub share: f64,
}

/// Compute the distribution of `facet` over `records`.
/// Values are ordered by count (descending), then by value.
pub fn facet_distribution<'a, I>(records: I, facet: Facet) -> Option<FacetDistribution>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts: HashMap<&FacetValue, usize> = HashMap::new();
    let mut total = 0usize;
    let mut missing = 0usize;
    for record in records {
        total += 1;
        match record.attribute(facet) {
            Some(value) => *counts.entry(value).or_default() += 1,
            None => missing += 1,
        }
    }
    if total == 0 {
        return None;
    }
    let present = total - missing;
    let share = |count: usize| {
        if present == 0 {
            0.0
        } else {
            count as f64 / present as f64
        }
    };
    let mut per_value: Vec<ValueShare> = counts
        .into_iter()
        .map(|(value, count)| ValueShare {
            value: value.clone(),
            count,
            share: share(count),
        })
        .collect();
    per_value.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    let max_share = per_value.first().map(|entry| entry.share).unwrap_or(0.0);
    Some(FacetDistribution {
        facet,
        total,
        missing,
        distinct: per_value.len(),
        max_share,
        per_value,
    })
}
