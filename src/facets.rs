//! Facet names, facet values, and the facet index used to populate selection controls.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::facets::{
    FACET_DELIMITER, FEATURE, GROUP, LABEL, LAYER, MODEL, SUB_SOURCE,
};
use crate::data::Record;
use crate::errors::FilterError;

/// Filterable record attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Feature,
    Group,
    SubSource,
    Model,
    Label,
    Layer,
}

/// How values of a facet compare and sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetKind {
    /// Integer valued; string inputs are parsed before comparison.
    Numeric,
    /// Compared by exact string equality.
    Text,
}

impl Facet {
    /// Every facet, in canonical display order.
    pub const ALL: [Facet; 6] = [
        Facet::Feature,
        Facet::Layer,
        Facet::Group,
        Facet::SubSource,
        Facet::Model,
        Facet::Label,
    ];

    /// Upstream JSON key for this facet.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Facet::Feature => FEATURE,
            Facet::Group => GROUP,
            Facet::SubSource => SUB_SOURCE,
            Facet::Model => MODEL,
            Facet::Label => LABEL,
            Facet::Layer => LAYER,
        }
    }

    /// Value kind for this facet.
    pub const fn kind(&self) -> FacetKind {
        match self {
            Facet::Feature | Facet::Label | Facet::Layer => FacetKind::Numeric,
            Facet::Group | Facet::SubSource | Facet::Model => FacetKind::Text,
        }
    }

    /// Encode a value as `name=value` (for example `feature=12`).
    pub fn encode(&self, value: impl fmt::Display) -> String {
        format!("{}{}{}", self.as_str(), FACET_DELIMITER, value)
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Facet::ALL
            .into_iter()
            .find(|facet| facet.as_str() == value)
            .ok_or_else(|| FilterError::UnknownFacet(value.to_string()))
    }
}

/// A single facet value. Numeric facets hold `Int`, string facets hold `Text`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Int(i64),
    Text(String),
}

impl FacetValue {
    /// Integer payload, if this is a numeric value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FacetValue::Int(value) => Some(*value),
            FacetValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FacetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetValue::Int(value) => write!(f, "{value}"),
            FacetValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for FacetValue {
    fn from(value: i64) -> Self {
        FacetValue::Int(value)
    }
}

impl From<i32> for FacetValue {
    fn from(value: i32) -> Self {
        FacetValue::Int(i64::from(value))
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::Text(value.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(value: String) -> Self {
        FacetValue::Text(value)
    }
}

/// Sorted distinct values per facet, derived from a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FacetIndex {
    values: IndexMap<Facet, Vec<FacetValue>>,
}

impl FacetIndex {
    /// Sorted distinct values observed for `facet` (empty when the facet is not indexed).
    pub fn values(&self, facet: Facet) -> &[FacetValue] {
        self.values.get(&facet).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Facets covered by this index, in schema order.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.values.keys().copied()
    }

    /// True when no facet has any value.
    pub fn is_empty(&self) -> bool {
        self.values.values().all(Vec::is_empty)
    }
}

/// Collect the sorted distinct values of each facet in `facets` across `records`.
///
/// Numeric values sort ascending by integer value, text values lexicographically.
/// The result does not depend on record order.
pub fn extract_facets(records: &[Record], facets: &[Facet]) -> FacetIndex {
    let mut values = IndexMap::with_capacity(facets.len());
    for facet in facets {
        let distinct: BTreeSet<&FacetValue> = records
            .iter()
            .filter_map(|record| record.attribute(*facet))
            .collect();
        values.insert(*facet, distinct.into_iter().cloned().collect());
    }
    FacetIndex { values }
}
