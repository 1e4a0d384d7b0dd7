//! Conjunctive exact-match filtering over records.

use indexmap::IndexMap;
use serde::Serialize;

use crate::constants::facets::WILDCARD;
use crate::data::Record;
use crate::errors::FilterError;
use crate::facets::{Facet, FacetKind, FacetValue};

/// Set of optional exact-match constraints, one per facet.
///
/// Facets without a constraint match every record.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterSpec {
    constraints: IndexMap<Facet, FacetValue>,
}

impl FilterSpec {
    /// Unconstrained spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `facet` to an already-typed value.
    pub fn with(mut self, facet: Facet, value: impl Into<FacetValue>) -> Self {
        self.constraints.insert(facet, value.into());
        self
    }

    /// Constrain `facet` from a raw control value.
    ///
    /// Empty input or `"all"` clears the constraint. Numeric facets parse
    /// the input as an integer.
    pub fn with_raw(mut self, facet: Facet, raw: &str) -> Result<Self, FilterError> {
        match parse_constraint(facet, raw)? {
            Some(value) => {
                self.constraints.insert(facet, value);
            }
            None => {
                self.constraints.shift_remove(&facet);
            }
        }
        Ok(self)
    }

    /// Remove any constraint on `facet`.
    pub fn clear(&mut self, facet: Facet) {
        self.constraints.shift_remove(&facet);
    }

    /// Constraint on `facet`, if any.
    pub fn constraint(&self, facet: Facet) -> Option<&FacetValue> {
        self.constraints.get(&facet)
    }

    /// True when no facet is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }

    /// True when `record` satisfies every constraint.
    pub fn matches(&self, record: &Record) -> bool {
        self.constraints
            .iter()
            .all(|(facet, expected)| record.attribute(*facet) == Some(expected))
    }
}

/// Interpret a raw control value for `facet`. `Ok(None)` means unconstrained.
pub fn parse_constraint(facet: Facet, raw: &str) -> Result<Option<FacetValue>, FilterError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(WILDCARD) {
        return Ok(None);
    }
    match facet.kind() {
        FacetKind::Numeric => trimmed
            .parse::<i64>()
            .map(|value| Some(FacetValue::Int(value)))
            .map_err(|_| FilterError::InvalidConstraint {
                facet: facet.as_str().to_string(),
                value: raw.to_string(),
            }),
        FacetKind::Text => Ok(Some(FacetValue::Text(raw.to_string()))),
    }
}

/// Records satisfying every constraint in `spec`, in their original order.
pub fn filter_records<'a>(records: &'a [Record], spec: &FilterSpec) -> Vec<&'a Record> {
    if spec.is_unconstrained() {
        return records.iter().collect();
    }
    records.iter().filter(|record| spec.matches(record)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, feature: i64, group: &str) -> Record {
        Record::new(id, vec!["t".into()], vec![1.0])
            .with_attribute(Facet::Feature, feature)
            .with_attribute(Facet::Group, group)
    }

    #[test]
    fn empty_spec_returns_everything_in_order() {
        let records = vec![record("a", 1, "news"), record("b", 2, "blog")];
        let ids: Vec<_> = filter_records(&records, &FilterSpec::new())
            .into_iter()
            .map(Record::id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn string_constraint_uses_exact_equality() {
        let records = vec![record("a", 1, "news"), record("b", 1, "blog"), record("c", 1, "News")];
        let spec = FilterSpec::new().with(Facet::Group, "news");
        let ids: Vec<_> = filter_records(&records, &spec)
            .into_iter()
            .map(Record::id)
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn numeric_constraint_is_parsed_from_text() {
        let records = vec![record("a", 7, "x"), record("b", 8, "x"), record("c", 7, "y")];
        let spec = FilterSpec::new().with_raw(Facet::Feature, " 7 ").unwrap();
        let ids: Vec<_> = filter_records(&records, &spec)
            .into_iter()
            .map(Record::id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);

        let both = spec.with_raw(Facet::Group, "y").unwrap();
        let ids: Vec<_> = filter_records(&records, &both)
            .into_iter()
            .map(Record::id)
            .collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn wildcard_clears_constraint() {
        let spec = FilterSpec::new()
            .with(Facet::Group, "news")
            .with_raw(Facet::Group, "all")
            .unwrap()
            .with_raw(Facet::Feature, "")
            .unwrap();
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn invalid_numeric_constraint_is_rejected() {
        let err = FilterSpec::new().with_raw(Facet::Label, "seven").unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidConstraint {
                facet: "label".into(),
                value: "seven".into()
            }
        );
    }

    #[test]
    fn record_without_constrained_facet_does_not_match() {
        let bare = Record::new("bare", vec!["t".into()], vec![0.0]);
        let spec = FilterSpec::new().with(Facet::Model, "gpt2");
        assert!(!spec.matches(&bare));
        assert!(FilterSpec::new().matches(&bare));
    }
}
