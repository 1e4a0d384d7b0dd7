//! Feature metadata maps and single-text documents.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::facets::METADATA_LINE_SEPARATOR;
use crate::data::{Record, Token};
use crate::facets::{Facet, FacetValue};
use crate::types::{FeatureKey, RecordId};

/// Quality scores and display tags for one feature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Aggregate quality score.
    #[serde(rename = "Macro F1", default, skip_serializing_if = "Option::is_none")]
    pub macro_f1: Option<f64>,
    /// Score per facet value (for example per group).
    #[serde(default, alias = "group_scores", skip_serializing_if = "BTreeMap::is_empty")]
    pub scores: BTreeMap<String, f64>,
    /// Rank per facet value; 1 is best.
    #[serde(default, alias = "group_ranks", skip_serializing_if = "BTreeMap::is_empty")]
    pub ranks: BTreeMap<String, u32>,
    /// Remaining fields, kept for display (boolean flags, tag arrays, notes).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FeatureDescriptor {
    /// Facet value with the best (lowest) rank, ties broken by name.
    pub fn best_ranked(&self) -> Option<(&str, u32)> {
        self.ranks
            .iter()
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(name, rank)| (name.as_str(), *rank))
    }

    /// Display tags: names of `true` flags plus the strings of tag arrays.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for (key, value) in &self.extra {
            match value {
                Value::Bool(true) => tags.push(key.clone()),
                Value::Array(items) => tags.extend(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string),
                ),
                _ => {}
            }
        }
        tags
    }

    /// One-line summary for display next to a feature selector.
    pub fn summary_line(&self, precision: usize) -> String {
        let mut parts = Vec::new();
        if let Some(f1) = self.macro_f1 {
            parts.push(format!("Macro F1: {f1:.precision$}"));
        }
        if let Some((name, rank)) = self.best_ranked() {
            match self.scores.get(name) {
                Some(score) => parts.push(format!("best: {name} (rank {rank}, {score:.precision$})")),
                None => parts.push(format!("best: {name} (rank {rank})")),
            }
        }
        let tags = self.tags();
        if !tags.is_empty() {
            parts.push(format!("tags: {}", tags.join(", ")));
        }
        parts.join(METADATA_LINE_SEPARATOR)
    }
}

/// Map from feature id to descriptor, in upstream order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMetadata {
    features: IndexMap<FeatureKey, FeatureDescriptor>,
}

impl FeatureMetadata {
    /// Descriptor for a feature id given as text.
    pub fn get(&self, feature: &str) -> Option<&FeatureDescriptor> {
        self.features.get(feature)
    }

    /// Descriptor for a `feature` facet value.
    pub fn for_value(&self, value: &FacetValue) -> Option<&FeatureDescriptor> {
        self.features.get(value.to_string().as_str())
    }

    /// Iterate over `(feature id, descriptor)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureDescriptor)> {
        self.features
            .iter()
            .map(|(key, descriptor)| (key.as_str(), descriptor))
    }

    /// Number of described features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True when no features are described.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A single tokenized text with its scalar facets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextDocument {
    pub text_id: RecordId,
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<FacetValue>,
}

impl TextDocument {
    /// Convert into a record with zero magnitudes, carrying sub_source/model/label facets.
    ///
    /// `label` is numeric; values that do not parse as integers are dropped.
    pub fn into_record(self) -> Record {
        let magnitudes = vec![0.0; self.tokens.len()];
        let mut record = Record::new(self.text_id, self.tokens, magnitudes);
        if let Some(sub_source) = self.sub_source {
            record = record.with_attribute(Facet::SubSource, sub_source);
        }
        if let Some(model) = self.model {
            record = record.with_attribute(Facet::Model, model);
        }
        let label = match self.label {
            Some(FacetValue::Int(value)) => Some(value),
            Some(FacetValue::Text(text)) => {
                let parsed = text.trim().parse::<i64>().ok();
                if parsed.is_none() {
                    debug!(record_id = %record.id(), label = %text, "dropping non-integer label");
                }
                parsed
            }
            None => None,
        };
        if let Some(label) = label {
            record = record.with_attribute(Facet::Label, label);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_reads_scores_ranks_and_tags() {
        let metadata: FeatureMetadata = serde_json::from_value(json!({
            "12": {
                "Macro F1": 0.83,
                "scores": {"news": 0.9, "blog": 0.4},
                "ranks": {"news": 1, "blog": 7},
                "dead": false,
                "interpretable": true,
                "concepts": ["finance", "dates"]
            },
            "13": {}
        }))
        .unwrap();
        assert_eq!(metadata.len(), 2);
        let descriptor = metadata.get("12").unwrap();
        assert_eq!(descriptor.macro_f1, Some(0.83));
        assert_eq!(descriptor.best_ranked(), Some(("news", 1)));
        assert_eq!(descriptor.tags(), vec!["finance", "dates", "interpretable"]);
        assert_eq!(
            descriptor.summary_line(2),
            "Macro F1: 0.83 | best: news (rank 1, 0.90) | tags: finance, dates, interpretable"
        );
        assert_eq!(
            metadata.for_value(&FacetValue::Int(13)),
            Some(&FeatureDescriptor::default())
        );
        assert_eq!(metadata.for_value(&FacetValue::Int(14)), None);
    }

    #[test]
    fn text_document_becomes_zero_magnitude_record() {
        let document: TextDocument = serde_json::from_value(json!({
            "text_id": "t9",
            "tokens": ["hi", "there"],
            "sub_source": "reddit",
            "model": "gpt2",
            "label": "3"
        }))
        .unwrap();
        let record = document.into_record();
        assert_eq!(record.id(), "t9");
        assert_eq!(record.magnitudes(), &[0.0, 0.0]);
        assert_eq!(record.attribute(Facet::Label), Some(&FacetValue::Int(3)));
        assert_eq!(record.attribute(Facet::SubSource), Some(&FacetValue::from("reddit")));
    }

    #[test]
    fn non_integer_label_is_dropped() {
        let document: TextDocument = serde_json::from_value(json!({
            "text_id": "t10",
            "tokens": ["ok"],
            "label": "positive"
        }))
        .unwrap();
        let record = document.into_record();
        assert!(record.attribute(Facet::Label).is_none());

        let records = [record];
        let index = crate::facets::extract_facets(&records, &[Facet::Label]);
        assert!(index.values(Facet::Label).is_empty());
    }
}
