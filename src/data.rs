use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::enrich::activation_score;
use crate::errors::SchemaError;
use crate::facets::{Facet, FacetValue};

pub use crate::types::{DatasetId, Magnitude, RecordId, Token};

/// One annotated token sequence.
///
/// `tokens` and `magnitudes` are always the same length: construction pads
/// missing magnitudes with 0 and drops extra ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    tokens: Vec<Token>,
    magnitudes: Vec<Magnitude>,
    attributes: IndexMap<Facet, FacetValue>,
    activation_score: f64,
}

impl Record {
    /// Build a record, aligning `magnitudes` to the token count.
    pub fn new(id: impl Into<RecordId>, tokens: Vec<Token>, mut magnitudes: Vec<Magnitude>) -> Self {
        magnitudes.resize(tokens.len(), 0.0);
        let activation_score = activation_score(&magnitudes);
        Self {
            id: id.into(),
            tokens,
            magnitudes,
            attributes: IndexMap::new(),
            activation_score,
        }
    }

    /// Attach a facet value, replacing any previous value for that facet.
    pub fn with_attribute(mut self, facet: Facet, value: impl Into<FacetValue>) -> Self {
        self.attributes.insert(facet, value.into());
        self
    }

    /// Record identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Per-token magnitudes, index-aligned with `tokens`.
    pub fn magnitudes(&self) -> &[Magnitude] {
        &self.magnitudes
    }

    /// Value of `facet`, if the record carries it.
    pub fn attribute(&self, facet: Facet) -> Option<&FacetValue> {
        self.attributes.get(&facet)
    }

    /// All facet values in insertion order.
    pub fn attributes(&self) -> &IndexMap<Facet, FacetValue> {
        &self.attributes
    }

    /// Sum of magnitudes, as last computed by the enricher.
    pub fn activation_score(&self) -> f64 {
        self.activation_score
    }

    pub(crate) fn set_activation_score(&mut self, score: f64) {
        self.activation_score = score;
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the record has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Ordered collection of records loaded from one resource.
#[derive(Clone, Debug, Serialize)]
pub struct Dataset {
    /// Identifier the dataset was loaded under.
    pub id: DatasetId,
    /// Records in upstream order.
    pub records: Vec<Record>,
    /// When this snapshot was produced.
    pub loaded_at: DateTime<Utc>,
    /// Schema violations tolerated while parsing.
    #[serde(skip)]
    pub issues: Vec<SchemaError>,
}

impl Dataset {
    /// Build a dataset snapshot stamped with the current time.
    pub fn new(id: impl Into<DatasetId>, records: Vec<Record>) -> Self {
        Self {
            id: id.into(),
            records,
            loaded_at: Utc::now(),
            issues: Vec::new(),
        }
    }

    /// Empty dataset, used after a failed load.
    pub fn empty(id: impl Into<DatasetId>) -> Self {
        Self::new(id, Vec::new())
    }

    /// Attach tolerated schema issues.
    pub fn with_issues(mut self, issues: Vec<SchemaError>) -> Self {
        self.issues = issues;
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id() == id)
    }
}
