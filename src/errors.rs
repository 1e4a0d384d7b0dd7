use thiserror::Error;

use crate::types::{RecordId, ResourceName};

/// Failure while retrieving a dataset, metadata map, or per-text resource.
///
/// Every variant names the resource so callers can log and display it.
/// Causes are captured as text so the error can be cloned into session state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("resource '{resource}' could not be fetched: {reason}")]
    Fetch {
        resource: ResourceName,
        reason: String,
    },
    #[error("resource '{resource}' could not be decompressed: {reason}")]
    Decompress {
        resource: ResourceName,
        reason: String,
    },
    #[error("resource '{resource}' is not valid JSON: {reason}")]
    Parse {
        resource: ResourceName,
        reason: String,
    },
    #[error("resource '{resource}' has an unexpected shape: {details}")]
    Shape {
        resource: ResourceName,
        details: String,
    },
}

impl LoadError {
    /// Name of the resource that failed to load.
    pub fn resource(&self) -> &str {
        match self {
            LoadError::Fetch { resource, .. }
            | LoadError::Decompress { resource, .. }
            | LoadError::Parse { resource, .. }
            | LoadError::Shape { resource, .. } => resource,
        }
    }
}

/// Per-record schema violation tolerated during dataset parsing.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("entry {index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("record '{record_id}' has no token array")]
    MissingTokens { record_id: RecordId },
    #[error("record '{record_id}' has no '{key}' array; magnitudes default to 0")]
    MissingMagnitudes { record_id: RecordId, key: String },
    #[error("record '{record_id}' has {tokens} tokens but {magnitudes} magnitudes")]
    LengthMismatch {
        record_id: RecordId,
        tokens: usize,
        magnitudes: usize,
    },
    #[error("record '{record_id}' has a non-numeric or negative magnitude at index {index}")]
    InvalidMagnitude { record_id: RecordId, index: usize },
    #[error("record '{record_id}' has an unusable '{facet}' value: {value}")]
    InvalidFacet {
        record_id: RecordId,
        facet: String,
        value: String,
    },
}

/// Failure while building a filter from user-supplied values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("'{value}' is not a valid integer for facet '{facet}'")]
    InvalidConstraint { facet: String, value: String },
    #[error("unknown facet '{0}'")]
    UnknownFacet(String),
}
