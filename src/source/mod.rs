//! Resource sources and the dataset loader.
//!
//! Ownership model:
//! - `ResourceSource` turns a resource name into bytes (filesystem, HTTP, memory).
//! - `DatasetLoader` owns a source plus a `DatasetSchema` and runs the
//!   fetch → decode → parse → enrich sequence for datasets, metadata maps and
//!   per-text documents.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::DatasetSchema;
use crate::constants::source::IN_MEMORY_SOURCE_ID;
use crate::data::Dataset;
use crate::enrich::enrich;
use crate::errors::LoadError;
use crate::metadata::{FeatureMetadata, TextDocument};
use crate::types::{DatasetId, ResourceName};

/// Payload decoding (gzip detection and JSON parsing).
pub mod decode;
/// JSON entry to `Record` conversion.
pub mod records;
/// Source implementation modules.
pub mod sources;

pub use sources::file_source::FileSource;
#[cfg(feature = "http")]
pub use sources::http_source::HttpSource;

/// Byte-level access to named resources.
pub trait ResourceSource: Send + Sync {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Fetch the raw bytes of `resource`.
    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError>;

    /// Names of resources this source can serve, when it can enumerate them.
    ///
    /// Sources that cannot enumerate (for example plain HTTP) return an empty list.
    fn list(&self) -> Result<Vec<ResourceName>, LoadError> {
        Ok(Vec::new())
    }
}

/// Resource source backed by an in-memory map.
#[derive(Default)]
pub struct InMemorySource {
    resources: RwLock<HashMap<ResourceName, Arc<Vec<u8>>>>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource.
    pub fn insert(&self, resource: impl Into<ResourceName>, bytes: impl Into<Vec<u8>>) {
        self.resources
            .write()
            .expect("in-memory source poisoned")
            .insert(resource.into(), Arc::new(bytes.into()));
    }

    /// Builder-style `insert`.
    pub fn with_resource(self, resource: impl Into<ResourceName>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(resource, bytes);
        self
    }

    /// Remove a resource; later fetches fail.
    pub fn remove(&self, resource: &str) {
        self.resources
            .write()
            .expect("in-memory source poisoned")
            .remove(resource);
    }
}

impl ResourceSource for InMemorySource {
    fn id(&self) -> &str {
        IN_MEMORY_SOURCE_ID
    }

    fn fetch(&self, resource: &str) -> Result<Vec<u8>, LoadError> {
        let resources = self.resources.read().expect("in-memory source poisoned");
        resources
            .get(resource)
            .map(|bytes| bytes.as_ref().clone())
            .ok_or_else(|| LoadError::Fetch {
                resource: resource.to_string(),
                reason: "resource not found".into(),
            })
    }

    fn list(&self) -> Result<Vec<ResourceName>, LoadError> {
        let resources = self.resources.read().expect("in-memory source poisoned");
        let mut names: Vec<ResourceName> = resources.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Loads datasets and auxiliary resources through a `ResourceSource`.
#[derive(Clone)]
pub struct DatasetLoader {
    source: Arc<dyn ResourceSource>,
    schema: DatasetSchema,
}

impl DatasetLoader {
    /// Create a loader for `source` using `schema`.
    pub fn new(source: Arc<dyn ResourceSource>, schema: DatasetSchema) -> Self {
        Self { source, schema }
    }

    /// Schema applied to datasets.
    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    /// Identifier of the underlying source.
    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    /// Fetch, decode, parse and enrich `dataset_id`.
    ///
    /// Per-record schema problems are tolerated and attached to the dataset.
    /// Any fetch, decompression or parse failure yields `LoadError` and no data.
    pub fn load(&self, dataset_id: &str) -> Result<Dataset, LoadError> {
        let resource = self.schema.resource_for(dataset_id);
        let start = Instant::now();
        let value = self.fetch_json(&resource)?;
        let entries = value.as_array().ok_or_else(|| LoadError::Shape {
            resource: resource.clone(),
            details: format!("expected a JSON array of records, found {}", json_kind(&value)),
        });
        let entries = entries.inspect_err(|err| self.log_failure(err))?;
        let parsed = records::parse_records(dataset_id, entries, &self.schema);
        if let Some(first) = parsed.issues.first() {
            warn!(
                source_id = %self.source.id(),
                resource = %resource,
                issues = parsed.issues.len(),
                first = %first,
                "tolerated schema problems while parsing dataset"
            );
            for issue in &parsed.issues {
                debug!(resource = %resource, issue = %issue, "schema problem");
            }
        }
        let dataset = enrich(Dataset::new(dataset_id, parsed.records).with_issues(parsed.issues));
        info!(
            source_id = %self.source.id(),
            resource = %resource,
            schema = %self.schema.name,
            records = dataset.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Fetch and parse a feature metadata map.
    pub fn load_metadata(&self, resource: &str) -> Result<FeatureMetadata, LoadError> {
        let value = self.fetch_json(resource)?;
        let metadata: FeatureMetadata = serde_json::from_value(value)
            .map_err(|err| LoadError::Shape {
                resource: resource.to_string(),
                details: format!("feature metadata: {err}"),
            })
            .inspect_err(|err| self.log_failure(err))?;
        debug!(resource = %resource, features = metadata.len(), "feature metadata loaded");
        Ok(metadata)
    }

    /// Fetch and parse a single-text document.
    pub fn load_text(&self, resource: &str) -> Result<TextDocument, LoadError> {
        let value = self.fetch_json(resource)?;
        serde_json::from_value(value)
            .map_err(|err| LoadError::Shape {
                resource: resource.to_string(),
                details: format!("text document: {err}"),
            })
            .inspect_err(|err| self.log_failure(err))
    }

    /// Dataset ids the source can serve under this schema's resource suffix.
    pub fn available_datasets(&self) -> Result<Vec<DatasetId>, LoadError> {
        Ok(self
            .source
            .list()?
            .iter()
            .filter_map(|resource| self.schema.dataset_id_for(resource))
            .collect())
    }

    fn fetch_json(&self, resource: &str) -> Result<Value, LoadError> {
        let bytes = self
            .source
            .fetch(resource)
            .inspect_err(|err| self.log_failure(err))?;
        debug!(
            source_id = %self.source.id(),
            resource = %resource,
            bytes = bytes.len(),
            gzip = decode::is_gzip(&bytes),
            "resource fetched"
        );
        decode::decode_json(resource, &bytes).inspect_err(|err| self.log_failure(err))
    }

    fn log_failure(&self, err: &LoadError) {
        warn!(
            source_id = %self.source.id(),
            resource = %err.resource(),
            error = %err,
            "resource load failed"
        );
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
