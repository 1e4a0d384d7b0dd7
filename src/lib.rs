#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Dataset schema, transport and render configuration.
pub mod config;
/// Centralized constants used across sources, facets and rendering.
pub mod constants;
/// Record and dataset types.
pub mod data;
/// Activation score derivation.
pub mod enrich;
/// Reusable example runners shared by demos.
pub mod example_apps;
/// Facet names, values and the facet index.
pub mod facets;
/// Conjunctive facet filtering.
pub mod filter;
/// Feature metadata and per-text documents.
pub mod metadata;
/// Facet distribution metrics.
pub mod metrics;
/// Per-record intensity normalization.
pub mod normalize;
/// Render projection and HTML output.
pub mod render;
/// Session controller with generation-guarded loading.
pub mod session;
/// Activation score ordering.
pub mod sort;
/// Resource sources and the dataset loader.
pub mod source;
/// Byte transports used by sources (filesystem, HTTP).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{DatasetSchema, RenderConfig};
#[cfg(feature = "http")]
pub use config::HttpSourceConfig;
pub use data::{Dataset, Record};
pub use enrich::{activation_score, enrich};
pub use errors::{FilterError, LoadError, SchemaError};
pub use facets::{Facet, FacetIndex, FacetKind, FacetValue, extract_facets};
pub use filter::{FilterSpec, filter_records};
pub use metadata::{FeatureDescriptor, FeatureMetadata, TextDocument};
pub use metrics::{FacetDistribution, facet_distribution};
pub use normalize::{local_max, normalize_intensities};
pub use render::{RenderRecord, RenderToken, project, render_html};
pub use session::{LoadHandle, LoadOutcome, LoadTicket, Selection, Session};
pub use sort::{SortDirection, sort_by_activation};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DatasetLoader, FileSource, InMemorySource, ResourceSource};
pub use types::{
    DatasetId, FeatureKey, Intensity, Magnitude, MetadataLine, RecordId, ResourceName, Token,
};
