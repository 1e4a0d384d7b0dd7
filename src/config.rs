use std::borrow::Cow;

use crate::constants::render::{DEFAULT_HIGHLIGHT_RGB, DEFAULT_TOOLTIP_PRECISION};
use crate::constants::schema::{
    ACTIVATIONS_KEY, FIRING_MAGNITUDES_KEY, GROUPED_SCHEMA_NAME, GZIP_JSON_SUFFIX, ID_KEY,
    LAYERED_SCHEMA_NAME, TEXT_ID_KEY, TOKENS_KEY,
};
#[cfg(feature = "http")]
use crate::constants::source::DEFAULT_MAX_BODY_BYTES;
use crate::facets::Facet;
use crate::types::{DatasetId, ResourceName};

/// Describes how records of one dataset variant are laid out upstream.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetSchema {
    /// Schema name used in logs.
    pub name: Cow<'static, str>,
    /// Field holding the record id; a synthetic id is used when absent.
    pub id_key: Cow<'static, str>,
    /// Field holding the token array.
    pub tokens_key: Cow<'static, str>,
    /// Field holding the per-token magnitude array.
    pub magnitude_key: Cow<'static, str>,
    /// Facets extracted from each record, in display order.
    pub facets: Vec<Facet>,
    /// Suffix appended to a dataset id to form its resource name.
    pub resource_suffix: Cow<'static, str>,
}

impl DatasetSchema {
    /// Group-based datasets: `firing_magnitudes` with feature/group/sub_source/model/label facets.
    pub fn grouped() -> Self {
        Self {
            name: Cow::Borrowed(GROUPED_SCHEMA_NAME),
            id_key: Cow::Borrowed(TEXT_ID_KEY),
            tokens_key: Cow::Borrowed(TOKENS_KEY),
            magnitude_key: Cow::Borrowed(FIRING_MAGNITUDES_KEY),
            facets: vec![
                Facet::Feature,
                Facet::Group,
                Facet::SubSource,
                Facet::Model,
                Facet::Label,
            ],
            resource_suffix: Cow::Borrowed(GZIP_JSON_SUFFIX),
        }
    }

    /// Layer-based datasets: `activations` with layer/feature facets.
    pub fn layered() -> Self {
        Self {
            name: Cow::Borrowed(LAYERED_SCHEMA_NAME),
            id_key: Cow::Borrowed(ID_KEY),
            tokens_key: Cow::Borrowed(TOKENS_KEY),
            magnitude_key: Cow::Borrowed(ACTIVATIONS_KEY),
            facets: vec![Facet::Layer, Facet::Feature],
            resource_suffix: Cow::Borrowed(GZIP_JSON_SUFFIX),
        }
    }

    /// Override the magnitude field.
    pub fn with_magnitude_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.magnitude_key = key.into();
        self
    }

    /// Override the id field.
    pub fn with_id_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.id_key = key.into();
        self
    }

    /// Override the facet set.
    pub fn with_facets(mut self, facets: impl IntoIterator<Item = Facet>) -> Self {
        self.facets = facets.into_iter().collect();
        self
    }

    /// Override the resource suffix (for example `.json` for uncompressed data).
    pub fn with_resource_suffix(mut self, suffix: impl Into<Cow<'static, str>>) -> Self {
        self.resource_suffix = suffix.into();
        self
    }

    /// Resource name for `dataset_id`.
    pub fn resource_for(&self, dataset_id: &str) -> ResourceName {
        format!("{dataset_id}{}", self.resource_suffix)
    }

    /// Inverse of `resource_for`: the dataset id of a resource, if it carries this schema's suffix.
    pub fn dataset_id_for(&self, resource: &str) -> Option<DatasetId> {
        resource
            .strip_suffix(self.resource_suffix.as_ref())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self::grouped()
    }
}

/// Settings for the HTTP resource transport.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpSourceConfig {
    /// Base URL resources are resolved against (no trailing slash needed).
    pub base_url: String,
    /// Maximum accepted response body size in bytes.
    pub max_body_bytes: u64,
}

#[cfg(feature = "http")]
impl HttpSourceConfig {
    /// Create a config for `base_url` with the default body limit.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the body size limit.
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Full URL for `resource`.
    pub fn url_for(&self, resource: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}

/// Presentation settings for HTML rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Highlight color; the per-token alpha channel carries the intensity.
    pub highlight_rgb: (u8, u8, u8),
    /// Decimals shown for raw magnitudes in tooltips.
    pub tooltip_precision: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight_rgb: DEFAULT_HIGHLIGHT_RGB,
            tooltip_precision: DEFAULT_TOOLTIP_PRECISION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_round_trip_through_suffix() {
        let schema = DatasetSchema::layered();
        assert_eq!(schema.resource_for("layer_6"), "layer_6.json.gz");
        assert_eq!(schema.dataset_id_for("layer_6.json.gz"), Some("layer_6".into()));
        assert_eq!(schema.dataset_id_for("layer_6.json"), None);
        assert_eq!(schema.dataset_id_for(".json.gz"), None);
    }

    #[test]
    fn presets_differ_only_in_layout() {
        let grouped = DatasetSchema::grouped();
        let layered = DatasetSchema::layered();
        assert_eq!(grouped.magnitude_key, "firing_magnitudes");
        assert_eq!(layered.magnitude_key, "activations");
        assert!(grouped.facets.contains(&Facet::Group));
        assert_eq!(layered.facets, vec![Facet::Layer, Facet::Feature]);
        assert_eq!(grouped.tokens_key, layered.tokens_key);
    }

    #[test]
    fn builders_override_fields() {
        let schema = DatasetSchema::grouped()
            .with_magnitude_key("scores")
            .with_id_key("uid")
            .with_facets([Facet::Model])
            .with_resource_suffix(".json");
        assert_eq!(schema.magnitude_key, "scores");
        assert_eq!(schema.id_key, "uid");
        assert_eq!(schema.facets, vec![Facet::Model]);
        assert_eq!(schema.resource_for("x"), "x.json");
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_urls_join_cleanly() {
        let config = HttpSourceConfig::new("https://host/data/");
        assert_eq!(config.url_for("/a.json"), "https://host/data/a.json");
        assert_eq!(config.url_for("b.json.gz"), "https://host/data/b.json.gz");
    }
}
