/// Constants used by facet names and metadata line encoding.
pub mod facets {
    /// Separator between a facet name and its value (for example `feature=12`).
    pub const FACET_DELIMITER: &str = "=";
    /// Separator between encoded facets in a metadata line.
    pub const METADATA_LINE_SEPARATOR: &str = " | ";
    /// Sentinel filter value meaning "no constraint".
    pub const WILDCARD: &str = "all";

    /// Facet key for feature ids.
    pub const FEATURE: &str = "feature";
    /// Facet key for text groups.
    pub const GROUP: &str = "group";
    /// Facet key for the sub-source a text came from.
    pub const SUB_SOURCE: &str = "sub_source";
    /// Facet key for the generating model.
    pub const MODEL: &str = "model";
    /// Facet key for integer labels.
    pub const LABEL: &str = "label";
    /// Facet key for model layers.
    pub const LAYER: &str = "layer";
}

/// Constants used by dataset schemas and record parsing.
pub mod schema {
    /// Field holding the token array.
    pub const TOKENS_KEY: &str = "tokens";
    /// Magnitude field used by group-based datasets.
    pub const FIRING_MAGNITUDES_KEY: &str = "firing_magnitudes";
    /// Magnitude field used by layer-based datasets.
    pub const ACTIVATIONS_KEY: &str = "activations";
    /// Record id field used by group-based datasets and per-text resources.
    pub const TEXT_ID_KEY: &str = "text_id";
    /// Record id field used by layer-based datasets.
    pub const ID_KEY: &str = "id";
    /// Resource suffix for compressed datasets.
    pub const GZIP_JSON_SUFFIX: &str = ".json.gz";
    /// Resource suffix for plain datasets.
    pub const JSON_SUFFIX: &str = ".json";
    /// Schema name for group-based datasets.
    pub const GROUPED_SCHEMA_NAME: &str = "grouped";
    /// Schema name for layer-based datasets.
    pub const LAYERED_SCHEMA_NAME: &str = "layered";
}

/// Constants used by resource transports and payload decoding.
pub mod source {
    /// Leading bytes of every gzip member.
    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
    /// Default cap on HTTP response bodies (256 MiB).
    pub const DEFAULT_MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;
    /// Source id reported by the in-memory transport.
    pub const IN_MEMORY_SOURCE_ID: &str = "memory";
    /// Failure reason reported when a background load worker dies.
    pub const LOAD_WORKER_STOPPED_REASON: &str = "load worker stopped before completing";
}

/// Constants used by the render projection and HTML output.
pub mod render {
    /// Default highlight color (red) as RGB.
    pub const DEFAULT_HIGHLIGHT_RGB: (u8, u8, u8) = (255, 0, 0);
    /// Default number of decimals shown in magnitude tooltips.
    pub const DEFAULT_TOOLTIP_PRECISION: usize = 4;
    /// Prefix of the per-token tooltip text.
    pub const TOOLTIP_LABEL: &str = "Activation";
    /// CSS class on each record block.
    pub const RECORD_CLASS: &str = "record";
    /// CSS class on each record's metadata line.
    pub const METADATA_CLASS: &str = "record-meta";
    /// CSS class on each token span.
    pub const TOKEN_CLASS: &str = "token";
}
