/// Unique record identifier within a dataset.
/// Examples: `text_0042`, `layer_6:17` (synthetic fallback)
pub type RecordId = String;
/// Identifier for a dataset as selected by a user.
/// Examples: `layer_6`, `feature_activations`
pub type DatasetId = String;
/// Name of a byte resource as understood by a `ResourceSource`.
/// Examples: `layer_6.json.gz`, `feature_metadata.json`, `texts/text_0042.json`
pub type ResourceName = String;
/// One token of a tokenized text, as emitted by the upstream tokenizer.
/// Examples: `The`, ` cat`, `\n`
pub type Token = String;
/// Raw non-negative per-token activation magnitude.
pub type Magnitude = f64;
/// Normalized per-token intensity in `[0, 1]`.
pub type Intensity = f64;
/// Upstream feature identifier as used in metadata maps.
/// Examples: `12`, `4031`
pub type FeatureKey = String;
/// Rendered metadata line for a record.
/// Example: `feature=12 | group=news | model=gpt2`
pub type MetadataLine = String;
