//! Conversion of upstream JSON entries into `Record`s.
//!
//! Parsing is tolerant per entry: an entry that cannot yield a record (not an
//! object, no token array) is skipped, while recoverable problems (missing or
//! misaligned magnitudes, odd facet values) are defaulted. Every problem is
//! reported as a `SchemaError` alongside the parsed records.

use serde_json::{Map, Value};

use crate::config::DatasetSchema;
use crate::data::{Magnitude, Record, Token};
use crate::errors::SchemaError;
use crate::facets::{Facet, FacetKind, FacetValue};

/// Records parsed from one dataset plus the schema problems encountered.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    /// Records that could be built, in upstream order.
    pub records: Vec<Record>,
    /// Tolerated problems, including those of skipped entries.
    pub issues: Vec<SchemaError>,
}

/// Parse every entry of a dataset array.
pub fn parse_records(dataset_id: &str, entries: &[Value], schema: &DatasetSchema) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    for (index, entry) in entries.iter().enumerate() {
        match parse_record(dataset_id, index, entry, schema, &mut parsed.issues) {
            Ok(record) => parsed.records.push(record),
            Err(err) => parsed.issues.push(err),
        }
    }
    parsed
}

/// Parse one entry. Recoverable problems are appended to `issues`.
pub fn parse_record(
    dataset_id: &str,
    index: usize,
    entry: &Value,
    schema: &DatasetSchema,
    issues: &mut Vec<SchemaError>,
) -> Result<Record, SchemaError> {
    let object = entry
        .as_object()
        .ok_or(SchemaError::NotAnObject { index })?;

    let record_id = object
        .get(schema.id_key.as_ref())
        .and_then(value_to_text)
        .unwrap_or_else(|| format!("{dataset_id}:{index}"));

    let tokens = object
        .get(schema.tokens_key.as_ref())
        .and_then(Value::as_array)
        .map(|values| values.iter().map(token_text).collect::<Vec<Token>>())
        .ok_or_else(|| SchemaError::MissingTokens {
            record_id: record_id.clone(),
        })?;

    let magnitudes = match object
        .get(schema.magnitude_key.as_ref())
        .and_then(Value::as_array)
    {
        Some(values) => parse_magnitudes(&record_id, values, issues),
        None => {
            issues.push(SchemaError::MissingMagnitudes {
                record_id: record_id.clone(),
                key: schema.magnitude_key.to_string(),
            });
            Vec::new()
        }
    };
    if !magnitudes.is_empty() && magnitudes.len() != tokens.len() {
        issues.push(SchemaError::LengthMismatch {
            record_id: record_id.clone(),
            tokens: tokens.len(),
            magnitudes: magnitudes.len(),
        });
    }

    let mut record = Record::new(record_id.clone(), tokens, magnitudes);
    for facet in &schema.facets {
        if let Some(value) = read_facet(&record_id, *facet, object, issues) {
            record = record.with_attribute(*facet, value);
        }
    }
    Ok(record)
}

fn parse_magnitudes(
    record_id: &str,
    values: &[Value],
    issues: &mut Vec<SchemaError>,
) -> Vec<Magnitude> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value.as_f64() {
            Some(number) if number.is_finite() && number >= 0.0 => number,
            _ => {
                issues.push(SchemaError::InvalidMagnitude {
                    record_id: record_id.to_string(),
                    index,
                });
                0.0
            }
        })
        .collect()
}

fn read_facet(
    record_id: &str,
    facet: Facet,
    object: &Map<String, Value>,
    issues: &mut Vec<SchemaError>,
) -> Option<FacetValue> {
    let value = object.get(facet.as_str())?;
    if value.is_null() {
        return None;
    }
    let parsed = match facet.kind() {
        FacetKind::Numeric => numeric_facet(value),
        FacetKind::Text => value_to_text(value).map(FacetValue::Text),
    };
    if parsed.is_none() {
        issues.push(SchemaError::InvalidFacet {
            record_id: record_id.to_string(),
            facet: facet.as_str().to_string(),
            value: value.to_string(),
        });
    }
    parsed
}

fn numeric_facet(value: &Value) -> Option<FacetValue> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                    .map(|float| float as i64)
            })
            .map(FacetValue::Int),
        Value::String(text) => text.trim().parse::<i64>().ok().map(FacetValue::Int),
        _ => None,
    }
}

/// Scalar JSON value as text. Null and blank strings yield `None`.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn token_text(value: &Value) -> Token {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
