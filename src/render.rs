//! Render projection: what a visual layer needs to draw a record.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::config::RenderConfig;
use crate::constants::facets::METADATA_LINE_SEPARATOR;
use crate::constants::render::{METADATA_CLASS, RECORD_CLASS, TOKEN_CLASS, TOOLTIP_LABEL};
use crate::data::Record;
use crate::facets::{Facet, FacetValue};
use crate::normalize::normalize_intensities;
use crate::types::{Intensity, Magnitude, MetadataLine, RecordId, Token};

/// One token with its normalized intensity and raw magnitude.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderToken {
    /// Token text.
    pub text: Token,
    /// Intensity in `[0, 1]`, drives the color channel.
    pub intensity: Intensity,
    /// Raw magnitude, shown in the tooltip.
    pub magnitude: Magnitude,
}

/// Everything the visual layer needs for one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Facet values in display order.
    pub attributes: Vec<(Facet, FacetValue)>,
    /// Sum of raw magnitudes.
    pub activation_score: f64,
    /// Tokens with intensities.
    pub tokens: Vec<RenderToken>,
}

impl RenderRecord {
    /// Facet values encoded as `feature=12 | group=news`.
    pub fn metadata_line(&self) -> MetadataLine {
        self.attributes
            .iter()
            .map(|(facet, value)| facet.encode(value))
            .collect::<Vec<_>>()
            .join(METADATA_LINE_SEPARATOR)
    }
}

/// Project one record for rendering.
pub fn project(record: &Record) -> RenderRecord {
    let intensities = normalize_intensities(record.magnitudes());
    let tokens = record
        .tokens()
        .iter()
        .zip(record.magnitudes())
        .zip(intensities)
        .map(|((text, magnitude), intensity)| RenderToken {
            text: text.clone(),
            intensity,
            magnitude: *magnitude,
        })
        .collect();
    RenderRecord {
        id: record.id().to_string(),
        attributes: record
            .attributes()
            .iter()
            .map(|(facet, value)| (*facet, value.clone()))
            .collect(),
        activation_score: record.activation_score(),
        tokens,
    }
}

/// Project a sequence of records, keeping their order.
pub fn project_all<'a, I>(records: I) -> Vec<RenderRecord>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().map(project).collect()
}

/// Inline CSS for a token of the given intensity.
pub fn token_style(intensity: Intensity, config: &RenderConfig) -> String {
    let (r, g, b) = config.highlight_rgb;
    format!(
        "background-color: rgba({r}, {g}, {b}, {:.3})",
        intensity.clamp(0.0, 1.0)
    )
}

/// Tooltip text for a raw magnitude.
pub fn tooltip(magnitude: Magnitude, config: &RenderConfig) -> String {
    format!(
        "{TOOLTIP_LABEL}: {magnitude:.precision$}",
        precision = config.tooltip_precision
    )
}

/// Render records as HTML blocks of colored token spans.
///
/// Each block starts with the metadata line; each token carries its raw
/// magnitude as a `title` tooltip.
pub fn render_html(records: &[RenderRecord], config: &RenderConfig) -> String {
    let mut html = String::new();
    for record in records {
        html.push_str(&format!(
            "<div class=\"{RECORD_CLASS}\" data-record-id=\"{}\">",
            encode_double_quoted_attribute(&record.id)
        ));
        html.push_str(&format!(
            "<div class=\"{METADATA_CLASS}\">{}</div><p style=\"white-space: pre-wrap\">",
            encode_text(&record.metadata_line())
        ));
        for token in &record.tokens {
            html.push_str(&format!(
                "<span class=\"{TOKEN_CLASS}\" style=\"{}\" title=\"{}\">{}</span>",
                token_style(token.intensity, config),
                encode_double_quoted_attribute(&tooltip(token.magnitude, config)),
                encode_text(&token.text)
            ));
        }
        html.push_str("</p></div>\n");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(
            "b",
            vec!["<a>".into(), " b".into(), "c".into()],
            vec![0.0, 0.0, 10.0],
        )
        .with_attribute(Facet::Feature, 4)
        .with_attribute(Facet::Group, "news & co")
    }

    #[test]
    fn projection_carries_normalized_and_raw_values() {
        let projected = project(&record());
        let intensities: Vec<f64> = projected.tokens.iter().map(|t| t.intensity).collect();
        let raw: Vec<f64> = projected.tokens.iter().map(|t| t.magnitude).collect();
        assert_eq!(intensities, vec![0.0, 0.0, 1.0]);
        assert_eq!(raw, vec![0.0, 0.0, 10.0]);
        assert_eq!(projected.activation_score, 10.0);
        assert_eq!(projected.metadata_line(), "feature=4 | group=news & co");
    }

    #[test]
    fn tooltip_shows_raw_magnitude() {
        let config = RenderConfig::default();
        assert_eq!(tooltip(10.0, &config), "Activation: 10.0000");
        assert_eq!(
            token_style(0.5, &config),
            "background-color: rgba(255, 0, 0, 0.500)"
        );
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let html = render_html(&[project(&record())], &RenderConfig::default());
        assert!(html.contains("&lt;a&gt;"));
        assert!(html.contains("news &amp; co"));
        assert!(html.contains("title=\"Activation: 10.0000\""));
        assert!(html.contains("data-record-id=\"b\""));
        assert_eq!(html.matches("<span").count(), 3);
    }

    #[test]
    fn each_record_renders_one_closed_block() {
        let other = Record::new("c", vec!["z".into()], vec![1.0]);
        let html = render_html(&project_all([&record(), &other]), &RenderConfig::default());
        assert_eq!(html.matches("<div class=\"record\"").count(), 2);
        assert_eq!(html.matches("</p></div>\n").count(), 2);
        assert!(html.find("data-record-id=\"b\"") < html.find("data-record-id=\"c\""));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_html(&[], &RenderConfig::default()).is_empty());
    }
}
